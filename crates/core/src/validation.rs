//! Field-level form schemas.
//!
//! A [`FormSchema`] lists the fields of a form together with the rules each
//! field must satisfy. Pages validate a single field when it loses focus
//! ([`FormSchema::validate_field`]) and the whole form on submit
//! ([`FormSchema::validate`]); submission is blocked while any field fails.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Submitted form values keyed by field name.
pub type FormValues = Map<String, Value>;

/// How a field is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; stored as a JSON string.
    Text,
    /// Checkbox; present in the form body only when ticked, stored as a JSON bool.
    Checkbox,
}

/// A single rule a field value must satisfy.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Non-blank text, or any checkbox state.
    Required,
    /// At least this many characters.
    MinLength(usize),
    /// Must match the regular expression.
    Pattern(Regex),
    /// Looks like an email address.
    Email,
    /// Checkbox must be ticked.
    MustBeTrue,
    /// A decimal number `>= 0`.
    NonNegativeDecimal,
    /// A whole number `>= 0`.
    NonNegativeInteger,
    /// One of a fixed set of values.
    OneOf(&'static [&'static str]),
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static validation pattern compiles")
}

fn pattern(pattern: &str) -> Rule {
    Rule::Pattern(compile(pattern))
}

impl Rule {
    /// Whether a non-empty text value passes this rule.
    ///
    /// `Required` and `MustBeTrue` look at presence rather than text and are
    /// handled by [`FieldSchema::check`].
    fn accepts_text(&self, text: &str) -> bool {
        match self {
            Self::Required | Self::MustBeTrue => true,
            Self::MinLength(min) => text.chars().count() >= *min,
            Self::Pattern(re) => re.is_match(text),
            Self::Email => EMAIL.is_match(text),
            Self::NonNegativeDecimal => text
                .trim()
                .parse::<Decimal>()
                .is_ok_and(|amount| !amount.is_sign_negative()),
            Self::NonNegativeInteger => text.trim().parse::<u32>().is_ok(),
            Self::OneOf(allowed) => allowed.contains(&text),
        }
    }
}

/// One field of a form.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// HTML input type used when rendering the field.
    pub input_type: &'static str,
    /// Initial value shown before the visitor types anything.
    pub default: &'static str,
    rules: Vec<(Rule, &'static str)>,
}

impl FieldSchema {
    /// A text field.
    #[must_use]
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            input_type: "text",
            default: "",
            rules: Vec::new(),
        }
    }

    /// A checkbox field.
    #[must_use]
    pub const fn checkbox(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Checkbox,
            input_type: "checkbox",
            default: "",
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn input_type(mut self, input_type: &'static str) -> Self {
        self.input_type = input_type;
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: &'static str) -> Self {
        self.default = default;
        self
    }

    /// Append a rule with the message shown when it fails.
    #[must_use]
    pub fn rule(mut self, rule: Rule, message: &'static str) -> Self {
        self.rules.push((rule, message));
        self
    }

    /// Whether a value is required for this field.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|(rule, _)| matches!(rule, Rule::Required | Rule::MustBeTrue))
    }

    /// Check the field's value. Returns the message of the first failing rule.
    ///
    /// Rules other than `Required`/`MustBeTrue` are skipped for empty values,
    /// so an optional field may be left blank.
    #[must_use]
    pub fn check(&self, values: &FormValues) -> Option<&'static str> {
        let value = values.get(self.name);
        let text = value.and_then(value_text);

        self.rules.iter().find_map(|(rule, message)| {
            let ok = match rule {
                Rule::Required => match value {
                    None | Some(Value::Null) => false,
                    Some(Value::String(s)) => !s.trim().is_empty(),
                    Some(_) => true,
                },
                Rule::MustBeTrue => matches!(value, Some(Value::Bool(true))),
                other => text
                    .as_deref()
                    .is_none_or(|text| text.is_empty() || other.accepts_text(text)),
            };
            (!ok).then_some(*message)
        })
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The fields of a form and their rules.
#[derive(Debug, Clone)]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
}

impl FormSchema {
    #[must_use]
    pub const fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Values a blank form starts with.
    #[must_use]
    pub fn initial_values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|field| {
                let value = match field.kind {
                    FieldKind::Text => Value::String(field.default.to_string()),
                    FieldKind::Checkbox => Value::Bool(false),
                };
                (field.name.to_string(), value)
            })
            .collect()
    }

    /// Convert a url-encoded form body into typed values.
    ///
    /// Only fields known to the schema are kept. Missing text fields become
    /// empty strings; a checkbox is `true` when present with `on` or `true`.
    #[must_use]
    pub fn values_from_form(&self, raw: &HashMap<String, String>) -> FormValues {
        self.fields
            .iter()
            .map(|field| {
                let submitted = raw.get(field.name);
                let value = match field.kind {
                    FieldKind::Text => Value::String(submitted.cloned().unwrap_or_default()),
                    FieldKind::Checkbox => {
                        Value::Bool(submitted.is_some_and(|v| v == "on" || v == "true"))
                    }
                };
                (field.name.to_string(), value)
            })
            .collect()
    }

    /// Validate a single field (the on-blur check).
    #[must_use]
    pub fn validate_field(&self, name: &str, values: &FormValues) -> Option<&'static str> {
        self.field(name)?.check(values)
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self, values: &FormValues) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        for field in &self.fields {
            if let Some(message) = field.check(values) {
                errors.insert(field.name, message);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// =============================================================================
// Schemas
// =============================================================================

/// Payment methods shown on the payment page; only `card` is accepted.
pub const PAYMENT_METHODS: &[&str] = &["card", "paypal", "applePay"];

/// Shipping address form.
#[must_use]
pub fn address_schema() -> &'static FormSchema {
    static SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
        FormSchema::new(vec![
            FieldSchema::text("fullName", "Full name")
                .rule(Rule::Required, "Full name is required"),
            FieldSchema::text("email", "Email")
                .input_type("email")
                .rule(Rule::Required, "Email is required")
                .rule(Rule::Email, "Enter a valid email address"),
            FieldSchema::text("address", "Address")
                .rule(Rule::Required, "Address is required"),
            FieldSchema::text("city", "City").rule(Rule::Required, "City is required"),
            FieldSchema::text("zipCode", "Zip code")
                .rule(Rule::Required, "Zip code is required")
                .rule(pattern(r"^[0-9]{4,10}$"), "Zip code must be 4 to 10 digits"),
            FieldSchema::text("country", "Country")
                .rule(Rule::Required, "Country is required"),
            FieldSchema::text("phoneNumber", "Phone number")
                .input_type("tel")
                .rule(Rule::Required, "Phone number is required")
                .rule(pattern(r"^\+?[0-9 ]{6,20}$"), "Enter a valid phone number"),
        ])
    });
    &SCHEMA
}

/// Payment details form.
#[must_use]
pub fn payment_schema() -> &'static FormSchema {
    static SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
        FormSchema::new(vec![
            FieldSchema::text("paymentMethod", "Payment method")
                .default_value("card")
                .rule(Rule::Required, "Choose a payment method")
                .rule(Rule::OneOf(&["card"]), "Only card payments are available"),
            FieldSchema::text("cardholderName", "Cardholder name")
                .rule(Rule::Required, "Cardholder name is required"),
            FieldSchema::text("cardNumber", "Card number")
                .rule(Rule::Required, "Card number is required")
                .rule(pattern(r"^[0-9]{16}$"), "Card number must be 16 digits"),
            FieldSchema::text("cardExpiry", "Card expiry date")
                .rule(Rule::Required, "Expiry date is required")
                .rule(
                    pattern(r"^(0[1-9]|1[0-2])/[0-9]{2}$"),
                    "Expiry date must look like MM/YY",
                ),
            FieldSchema::text("cardCvv", "CVV code")
                .rule(Rule::Required, "CVV is required")
                .rule(pattern(r"^[0-9]{3,4}$"), "CVV must be 3 or 4 digits"),
            FieldSchema::checkbox(
                "cardAgreement",
                "I have read and I accept the conditions, general terms and privacy policy.",
            )
            .rule(Rule::MustBeTrue, "You must accept the conditions to continue."),
        ])
    });
    &SCHEMA
}

/// New product form.
#[must_use]
pub fn new_product_schema() -> &'static FormSchema {
    static SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
        FormSchema::new(vec![
            FieldSchema::text("title", "Title").rule(Rule::Required, "Title is required"),
            FieldSchema::text("price", "Price")
                .input_type("number")
                .rule(Rule::Required, "Price is required")
                .rule(Rule::NonNegativeDecimal, "Price must be zero or more"),
            FieldSchema::text("img", "Image URL").rule(Rule::Required, "Image is required"),
            FieldSchema::text("unitsInStock", "Units in stock")
                .input_type("number")
                .rule(Rule::Required, "Units in stock is required")
                .rule(
                    Rule::NonNegativeInteger,
                    "Units in stock must be a whole number",
                ),
        ])
    });
    &SCHEMA
}

/// Sign-in form.
#[must_use]
pub fn sign_in_schema() -> &'static FormSchema {
    static SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
        FormSchema::new(vec![
            FieldSchema::text("email", "Email")
                .input_type("email")
                .rule(Rule::Required, "Email is required")
                .rule(Rule::Email, "Enter a valid email address"),
            FieldSchema::text("password", "Password")
                .input_type("password")
                .rule(Rule::Required, "Password is required")
                .rule(Rule::MinLength(6), "Password must be at least 6 characters"),
        ])
    });
    &SCHEMA
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn valid_payment() -> HashMap<String, String> {
        raw(&[
            ("paymentMethod", "card"),
            ("cardholderName", "Ada Lovelace"),
            ("cardNumber", "4242424242424242"),
            ("cardExpiry", "09/27"),
            ("cardCvv", "123"),
            ("cardAgreement", "on"),
        ])
    }

    #[test]
    fn test_valid_payment_passes() {
        let schema = payment_schema();
        let values = schema.values_from_form(&valid_payment());

        assert!(schema.validate(&values).is_ok());
        assert_eq!(values["cardAgreement"], json!(true));
    }

    #[test]
    fn test_payment_agreement_must_be_ticked() {
        let schema = payment_schema();
        let mut form = valid_payment();
        form.remove("cardAgreement");

        let errors = schema
            .validate(&schema.values_from_form(&form))
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("cardAgreement"),
            Some("You must accept the conditions to continue.")
        );
    }

    #[test]
    fn test_payment_card_patterns() {
        let schema = payment_schema();
        let mut form = valid_payment();
        form.insert("cardNumber".into(), "4242".into());
        form.insert("cardExpiry".into(), "13/27".into());
        form.insert("cardCvv".into(), "12a".into());

        let errors = schema
            .validate(&schema.values_from_form(&form))
            .unwrap_err();

        assert_eq!(errors.get("cardNumber"), Some("Card number must be 16 digits"));
        assert_eq!(errors.get("cardExpiry"), Some("Expiry date must look like MM/YY"));
        assert_eq!(errors.get("cardCvv"), Some("CVV must be 3 or 4 digits"));
    }

    #[test]
    fn test_required_reported_before_pattern() {
        let schema = payment_schema();
        let values = schema.values_from_form(&raw(&[("cardNumber", "   ")]));

        assert_eq!(
            schema.validate_field("cardNumber", &values),
            Some("Card number is required")
        );
    }

    #[test]
    fn test_disabled_payment_method_rejected() {
        let schema = payment_schema();
        let mut form = valid_payment();
        form.insert("paymentMethod".into(), "paypal".into());

        let values = schema.values_from_form(&form);

        assert_eq!(
            schema.validate_field("paymentMethod", &values),
            Some("Only card payments are available")
        );
    }

    #[test]
    fn test_initial_values_use_defaults() {
        let values = payment_schema().initial_values();

        assert_eq!(values["paymentMethod"], json!("card"));
        assert_eq!(values["cardNumber"], json!(""));
        assert_eq!(values["cardAgreement"], json!(false));
    }

    #[test]
    fn test_unknown_form_fields_are_dropped() {
        let values = address_schema().values_from_form(&raw(&[("admin", "true")]));

        assert!(!values.contains_key("admin"));
        assert_eq!(values.len(), address_schema().fields().len());
    }

    #[test]
    fn test_address_schema() {
        let schema = address_schema();
        let form = raw(&[
            ("fullName", "Ada Lovelace"),
            ("email", "ada@example"),
            ("address", "12 St James's Square"),
            ("city", "London"),
            ("zipCode", "SW1Y"),
            ("country", "UK"),
            ("phoneNumber", "+44 20 7946 0958"),
        ]);

        let errors = schema
            .validate(&schema.values_from_form(&form))
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors.get("email").is_some());
        assert!(errors.get("zipCode").is_some());
    }

    #[test]
    fn test_new_product_numbers() {
        let schema = new_product_schema();
        let form = raw(&[
            ("title", "Lamp"),
            ("price", "-1"),
            ("img", "lamp.png"),
            ("unitsInStock", "2.5"),
        ]);

        let errors = schema
            .validate(&schema.values_from_form(&form))
            .unwrap_err();

        assert_eq!(errors.get("price"), Some("Price must be zero or more"));
        assert!(errors.get("unitsInStock").is_some());
        assert!(errors.get("title").is_none());
    }

    #[test]
    fn test_new_product_accepts_free_item() {
        let schema = new_product_schema();
        let values = schema.values_from_form(&raw(&[("price", "0")]));

        assert_eq!(schema.validate_field("price", &values), None);
    }

    #[test]
    fn test_sign_in_min_length() {
        let schema = sign_in_schema();
        let values = schema.values_from_form(&raw(&[("email", "a@b.co"), ("password", "12345")]));

        assert_eq!(
            schema.validate_field("password", &values),
            Some("Password must be at least 6 characters")
        );
        assert!(schema.field("password").unwrap().is_required());
    }
}

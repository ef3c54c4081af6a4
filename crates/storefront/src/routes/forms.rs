//! Form rendering helpers and the single-field validation endpoint.
//!
//! Pages render a [`FormSchema`] through [`field_views`]. Each input posts
//! its own value to `/forms/{form}/{field}` on blur (HTMX) and swaps the
//! returned message into its error slot.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::Path, response::IntoResponse};
use serde_json::Value;
use shopcart_core::validation::{
    FieldKind, FieldSchema, PAYMENT_METHODS, address_schema, new_product_schema, payment_schema,
    sign_in_schema,
};
use shopcart_core::{FieldErrors, FormSchema, FormValues};
use tracing::instrument;

use crate::error::{AppError, Result};

/// A radio choice.
#[derive(Clone)]
pub struct ChoiceView {
    pub value: &'static str,
    pub label: &'static str,
    pub checked: bool,
    pub disabled: bool,
}

/// One rendered form field.
#[derive(Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub is_checkbox: bool,
    pub required: bool,
    pub error: Option<String>,
    /// Non-empty for fields rendered as a radio group.
    pub choices: Vec<ChoiceView>,
    pub validate_url: String,
}

/// Build the views for every field of a schema.
///
/// `form` is the name the field validation endpoint knows the schema by.
#[must_use]
pub fn field_views(
    form: &str,
    schema: &FormSchema,
    values: &FormValues,
    errors: &FieldErrors,
) -> Vec<FieldView> {
    schema
        .fields()
        .iter()
        .map(|field| field_view(form, field, values, errors))
        .collect()
}

fn field_view(
    form: &str,
    field: &FieldSchema,
    values: &FormValues,
    errors: &FieldErrors,
) -> FieldView {
    let value = match values.get(field.name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let checked = matches!(values.get(field.name), Some(Value::Bool(true)));

    let choices = if field.name == "paymentMethod" {
        payment_choices(&value)
    } else {
        Vec::new()
    };

    FieldView {
        name: field.name,
        label: field.label,
        input_type: field.input_type,
        value,
        checked,
        is_checkbox: field.kind == FieldKind::Checkbox,
        required: field.is_required(),
        error: errors.get(field.name).map(String::from),
        choices,
        validate_url: format!("/forms/{form}/{}", field.name),
    }
}

/// Payment method radios. Only card payments can be chosen.
fn payment_choices(selected: &str) -> Vec<ChoiceView> {
    PAYMENT_METHODS
        .iter()
        .map(|&method| ChoiceView {
            value: method,
            label: match method {
                "card" => "Credit/Debit Card",
                "paypal" => "PayPal",
                "applePay" => "Apple Pay",
                other => other,
            },
            checked: method == selected,
            disabled: method != "card",
        })
        .collect()
}

/// Look up a schema by the name used in validation URLs.
#[must_use]
pub fn schema_named(form: &str) -> Option<&'static FormSchema> {
    match form {
        "address" => Some(address_schema()),
        "payment" => Some(payment_schema()),
        "new-product" => Some(new_product_schema()),
        "sign-in" => Some(sign_in_schema()),
        _ => None,
    }
}

// =============================================================================
// Field Validation (HTMX)
// =============================================================================

/// Error message fragment for one field.
#[derive(Template, WebTemplate)]
#[template(path = "partials/field_error.html")]
pub struct FieldErrorTemplate {
    pub message: Option<&'static str>,
}

/// Validate a single field as it loses focus.
#[instrument(skip(raw))]
pub async fn validate_field(
    Path((form, field)): Path<(String, String)>,
    Form(raw): Form<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let schema =
        schema_named(&form).ok_or_else(|| AppError::NotFound(format!("form {form}")))?;
    if schema.field(&field).is_none() {
        return Err(AppError::NotFound(format!("field {field} of form {form}")));
    }

    let values = schema.values_from_form(&raw);
    Ok(FieldErrorTemplate {
        message: schema.validate_field(&field, &values),
    })
}

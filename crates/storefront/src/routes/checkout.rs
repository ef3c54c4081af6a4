//! Checkout route handlers.
//!
//! The checkout walks the pages in [`CHECKOUT_PAGES`] order. The address and
//! payment pages validate their form, merge the accepted values into the
//! session's checkout draft, pause for the configured submit delay and then
//! redirect to the next page.
//!
//! [`CHECKOUT_PAGES`]: shopcart_core::pages::CHECKOUT_PAGES

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use shopcart_core::validation::{address_schema, payment_schema};
use shopcart_core::{CheckoutDraft, CheckoutPage, FieldErrors, FormSchema, FormValues};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::CartView;
use super::forms::{FieldView, field_views};
use super::layout::Layout;
use crate::checkout_context::{checkout_draft, update_checkout_context};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Header of every checkout page.
#[derive(Clone)]
pub struct StepView {
    pub title: &'static str,
    pub path: &'static str,
    /// "Step N of M".
    pub progress: String,
    pub previous_path: Option<&'static str>,
}

impl From<CheckoutPage> for StepView {
    fn from(page: CheckoutPage) -> Self {
        Self {
            title: page.title(),
            path: page.path(),
            progress: page.progress().to_string(),
            previous_path: page.previous().map(CheckoutPage::path),
        }
    }
}

/// Redirect to the page after `page`.
fn redirect_after(page: CheckoutPage) -> Redirect {
    Redirect::to(page.next().map_or("/", CheckoutPage::path))
}

async fn cart_view(state: &AppState) -> CartView {
    CartView::from(state.shop().cart().await.as_slice())
}

// =============================================================================
// Step 1: Detail
// =============================================================================

/// Cart review page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/detail.html")]
pub struct DetailTemplate {
    pub layout: Layout,
    pub step: StepView,
    pub cart: CartView,
}

/// Display the cart review page.
#[instrument(skip(state, user))]
pub async fn detail(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let cart = cart_view(&state).await;
    DetailTemplate {
        layout: Layout::new(user, cart.item_count),
        step: StepView::from(CheckoutPage::Detail),
        cart,
    }
}

/// Continue from the cart review to the address page.
#[instrument]
pub async fn submit_detail() -> Redirect {
    redirect_after(CheckoutPage::Detail)
}

// =============================================================================
// Steps 2 and 3: Address and Payment
// =============================================================================

/// A checkout page with a validated form.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutFormTemplate {
    pub layout: Layout,
    pub step: StepView,
    pub cart: CartView,
    pub fields: Vec<FieldView>,
    pub has_errors: bool,
}

/// A form page of the checkout and the schema it validates against.
#[derive(Clone, Copy)]
struct FormPage {
    page: CheckoutPage,
    form: &'static str,
    schema: fn() -> &'static FormSchema,
}

const ADDRESS: FormPage = FormPage {
    page: CheckoutPage::Address,
    form: "address",
    schema: address_schema,
};

const PAYMENT: FormPage = FormPage {
    page: CheckoutPage::Payment,
    form: "payment",
    schema: payment_schema,
};

impl FormPage {
    /// Values to pre-fill: schema defaults overlaid with the draft.
    fn prefill(self, draft: &CheckoutDraft) -> FormValues {
        let mut values = (self.schema)().initial_values();
        for (name, value) in values.iter_mut() {
            if let Some(saved) = draft.get(name) {
                value.clone_from(saved);
            }
        }
        values
    }

    async fn render(
        self,
        state: &AppState,
        user: Option<CurrentUser>,
        values: &FormValues,
        errors: &FieldErrors,
    ) -> CheckoutFormTemplate {
        let cart = cart_view(state).await;
        CheckoutFormTemplate {
            layout: Layout::new(user, cart.item_count),
            step: StepView::from(self.page),
            cart,
            fields: field_views(self.form, (self.schema)(), values, errors),
            has_errors: !errors.is_empty(),
        }
    }

    async fn show(
        self,
        state: &AppState,
        session: &Session,
        user: Option<CurrentUser>,
    ) -> Result<CheckoutFormTemplate> {
        let draft = checkout_draft(session).await?;
        let values = self.prefill(&draft);
        Ok(self
            .render(state, user, &values, &FieldErrors::default())
            .await)
    }

    async fn submit(
        self,
        state: &AppState,
        session: &Session,
        user: Option<CurrentUser>,
        raw: &HashMap<String, String>,
    ) -> Result<Response> {
        let schema = (self.schema)();
        let values = schema.values_from_form(raw);

        if let Err(errors) = schema.validate(&values) {
            tracing::debug!(form = self.form, failed = errors.len(), "Checkout form rejected");
            let page = self.render(state, user, &values, &errors).await;
            return Ok(page.into_response());
        }

        update_checkout_context(session, values).await?;
        add_breadcrumb("checkout", "Checkout step completed", Some(&[("form", self.form)]));

        tokio::time::sleep(state.config().submit_delay).await;
        Ok(redirect_after(self.page).into_response())
    }
}

/// Display the address form.
#[instrument(skip(state, session, user))]
pub async fn address(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    ADDRESS.show(&state, &session, user).await
}

/// Validate the address and continue to payment.
#[instrument(skip(state, session, user, raw))]
pub async fn submit_address(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(raw): Form<HashMap<String, String>>,
) -> Result<Response> {
    ADDRESS.submit(&state, &session, user, &raw).await
}

/// Display the payment form.
#[instrument(skip(state, session, user))]
pub async fn payment(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    PAYMENT.show(&state, &session, user).await
}

/// Validate the payment details and continue to the summary.
#[instrument(skip(state, session, user, raw))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(raw): Form<HashMap<String, String>>,
) -> Result<Response> {
    PAYMENT.submit(&state, &session, user, &raw).await
}

// =============================================================================
// Step 4: Summary
// =============================================================================

/// A labelled value on the summary page.
#[derive(Clone)]
pub struct SummaryEntry {
    pub label: &'static str,
    pub value: String,
}

/// Order summary page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/summary.html")]
pub struct SummaryTemplate {
    pub layout: Layout,
    pub step: StepView,
    pub cart: CartView,
    pub shipping: Vec<SummaryEntry>,
    pub payment: Vec<SummaryEntry>,
    pub date: String,
}

/// Fields of `schema` present in the draft, in schema order.
///
/// Card numbers show only their last four digits; the CVV and the terms
/// checkbox are never shown.
fn summary_entries(schema: &FormSchema, draft: &CheckoutDraft) -> Vec<SummaryEntry> {
    schema
        .fields()
        .iter()
        .filter(|field| !matches!(field.name, "cardCvv" | "cardAgreement"))
        .filter_map(|field| {
            let value = draft.text(field.name)?;
            let value = if field.name == "cardNumber" {
                mask_card_number(&value)
            } else {
                value
            };
            Some(SummaryEntry {
                label: field.label,
                value,
            })
        })
        .collect()
}

fn mask_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits.iter().skip(digits.len().saturating_sub(4)).collect();
    format!("**** **** **** {tail}")
}

/// Display the order summary: draft, cart and today's date.
#[instrument(skip(state, session, user))]
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let draft = checkout_draft(&session).await?;
    let cart = cart_view(&state).await;

    Ok(SummaryTemplate {
        layout: Layout::new(user, cart.item_count),
        step: StepView::from(CheckoutPage::Summary),
        cart,
        shipping: summary_entries(address_schema(), &draft),
        payment: summary_entries(payment_schema(), &draft),
        date: chrono::Local::now().format("%-m/%-d/%Y").to_string(),
    })
}

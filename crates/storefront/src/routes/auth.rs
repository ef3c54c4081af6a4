//! Authentication route handlers.
//!
//! Sign-in only validates the form shape; no credentials are checked. The
//! accepted email is kept in the session until logout.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use shopcart_core::validation::sign_in_schema;
use shopcart_core::{FieldErrors, FormValues};
use tower_sessions::Session;
use tracing::instrument;

use super::forms::{FieldView, field_views};
use super::layout::Layout;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Name the field validation endpoint knows this form by.
const FORM_NAME: &str = "sign-in";

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/sign_in.html")]
pub struct SignInTemplate {
    pub layout: Layout,
    pub fields: Vec<FieldView>,
}

fn render_form(layout: Layout, values: &FormValues, errors: &FieldErrors) -> SignInTemplate {
    SignInTemplate {
        layout,
        fields: field_views(FORM_NAME, sign_in_schema(), values, errors),
    }
}

/// Display the sign-in page.
#[instrument(skip(state, user))]
pub async fn sign_in_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let layout = Layout::load(&state, user).await;
    render_form(
        layout,
        &sign_in_schema().initial_values(),
        &FieldErrors::default(),
    )
}

/// Handle sign-in form submission.
#[instrument(skip(state, session, user, raw))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(raw): Form<HashMap<String, String>>,
) -> Result<Response> {
    let schema = sign_in_schema();
    let values = schema.values_from_form(&raw);

    if let Err(errors) = schema.validate(&values) {
        // Never echo the password back into the form.
        let mut values = values;
        values.insert("password".to_string(), serde_json::Value::String(String::new()));
        let layout = Layout::load(&state, user).await;
        return Ok(render_form(layout, &values, &errors).into_response());
    }

    let email = values
        .get("email")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    // Fresh session ID on privilege change.
    session.cycle_id().await?;
    set_current_user(&session, &CurrentUser { email: email.clone() }).await?;
    set_sentry_user(&email);
    tracing::info!("Visitor signed in");

    Ok(Redirect::to("/").into_response())
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    tracing::info!("Visitor signed out");
    Ok(Redirect::to("/"))
}

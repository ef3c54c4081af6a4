//! Product route handlers: votes, favorites and the new product form.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use shopcart_core::validation::new_product_schema;
use shopcart_core::{FieldErrors, FormValues, Price, Product, ProductId};
use tracing::instrument;

use super::forms::{FieldView, field_views};
use super::layout::Layout;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

// =============================================================================
// Votes and Favorites
// =============================================================================

/// Up vote a product.
#[instrument(skip(state))]
pub async fn up_vote(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    state.shop().up_vote(&ProductId::new(id)).await;
    Redirect::to("/")
}

/// Down vote a product.
#[instrument(skip(state))]
pub async fn down_vote(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    state.shop().down_vote(&ProductId::new(id)).await;
    Redirect::to("/")
}

/// Toggle a product's favorite flag.
#[instrument(skip(state))]
pub async fn toggle_favorite(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    state.shop().toggle_favorite(&ProductId::new(id)).await;
    Redirect::to("/")
}

// =============================================================================
// New Product
// =============================================================================

/// Name the field validation endpoint knows this form by.
const FORM_NAME: &str = "new-product";

/// New product page template.
#[derive(Template, WebTemplate)]
#[template(path = "new_product.html")]
pub struct NewProductTemplate {
    pub layout: Layout,
    pub fields: Vec<FieldView>,
}

fn render_form(layout: Layout, values: &FormValues, errors: &FieldErrors) -> NewProductTemplate {
    NewProductTemplate {
        layout,
        fields: field_views(FORM_NAME, new_product_schema(), values, errors),
    }
}

/// Display the new product form.
#[instrument(skip(state, user))]
pub async fn new_product_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let layout = Layout::load(&state, user).await;
    render_form(
        layout,
        &new_product_schema().initial_values(),
        &FieldErrors::default(),
    )
}

/// Validate the form, prepend the product to the catalog and go home.
#[instrument(skip(state, user, raw))]
pub async fn create_product(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(raw): Form<HashMap<String, String>>,
) -> Result<Response> {
    let schema = new_product_schema();
    let values = schema.values_from_form(&raw);

    if let Err(errors) = schema.validate(&values) {
        tracing::debug!(failed = errors.len(), "New product form rejected");
        let layout = Layout::load(&state, user).await;
        return Ok(render_form(layout, &values, &errors).into_response());
    }

    let product = product_from_values(&values)?;
    tracing::info!(product_id = %product.id, title = %product.title, "Product created");
    state.shop().add_product(product).await;

    Ok(Redirect::to("/").into_response())
}

/// Build a product from validated form values.
fn product_from_values(values: &FormValues) -> Result<Product> {
    let text = |name: &str| {
        values
            .get(name)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };

    let price: Decimal = text("price")
        .parse()
        .map_err(|e| AppError::BadRequest(format!("price: {e}")))?;
    let units_in_stock: u32 = text("unitsInStock")
        .parse()
        .map_err(|e| AppError::BadRequest(format!("unitsInStock: {e}")))?;

    Ok(Product::new(
        text("title"),
        text("img"),
        Price::new(price),
        units_in_stock,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn values(value: serde_json::Value) -> FormValues {
        match value {
            serde_json::Value::Object(map) => map,
            _ => FormValues::new(),
        }
    }

    #[test]
    fn test_product_from_values() {
        let product = product_from_values(&values(json!({
            "title": " Lamp ",
            "img": "lamp.png",
            "price": "12.50",
            "unitsInStock": "4"
        })))
        .unwrap();

        assert_eq!(product.title, "Lamp");
        assert_eq!(product.price, Price::from_cents(1250));
        assert_eq!(product.units_in_stock, 4);
        assert!(!product.is_favorite);
        assert_eq!(product.votes.up_votes.current_value, 0);
    }

    #[test]
    fn test_product_from_values_rejects_bad_numbers() {
        let err = product_from_values(&values(json!({
            "title": "Lamp",
            "img": "lamp.png",
            "price": "cheap",
            "unitsInStock": "4"
        })))
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

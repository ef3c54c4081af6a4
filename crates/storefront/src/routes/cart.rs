//! Cart route handlers.
//!
//! Cart forms are posted from the home page and the checkout pages. Each
//! handler runs one cart operation and redirects back to the page the form
//! came from.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use shopcart_core::{CartLine, ProductId, cart};
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::state::AppState;

/// Most quantities offered in a line's select box.
pub const MAX_QUANTITY_OPTIONS: u32 = 20;

/// A quantity option in the line's select box.
#[derive(Clone)]
pub struct QuantityOption {
    pub value: u32,
    pub selected: bool,
}

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub title: String,
    pub img: String,
    pub price: String,
    pub quantity: u32,
    pub line_price: String,
    pub quantity_options: Vec<QuantityOption>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&[CartLine]> for CartView {
    fn from(lines: &[CartLine]) -> Self {
        Self {
            lines: lines.iter().map(CartLineView::from).collect(),
            subtotal: cart::subtotal(lines).to_string(),
            item_count: cart::item_count(lines),
        }
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        // Offer stocked quantities up to the cap, plus the current one if it lies outside.
        let max = line.units_in_stock.min(MAX_QUANTITY_OPTIONS);
        let mut quantity_options: Vec<QuantityOption> = (1..=max)
            .map(|value| QuantityOption {
                value,
                selected: value == line.quantity,
            })
            .collect();
        if line.quantity == 0 || line.quantity > max {
            quantity_options.push(QuantityOption {
                value: line.quantity,
                selected: true,
            });
        }

        Self {
            id: line.id.to_string(),
            title: line.title.clone(),
            img: line.img.clone(),
            price: line.price.to_string(),
            quantity: line.quantity,
            line_price: line.line_total().to_string(),
            quantity_options,
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
    pub return_to: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Where to send the visitor after a cart form.
///
/// Only local paths are followed; anything else goes home.
fn back_to(return_to: Option<&str>) -> Redirect {
    let target = return_to
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or("/");
    Redirect::to(target)
}

// =============================================================================
// Handlers
// =============================================================================

/// Add one unit of a product to the cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> impl IntoResponse {
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", form.product_id.as_str())]));
    state
        .shop()
        .add_to_cart(&ProductId::new(form.product_id))
        .await;
    back_to(form.return_to.as_deref())
}

/// Set a line's quantity.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> impl IntoResponse {
    state
        .shop()
        .change_quantity(&ProductId::new(form.product_id), form.quantity)
        .await;
    back_to(form.return_to.as_deref())
}

/// Remove a line from the cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> impl IntoResponse {
    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", form.product_id.as_str())]),
    );
    state
        .shop()
        .remove_from_cart(&ProductId::new(form.product_id))
        .await;
    back_to(form.return_to.as_deref())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::header::LOCATION;
    use chrono::Utc;
    use shopcart_core::Price;

    use super::*;

    fn line(quantity: u32, units_in_stock: u32) -> CartLine {
        let now = Utc::now();
        CartLine {
            id: ProductId::new("7"),
            title: "Teapot".to_string(),
            img: "teapot.png".to_string(),
            price: Price::from_cents(1250),
            units_in_stock,
            created_at: now,
            updated_at: now,
            quantity,
        }
    }

    #[test]
    fn test_cart_view_totals() {
        let lines = vec![line(2, 5)];

        let view = CartView::from(lines.as_slice());

        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "$25.00");
        assert_eq!(view.lines[0].line_price, "$25.00");
        assert!(!view.is_empty());
    }

    #[test]
    fn test_quantity_options_cover_stock() {
        let view = CartLineView::from(&line(2, 3));

        let values: Vec<u32> = view.quantity_options.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert!(view.quantity_options[1].selected);
    }

    #[test]
    fn test_quantity_options_include_out_of_range_quantity() {
        let view = CartLineView::from(&line(4, 2));

        let values: Vec<u32> = view.quantity_options.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1, 2, 4]);
        assert!(view.quantity_options[2].selected);
    }

    #[test]
    fn test_quantity_options_stay_bounded() {
        let huge_quantity = CartLineView::from(&line(50_000_000, 3));
        let huge_stock = CartLineView::from(&line(2, 1_000_000_000));

        assert_eq!(huge_quantity.quantity_options.len(), 4);
        assert_eq!(huge_quantity.quantity_options[3].value, 50_000_000);
        assert!(huge_quantity.quantity_options[3].selected);
        assert_eq!(
            huge_stock.quantity_options.len(),
            MAX_QUANTITY_OPTIONS as usize
        );
        assert!(huge_stock.quantity_options[1].selected);
    }

    #[test]
    fn test_cart_view_count_saturates() {
        let lines = vec![line(u32::MAX, 3), line(1, 3)];

        let view = CartView::from(lines.as_slice());

        assert_eq!(view.item_count, u32::MAX);
        assert_eq!(view.lines[0].quantity_options.len(), 4);
    }

    #[test]
    fn test_back_to_only_follows_local_paths() {
        let location = |redirect: Redirect| {
            redirect
                .into_response()
                .headers()
                .get(LOCATION)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string()
        };

        assert_eq!(location(back_to(Some("/checkout/step-1"))), "/checkout/step-1");
        assert_eq!(location(back_to(Some("https://evil.example"))), "/");
        assert_eq!(location(back_to(Some("//evil.example"))), "/");
        assert_eq!(location(back_to(None)), "/");
    }
}

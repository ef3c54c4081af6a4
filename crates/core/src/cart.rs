//! Cart lines and cart reducers.
//!
//! A cart is an ordered `Vec<CartLine>` with at most one line per product.
//! The reducers are total: they never fail and return the input unchanged
//! when there is nothing to do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::{self, Product};
use crate::types::{Price, ProductId};

/// One row of the cart.
///
/// Carries a snapshot of the product fields taken when the line was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ProductId,
    pub title: String,
    pub img: String,
    pub price: Price,
    pub units_in_stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Whether another unit can be added through [`add_to_cart`].
    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity < self.units_in_stock
    }
}

impl From<&Product> for CartLine {
    /// Build the first cart line for a product.
    ///
    /// The product's raw `quantity` is used as the starting point: a fresh
    /// product (quantity 0) yields a line of 1, but a product whose raw
    /// quantity already reached its stock keeps that quantity as-is.
    fn from(product: &Product) -> Self {
        let quantity = if product.quantity >= product.units_in_stock {
            product.quantity
        } else {
            product.quantity + 1
        };

        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            img: product.img.clone(),
            price: product.price,
            units_in_stock: product.units_in_stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
            quantity,
        }
    }
}

/// Add one unit of a product to the cart.
///
/// - Existing line: quantity goes up by one unless it already reached
///   `units_in_stock`.
/// - No line yet: a new line built from the catalog product is appended.
/// - Unknown product: the cart is returned unchanged.
#[must_use]
pub fn add_to_cart(cart: &[CartLine], products: &[Product], id: &ProductId) -> Vec<CartLine> {
    if cart.iter().any(|line| &line.id == id) {
        return cart
            .iter()
            .map(|line| {
                if &line.id == id && line.can_increment() {
                    CartLine {
                        quantity: line.quantity + 1,
                        ..line.clone()
                    }
                } else {
                    line.clone()
                }
            })
            .collect();
    }

    let mut updated = cart.to_vec();
    if let Some(product) = product::find(products, id) {
        updated.push(CartLine::from(product));
    }
    updated
}

/// Set a line's quantity from a manual edit.
///
/// The edit is accepted only while the line's current quantity does not
/// exceed its stock. The new value itself is not bounded.
#[must_use]
pub fn change_quantity(cart: &[CartLine], id: &ProductId, quantity: u32) -> Vec<CartLine> {
    cart.iter()
        .map(|line| {
            if &line.id == id && line.quantity <= line.units_in_stock {
                CartLine {
                    quantity,
                    ..line.clone()
                }
            } else {
                line.clone()
            }
        })
        .collect()
}

/// Drop the line for a product. Missing IDs are ignored.
#[must_use]
pub fn remove_from_cart(cart: &[CartLine], id: &ProductId) -> Vec<CartLine> {
    cart.iter().filter(|line| &line.id != id).cloned().collect()
}

/// Sum of all line totals.
#[must_use]
pub fn subtotal(cart: &[CartLine]) -> Price {
    cart.iter().map(CartLine::line_total).sum()
}

/// Total number of units across all lines, saturating at `u32::MAX`.
#[must_use]
pub fn item_count(cart: &[CartLine]) -> u32 {
    cart.iter()
        .map(|line| line.quantity)
        .fold(0, u32::saturating_add)
}

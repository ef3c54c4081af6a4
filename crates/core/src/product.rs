//! Product records and catalog reducers.
//!
//! The catalog is an ordered `Vec<Product>`. Every reducer here borrows the
//! current catalog and returns a new one; none of them fail. An unknown
//! product ID leaves the catalog unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Upper vote limit given to products created locally.
pub const DEFAULT_VOTE_LIMIT: i32 = 10;

/// A bounded vote counter.
///
/// ## Invariant
///
/// `lower_limit <= current_value <= upper_limit` for counters built with
/// [`VoteCounter::new`] or deserialized; out-of-range input is clamped.
/// [`VoteCounter::increment`] never moves the value past `upper_limit` and is
/// a no-op once the value is there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawVoteCounter")]
pub struct VoteCounter {
    pub current_value: i32,
    pub lower_limit: i32,
    pub upper_limit: i32,
}

impl VoteCounter {
    /// Create a counter, clamping `current_value` into the limits.
    #[must_use]
    pub fn new(current_value: i32, lower_limit: i32, upper_limit: i32) -> Self {
        let upper_limit = upper_limit.max(lower_limit);
        Self {
            current_value: current_value.clamp(lower_limit, upper_limit),
            lower_limit,
            upper_limit,
        }
    }

    /// A counter starting at zero with the given ceiling.
    #[must_use]
    pub fn starting_at_zero(upper_limit: i32) -> Self {
        Self::new(0, 0, upper_limit)
    }

    /// Whether the counter can no longer move.
    #[must_use]
    pub const fn is_at_limit(&self) -> bool {
        self.current_value >= self.upper_limit
    }

    /// Returns the counter advanced by one, or unchanged when at the limit.
    #[must_use]
    pub const fn increment(self) -> Self {
        if self.is_at_limit() {
            return self;
        }

        Self {
            current_value: self.current_value + 1,
            ..self
        }
    }
}

/// A vote counter as it arrives, before clamping.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVoteCounter {
    current_value: i32,
    lower_limit: i32,
    upper_limit: i32,
}

impl From<RawVoteCounter> for VoteCounter {
    fn from(raw: RawVoteCounter) -> Self {
        Self::new(raw.current_value, raw.lower_limit, raw.upper_limit)
    }
}

impl Default for VoteCounter {
    fn default() -> Self {
        Self::starting_at_zero(DEFAULT_VOTE_LIMIT)
    }
}

/// Up and down vote counters for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Votes {
    pub up_votes: VoteCounter,
    pub down_votes: VoteCounter,
}

/// A product in the catalog.
///
/// Field names follow the remote API (`unitsInStock`, `isFavorite`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub img: String,
    pub price: Price,
    pub units_in_stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub votes: Votes,
    /// Raw quantity carried on catalog records.
    ///
    /// The cart reads it as a stock sentinel when a product is first added;
    /// see [`crate::cart::add_to_cart`].
    #[serde(default, skip_serializing_if = "is_zero")]
    pub quantity: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes a reference
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Product {
    /// Build a product created locally (the "new product" form).
    #[must_use]
    pub fn new(title: String, img: String, price: Price, units_in_stock: u32) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            title,
            img,
            price,
            units_in_stock,
            created_at: now,
            updated_at: now,
            is_favorite: false,
            votes: Votes::default(),
            quantity: 0,
        }
    }
}

/// Apply `f` to the product with `id`, cloning every other product as-is.
fn map_product(products: &[Product], id: &ProductId, f: impl Fn(&Product) -> Product) -> Vec<Product> {
    products
        .iter()
        .map(|product| {
            if &product.id == id {
                f(product)
            } else {
                product.clone()
            }
        })
        .collect()
}

/// Record an up vote, bounded by the counter's upper limit.
#[must_use]
pub fn up_vote(products: &[Product], id: &ProductId) -> Vec<Product> {
    map_product(products, id, |product| Product {
        votes: Votes {
            up_votes: product.votes.up_votes.increment(),
            ..product.votes
        },
        ..product.clone()
    })
}

/// Record a down vote, bounded by the counter's upper limit.
#[must_use]
pub fn down_vote(products: &[Product], id: &ProductId) -> Vec<Product> {
    map_product(products, id, |product| Product {
        votes: Votes {
            down_votes: product.votes.down_votes.increment(),
            ..product.votes
        },
        ..product.clone()
    })
}

/// Flip the favorite flag.
#[must_use]
pub fn toggle_favorite(products: &[Product], id: &ProductId) -> Vec<Product> {
    map_product(products, id, |product| Product {
        is_favorite: !product.is_favorite,
        ..product.clone()
    })
}

/// Prepend a new product to the catalog.
#[must_use]
pub fn add_product(products: &[Product], product: Product) -> Vec<Product> {
    let mut updated = Vec::with_capacity(products.len() + 1);
    updated.push(product);
    updated.extend_from_slice(products);
    updated
}

/// Find a product by ID.
#[must_use]
pub fn find<'a>(products: &'a [Product], id: &ProductId) -> Option<&'a Product> {
    products.iter().find(|product| &product.id == id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: &str, up: VoteCounter, down: VoteCounter) -> Product {
        let mut product = Product::new(
            id.to_string(),
            format!("{id}.png"),
            Price::from_cents(1000),
            5,
        );
        product.id = ProductId::new(id);
        product.votes = Votes {
            up_votes: up,
            down_votes: down,
        };
        product
    }

    #[test]
    fn test_vote_counter_new_clamps() {
        let counter = VoteCounter::new(15, 0, 10);
        assert_eq!(counter.current_value, 10);

        let counter = VoteCounter::new(-3, 0, 10);
        assert_eq!(counter.current_value, 0);
    }

    #[test]
    fn test_increment_stops_at_upper_limit() {
        let mut counter = VoteCounter::new(8, 0, 10);
        for _ in 0..5 {
            counter = counter.increment();
        }
        assert_eq!(counter.current_value, 10);
        assert!(counter.is_at_limit());
        assert_eq!(counter.increment(), counter);
    }

    #[test]
    fn test_up_vote_only_touches_target() {
        let products = vec![
            product("a", VoteCounter::new(0, 0, 3), VoteCounter::new(0, 0, 3)),
            product("b", VoteCounter::new(0, 0, 3), VoteCounter::new(0, 0, 3)),
        ];

        let updated = up_vote(&products, &ProductId::new("b"));

        assert_eq!(updated[0], products[0]);
        assert_eq!(updated[1].votes.up_votes.current_value, 1);
        assert_eq!(updated[1].votes.down_votes.current_value, 0);
    }

    #[test]
    fn test_votes_stay_within_bounds() {
        let mut products = vec![product(
            "a",
            VoteCounter::new(0, 0, 2),
            VoteCounter::new(1, 1, 4),
        )];
        let id = ProductId::new("a");

        for round in 0..10 {
            products = if round % 3 == 0 {
                down_vote(&products, &id)
            } else {
                up_vote(&products, &id)
            };

            for counter in [products[0].votes.up_votes, products[0].votes.down_votes] {
                assert!(counter.lower_limit <= counter.current_value);
                assert!(counter.current_value <= counter.upper_limit);
            }
        }

        assert_eq!(products[0].votes.up_votes.current_value, 2);
        assert_eq!(products[0].votes.down_votes.current_value, 4);
    }

    #[test]
    fn test_down_vote_at_limit_is_noop() {
        let products = vec![product(
            "a",
            VoteCounter::default(),
            VoteCounter::new(3, 0, 3),
        )];

        assert_eq!(down_vote(&products, &ProductId::new("a")), products);
    }

    #[test]
    fn test_toggle_favorite_twice_restores() {
        let products = vec![product("a", VoteCounter::default(), VoteCounter::default())];
        let id = ProductId::new("a");

        let once = toggle_favorite(&products, &id);
        assert!(once[0].is_favorite);

        let twice = toggle_favorite(&once, &id);
        assert_eq!(twice, products);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let products = vec![product("a", VoteCounter::default(), VoteCounter::default())];
        let missing = ProductId::new("zzz");

        assert_eq!(up_vote(&products, &missing), products);
        assert_eq!(toggle_favorite(&products, &missing), products);
    }

    #[test]
    fn test_add_product_prepends() {
        let products = vec![product("a", VoteCounter::default(), VoteCounter::default())];
        let new = product("b", VoteCounter::default(), VoteCounter::default());

        let updated = add_product(&products, new);

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].id.as_str(), "b");
        assert_eq!(updated[1].id.as_str(), "a");
    }

    #[test]
    fn test_deserialize_remote_shape() {
        let json = r#"{
            "id": 3,
            "title": "Lamp",
            "img": "https://img.example/lamp.png",
            "price": 49.9,
            "unitsInStock": 4,
            "createdAt": "2021-03-01T10:00:00Z",
            "updatedAt": "2021-03-02T10:00:00Z",
            "votes": {
                "upVotes": { "currentValue": 1, "lowerLimit": 0, "upperLimit": 10 },
                "downVotes": { "currentValue": 0, "lowerLimit": 0, "upperLimit": 10 }
            }
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id.as_str(), "3");
        assert_eq!(product.units_in_stock, 4);
        assert!(!product.is_favorite);
        assert_eq!(product.quantity, 0);
        assert_eq!(product.votes.up_votes.current_value, 1);
    }

    #[test]
    fn test_deserialize_clamps_out_of_range_counter() {
        let json = r#"{ "currentValue": 14, "lowerLimit": 0, "upperLimit": 10 }"#;

        let counter: VoteCounter = serde_json::from_str(json).unwrap();

        assert_eq!(counter, VoteCounter::new(10, 0, 10));
        assert!(counter.is_at_limit());

        let below: VoteCounter =
            serde_json::from_str(r#"{ "currentValue": -4, "lowerLimit": 0, "upperLimit": 10 }"#)
                .unwrap();
        assert_eq!(below.current_value, 0);
        assert_eq!(below.increment().current_value, 1);
    }
}

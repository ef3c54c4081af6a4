//! Shopcart Core - Domain types and state reducers.
//!
//! This crate holds everything about the shop that can be expressed as plain
//! data and pure functions. It is used by:
//! - `storefront` - the web binary that renders pages and owns the I/O
//! - `integration-tests` - end-to-end tests against the storefront router
//!
//! # Architecture
//!
//! The core crate contains only types and reducers - no I/O, no HTTP clients,
//! no storage. Every mutation takes the current sequence by reference and
//! returns a new one, so the caller decides when to persist.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs and prices
//! - [`product`] - Product records, vote counters and catalog reducers
//! - [`cart`] - Cart lines and cart reducers
//! - [`checkout`] - The checkout draft accumulated across pages
//! - [`pages`] - Checkout page ordering and progress
//! - [`validation`] - Field-level form schemas

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod pages;
pub mod product;
pub mod types;
pub mod validation;

pub use cart::CartLine;
pub use checkout::CheckoutDraft;
pub use pages::{CheckoutPage, Progress};
pub use product::{Product, VoteCounter, Votes};
pub use types::*;
pub use validation::{FieldErrors, FormSchema, FormValues};

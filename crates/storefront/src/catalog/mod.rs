//! Remote product catalog.
//!
//! # Architecture
//!
//! - [`CatalogClient`] issues the single outbound read: `GET` on the configured
//!   endpoint, expecting a JSON array of products
//! - [`CatalogLoader`] runs that read once at startup, in the background, when
//!   the persisted catalog is empty, and can be cancelled deterministically
//!
//! There is no retry: a failed load leaves the catalog empty and surfaces the
//! error message on the home page.

mod client;
mod loader;

pub use client::CatalogClient;
pub use loader::CatalogLoader;

use thiserror::Error;

/// Errors that can occur while fetching the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Catalog request failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The body was not a JSON array of products.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

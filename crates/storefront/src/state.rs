//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::store::Shop;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the shop store, the catalog client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shop: Shop,
    catalog: CatalogClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The catalog client is built from `config.products_api_url`.
    #[must_use]
    pub fn new(config: StorefrontConfig, shop: Shop) -> Self {
        let catalog = CatalogClient::new(config.products_api_url.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                shop,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog and cart store.
    #[must_use]
    pub fn shop(&self) -> &Shop {
        &self.inner.shop
    }

    /// Get a reference to the remote catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }
}

//! Catalog and cart stores backed by local storage.
//!
//! [`Shop`] owns the in-memory catalog and cart. Each operation takes the
//! write lock, runs the matching pure reducer from `shopcart_core` and
//! serializes the new snapshot. The file write happens on the blocking pool
//! after the lock is released; the operation returns once that snapshot, or a
//! newer one, is in storage. Storage write failures are logged and never
//! surfaced to the visitor.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use shopcart_core::{CartLine, Product, ProductId, cart, product};
use tokio::sync::{Mutex, RwLock};

use crate::storage::{self, CART_ITEMS_KEY, LocalStorage, PRODUCTS_KEY};

/// State of the one-time catalog fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// No fetch was needed or none has started.
    #[default]
    Idle,
    /// The fetch is in flight.
    Loading,
    /// The fetch replaced the catalog.
    Loaded,
    /// The fetch failed; holds the message shown to the visitor.
    Failed(String),
    /// The fetch was cancelled before it finished; its result was discarded.
    Cancelled,
}

impl LoadStatus {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn has_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Message of a failed fetch.
    #[must_use]
    pub fn loading_error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A consistent copy of the shop state for rendering.
#[derive(Debug, Clone)]
pub struct ShopSnapshot {
    pub products: Vec<Product>,
    pub cart: Vec<CartLine>,
    pub status: LoadStatus,
}

#[derive(Default)]
struct ShopState {
    products: Vec<Product>,
    cart: Vec<CartLine>,
    status: LoadStatus,
    /// Bumped on every change that is persisted.
    revision: u64,
}

/// Shared catalog and cart.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Shop {
    inner: Arc<ShopInner>,
}

struct ShopInner {
    state: RwLock<ShopState>,
    storage: Arc<dyn LocalStorage>,
    /// Revision last written per storage key.
    written: Mutex<HashMap<&'static str, u64>>,
}

/// A serialized snapshot waiting to be written.
struct PendingWrite {
    key: &'static str,
    revision: u64,
    raw: String,
}

impl Shop {
    /// Build the shop from the snapshots in `storage`.
    ///
    /// Both snapshots are read exactly once, here.
    #[must_use]
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let products: Vec<Product> = storage::load_items(storage.as_ref(), PRODUCTS_KEY);
        let cart: Vec<CartLine> = storage::load_items(storage.as_ref(), CART_ITEMS_KEY);

        tracing::info!(
            products = products.len(),
            cart_lines = cart.len(),
            "Loaded shop state from local storage"
        );

        Self {
            inner: Arc::new(ShopInner {
                state: RwLock::new(ShopState {
                    products,
                    cart,
                    status: LoadStatus::Idle,
                    revision: 0,
                }),
                storage,
                written: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub async fn snapshot(&self) -> ShopSnapshot {
        let state = self.inner.state.read().await;
        ShopSnapshot {
            products: state.products.clone(),
            cart: state.cart.clone(),
            status: state.status.clone(),
        }
    }

    pub async fn products(&self) -> Vec<Product> {
        self.inner.state.read().await.products.clone()
    }

    pub async fn cart(&self) -> Vec<CartLine> {
        self.inner.state.read().await.cart.clone()
    }

    pub async fn status(&self) -> LoadStatus {
        self.inner.state.read().await.status.clone()
    }

    /// Whether the catalog is empty and should be fetched.
    pub async fn needs_catalog(&self) -> bool {
        self.inner.state.read().await.products.is_empty()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub async fn add_to_cart(&self, id: &ProductId) {
        self.update_cart(|lines, products| cart::add_to_cart(lines, products, id))
            .await;
    }

    pub async fn change_quantity(&self, id: &ProductId, quantity: u32) {
        self.update_cart(|lines, _| cart::change_quantity(lines, id, quantity))
            .await;
    }

    pub async fn remove_from_cart(&self, id: &ProductId) {
        self.update_cart(|lines, _| cart::remove_from_cart(lines, id))
            .await;
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn up_vote(&self, id: &ProductId) {
        self.update_products(|products| product::up_vote(products, id))
            .await;
    }

    pub async fn down_vote(&self, id: &ProductId) {
        self.update_products(|products| product::down_vote(products, id))
            .await;
    }

    pub async fn toggle_favorite(&self, id: &ProductId) {
        self.update_products(|products| product::toggle_favorite(products, id))
            .await;
    }

    pub async fn add_product(&self, new_product: Product) {
        self.update_products(move |products| product::add_product(products, new_product))
            .await;
    }

    // =========================================================================
    // Catalog loading
    // =========================================================================

    pub(crate) async fn set_status(&self, status: LoadStatus) {
        self.inner.state.write().await.status = status;
    }

    /// Replace the whole catalog with a fetched one.
    pub(crate) async fn replace_products(&self, products: Vec<Product>) {
        let pending = {
            let mut state = self.inner.state.write().await;
            let pending = stage(&mut state, PRODUCTS_KEY, &products);
            state.products = products;
            state.status = LoadStatus::Loaded;
            pending
        };
        self.persist(pending).await;
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn update_cart(&self, reducer: impl FnOnce(&[CartLine], &[Product]) -> Vec<CartLine>) {
        let pending = {
            let mut state = self.inner.state.write().await;
            let updated = reducer(&state.cart, &state.products);
            let pending = stage(&mut state, CART_ITEMS_KEY, &updated);
            state.cart = updated;
            pending
        };
        self.persist(pending).await;
    }

    async fn update_products(&self, reducer: impl FnOnce(&[Product]) -> Vec<Product>) {
        let pending = {
            let mut state = self.inner.state.write().await;
            let updated = reducer(&state.products);
            let pending = stage(&mut state, PRODUCTS_KEY, &updated);
            state.products = updated;
            pending
        };
        self.persist(pending).await;
    }

    /// Write a staged snapshot unless a newer one for the same key landed first.
    async fn persist(&self, pending: Option<PendingWrite>) {
        let Some(PendingWrite { key, revision, raw }) = pending else {
            return;
        };

        let mut written = self.inner.written.lock().await;
        if written.get(key).is_some_and(|&last| last >= revision) {
            return;
        }

        let storage = Arc::clone(&self.inner.storage);
        match tokio::task::spawn_blocking(move || storage.set_item(key, &raw)).await {
            Ok(Ok(())) => {
                written.insert(key, revision);
            }
            Ok(Err(e)) => tracing::warn!(key, error = %e, "Failed to persist shop state"),
            Err(e) => tracing::error!(key, error = %e, "Storage write task failed"),
        }
    }
}

/// Serialize `items` for `key` and take the next revision.
fn stage<T: Serialize>(
    state: &mut ShopState,
    key: &'static str,
    items: &[T],
) -> Option<PendingWrite> {
    match serde_json::to_string(items) {
        Ok(raw) => {
            state.revision += 1;
            Some(PendingWrite {
                key,
                revision: state.revision,
                raw,
            })
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to serialize shop state");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use shopcart_core::Price;

    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: &str, units_in_stock: u32) -> Product {
        let mut product = Product::new(
            format!("Product {id}"),
            format!("{id}.png"),
            Price::from_cents(999),
            units_in_stock,
        );
        product.id = ProductId::new(id);
        product
    }

    fn seeded(products: &[Product]) -> (Shop, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        storage::save_items(&*storage, PRODUCTS_KEY, products).unwrap();
        let shop = Shop::load(storage.clone());
        (shop, storage)
    }

    #[tokio::test]
    async fn test_empty_storage_needs_catalog() {
        let shop = Shop::load(Arc::new(MemoryStorage::new()));

        assert!(shop.needs_catalog().await);
        assert_eq!(shop.status().await, LoadStatus::Idle);
    }

    #[tokio::test]
    async fn test_cart_changes_are_persisted() {
        let (shop, storage) = seeded(&[product("a", 3)]);
        let id = ProductId::new("a");

        shop.add_to_cart(&id).await;
        shop.add_to_cart(&id).await;

        let stored: Vec<CartLine> = storage::load_items(&*storage, CART_ITEMS_KEY);
        assert_eq!(stored, shop.cart().await);
        assert_eq!(stored[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_reload_restores_cart() {
        let (shop, storage) = seeded(&[product("a", 3), product("b", 1)]);
        shop.add_to_cart(&ProductId::new("b")).await;
        shop.add_to_cart(&ProductId::new("a")).await;
        shop.change_quantity(&ProductId::new("a"), 3).await;

        let reloaded = Shop::load(storage);

        assert_eq!(reloaded.cart().await, shop.cart().await);
        assert!(!reloaded.needs_catalog().await);
    }

    #[tokio::test]
    async fn test_remove_missing_keeps_cart() {
        let (shop, _) = seeded(&[product("a", 3)]);
        shop.add_to_cart(&ProductId::new("a")).await;

        shop.remove_from_cart(&ProductId::new("zzz")).await;

        assert_eq!(shop.cart().await.len(), 1);
    }

    #[tokio::test]
    async fn test_votes_and_favorite_are_persisted() {
        let (shop, storage) = seeded(&[product("a", 3)]);
        let id = ProductId::new("a");

        shop.up_vote(&id).await;
        shop.down_vote(&id).await;
        shop.toggle_favorite(&id).await;

        let stored: Vec<Product> = storage::load_items(&*storage, PRODUCTS_KEY);
        assert_eq!(stored[0].votes.up_votes.current_value, 1);
        assert_eq!(stored[0].votes.down_votes.current_value, 1);
        assert!(stored[0].is_favorite);
    }

    #[tokio::test]
    async fn test_add_product_prepends_and_persists() {
        let (shop, storage) = seeded(&[product("a", 3)]);

        shop.add_product(product("new", 1)).await;

        let stored: Vec<Product> = storage::load_items(&*storage, PRODUCTS_KEY);
        assert_eq!(stored[0].id.as_str(), "new");
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_replace_products_marks_loaded() {
        let shop = Shop::load(Arc::new(MemoryStorage::new()));
        shop.set_status(LoadStatus::Loading).await;

        shop.replace_products(vec![product("a", 1)]).await;

        let snapshot = shop.snapshot().await;
        assert_eq!(snapshot.status, LoadStatus::Loaded);
        assert_eq!(snapshot.products.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_changes_persist_latest_state() {
        let (shop, storage) = seeded(&[product("a", 100)]);
        let id = ProductId::new("a");

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let shop = shop.clone();
                let id = id.clone();
                tokio::spawn(async move { shop.add_to_cart(&id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let stored: Vec<CartLine> = storage::load_items(&*storage, CART_ITEMS_KEY);
        assert_eq!(stored[0].quantity, 20);
        assert_eq!(stored, shop.cart().await);
    }

    #[tokio::test]
    async fn test_reads_proceed_while_write_pending() {
        let (shop, _) = seeded(&[product("a", 3)]);
        let id = ProductId::new("a");

        // Hold the write-order lock so the next snapshot cannot be written yet.
        let order = shop.inner.written.lock().await;
        let writer = tokio::spawn({
            let shop = shop.clone();
            async move { shop.add_to_cart(&id).await }
        });

        let cart = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                let cart = shop.cart().await;
                if !cart.is_empty() {
                    break cart;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(cart[0].quantity, 1);
        assert!(!writer.is_finished());

        drop(order);
        writer.await.unwrap();
    }

    #[test]
    fn test_load_status_flags() {
        let failed = LoadStatus::Failed("boom".to_string());
        assert!(failed.has_error());
        assert_eq!(failed.loading_error(), Some("boom"));
        assert!(!failed.is_loading());

        assert!(LoadStatus::Loading.is_loading());
        assert_eq!(LoadStatus::Loaded.loading_error(), None);
    }
}

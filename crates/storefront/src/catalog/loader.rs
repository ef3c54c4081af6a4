//! One-shot background catalog fetch.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::CatalogClient;
use crate::store::{LoadStatus, Shop};

/// Handle to the startup catalog fetch.
///
/// The fetch races a cancellation signal. Once cancelled, the fetch future is
/// dropped, the shop status becomes [`LoadStatus::Cancelled`] and nothing from
/// the response is ever applied. Dropping the handle cancels as well.
pub struct CatalogLoader {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CatalogLoader {
    /// Start the fetch if the shop has no products yet.
    ///
    /// Returns `None` when the persisted catalog is non-empty. The shop is
    /// marked [`LoadStatus::Loading`] before this returns.
    pub async fn start_if_empty(shop: Shop, client: CatalogClient) -> Option<Self> {
        if !shop.needs_catalog().await {
            tracing::debug!("Catalog restored from local storage, skipping fetch");
            return None;
        }

        shop.set_status(LoadStatus::Loading).await;
        let (cancel, mut cancelled) = watch::channel(false);

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                // The watch guard is dropped before the arm body awaits.
                () = async { let _ = cancelled.wait_for(|cancelled| *cancelled).await; } => {
                    tracing::info!("Catalog fetch cancelled");
                    shop.set_status(LoadStatus::Cancelled).await;
                }
                result = client.fetch_products() => match result {
                    Ok(products) => {
                        tracing::info!(count = products.len(), "Catalog loaded");
                        shop.replace_products(products).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to load catalog");
                        shop.set_status(LoadStatus::Failed(e.to_string())).await;
                    }
                },
            }
        });

        Some(Self { cancel, task })
    }

    /// Wait for the fetch to complete without cancelling it.
    pub async fn wait(self) {
        let Self { cancel, task } = self;
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Catalog fetch task panicked");
        }
        drop(cancel);
    }

    /// Cancel the fetch and wait for the task to settle.
    ///
    /// A fetch that already finished is unaffected.
    pub async fn cancel(self) {
        let Self { cancel, task } = self;
        // Receiver may already be gone if the task finished.
        let _ = cancel.send(true);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Catalog fetch task panicked");
        }
    }
}

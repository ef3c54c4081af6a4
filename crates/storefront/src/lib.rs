//! Shopcart Storefront library.
//!
//! This crate provides the storefront as a library so the router can be
//! driven in-process by tests. The binary in `main.rs` adds configuration,
//! observability and the startup catalog fetch around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod checkout_context;
pub mod config;
pub mod error;
mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;
pub mod store;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Build the storefront router with its middleware stack.
///
/// Sentry layers are outermost; without an initialised Sentry client they
/// only create a per-request hub.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .fallback(not_found)
        .layer(session_layer)
        .with_state(state)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found(request: Request) -> impl IntoResponse {
    AppError::NotFound(request.uri().path().to_string())
}

//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home: product listing, votes, favorites, cart
//! GET  /health                    - Health check
//!
//! # Products
//! POST /products/{id}/up-vote     - Up vote
//! POST /products/{id}/down-vote   - Down vote
//! POST /products/{id}/favorite    - Toggle favorite
//! GET  /new-product               - New product form
//! POST /new-product               - Create product, redirect home
//!
//! # Cart (form posts, redirect back)
//! POST /cart/add                  - Add one unit
//! POST /cart/update               - Set quantity
//! POST /cart/remove               - Remove line
//!
//! # Checkout
//! GET  /checkout/step-1           - Cart review (Step 1 of 4)
//! POST /checkout/step-1           - Continue to address
//! GET  /checkout/step-2           - Address form (Step 2 of 4)
//! POST /checkout/step-2           - Validate address, continue to payment
//! GET  /checkout/step-3           - Payment form (Step 3 of 4)
//! POST /checkout/step-3           - Validate payment, continue to summary
//! GET  /checkout/order-summary    - Order summary (Step 4 of 4)
//!
//! # Auth
//! GET  /auth                      - Sign-in page
//! POST /auth                      - Sign in
//! POST /auth/logout               - Logout
//!
//! # Forms (HTMX fragments)
//! POST /forms/{form}/{field}      - Validate one field
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod forms;
pub mod home;
pub mod layout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use shopcart_core::CheckoutPage;

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/up-vote", post(products::up_vote))
        .route("/{id}/down-vote", post(products::down_vote))
        .route("/{id}/favorite", post(products::toggle_favorite))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the checkout routes router.
///
/// Paths come from [`CheckoutPage::path`].
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            CheckoutPage::Detail.path(),
            get(checkout::detail).post(checkout::submit_detail),
        )
        .route(
            CheckoutPage::Address.path(),
            get(checkout::address).post(checkout::submit_address),
        )
        .route(
            CheckoutPage::Payment.path(),
            get(checkout::payment).post(checkout::submit_payment),
        )
        .route(CheckoutPage::Summary.path(), get(checkout::summary))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::sign_in_page).post(auth::sign_in))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        .route(
            "/new-product",
            get(products::new_product_page).post(products::create_product),
        )
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout pages
        .merge(checkout_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Field validation
        .route("/forms/{form}/{field}", post(forms::validate_field))
}

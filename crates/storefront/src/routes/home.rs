//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use shopcart_core::{Product, VoteCounter};
use tracing::instrument;

use super::cart::CartView;
use super::layout::Layout;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Vote counter display data.
#[derive(Clone)]
pub struct VoteView {
    pub count: i32,
    pub at_limit: bool,
}

impl From<&VoteCounter> for VoteView {
    fn from(counter: &VoteCounter) -> Self {
        Self {
            count: counter.current_value,
            at_limit: counter.is_at_limit(),
        }
    }
}

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub img: String,
    pub price: String,
    pub units_in_stock: u32,
    pub is_favorite: bool,
    pub up_votes: VoteView,
    pub down_votes: VoteView,
    /// Units of this product already in the cart.
    pub in_cart: u32,
}

impl ProductCardView {
    fn new(product: &Product, cart: &CartView) -> Self {
        let id = product.id.to_string();
        let in_cart = cart
            .lines
            .iter()
            .find(|line| line.id == id)
            .map_or(0, |line| line.quantity);

        Self {
            id,
            title: product.title.clone(),
            img: product.img.clone(),
            price: product.price.to_string(),
            units_in_stock: product.units_in_stock,
            is_favorite: product.is_favorite,
            up_votes: VoteView::from(&product.votes.up_votes),
            down_votes: VoteView::from(&product.votes.down_votes),
            in_cart,
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCardView>,
    pub cart: CartView,
    pub is_loading: bool,
    pub loading_error: Option<String>,
}

/// Display the product listing with the cart alongside.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let snapshot = state.shop().snapshot().await;
    let cart = CartView::from(snapshot.cart.as_slice());
    let products = snapshot
        .products
        .iter()
        .map(|product| ProductCardView::new(product, &cart))
        .collect();

    HomeTemplate {
        layout: Layout::new(user, cart.item_count),
        products,
        cart,
        is_loading: snapshot.status.is_loading(),
        loading_error: snapshot.status.loading_error().map(String::from),
    }
}

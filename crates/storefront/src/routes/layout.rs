//! Data every page passes to `base.html`.

use crate::models::CurrentUser;
use crate::state::AppState;

/// Header state: who is signed in and how many items are in the cart.
#[derive(Clone)]
pub struct Layout {
    pub user_email: Option<String>,
    pub cart_count: u32,
}

impl Layout {
    #[must_use]
    pub fn new(user: Option<CurrentUser>, cart_count: u32) -> Self {
        Self {
            user_email: user.map(|user| user.email),
            cart_count,
        }
    }

    /// Build the header for a page that does not otherwise read the cart.
    pub async fn load(state: &AppState, user: Option<CurrentUser>) -> Self {
        let cart = state.shop().cart().await;
        Self::new(user, shopcart_core::cart::item_count(&cart))
    }
}

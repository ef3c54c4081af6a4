//! Session-related types.
//!
//! Types stored in the visitor's session: the signed-in user and the checkout
//! draft being collected across the checkout pages.

use serde::{Deserialize, Serialize};

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Email the visitor signed in with.
    pub email: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the checkout draft (merged form values of all checkout pages).
    pub const CHECKOUT_DRAFT: &str = "checkout_draft";
}

//! Checkout context held in the visitor session.
//!
//! Each checkout page merges its accepted form values into one draft. The
//! draft is per visitor and lives only as long as the session.

use shopcart_core::{CheckoutDraft, FormValues};
use tower_sessions::Session;

use crate::models::session_keys;

/// Read the visitor's checkout draft. A missing draft is empty.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn checkout_draft(
    session: &Session,
) -> Result<CheckoutDraft, tower_sessions::session::Error> {
    Ok(session
        .get::<CheckoutDraft>(session_keys::CHECKOUT_DRAFT)
        .await?
        .unwrap_or_default())
}

/// Shallow-merge `partial` into the visitor's draft and store the result.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn update_checkout_context(
    session: &Session,
    partial: FormValues,
) -> Result<CheckoutDraft, tower_sessions::session::Error> {
    let draft = checkout_draft(session).await?.merge(partial);
    session.insert(session_keys::CHECKOUT_DRAFT, &draft).await?;
    tracing::debug!(fields = draft.len(), "Checkout context updated");
    Ok(draft)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn values(value: Value) -> FormValues {
        match value {
            Value::Object(map) => map,
            _ => FormValues::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_session_has_empty_draft() {
        let draft = checkout_draft(&session()).await.unwrap();
        assert!(draft.is_empty());
    }

    #[tokio::test]
    async fn test_later_page_wins_on_overlap() {
        let session = session();

        update_checkout_context(
            &session,
            values(json!({ "fullName": "Ada Lovelace", "email": "ada@example.com" })),
        )
        .await
        .unwrap();
        update_checkout_context(
            &session,
            values(json!({ "email": "billing@example.com", "cardNumber": "4242424242424242" })),
        )
        .await
        .unwrap();

        let draft = checkout_draft(&session).await.unwrap();
        assert_eq!(draft.len(), 3);
        assert_eq!(draft.text("fullName").as_deref(), Some("Ada Lovelace"));
        assert_eq!(draft.text("email").as_deref(), Some("billing@example.com"));
        assert_eq!(draft.text("cardNumber").as_deref(), Some("4242424242424242"));
    }
}

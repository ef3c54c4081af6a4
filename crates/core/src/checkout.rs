//! The checkout draft accumulated across checkout pages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Order data gathered so far, keyed by form field name.
///
/// Each checkout page merges its submitted fields in with
/// [`CheckoutDraft::merge`]; a later page overwrites any key an earlier page
/// also set. No schema is enforced across pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutDraft(Map<String, Value>);

impl CheckoutDraft {
    /// An empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-merge `partial` into the draft. Last write per key wins.
    #[must_use]
    pub fn merge(mut self, partial: Map<String, Value>) -> Self {
        self.0.extend(partial);
        self
    }

    /// Raw value for a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A field rendered as text: strings as-is, other scalars via JSON.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for CheckoutDraft {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

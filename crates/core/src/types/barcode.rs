//! The fulfillment barcode token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque pickup token assigned to an order at creation.
///
/// Generated once, never regenerated, unique across all orders (the store
/// enforces uniqueness). Downstream barcode rendering treats it as an
/// arbitrary character sequence; the token carries no business meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Barcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Barcode {
    fn from(token: String) -> Self {
        Self(token)
    }
}

//! Opaque handle into the content store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content identifier returned by the store.
///
/// No internal structure is assumed beyond "stable and retrievable by
/// this identifier". This is the only artifact that crosses back into
/// durable chain state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Wraps a raw identifier string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

//! Application identity.

use serde::{Deserialize, Serialize};

/// Fully qualified application (pipeline) name, e.g. `"admin.orders_cdc"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppName(String);

impl AppName {
    /// Create a new application name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace part of a qualified name (`"admin"` for `"admin.orders_cdc"`).
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once('.').map(|(ns, _)| ns)
    }
}

impl std::fmt::Display for AppName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AppName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AppName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

//! Type-safe identifiers for planted trees.
//!
//! Identifiers use Arc<str> for cheap cloning, since every proximity hit and
//! rejection outcome carries one.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeIdentifier(Arc<str>);

impl TreeIdentifier {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for TreeIdentifier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for TreeIdentifier {}

impl Hash for TreeIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for TreeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TreeIdentifier {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TreeIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// Database-backed callers mostly hold integer primary keys.
impl From<i64> for TreeIdentifier {
    fn from(id: i64) -> Self {
        Self::new(id.to_string())
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Name of a floating-rate index referenced by a trade's floating leg.
///
/// Free-form: EONIA, LIBOR, ESTR, SOFR or whatever the repositories report.
///
/// # Examples
///
/// ```
/// use exposure_engine::core::index::IndexName;
///
/// let eonia = IndexName::new("EONIA");
/// let libor = IndexName::new("LIBOR");
/// assert_ne!(eonia, libor);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexName(String);

impl IndexName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IndexName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IndexName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A set of requested index names, kept sorted for stable output.
pub type IndexSet = BTreeSet<IndexName>;

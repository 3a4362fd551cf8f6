//! Account address type with `aeg_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An AEGIS account address, always prefixed with `aeg_`.
///
/// The shield never derives addresses itself; they arrive fully formed from
/// the host's account layer. Addresses are totally ordered so that maps
/// keyed by address iterate deterministically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all AEGIS account addresses.
    pub const PREFIX: &'static str = "aeg_";

    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `aeg_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with aeg_");
        Self(s)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_address_roundtrip() {
        let addr = Address::new("aeg_provider_1");
        assert!(addr.is_valid());
        assert_eq!(addr.as_str(), "aeg_provider_1");
        assert_eq!(addr.to_string(), "aeg_provider_1");
    }

    #[test]
    #[should_panic(expected = "must start with aeg_")]
    fn test_bad_prefix_panics() {
        Address::new("brst_wrong_chain");
    }

    #[test]
    fn test_bare_prefix_is_invalid() {
        let addr = Address::new("aeg_");
        assert!(!addr.is_valid());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = Address::new("aeg_a");
        let b = Address::new("aeg_b");
        assert!(a < b);
    }
}

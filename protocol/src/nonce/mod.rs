//! # Nonces & Replay Protection
//!
//! A Schnorr signature stays mathematically valid forever. What stops it
//! from being accepted twice is the nonce it carries: a sequential number
//! handed out by the [`NonceRegistry`] at signing time and burned by the
//! verifier on first acceptance.
//!
//! ```text
//!   Unissued ──issue()──▶ Issued ──try_consume()──▶ Consumed
//!                                                    (terminal)
//! ```
//!
//! A context can issue `0..=u64::MAX - 1`. `u64::MAX` is reserved as
//! [`Nonce::EXHAUSTED`]: once a context runs out, `issue` keeps returning
//! it, and the registry never accepts it, so nothing signed with it ever
//! verifies.
//!
//! Nonces are scoped to a [`NonceContext`]. Two contexts never share a
//! counter or a consumed set, which is how several independent authorities
//! coexist in one process.

pub mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CONTEXT;

pub use registry::{ContextSnapshot, NonceRegistry, NonceState};

/// A single-use, strictly ordered replay token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(u64);

impl Nonce {
    /// The first nonce any context issues.
    pub const ZERO: Nonce = Nonce(0);

    /// Terminal marker returned by an exhausted context. Never issued as a
    /// usable nonce and never consumable.
    pub const EXHAUSTED: Nonce = Nonce(u64::MAX);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn is_exhausted(self) -> bool {
        self.0 == u64::MAX
    }

    /// The nonce after this one, or `None` past the end of the counter.
    pub(crate) fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Label of an issuing context (one signer authority).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NonceContext(String);

impl NonceContext {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NonceContext {
    /// The single global signer context.
    fn default() -> Self {
        Self(DEFAULT_CONTEXT.to_string())
    }
}

impl fmt::Display for NonceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_ordering_follows_value() {
        assert!(Nonce::new(1) > Nonce::ZERO);
        assert_eq!(Nonce::new(7).next(), Some(Nonce::new(8)));
        assert_eq!(Nonce::new(u64::MAX - 1).next(), Some(Nonce::EXHAUSTED));
        assert_eq!(Nonce::EXHAUSTED.next(), None);
        assert!(Nonce::EXHAUSTED.is_exhausted());
        assert!(!Nonce::new(u64::MAX - 1).is_exhausted());
    }

    #[test]
    fn test_nonce_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Nonce::new(42)).unwrap(), "42");
        let n: Nonce = serde_json::from_str("42").unwrap();
        assert_eq!(n.value(), 42);
    }

    #[test]
    fn default_context_label() {
        assert_eq!(NonceContext::default().as_str(), "default");
        assert_eq!(NonceContext::new("issuer-1").to_string(), "issuer-1");
    }
}

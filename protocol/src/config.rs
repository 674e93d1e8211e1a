//! # Protocol Configuration & Constants
//!
//! Every magic number in VERITAS lives here, together with the small
//! [`AuthorityConfig`] document used to stand up an [`Authority`].
//!
//! The domain-separation contexts below are part of the signature format.
//! Changing one invalidates every signature and credential digest ever
//! produced, so treat them as frozen.
//!
//! [`Authority`]: crate::attestation::Authority

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::curve::CurvePoint;
use crate::nonce::NonceContext;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full version string of the signature format.
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// Protocol fingerprint, printed by the CLI and mixed into nothing.
/// Purely informational.
pub const PROTOCOL_FINGERPRINT: &str = "ALAS-VERITAS-2026";

// ---------------------------------------------------------------------------
// Curve Parameters
// ---------------------------------------------------------------------------

/// The one and only curve. Multi-curve agility is explicitly not a feature.
pub const CURVE_NAME: &str = "BN254-G1";

/// Secret scalars are 32-byte big-endian integers in `[1, r-1]`.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Scalars (signature `s`, challenges) are 32 bytes big-endian.
pub const SCALAR_LENGTH: usize = 32;

/// A single base-field coordinate, 32 bytes big-endian.
pub const COORDINATE_LENGTH: usize = 32;

/// Uncompressed point encoding: `x || y`.
pub const POINT_LENGTH: usize = 2 * COORDINATE_LENGTH;

/// Compressed point encoding (arkworks canonical, flags in the top bits).
pub const COMPRESSED_POINT_LENGTH: usize = 32;

/// Width of the field encoder output. Inputs longer than this are truncated.
pub const FIELD_WIDTH: usize = 32;

// ---------------------------------------------------------------------------
// Domain Separation
// ---------------------------------------------------------------------------

/// BLAKE3 `derive_key` context for the Schnorr challenge `e = H(R, pk, m)`.
pub const CHALLENGE_CONTEXT: &str = "VERITAS 2026-10-01 schnorr challenge v1";

/// BLAKE3 `derive_key` context for credential-subject digests.
///
/// Distinct from [`CHALLENGE_CONTEXT`] so that a credential digest can never
/// be mistaken for an arbitrary message hash.
pub const CREDENTIAL_CONTEXT: &str = "VERITAS 2026-10-01 credential subject v1";

/// BLAKE3 `derive_key` context for [`prehash`](crate::crypto::encoding::prehash).
pub const PREHASH_CONTEXT: &str = "VERITAS 2026-10-01 message prehash v1";

/// Tag prepended to the SHA-512 input when deriving the ephemeral scalar `k`.
pub const EPHEMERAL_DST: &[u8] = b"VERITAS-schnorr-ephemeral-v1";

/// Label of the single global signer context.
pub const DEFAULT_CONTEXT: &str = "default";

// ---------------------------------------------------------------------------
// AuthorityConfig
// ---------------------------------------------------------------------------

/// Errors raised while loading an [`AuthorityConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the schema.
    #[error("malformed authority config: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An entry of `authorized_signers` is not a valid hex-encoded point.
    #[error("invalid authorized signer at index {index}: {reason}")]
    InvalidSigner { index: usize, reason: String },
}

/// Runtime configuration for an [`Authority`](crate::attestation::Authority).
///
/// ```json
/// {
///   "context": "issuer-eu-1",
///   "authorized_signers": ["<128 hex chars: x || y>"]
/// }
/// ```
///
/// An empty `authorized_signers` list means "any key may sign".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Issuing context label for the nonce registry.
    pub context: String,

    /// Hex-encoded public keys allowed to produce accepted signatures.
    pub authorized_signers: Vec<String>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            context: DEFAULT_CONTEXT.to_string(),
            authorized_signers: Vec::new(),
        }
    }
}

impl AuthorityConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The nonce context this configuration selects.
    pub fn nonce_context(&self) -> NonceContext {
        NonceContext::new(self.context.clone())
    }

    /// Decode the authorized signer list.
    ///
    /// Fails on the first malformed entry; we'd rather refuse to start than
    /// silently run with a shorter allow-list than the operator wrote down.
    pub fn decode_signers(&self) -> Result<Vec<CurvePoint>, ConfigError> {
        self.authorized_signers
            .iter()
            .enumerate()
            .map(|(index, hex_str)| {
                CurvePoint::from_hex(hex_str).map_err(|e| ConfigError::InvalidSigner {
                    index,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

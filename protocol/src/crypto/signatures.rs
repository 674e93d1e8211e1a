//! # Schnorr Signatures
//!
//! The signature value and the equation that makes it a signature.
//!
//! ```text
//! sign:    k  = H_eph(sk, ctx, nonce)      R = k·G
//!          e  = H_chal(R, pk, encode(m))   s = k + e·sk  (mod r)
//!
//! verify:  s·G == R + e·pk
//! ```
//!
//! This module is stateless. Whether a valid signature is *accepted* also
//! depends on the nonce registry, and that decision lives in
//! [`attestation::verification`](crate::attestation::verification). Here we
//! only answer "is the math right?".

use std::fmt;

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::curve::{scalar_hex, scalar_to_be_bytes, CurvePoint};
use super::encoding::encode;
use super::hash::challenge;
use crate::nonce::Nonce;

/// Errors while decoding a serialized signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("malformed signature document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A Schnorr signature bound to a registry nonce.
///
/// Self-contained: the public key travels with the signature, so a verifier
/// needs nothing but this value, the message and its registry.
///
/// JSON form:
///
/// ```json
/// { "pk": "<128 hex>", "r": "<128 hex>", "s": "<64 hex>", "nonce": 0 }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Signer public key `sk·G`.
    pub pk: CurvePoint,
    /// Commitment `k·G`.
    pub r: CurvePoint,
    /// Response `k + e·sk mod r`.
    #[serde(with = "scalar_hex")]
    pub s: Fr,
    /// Registry nonce issued for this signature.
    pub nonce: Nonce,
}

impl Signature {
    /// Pretty-printed JSON. Points and scalars are hex strings.
    pub fn to_json(&self) -> Result<String, SignatureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse the JSON form. Points are fully validated on the way in.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The response scalar as 32 big-endian bytes.
    pub fn s_bytes(&self) -> [u8; 32] {
        scalar_to_be_bytes(&self.s)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("pk", &self.pk)
            .field("r", &self.r)
            .field("s", &hex::encode(self.s_bytes()))
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// Check `s·G == R + e·pk` for `message`.
///
/// Returns `false` for the point at infinity in either `pk` or `R`. Valid
/// signers never produce it, and accepting an identity public key would let
/// anyone "sign" with `s·G == R`.
///
/// Pure: no registry, no side effects. Safe to call as often as you like.
pub fn verify_equation(message: &[u8], signature: &Signature) -> bool {
    if signature.pk.is_identity() || signature.r.is_identity() {
        return false;
    }
    let e = challenge(&signature.r, &signature.pk, &encode(message));
    let lhs = CurvePoint::mul_generator(&signature.s);
    let rhs = signature.r.add(&signature.pk.mul_scalar(&e));
    lhs == rhs
}

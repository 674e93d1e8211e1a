//! # Key Management
//!
//! Keypairs for VERITAS signers: a secret scalar on BN254 and the public
//! point derived from it.
//!
//! ## Security considerations
//!
//! - Secret keys are 32-byte big-endian scalars in `[1, r-1]`. The all-zero
//!   key is rejected up front, before anything is signed.
//! - Generated keys come from `OsRng`.
//! - Key bytes are never logged and never appear in `Debug` output.

use ark_bn254::Fr;
use ark_ff::UniformRand;
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use super::curve::{CurvePoint, SecretScalar};
use crate::config::SECRET_KEY_LENGTH;

/// Errors that can occur during key operations.
///
/// Deliberately terse: error messages must not leak key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid secret key: must be a non-zero scalar below the group order")]
    InvalidSecretKey,

    #[error("invalid public key: not a valid BN254 G1 point")]
    InvalidPublicKey,
}

/// A VERITAS signing identity: secret scalar plus cached public key.
///
/// Cloning is allowed; every clone is one more copy of the secret to
/// protect. Each copy wipes its scalar on drop.
///
/// # Examples
///
/// ```
/// use veritas_protocol::crypto::keys::VeritasKeypair;
///
/// let kp = VeritasKeypair::from_bytes(&[0x11; 32]).unwrap();
/// assert_eq!(kp.public_key(), VeritasKeypair::from_bytes(&[0x11; 32]).unwrap().public_key());
/// ```
#[derive(Clone)]
pub struct VeritasKeypair {
    secret: SecretScalar,
    public: CurvePoint,
}

impl VeritasKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        loop {
            // A zero draw has probability 2^-254. Looping is still cheaper
            // than explaining a panic.
            if let Ok(secret) = SecretScalar::from_scalar(Fr::rand(&mut OsRng)) {
                return Self::from_secret(secret);
            }
        }
    }

    /// Rebuild a keypair from its 32-byte big-endian secret key.
    pub fn from_bytes(secret_key: &[u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        Ok(Self::from_secret(SecretScalar::from_be_bytes(secret_key)?))
    }

    /// Rebuild a keypair from a hex-encoded secret key.
    ///
    /// Handy for CLI flags and test fixtures. Keep real keys out of shell
    /// history.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidSecretKey)?,
        );
        let arr: Zeroizing<[u8; SECRET_KEY_LENGTH]> = Zeroizing::new(
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| KeyError::InvalidSecretKey)?,
        );
        Self::from_bytes(&arr)
    }

    /// Wrap an already-validated secret scalar.
    pub fn from_secret(secret: SecretScalar) -> Self {
        let public = secret.public_point();
        Self { secret, public }
    }

    /// The public key `sk * G`.
    pub fn public_key(&self) -> CurvePoint {
        self.public
    }

    /// Borrow the secret scalar. Needed by the signer; try not to pass it
    /// around more than that.
    pub fn secret(&self) -> &SecretScalar {
        &self.secret
    }

    /// Export the raw 32-byte secret key. The buffer is wiped on drop.
    pub fn secret_key_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        self.secret.to_be_bytes()
    }
}

impl fmt::Debug for VeritasKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VeritasKeypair(pub={})", self.public.short_hex())
    }
}

impl PartialEq for VeritasKeypair {
    /// Compared by public key; comparing secrets non-constant-time is a
    /// habit worth not having.
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
    }
}

impl Eq for VeritasKeypair {}

//! # Cryptographic Primitives for VERITAS
//!
//! Everything below the nonce registry: the curve, the fixed-width encoder,
//! the hashes, keys and the Schnorr equation itself.
//!
//! The choices are boring on purpose:
//!
//! - **BN254 G1** (arkworks) for the group. Prime order, no cofactor games.
//! - **BLAKE3** in `derive_key` mode for every protocol hash.
//! - **SHA-512** for deriving ephemeral scalars.
//!
//! None of this is novel cryptography. If you find yourself "improving" the
//! challenge layout, stop; every signature ever issued depends on it.

pub mod curve;
pub mod encoding;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use curve::{derive_public_key, CurvePoint, SecretScalar};
pub use encoding::{encode, prehash};
pub use hash::{challenge, domain_separated_hash};
pub use keys::{KeyError, VeritasKeypair};
pub use signatures::{verify_equation, Signature, SignatureError};

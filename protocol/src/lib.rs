// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # VERITAS Protocol — Core Library
//!
//! Schnorr signatures that can only be accepted once.
//!
//! A Schnorr signature is valid forever. That is exactly what you want from
//! a proof of authorship and exactly what you don't want from an
//! attestation that should be redeemed a single time. VERITAS binds every
//! signature to a nonce issued by a [`NonceRegistry`], and the verifier
//! burns that nonce the first time it accepts the signature. Replay it and
//! you get `false`, even though the math still checks out.
//!
//! ## Architecture
//!
//! - **crypto** — BN254 arithmetic, the fixed-width field encoder, challenge
//!   hashing, keys and the Schnorr equation.
//! - **nonce** — the issue/consume state machine. The only shared mutable
//!   state in the crate.
//! - **attestation** — signer, verifier and the [`Authority`] facade.
//! - **identity** — credential subjects and their canonical digest.
//! - **config** — protocol constants and [`AuthorityConfig`].
//!
//! ## Quick tour
//!
//! ```
//! use veritas_protocol::{Authority, CredentialSubject, NonceContext};
//!
//! let authority = Authority::standalone(NonceContext::default());
//! let sk = [0x11u8; 32];
//!
//! let subject = CredentialSubject::new("id-1", "Ada", "Lovelace", [0x42; 32], 0);
//! let signed = authority.sign_credential_subject(&subject, &sk).unwrap();
//!
//! assert!(authority.verify_signed_credential(&signed));
//! assert!(!authority.verify_signed_credential(&signed));
//! ```
//!
//! ## Design Philosophy
//!
//! 1. `verify` answers yes or no. It never panics and never errors.
//! 2. A failed check never mutates the registry.
//! 3. No global state. Registries are passed in, so authorities compose.
//! 4. Secrets never reach a log line or a `Debug` impl.

pub mod attestation;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod nonce;

pub use attestation::{Authority, Signer, Verifier};
pub use config::AuthorityConfig;
pub use crypto::{derive_public_key, CurvePoint, KeyError, Signature};
pub use identity::{CredentialSubject, SignedCredentialSubject};
pub use nonce::{Nonce, NonceContext, NonceRegistry, NonceState};

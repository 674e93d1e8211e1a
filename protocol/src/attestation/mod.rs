//! # Attestation
//!
//! Where the stateless Schnorr math meets the stateful nonce registry.
//!
//! - [`signing`] issues a nonce and signs under it.
//! - [`verification`] checks the equation and consumes the nonce, once.
//! - [`authority`] bundles both around one shared registry.

pub mod authority;
pub mod signing;
pub mod verification;

pub use authority::Authority;
pub use signing::{RegistryWitness, Signer, Witness, WitnessProvider};
pub use verification::Verifier;

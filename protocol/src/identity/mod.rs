//! # Identity Module
//!
//! Structured identity records and their attestation. A credential subject
//! is canonicalized into one 32-byte digest, and that digest is what the
//! signer signs and the verifier accepts, once.

pub mod credential;

pub use credential::{
    hash_credential_subject, sign_credential_subject, verify_signed_credential, CredentialError,
    CredentialSubject, SignedCredentialSubject,
};

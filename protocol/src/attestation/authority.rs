//! The attestation authority: one issuing context, one registry, the six
//! operations callers actually use.
//!
//! An `Authority` owns a [`Signer`] and a [`Verifier`] that share a single
//! [`NonceRegistry`]. The registry is injected, so several authorities can
//! share one (each with its own context) or run completely separately in
//! the same process.

use std::sync::Arc;

use tracing::info;

use super::signing::Signer;
use super::verification::Verifier;
use crate::config::{AuthorityConfig, ConfigError};
use crate::crypto::curve::{self, CurvePoint};
use crate::crypto::keys::KeyError;
use crate::crypto::signatures::Signature;
use crate::identity::credential::{self, CredentialSubject, SignedCredentialSubject};
use crate::nonce::{NonceContext, NonceRegistry};

/// Replay-safe signing and verification for one issuing context.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use veritas_protocol::attestation::Authority;
/// use veritas_protocol::nonce::{NonceContext, NonceRegistry};
///
/// let authority = Authority::new(Arc::new(NonceRegistry::new()), NonceContext::default());
/// let sk = [0x11u8; 32];
///
/// let sig = authority.sign(b"Test message", &sk).unwrap();
/// assert!(authority.verify(b"Test message", &sig));
/// assert!(!authority.verify(b"Test message", &sig)); // replay
/// ```
#[derive(Debug)]
pub struct Authority {
    registry: Arc<NonceRegistry>,
    signer: Signer,
    verifier: Verifier,
}

impl Authority {
    pub fn new(registry: Arc<NonceRegistry>, context: NonceContext) -> Self {
        let signer = Signer::new(Arc::clone(&registry), context.clone());
        let verifier = Verifier::new(Arc::clone(&registry), context);
        Self {
            registry,
            signer,
            verifier,
        }
    }

    /// An authority with its own private registry.
    pub fn standalone(context: NonceContext) -> Self {
        Self::new(Arc::new(NonceRegistry::new()), context)
    }

    /// Build from configuration, on a caller-supplied registry.
    pub fn from_config(
        config: &AuthorityConfig,
        registry: Arc<NonceRegistry>,
    ) -> Result<Self, ConfigError> {
        let signers = config.decode_signers()?;
        let restricted = !signers.is_empty();

        let context = config.nonce_context();
        let signer = Signer::new(Arc::clone(&registry), context.clone());
        let verifier =
            Verifier::new(Arc::clone(&registry), context).with_authorized_signers(signers);

        info!(
            context = %config.context,
            restricted,
            authorized = config.authorized_signers.len(),
            "authority initialized"
        );
        Ok(Self {
            registry,
            signer,
            verifier,
        })
    }

    pub fn context(&self) -> &NonceContext {
        self.signer.context()
    }

    pub fn registry(&self) -> &Arc<NonceRegistry> {
        &self.registry
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// `sk * G` for a 32-byte big-endian secret key.
    pub fn derive_public_key(&self, secret_key: &[u8; 32]) -> Result<CurvePoint, KeyError> {
        curve::derive_public_key(secret_key)
    }

    /// Sign `message` under a freshly issued nonce.
    pub fn sign(&self, message: &[u8], secret_key: &[u8; 32]) -> Result<Signature, KeyError> {
        self.signer.sign(message, secret_key)
    }

    /// Accept `signature` at most once.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.verifier.verify(message, signature)
    }

    pub fn hash_credential_subject(&self, subject: &CredentialSubject) -> [u8; 32] {
        credential::hash_credential_subject(subject)
    }

    pub fn sign_credential_subject(
        &self,
        subject: &CredentialSubject,
        secret_key: &[u8; 32],
    ) -> Result<SignedCredentialSubject, KeyError> {
        credential::sign_credential_subject(&self.signer, subject, secret_key)
    }

    pub fn verify_signed_credential(&self, signed: &SignedCredentialSubject) -> bool {
        credential::verify_signed_credential(&self.verifier, signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SK: [u8; 32] = [0x11; 32];

    #[test]
    fn test_six_operations() {
        let authority = Authority::standalone(NonceContext::default());

        let pk = authority.derive_public_key(&SK).unwrap();
        let sig = authority.sign(b"Test message", &SK).unwrap();
        assert_eq!(sig.pk, pk);
        assert!(authority.verify(b"Test message", &sig));
        assert!(!authority.verify(b"Test message", &sig));

        let subject = CredentialSubject::new("id-1", "Ada", "Lovelace", [7; 32], 0);
        let digest = authority.hash_credential_subject(&subject);
        let signed = authority.sign_credential_subject(&subject, &SK).unwrap();
        assert_eq!(digest, credential::hash_credential_subject(&signed.subject));
        assert!(authority.verify_signed_credential(&signed));
        assert!(!authority.verify_signed_credential(&signed));
    }

    #[test]
    fn test_from_config_restricts_signers() {
        let allowed = curve::derive_public_key(&[0x22; 32]).unwrap();
        let config = AuthorityConfig {
            context: "issuer-eu-1".into(),
            authorized_signers: vec![allowed.to_hex()],
        };
        let authority = Authority::from_config(&config, Arc::new(NonceRegistry::new())).unwrap();
        assert_eq!(authority.context().as_str(), "issuer-eu-1");

        let rejected = authority.sign(b"m", &SK).unwrap();
        assert!(!authority.verify(b"m", &rejected));

        let accepted = authority.sign(b"m", &[0x22; 32]).unwrap();
        assert!(authority.verify(b"m", &accepted));
    }

    #[test]
    fn test_from_config_rejects_bad_signer() {
        let config = AuthorityConfig {
            context: "x".into(),
            authorized_signers: vec!["00".repeat(64)],
        };
        assert!(Authority::from_config(&config, Arc::new(NonceRegistry::new())).is_err());
    }

    #[test]
    fn shared_registry_keeps_contexts_apart() {
        let registry = Arc::new(NonceRegistry::new());
        let a = Authority::new(Arc::clone(&registry), NonceContext::new("a"));
        let b = Authority::new(Arc::clone(&registry), NonceContext::new("b"));

        let sig_a = a.sign(b"m", &SK).unwrap();
        let sig_b = b.sign(b"m", &SK).unwrap();
        assert_eq!(sig_a.nonce, sig_b.nonce);

        // Consuming nonce 0 in `b` leaves `a`'s nonce 0 untouched.
        assert!(b.verify(b"m", &sig_b));
        assert!(a.verify(b"m", &sig_a));
        assert!(!a.verify(b"m", &sig_a));
    }
}

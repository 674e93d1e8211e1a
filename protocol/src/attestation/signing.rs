//! Signing bound to a freshly issued nonce.
//!
//! The signer never resolves its private inputs from ambient state. Each
//! call asks a [`WitnessProvider`] for a [`Witness`] (the secret scalar and
//! the nonce to bind), so tests and alternative nonce sources plug in
//! without touching the signing math. [`RegistryWitness`] is the provider
//! everybody actually uses: it issues the nonce from the shared
//! [`NonceRegistry`].

use std::sync::Arc;

use ark_bn254::Fr;
use ark_ff::Zero;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::curve::{CurvePoint, SecretScalar};
use crate::crypto::encoding::encode;
use crate::crypto::hash::{challenge, ephemeral_scalar};
use crate::crypto::keys::KeyError;
use crate::crypto::signatures::Signature;
use crate::nonce::{Nonce, NonceContext, NonceRegistry};

// ---------------------------------------------------------------------------
// Witness supply
// ---------------------------------------------------------------------------

/// Private inputs for one signature. The secret is wiped on drop.
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct Witness {
    pub secret: SecretScalar,
    #[zeroize(skip)]
    pub nonce: Nonce,
}

/// Capability that supplies the private inputs of a signature.
///
/// `witness` is called once per signature, after the key has been validated.
/// Implementations that hand out nonces must never hand out the same one
/// twice for the same context.
pub trait WitnessProvider: Send + Sync {
    fn witness(&self, secret: SecretScalar, context: &NonceContext) -> Witness;
}

/// The standard provider: nonces come from a [`NonceRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryWitness {
    registry: Arc<NonceRegistry>,
}

impl RegistryWitness {
    pub fn new(registry: Arc<NonceRegistry>) -> Self {
        Self { registry }
    }
}

impl WitnessProvider for RegistryWitness {
    fn witness(&self, secret: SecretScalar, context: &NonceContext) -> Witness {
        let nonce = self.registry.issue(context);
        Witness { secret, nonce }
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Produces Schnorr signatures for one issuing context.
pub struct Signer {
    context: NonceContext,
    witnesses: Arc<dyn WitnessProvider>,
}

impl Signer {
    /// A signer whose nonces come from `registry`.
    pub fn new(registry: Arc<NonceRegistry>, context: NonceContext) -> Self {
        Self::with_provider(Arc::new(RegistryWitness::new(registry)), context)
    }

    /// A signer with a custom witness provider.
    pub fn with_provider(witnesses: Arc<dyn WitnessProvider>, context: NonceContext) -> Self {
        Self { context, witnesses }
    }

    pub fn context(&self) -> &NonceContext {
        &self.context
    }

    /// Sign `message` with a 32-byte big-endian secret key.
    ///
    /// The key is validated before a nonce is requested, so an invalid key
    /// never burns a nonce. On success the returned nonce is *issued*, not
    /// consumed; consumption is the verifier's business.
    ///
    /// Messages longer than 32 bytes are truncated by the field encoder.
    /// See [`encoding`](crate::crypto::encoding).
    pub fn sign(&self, message: &[u8], secret_key: &[u8; 32]) -> Result<Signature, KeyError> {
        let secret = SecretScalar::from_be_bytes(secret_key)?;
        let witness = self.witnesses.witness(secret, &self.context);
        Ok(self.sign_with_witness(message, &witness))
    }

    /// Sign with explicitly supplied private inputs.
    ///
    /// Infallible: a `SecretScalar` is non-zero by construction, and the
    /// ephemeral scalar is re-derived until it is non-zero too.
    pub fn sign_with_witness(&self, message: &[u8], witness: &Witness) -> Signature {
        let sk = witness.secret.expose();
        let pk = witness.secret.public_point();

        let mut k = self.derive_ephemeral(witness);
        let r = CurvePoint::mul_generator(&k);
        let e = challenge(&r, &pk, &encode(message));
        let s = k + e * sk;
        k.zeroize();

        debug!(
            context = %self.context,
            pk = %pk.short_hex(),
            nonce = witness.nonce.value(),
            "message signed"
        );

        Signature {
            pk,
            r,
            s,
            nonce: witness.nonce,
        }
    }

    fn derive_ephemeral(&self, witness: &Witness) -> Fr {
        let mut counter = 0u32;
        loop {
            let k = ephemeral_scalar(&witness.secret, &self.context, witness.nonce, counter);
            if !k.is_zero() {
                return k;
            }
            counter = counter.wrapping_add(1);
        }
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signatures::verify_equation;
    use crate::nonce::NonceState;

    const SK: [u8; 32] = [0x11; 32];

    fn signer() -> (Arc<NonceRegistry>, Signer) {
        let registry = Arc::new(NonceRegistry::new());
        let signer = Signer::new(Arc::clone(&registry), NonceContext::default());
        (registry, signer)
    }

    #[test]
    fn test_signature_satisfies_equation() {
        let (_, signer) = signer();
        let sig = signer.sign(b"Test message", &SK).unwrap();
        assert!(verify_equation(b"Test message", &sig));
    }

    #[test]
    fn test_repeat_signing_uses_fresh_nonce() {
        let (_, signer) = signer();
        let a = signer.sign(b"same", &SK).unwrap();
        let b = signer.sign(b"same", &SK).unwrap();

        assert_eq!(a.pk, b.pk);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.r, b.r);
        assert_ne!(a.s, b.s);
    }

    #[test]
    fn test_nonces_start_at_zero_and_increase() {
        let (_, signer) = signer();
        let nonces: Vec<u64> = (0..4)
            .map(|_| signer.sign(b"m", &SK).unwrap().nonce.value())
            .collect();
        assert_eq!(nonces, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_signing_leaves_nonce_issued_not_consumed() {
        let (registry, signer) = signer();
        let sig = signer.sign(b"m", &SK).unwrap();
        assert_eq!(
            registry.state_of(signer.context(), sig.nonce),
            NonceState::Issued
        );
    }

    #[test]
    fn zero_key_burns_no_nonce() {
        let (registry, signer) = signer();
        assert_eq!(signer.sign(b"m", &[0u8; 32]), Err(KeyError::InvalidSecretKey));
        assert!(registry.snapshot(signer.context()).is_none());
        // Next valid signature still gets nonce 0.
        assert_eq!(signer.sign(b"m", &SK).unwrap().nonce, Nonce::ZERO);
    }

    #[test]
    fn test_deterministic_for_same_witness() {
        let (_, signer) = signer();
        let witness = Witness {
            secret: SecretScalar::from_be_bytes(&SK).unwrap(),
            nonce: Nonce::new(42),
        };
        let a = signer.sign_with_witness(b"m", &witness);
        let b = signer.sign_with_witness(b"m", &witness);
        assert_eq!(a, b);
    }

    #[test]
    fn witness_zeroize_clears_secret_keeps_nonce() {
        let mut witness = Witness {
            secret: SecretScalar::from_be_bytes(&SK).unwrap(),
            nonce: Nonce::new(7),
        };
        witness.zeroize();
        assert!(witness.secret.expose().is_zero());
        assert_eq!(witness.nonce, Nonce::new(7));
    }

    struct FixedWitness(Nonce);

    impl WitnessProvider for FixedWitness {
        fn witness(&self, secret: SecretScalar, _context: &NonceContext) -> Witness {
            Witness {
                secret,
                nonce: self.0,
            }
        }
    }

    #[test]
    fn test_custom_provider_is_used() {
        let signer = Signer::with_provider(
            Arc::new(FixedWitness(Nonce::new(1_000))),
            NonceContext::new("fixture"),
        );
        let sig = signer.sign(b"m", &SK).unwrap();
        assert_eq!(sig.nonce, Nonce::new(1_000));
        assert!(verify_equation(b"m", &sig));
    }
}

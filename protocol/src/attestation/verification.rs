//! Verification with replay protection.
//!
//! Acceptance is a three-step decision, ordered cheapest-to-commit first:
//!
//! 1. **Math.** The Schnorr equation must hold. If it doesn't, we return
//!    `false` and the registry is never touched.
//! 2. **Authorization** (optional). If an allow-list is configured, `pk`
//!    must be on it. Rejected signers never consume a nonce either.
//! 3. **Replay.** The signature's nonce must still be unconsumed; accepting
//!    it consumes it, atomically.
//!
//! Every failure is a plain `false`. "Replayed" and "invalid" look the same
//! from here; callers who need to tell them apart ask the registry via
//! [`NonceRegistry::state_of`].

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::crypto::curve::CurvePoint;
use crate::crypto::signatures::{verify_equation, Signature};
use crate::nonce::{NonceContext, NonceRegistry};

/// Verifies signatures for one issuing context and consumes their nonces.
///
/// # Nonce binding
///
/// The challenge is `H(R, pk, msg)`; the nonce is not part of it. The
/// equation therefore authenticates `(pk, R, s)` over the message but says
/// nothing about which nonce the signature carries. Anyone holding an
/// accepted signature can attach a different nonce to the same `(R, s)`,
/// and if that nonce was issued in this context and is still pending, the
/// relabelled copy is accepted and the nonce is consumed. The signature
/// that was actually waiting on that nonce is rejected afterwards.
///
/// The registry still bounds this: a nonce that was never issued, or was
/// already consumed, is never accepted, so each issued nonce yields at most
/// one acceptance.
#[derive(Debug)]
pub struct Verifier {
    registry: Arc<NonceRegistry>,
    context: NonceContext,
    /// Empty means "any signer".
    authorized: RwLock<HashSet<CurvePoint>>,
}

impl Verifier {
    pub fn new(registry: Arc<NonceRegistry>, context: NonceContext) -> Self {
        Self {
            registry,
            context,
            authorized: RwLock::new(HashSet::new()),
        }
    }

    /// Restrict acceptance to the given public keys.
    pub fn with_authorized_signers(self, signers: impl IntoIterator<Item = CurvePoint>) -> Self {
        self.authorized.write().extend(signers);
        self
    }

    /// Add one key to the allow-list at runtime.
    ///
    /// Note the first call flips the verifier from "anyone" to
    /// "only these keys".
    pub fn authorize(&self, signer: CurvePoint) {
        self.authorized.write().insert(signer);
    }

    /// Whether `pk` may sign under the current allow-list.
    pub fn is_authorized(&self, pk: &CurvePoint) -> bool {
        let authorized = self.authorized.read();
        authorized.is_empty() || authorized.contains(pk)
    }

    pub fn context(&self) -> &NonceContext {
        &self.context
    }

    /// Accept `signature` over `message` at most once.
    ///
    /// Returns `true` only if the equation holds, the signer is authorized
    /// and the nonce had not been consumed. On `true` the nonce is now
    /// consumed; on `false` nothing changed unless the nonce had already
    /// been consumed before the call.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        if !verify_equation(message, signature) {
            debug!(
                context = %self.context,
                pk = %signature.pk.short_hex(),
                nonce = signature.nonce.value(),
                "signature rejected: equation does not hold"
            );
            return false;
        }

        if !self.is_authorized(&signature.pk) {
            warn!(
                context = %self.context,
                pk = %signature.pk.short_hex(),
                "signature rejected: signer not authorized"
            );
            return false;
        }

        let accepted = self.registry.try_consume(&self.context, signature.nonce);
        debug!(
            context = %self.context,
            pk = %signature.pk.short_hex(),
            nonce = signature.nonce.value(),
            accepted,
            "signature verified"
        );
        accepted
    }

    /// The mathematical check alone. Registry-free and side-effect free.
    pub fn check_equation(&self, message: &[u8], signature: &Signature) -> bool {
        verify_equation(message, signature)
    }
}

//! # Hashing Utilities
//!
//! Two hash functions, each with one job:
//!
//! - **BLAKE3** — every protocol hash: the Schnorr challenge, credential
//!   digests, message prehashing. Always in `derive_key` mode, so each use
//!   gets its own domain and outputs from different contexts can never
//!   collide by construction.
//!
//! - **SHA-512** — deterministic derivation of the ephemeral signing scalar
//!   `k`. 512 bits of output reduced modulo a 254-bit order leaves a bias
//!   far below anything measurable.
//!
//! ## Challenge construction
//!
//! ```text
//! e = BLAKE3-XOF[CHALLENGE_CONTEXT]( R.x || R.y || pk.x || pk.y || encode(m) )[..64]  mod r
//! ```
//!
//! Every input is fixed-width (32 or 64 bytes), so the concatenation is
//! unambiguous without length prefixes.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use sha2::{Digest, Sha512};

use super::curve::{CurvePoint, SecretScalar};
use crate::config::{CHALLENGE_CONTEXT, EPHEMERAL_DST, FIELD_WIDTH};
use crate::nonce::{Nonce, NonceContext};

/// Number of XOF bytes read before reducing to a scalar.
const WIDE_REDUCTION_BYTES: usize = 64;

/// Compute a domain-separated BLAKE3 hash with a context string.
///
/// `domain_separated_hash("a", data)` and `domain_separated_hash("b", data)`
/// never collide, even for identical `data`, because BLAKE3's `derive_key`
/// mode keys the whole compression function with the context.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    domain_separated_hash_multi(context, &[data])
}

/// Same as [`domain_separated_hash`], fed from several slices without
/// concatenating them first.
pub fn domain_separated_hash_multi(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Hash `parts` under `context` straight to a scalar, using 64 bytes of XOF
/// output for a near-uniform reduction modulo `r`.
pub fn hash_to_scalar(context: &str, parts: &[&[u8]]) -> Fr {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    let mut wide = [0u8; WIDE_REDUCTION_BYTES];
    hasher.finalize_xof().fill(&mut wide);
    Fr::from_le_bytes_mod_order(&wide)
}

/// The Fiat–Shamir challenge `e = H(R, pk, msg)`.
///
/// `msg` is the already-encoded 32-byte field element; encoding is the
/// caller's job (see [`encode`](super::encoding::encode)) so that the
/// truncation rule lives in exactly one place.
pub fn challenge(r: &CurvePoint, pk: &CurvePoint, msg: &[u8; FIELD_WIDTH]) -> Fr {
    hash_to_scalar(
        CHALLENGE_CONTEXT,
        &[r.to_bytes().as_slice(), pk.to_bytes().as_slice(), msg.as_slice()],
    )
}

/// Deterministic ephemeral scalar for one signature.
///
/// `k = SHA-512(DST || sk || len(ctx) || ctx || nonce || counter) mod r`
///
/// Binding `k` to the registry-issued nonce means two signatures from the
/// same key never share `k` (the nonce is never issued twice per context),
/// with no dependence on the quality of a runtime RNG. `counter` exists only
/// to step past the astronomically unlikely `k = 0`.
pub fn ephemeral_scalar(
    secret: &SecretScalar,
    context: &NonceContext,
    nonce: Nonce,
    counter: u32,
) -> Fr {
    let label = context.as_str().as_bytes();
    // Wiped when it goes out of scope.
    let sk_bytes = secret.to_be_bytes();
    let mut hasher = Sha512::new();
    hasher.update(EPHEMERAL_DST);
    hasher.update(sk_bytes.as_slice());
    hasher.update((label.len() as u64).to_be_bytes());
    hasher.update(label);
    hasher.update(nonce.value().to_be_bytes());
    hasher.update(counter.to_be_bytes());
    Fr::from_le_bytes_mod_order(&hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curve::derive_public_key;
    use crate::crypto::encoding::encode;

    #[test]
    fn test_domain_separation() {
        // Same data, different contexts = different hashes.
        let data = b"same data";
        let hash_a = domain_separated_hash("context-a", data);
        let hash_b = domain_separated_hash("context-b", data);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_multi_matches_single() {
        let multi = domain_separated_hash_multi("ctx", &[b"hello".as_slice(), b" world".as_slice()]);
        let single = domain_separated_hash("ctx", b"hello world");
        assert_eq!(multi, single);
    }

    #[test]
    fn test_domain_separated_is_not_plain_blake3() {
        let data = b"test data";
        let plain = *blake3::hash(data).as_bytes();
        assert_ne!(plain, domain_separated_hash("veritas-test", data));
    }

    #[test]
    fn challenge_is_deterministic() {
        let pk = derive_public_key(&[0x11; 32]).unwrap();
        let r = derive_public_key(&[0x22; 32]).unwrap();
        let m = encode(b"Test message");
        assert_eq!(challenge(&r, &pk, &m), challenge(&r, &pk, &m));
    }

    #[test]
    fn challenge_binds_every_input() {
        let pk = derive_public_key(&[0x11; 32]).unwrap();
        let pk2 = derive_public_key(&[0x12; 32]).unwrap();
        let r = derive_public_key(&[0x22; 32]).unwrap();
        let r2 = derive_public_key(&[0x23; 32]).unwrap();
        let m = encode(b"msg1");
        let m2 = encode(b"msg2");

        let base = challenge(&r, &pk, &m);
        assert_ne!(base, challenge(&r2, &pk, &m));
        assert_ne!(base, challenge(&r, &pk2, &m));
        assert_ne!(base, challenge(&r, &pk, &m2));
        // Swapping R and pk is a different transcript too.
        assert_ne!(base, challenge(&pk, &r, &m));
    }

    #[test]
    fn test_ephemeral_scalar_depends_on_nonce_and_context() {
        let sk = SecretScalar::from_be_bytes(&[0x11; 32]).unwrap();
        let ctx = NonceContext::default();
        let other = NonceContext::new("other");

        let k0 = ephemeral_scalar(&sk, &ctx, Nonce::new(0), 0);
        assert_eq!(k0, ephemeral_scalar(&sk, &ctx, Nonce::new(0), 0));
        assert_ne!(k0, ephemeral_scalar(&sk, &ctx, Nonce::new(1), 0));
        assert_ne!(k0, ephemeral_scalar(&sk, &other, Nonce::new(0), 0));
        assert_ne!(k0, ephemeral_scalar(&sk, &ctx, Nonce::new(0), 1));
    }
}

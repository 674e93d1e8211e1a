//! # Field Encoder
//!
//! Maps byte strings onto the fixed 32-byte width that the challenge hasher
//! and the credential codec consume.
//!
//! ## ⚠ Truncation
//!
//! [`encode`] right-pads short inputs with zeros and **truncates long inputs
//! to their first 32 bytes**. This is a deliberate simplification of the
//! signature format, not a bug, but it is a sharp edge:
//!
//! ```text
//! encode(b"transfer 10 to alice ........ and also 9000 to mallory")
//!   == encode(b"transfer 10 to alice ........ and nothing else")
//! ```
//!
//! Two messages sharing a 32-byte prefix sign identically. If your messages
//! can be longer than 32 bytes, run them through [`prehash`] first and sign
//! the digest.
//!
//! Zero padding also means `b"abc"` and `b"abc\0"` encode identically.
//! Same advice applies.

use crate::config::{FIELD_WIDTH, PREHASH_CONTEXT};
use crate::crypto::hash::domain_separated_hash;

/// Encode `input` to exactly 32 bytes: zero-pad on the right, or truncate.
///
/// # Example
///
/// ```
/// use veritas_protocol::crypto::encoding::encode;
///
/// let short = encode(b"hi");
/// assert_eq!(&short[..2], b"hi");
/// assert!(short[2..].iter().all(|b| *b == 0));
///
/// let long = [7u8; 40];
/// assert_eq!(encode(&long), [7u8; 32]);
/// ```
pub fn encode(input: &[u8]) -> [u8; FIELD_WIDTH] {
    let mut out = [0u8; FIELD_WIDTH];
    let len = input.len().min(FIELD_WIDTH);
    out[..len].copy_from_slice(&input[..len]);
    out
}

/// Whether [`encode`] would drop bytes from `input`.
pub fn is_truncated(input: &[u8]) -> bool {
    input.len() > FIELD_WIDTH
}

/// Encode an integer as a 32-byte big-endian field element (left-padded).
///
/// Used for credential timestamps, where the full 64-bit value must survive.
pub fn encode_u64(value: u64) -> [u8; FIELD_WIDTH] {
    let mut out = [0u8; FIELD_WIDTH];
    out[FIELD_WIDTH - 8..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Collapse an arbitrary-length input to 32 bytes with a domain-separated
/// BLAKE3 hash.
///
/// The output passes through [`encode`] unchanged, so signing
/// `prehash(msg)` binds the signature to every byte of `msg`.
pub fn prehash(input: &[u8]) -> [u8; FIELD_WIDTH] {
    domain_separated_hash(PREHASH_CONTEXT, input)
}

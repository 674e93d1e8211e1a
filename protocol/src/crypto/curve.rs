//! # Scalar & Point Arithmetic on BN254/G1
//!
//! The group underneath every signature in VERITAS. G1 of BN254 is a
//! prime-order short-Weierstrass curve (cofactor 1), which buys us two
//! things for free:
//!
//! - every non-identity point is a generator, so `sk * G` is injective on
//!   `[1, r-1]` (distinct keys give distinct public keys, exactly);
//! - there are no small-subgroup points to reject on decode, only
//!   off-curve garbage and the point at infinity.
//!
//! ## Encodings
//!
//! | Value        | Bytes | Layout                                   |
//! |--------------|-------|------------------------------------------|
//! | Scalar       | 32    | big-endian integer, must be `< r`        |
//! | Point        | 64    | `x || y`, each a big-endian `Fq` element |
//! | Point (cmp.) | 32    | arkworks canonical compressed form       |
//!
//! Points are immutable values. Arithmetic happens in projective
//! coordinates and is normalized back to affine before it escapes.

use std::fmt;
use std::ops::Mul;

use ark_bn254::{Fq, Fr, G1Affine, G1Projective};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInt, BigInteger, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::keys::KeyError;
use crate::config::{COMPRESSED_POINT_LENGTH, COORDINATE_LENGTH, POINT_LENGTH, SCALAR_LENGTH};

// ---------------------------------------------------------------------------
// Big-endian <-> field conversions
// ---------------------------------------------------------------------------

/// Interpret 32 big-endian bytes as a 256-bit integer (little-endian limbs,
/// which is what arkworks stores).
fn be_bytes_to_bigint(bytes: &[u8; 32]) -> BigInt<4> {
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let start = 32 - 8 * (i + 1);
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[start..start + 8]);
        *limb = u64::from_be_bytes(word);
    }
    BigInt::new(limbs)
}

fn field_to_be_bytes<F: PrimeField>(value: &F) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    // BN254 moduli are 254 bits, so the big-endian repr is always 32 bytes.
    // Right-align anyway in case a shorter vector ever shows up.
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Parse a scalar from 32 big-endian bytes.
///
/// Returns `None` when the integer is `>= r`. We never reduce silently here:
/// a caller handing us an out-of-range value has a bug, and reducing would
/// paper over it.
pub fn scalar_from_be_bytes(bytes: &[u8; SCALAR_LENGTH]) -> Option<Fr> {
    Fr::from_bigint(be_bytes_to_bigint(bytes))
}

/// Encode a scalar as 32 big-endian bytes.
pub fn scalar_to_be_bytes(scalar: &Fr) -> [u8; SCALAR_LENGTH] {
    field_to_be_bytes(scalar)
}

fn coordinate_from_be_bytes(bytes: &[u8]) -> Option<Fq> {
    let arr: [u8; COORDINATE_LENGTH] = bytes.try_into().ok()?;
    Fq::from_bigint(be_bytes_to_bigint(&arr))
}

// ---------------------------------------------------------------------------
// SecretScalar
// ---------------------------------------------------------------------------

/// A private scalar in `[1, r-1]`.
///
/// The zero scalar is unrepresentable: every constructor rejects it, so code
/// holding a `SecretScalar` never has to re-check. The scalar is wiped when
/// the value is dropped, clones included.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretScalar(Fr);

impl SecretScalar {
    /// Parse a secret key from its 32-byte big-endian encoding.
    ///
    /// Fails with [`KeyError::InvalidSecretKey`] when the value is zero or
    /// not below the group order.
    pub fn from_be_bytes(bytes: &[u8; SCALAR_LENGTH]) -> Result<Self, KeyError> {
        let scalar = scalar_from_be_bytes(bytes).ok_or(KeyError::InvalidSecretKey)?;
        Self::from_scalar(scalar)
    }

    /// Wrap an existing field element, rejecting zero.
    pub fn from_scalar(scalar: Fr) -> Result<Self, KeyError> {
        if scalar.is_zero() {
            return Err(KeyError::InvalidSecretKey);
        }
        Ok(Self(scalar))
    }

    /// The underlying field element.
    pub fn expose(&self) -> &Fr {
        &self.0
    }

    /// Big-endian encoding, wiped when the returned buffer is dropped.
    pub fn to_be_bytes(&self) -> Zeroizing<[u8; SCALAR_LENGTH]> {
        Zeroizing::new(scalar_to_be_bytes(&self.0))
    }

    /// `sk * G`.
    pub fn public_point(&self) -> CurvePoint {
        CurvePoint::mul_generator(&self.0)
    }
}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar(<redacted>)")
    }
}

/// Derive the public key `sk * G` for a 32-byte big-endian secret key.
///
/// Pure and deterministic. Zero and out-of-range scalars are rejected with
/// [`KeyError::InvalidSecretKey`] before any curve arithmetic happens.
pub fn derive_public_key(secret_key: &[u8; SCALAR_LENGTH]) -> Result<CurvePoint, KeyError> {
    Ok(SecretScalar::from_be_bytes(secret_key)?.public_point())
}

// ---------------------------------------------------------------------------
// CurvePoint
// ---------------------------------------------------------------------------

/// An affine point on BN254/G1.
///
/// Public keys and signature commitments are both `CurvePoint`s. Equality is
/// plain coordinate equality, which is the curve's point-equality test since
/// both sides are always normalized affine points.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurvePoint(G1Affine);

impl CurvePoint {
    /// The standard BN254 G1 generator `G = (1, 2)`.
    pub fn generator() -> Self {
        Self(G1Affine::generator())
    }

    /// `scalar * G`.
    pub fn mul_generator(scalar: &Fr) -> Self {
        Self(G1Affine::generator().mul(*scalar).into_affine())
    }

    /// `scalar * self`.
    pub fn mul_scalar(&self, scalar: &Fr) -> Self {
        Self(self.0.mul(*scalar).into_affine())
    }

    /// `self + other`. The result may be the point at infinity.
    pub fn add(&self, other: &Self) -> Self {
        let sum: G1Projective = self.0 + other.0;
        Self(sum.into_affine())
    }

    /// Whether this is the point at infinity (the group identity).
    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    /// The affine `x` coordinate, big-endian.
    pub fn x_bytes(&self) -> [u8; COORDINATE_LENGTH] {
        field_to_be_bytes(&self.0.x)
    }

    /// The affine `y` coordinate, big-endian.
    pub fn y_bytes(&self) -> [u8; COORDINATE_LENGTH] {
        field_to_be_bytes(&self.0.y)
    }

    /// Uncompressed `x || y` encoding.
    ///
    /// The identity has no affine coordinates; arkworks stores it as
    /// `(0, 0)` with a flag, so it encodes as 64 zero bytes. `(0, 0)` is not
    /// on the curve, so the encoding stays unambiguous.
    pub fn to_bytes(&self) -> [u8; POINT_LENGTH] {
        let mut out = [0u8; POINT_LENGTH];
        if !self.is_identity() {
            out[..COORDINATE_LENGTH].copy_from_slice(&self.x_bytes());
            out[COORDINATE_LENGTH..].copy_from_slice(&self.y_bytes());
        }
        out
    }

    /// Decode an uncompressed point.
    ///
    /// Rejects coordinates outside `Fq`, points off the curve and the point
    /// at infinity. Public keys and commitments are never the identity for a
    /// valid signer, so accepting it would only ever help a forger.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != POINT_LENGTH {
            return Err(KeyError::InvalidPublicKey);
        }
        let x = coordinate_from_be_bytes(&bytes[..COORDINATE_LENGTH])
            .ok_or(KeyError::InvalidPublicKey)?;
        let y = coordinate_from_be_bytes(&bytes[COORDINATE_LENGTH..])
            .ok_or(KeyError::InvalidPublicKey)?;

        let point = G1Affine::new_unchecked(x, y);
        if point.is_zero()
            || !point.is_on_curve()
            || !point.is_in_correct_subgroup_assuming_on_curve()
        {
            return Err(KeyError::InvalidPublicKey);
        }
        Ok(Self(point))
    }

    /// Canonical compressed encoding (32 bytes).
    pub fn to_compressed(&self) -> [u8; COMPRESSED_POINT_LENGTH] {
        let mut buf = Vec::with_capacity(COMPRESSED_POINT_LENGTH);
        let mut out = [0u8; COMPRESSED_POINT_LENGTH];
        // Writing into a Vec cannot fail, and a G1 point always compresses
        // to exactly 32 bytes.
        if self.0.serialize_compressed(&mut buf).is_ok() && buf.len() == COMPRESSED_POINT_LENGTH {
            out.copy_from_slice(&buf);
        }
        out
    }

    /// Decode the compressed form produced by [`to_compressed`](Self::to_compressed).
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != COMPRESSED_POINT_LENGTH {
            return Err(KeyError::InvalidPublicKey);
        }
        let point =
            G1Affine::deserialize_compressed(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        if point.is_zero() {
            return Err(KeyError::InvalidPublicKey);
        }
        Ok(Self(point))
    }

    /// Hex-encoded uncompressed form. 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse the hex form produced by [`to_hex`](Self::to_hex).
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }

    /// Short fingerprint for log lines. Never use it as an identifier.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.x_bytes()[..8])
    }
}

impl fmt::Display for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return f.write_str("CurvePoint(infinity)");
        }
        write!(f, "CurvePoint({}…)", self.short_hex())
    }
}

impl Serialize for CurvePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CurvePoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CurvePoint::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for scalars as 64-char big-endian hex strings.
pub(crate) mod scalar_hex {
    use ark_bn254::Fr;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{scalar_from_be_bytes, scalar_to_be_bytes};

    pub fn serialize<S: Serializer>(scalar: &Fr, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(scalar_to_be_bytes(scalar)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fr, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::invalid_length(bytes.len(), &"32 bytes"))?;
        scalar_from_be_bytes(&arr)
            .ok_or_else(|| serde::de::Error::custom("scalar is not below the group order"))
    }
}

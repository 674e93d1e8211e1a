//! # Credential Subjects
//!
//! A credential subject is the identity record an issuer attests to. What
//! actually gets signed is its digest:
//!
//! ```text
//! digest = BLAKE3[CREDENTIAL_CONTEXT](
//!     encode(id) || encode(first_name) || encode(last_name)
//!     || national_identifier || encode_u64(birth_timestamp) )
//! ```
//!
//! Each field occupies a fixed 32-byte slot, so field boundaries can't be
//! shifted to produce a collision. The context differs from the challenge
//! context, so a credential digest is never mistaken for a plain message.
//!
//! The string fields go through the field encoder and are **truncated to
//! 32 bytes**. Two subjects whose names agree on the first 32 bytes hash
//! identically. The timestamp is hashed at full 64-bit precision.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::attestation::signing::Signer;
use crate::attestation::verification::Verifier;
use crate::config::{CREDENTIAL_CONTEXT, FIELD_WIDTH};
use crate::crypto::encoding::{encode, encode_u64};
use crate::crypto::hash::domain_separated_hash_multi;
use crate::crypto::keys::KeyError;
use crate::crypto::signatures::Signature;

/// Errors building a credential subject from external input.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("national identifier is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("national identifier must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("birth timestamp {0} is out of range")]
    InvalidTimestamp(u64),

    #[error("birth date {0} is before the Unix epoch")]
    BeforeEpoch(DateTime<Utc>),
}

/// The identity record being attested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSubject {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Opaque 32-byte national identifier (hex in JSON).
    #[serde(with = "hex_32")]
    pub national_identifier: [u8; 32],
    /// Seconds since the Unix epoch.
    pub birth_timestamp: u64,
}

impl CredentialSubject {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        national_identifier: [u8; 32],
        birth_timestamp: u64,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_identifier,
            birth_timestamp,
        }
    }

    /// A fresh random subject id: UUID v4 in its 32-character simple form,
    /// which fits one field slot exactly. The hyphenated form (36 chars)
    /// would be truncated.
    pub fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Replace the birth timestamp with a calendar date.
    ///
    /// The field is unsigned, so dates before 1970 are rejected with
    /// [`CredentialError::BeforeEpoch`] rather than mapped onto another
    /// timestamp.
    pub fn with_birth_date(mut self, date: DateTime<Utc>) -> Result<Self, CredentialError> {
        self.birth_timestamp =
            u64::try_from(date.timestamp()).map_err(|_| CredentialError::BeforeEpoch(date))?;
        Ok(self)
    }

    /// The birth timestamp as a date, if it fits chrono's range.
    pub fn birth_date(&self) -> Result<DateTime<Utc>, CredentialError> {
        let secs = i64::try_from(self.birth_timestamp)
            .map_err(|_| CredentialError::InvalidTimestamp(self.birth_timestamp))?;
        Utc.timestamp_opt(secs, 0)
            .single()
            .ok_or(CredentialError::InvalidTimestamp(self.birth_timestamp))
    }

    /// Parse a 64-character hex national identifier.
    pub fn national_identifier_from_hex(hex_str: &str) -> Result<[u8; 32], CredentialError> {
        let bytes = hex::decode(hex_str.trim())?;
        let actual = bytes.len();
        bytes
            .try_into()
            .map_err(|_| CredentialError::InvalidLength {
                expected: 32,
                actual,
            })
    }

    /// Whether any string field is longer than one slot and will be
    /// truncated when hashed.
    pub fn has_truncated_fields(&self) -> bool {
        [&self.id, &self.first_name, &self.last_name]
            .iter()
            .any(|field| field.len() > FIELD_WIDTH)
    }
}

/// A subject together with the issuer's signature over its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCredentialSubject {
    pub subject: CredentialSubject,
    pub signature: Signature,
}

/// Deterministic, domain-separated digest of all five fields.
pub fn hash_credential_subject(subject: &CredentialSubject) -> [u8; 32] {
    domain_separated_hash_multi(
        CREDENTIAL_CONTEXT,
        &[
            encode(subject.id.as_bytes()).as_slice(),
            encode(subject.first_name.as_bytes()).as_slice(),
            encode(subject.last_name.as_bytes()).as_slice(),
            subject.national_identifier.as_slice(),
            encode_u64(subject.birth_timestamp).as_slice(),
        ],
    )
}

/// Hash `subject` and sign the digest.
pub fn sign_credential_subject(
    signer: &Signer,
    subject: &CredentialSubject,
    secret_key: &[u8; 32],
) -> Result<SignedCredentialSubject, KeyError> {
    let digest = hash_credential_subject(subject);
    let signature = signer.sign(&digest, secret_key)?;
    Ok(SignedCredentialSubject {
        subject: subject.clone(),
        signature,
    })
}

/// Re-hash the embedded subject and verify the signature over it.
///
/// Same at-most-once semantics as [`Verifier::verify`].
pub fn verify_signed_credential(verifier: &Verifier, signed: &SignedCredentialSubject) -> bool {
    let digest = hash_credential_subject(&signed.subject);
    verifier.verify(&digest, &signed.signature)
}

mod hex_32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::CredentialSubject::national_identifier_from_hex(&s)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonce::{NonceContext, NonceRegistry};
    use std::sync::Arc;

    fn subject() -> CredentialSubject {
        CredentialSubject::new("did:veritas:0001", "Ada", "Lovelace", [0x42; 32], 1_000_000_000)
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(
            hash_credential_subject(&subject()),
            hash_credential_subject(&subject())
        );
    }

    #[test]
    fn test_every_field_changes_the_hash() {
        let base = hash_credential_subject(&subject());

        let mut s = subject();
        s.id.push('x');
        assert_ne!(hash_credential_subject(&s), base);

        let mut s = subject();
        s.first_name = "Ado".into();
        assert_ne!(hash_credential_subject(&s), base);

        let mut s = subject();
        s.last_name = "Byron".into();
        assert_ne!(hash_credential_subject(&s), base);

        let mut s = subject();
        s.national_identifier[31] ^= 1;
        assert_ne!(hash_credential_subject(&s), base);

        let mut s = subject();
        s.birth_timestamp += 1;
        assert_ne!(hash_credential_subject(&s), base);
    }

    #[test]
    fn timestamp_keeps_full_precision() {
        let mut a = subject();
        let mut b = subject();
        a.birth_timestamp = 1 << 40;
        b.birth_timestamp = (1 << 40) + (1 << 33);
        assert_ne!(hash_credential_subject(&a), hash_credential_subject(&b));
    }

    #[test]
    fn field_boundaries_are_fixed() {
        // Moving a character between adjacent fields must change the digest.
        let a = CredentialSubject::new("id", "AB", "C", [0; 32], 0);
        let b = CredentialSubject::new("id", "A", "BC", [0; 32], 0);
        assert_ne!(hash_credential_subject(&a), hash_credential_subject(&b));
    }

    #[test]
    fn long_names_are_truncated() {
        let long = "x".repeat(40);
        let mut a = subject();
        a.first_name = long.clone();
        let mut b = subject();
        b.first_name = format!("{}yyyy", &long[..36]);
        assert!(a.has_truncated_fields());
        assert_eq!(hash_credential_subject(&a), hash_credential_subject(&b));
    }

    #[test]
    fn test_new_id_fits_one_slot() {
        let id = CredentialSubject::new_id();
        assert_eq!(id.len(), 32);
        assert_ne!(id, CredentialSubject::new_id());
    }

    #[test]
    fn test_birth_date_roundtrip() {
        let date = Utc.with_ymd_and_hms(1990, 5, 17, 0, 0, 0).unwrap();
        let s = subject().with_birth_date(date).unwrap();
        assert_eq!(s.birth_timestamp, date.timestamp() as u64);
        assert_eq!(s.birth_date().unwrap(), date);
    }

    #[test]
    fn pre_epoch_birth_dates_are_rejected() {
        let lovelace_born = Utc.with_ymd_and_hms(1815, 12, 10, 0, 0, 0).unwrap();
        let moon_landing = Utc.with_ymd_and_hms(1969, 7, 20, 20, 17, 0).unwrap();
        for date in [lovelace_born, moon_landing] {
            assert!(matches!(
                subject().with_birth_date(date),
                Err(CredentialError::BeforeEpoch(d)) if d == date
            ));
        }

        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(subject().with_birth_date(epoch).unwrap().birth_timestamp, 0);
    }

    #[test]
    fn distinct_birth_dates_give_distinct_digests() {
        let a = subject()
            .with_birth_date(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap())
            .unwrap();
        let b = subject()
            .with_birth_date(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 2).unwrap())
            .unwrap();
        assert_ne!(a.birth_timestamp, b.birth_timestamp);
        assert_ne!(hash_credential_subject(&a), hash_credential_subject(&b));
    }

    #[test]
    fn test_national_identifier_from_hex() {
        let hex_id = "ab".repeat(32);
        assert_eq!(
            CredentialSubject::national_identifier_from_hex(&hex_id).unwrap(),
            [0xab; 32]
        );
        assert!(matches!(
            CredentialSubject::national_identifier_from_hex("abcd"),
            Err(CredentialError::InvalidLength { expected: 32, actual: 2 })
        ));
        assert!(matches!(
            CredentialSubject::national_identifier_from_hex("zz"),
            Err(CredentialError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_sign_tamper_verify_replay() {
        let registry = Arc::new(NonceRegistry::new());
        let ctx = NonceContext::default();
        let signer = Signer::new(Arc::clone(&registry), ctx.clone());
        let verifier = Verifier::new(registry, ctx);

        let signed = sign_credential_subject(&signer, &subject(), &[0x11; 32]).unwrap();

        let mut tampered = signed.clone();
        tampered.subject.first_name = "Eve".into();
        assert!(!verify_signed_credential(&verifier, &tampered));

        assert!(verify_signed_credential(&verifier, &signed));
        assert!(!verify_signed_credential(&verifier, &signed));
    }

    #[test]
    fn test_signed_credential_json_roundtrip() {
        let registry = Arc::new(NonceRegistry::new());
        let signer = Signer::new(registry, NonceContext::default());
        let signed = sign_credential_subject(&signer, &subject(), &[0x11; 32]).unwrap();

        let json = serde_json::to_string(&signed).unwrap();
        assert!(json.contains(&"42".repeat(32)));
        let back: SignedCredentialSubject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signed);
    }
}

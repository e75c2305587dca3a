//! Registry entries (spec §4.4): a signed, monotonically-revised pointer
//! from a public key to a content hash — the mutable layer over the
//! immutable blob store.
//!
//! Grounded on `examples/s5-dev-s5-rs/s5_fs/src/actor/persistence.rs`'s
//! `sign_bytes` construction and `examples/s5-dev-s5-rs/s5_core/src/stream/types.rs`'s
//! `StreamMessage`, but built to match this spec's exact wire shape rather
//! than the teacher's unified stream/registry message.

use crate::crypto::{Crypto, TaggedPublicKey};
use crate::error::{Error, S5Result};

/// Tag byte identifying a registry record in the signed byte string.
/// Distinguishes registry signatures from any other message type that
/// might reuse the same keypair.
pub const REGISTRY_RECORD_TAG: u8 = 0x07;

/// Revisions must stay below 2^48 (spec §3.1 invariant).
pub const MAX_REVISION: u64 = 1 << 48;

/// Maximum size of a registry entry's opaque payload.
pub const MAX_DATA_LEN: usize = 64;

/// A signed, monotonically-revised pointer (spec §3.1, §4.4).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
    pub public_key: TaggedPublicKey,
    pub revision: u64,
    pub data: Vec<u8>,
    pub signature: [u8; 64],
}

#[derive(thiserror::Error, Debug)]
pub enum RegistryEntryError {
    #[error("revision {0} meets or exceeds 2^48")]
    RevisionTooLarge(u64),
    #[error("data length {0} exceeds the maximum of {max}", max = MAX_DATA_LEN)]
    DataTooLarge(usize),
    #[error("wire data too short to decode a registry entry")]
    Truncated,
    #[error("signature verification failed")]
    InvalidSignature,
}

impl RegistryEntry {
    /// Builds the exact byte string the signature covers:
    /// `record_tag(1) ‖ le(revision, 8) ‖ data_len(1) ‖ data`.
    fn signing_bytes(revision: u64, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + 8 + 1 + data.len());
        buf.push(REGISTRY_RECORD_TAG);
        buf.extend_from_slice(&revision.to_le_bytes());
        buf.push(data.len() as u8);
        buf.extend_from_slice(data);
        buf
    }

    /// Signs a new entry for `public_key` at `revision` with `priv_seed`.
    pub fn sign(
        crypto: &dyn Crypto,
        public_key: TaggedPublicKey,
        priv_seed: &[u8; 32],
        revision: u64,
        data: Vec<u8>,
    ) -> Result<Self, RegistryEntryError> {
        if revision >= MAX_REVISION {
            return Err(RegistryEntryError::RevisionTooLarge(revision));
        }
        if data.len() > MAX_DATA_LEN {
            return Err(RegistryEntryError::DataTooLarge(data.len()));
        }
        let signature = crypto.ed25519_sign(priv_seed, &Self::signing_bytes(revision, &data));
        Ok(Self {
            public_key,
            revision,
            data,
            signature,
        })
    }

    /// Verifies the signature against this entry's own `public_key`.
    pub fn verify(&self, crypto: &dyn Crypto) -> bool {
        if self.revision >= MAX_REVISION || self.data.len() > MAX_DATA_LEN {
            return false;
        }
        let msg = Self::signing_bytes(self.revision, &self.data);
        crypto.ed25519_verify(&self.public_key, &msg, &self.signature)
    }

    /// Transport serialisation:
    /// `record_tag ‖ public_key(33) ‖ le(revision,8) ‖ data_len(1) ‖ data ‖ signature(64)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(1 + 33 + 8 + 1 + self.data.len() + 64);
        buf.push(REGISTRY_RECORD_TAG);
        buf.extend_from_slice(&self.public_key);
        buf.extend_from_slice(&self.revision.to_le_bytes());
        buf.push(self.data.len() as u8);
        buf.extend_from_slice(&self.data);
        buf.extend_from_slice(&self.signature);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RegistryEntryError> {
        if bytes.len() < 1 + 33 + 8 + 1 {
            return Err(RegistryEntryError::Truncated);
        }
        let mut pos = 1; // skip record tag
        let public_key: TaggedPublicKey = bytes[pos..pos + 33]
            .try_into()
            .map_err(|_| RegistryEntryError::Truncated)?;
        pos += 33;
        let revision = u64::from_le_bytes(
            bytes[pos..pos + 8]
                .try_into()
                .map_err(|_| RegistryEntryError::Truncated)?,
        );
        pos += 8;
        let data_len = bytes[pos] as usize;
        pos += 1;
        if bytes.len() < pos + data_len + 64 {
            return Err(RegistryEntryError::Truncated);
        }
        let data = bytes[pos..pos + data_len].to_vec();
        pos += data_len;
        let signature: [u8; 64] = bytes[pos..pos + 64]
            .try_into()
            .map_err(|_| RegistryEntryError::Truncated)?;

        Ok(Self {
            public_key,
            revision,
            data,
            signature,
        })
    }
}

/// Local write policy for a registry implementation (spec §4.4): reject any
/// incoming entry whose revision does not strictly increase on the one
/// already held for the same public key.
pub fn accepts_revision(existing: Option<&RegistryEntry>, incoming: &RegistryEntry) -> bool {
    existing.is_none_or(|e| incoming.revision > e.revision)
}

/// Validates an incoming entry for storage: signature must verify and the
/// revision must strictly exceed any existing entry.
pub fn validate_incoming(
    crypto: &dyn Crypto,
    existing: Option<&RegistryEntry>,
    incoming: &RegistryEntry,
) -> S5Result<()> {
    if !incoming.verify(crypto) {
        tracing::debug!("rejecting registry entry: signature invalid");
        return Err(Error::Crypto("registry entry signature invalid".into()));
    }
    if !accepts_revision(existing, incoming) {
        tracing::debug!(
            revision = incoming.revision,
            "rejecting registry entry: revision does not advance"
        );
        return Err(Error::RevisionConflict { attempts: 0 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCrypto;

    #[test]
    fn sign_and_verify_round_trip() {
        let crypto = DefaultCrypto;
        let (priv_seed, public) = crypto.ed25519_keypair(&[1u8; 32]);
        let entry =
            RegistryEntry::sign(&crypto, public, &priv_seed, 1, b"hello".to_vec()).unwrap();
        assert!(entry.verify(&crypto));
    }

    #[test]
    fn bit_flip_in_signed_region_fails_verification() {
        let crypto = DefaultCrypto;
        let (priv_seed, public) = crypto.ed25519_keypair(&[2u8; 32]);
        let mut entry =
            RegistryEntry::sign(&crypto, public, &priv_seed, 3, b"data".to_vec()).unwrap();
        entry.data[0] ^= 0x01;
        assert!(!entry.verify(&crypto));
    }

    #[test]
    fn wire_round_trip() {
        let crypto = DefaultCrypto;
        let (priv_seed, public) = crypto.ed25519_keypair(&[3u8; 32]);
        let entry =
            RegistryEntry::sign(&crypto, public, &priv_seed, 9, b"payload".to_vec()).unwrap();
        let bytes = entry.to_bytes();
        let decoded = RegistryEntry::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, entry);
        assert!(decoded.verify(&crypto));
    }

    #[test]
    fn revision_monotonicity_is_enforced() {
        let crypto = DefaultCrypto;
        let (priv_seed, public) = crypto.ed25519_keypair(&[4u8; 32]);
        let first = RegistryEntry::sign(&crypto, public, &priv_seed, 1, vec![]).unwrap();
        let replay = RegistryEntry::sign(&crypto, public, &priv_seed, 1, vec![]).unwrap();
        let next = RegistryEntry::sign(&crypto, public, &priv_seed, 2, vec![]).unwrap();

        assert!(validate_incoming(&crypto, None, &first).is_ok());
        assert!(validate_incoming(&crypto, Some(&first), &replay).is_err());
        assert!(validate_incoming(&crypto, Some(&first), &next).is_ok());
    }

    #[test]
    fn revision_ceiling_is_rejected() {
        let crypto = DefaultCrypto;
        let (priv_seed, public) = crypto.ed25519_keypair(&[5u8; 32]);
        let err = RegistryEntry::sign(&crypto, public, &priv_seed, MAX_REVISION, vec![])
            .unwrap_err();
        assert!(matches!(err, RegistryEntryError::RevisionTooLarge(_)));
    }
}

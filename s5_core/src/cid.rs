//! Content identifiers (spec §3.1, §6.4).
//!
//! Two CID shapes exist:
//!
//! - [`RawCid`]: the multibase encoding of a bare 32-byte BLAKE3 hash, with
//!   no length or algorithm metadata. Used where the size is already known
//!   from context (e.g. a registry entry's public key identifies the
//!   owner, not a blob).
//! - [`BlobRef`] (and its CID form, [`BlobRef::to_cid`]): a tagged
//!   multihash plus size, so a downloader can verify both the hash and
//!   the expected byte count before trusting a peer's response.
//!
//! Grounded on `examples/s5-dev-s5-rs/s5_core/src/blob/identifier.rs`
//! (`BlobId`), generalized to carry an explicit, decode-time-checked
//! algorithm tag instead of a single hardcoded one.

use crate::error::{Error, S5Result};
use crate::hash::Hash;

/// Modern BLAKE3 multihash tag, always emitted on new writes.
pub const MULTIHASH_BLAKE3: u8 = 0x1e;
/// Legacy BLAKE3 multihash tag, accepted on decode only (see
/// `SPEC_FULL.md` Open Question 3).
pub const MULTIHASH_BLAKE3_LEGACY: u8 = 0x1f;

/// 2-byte scheme prefix for a [`BlobRef`] CID.
const BLOB_REF_SCHEME: [u8; 2] = [0x5b, 0x82];

#[derive(thiserror::Error, Debug)]
pub enum CidError {
    #[error("invalid multibase string: {0}")]
    Multibase(#[from] multibase::Error),
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("unrecognised multihash algorithm tag: {0:#x}")]
    UnknownAlgorithm(u8),
    #[error("unrecognised blob-ref scheme prefix: {0:?}")]
    UnknownScheme([u8; 2]),
}

/// The multibase encoding of a bare 32-byte hash: no tag, no size.
pub struct RawCid;

impl RawCid {
    pub fn encode(hash: &Hash) -> String {
        multibase::encode(multibase::Base::Base32Lower, hash.as_bytes())
    }

    pub fn decode(s: &str) -> Result<Hash, CidError> {
        let (_, bytes) = multibase::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CidError::InvalidLength {
                expected: 32,
                actual: b.len(),
            })?;
        Ok(Hash::from(arr))
    }
}

/// A multihash-tagged content hash: `[algorithm tag] ++ [32-byte hash]`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TaggedHash {
    pub hash: Hash,
    pub tag: u8,
}

impl TaggedHash {
    /// Tags `hash` with the modern algorithm tag, as all new writes must.
    pub fn new(hash: Hash) -> Self {
        Self {
            hash,
            tag: MULTIHASH_BLAKE3,
        }
    }

    pub fn to_bytes(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = self.tag;
        out[1..].copy_from_slice(self.hash.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CidError> {
        if bytes.len() != 33 {
            return Err(CidError::InvalidLength {
                expected: 33,
                actual: bytes.len(),
            });
        }
        let tag = bytes[0];
        if tag != MULTIHASH_BLAKE3 && tag != MULTIHASH_BLAKE3_LEGACY {
            return Err(CidError::UnknownAlgorithm(tag));
        }
        let arr: [u8; 32] = bytes[1..].try_into().expect("checked length above");
        Ok(Self {
            hash: Hash::from(arr),
            tag,
        })
    }
}

/// A content-addressed handle to an immutable blob: `(hash, size)`
/// (spec §3.1).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlobRef {
    pub hash: Hash,
    pub size: u64,
}

impl BlobRef {
    pub fn new(hash: Hash, size: u64) -> Self {
        Self { hash, size }
    }

    /// Encodes as `scheme(2) ‖ tagged_hash(33) ‖ minimal_le_size`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let tagged = TaggedHash::new(self.hash).to_bytes();
        let mut size_bytes = self.size.to_le_bytes().to_vec();
        if let Some(pos) = size_bytes.iter().rposition(|&b| b != 0) {
            size_bytes.truncate(pos + 1);
        } else {
            size_bytes.clear();
        }
        [BLOB_REF_SCHEME.to_vec(), tagged.to_vec(), size_bytes].concat()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CidError> {
        if bytes.len() < 2 + 33 {
            return Err(CidError::InvalidLength {
                expected: 2 + 33,
                actual: bytes.len(),
            });
        }
        let scheme: [u8; 2] = bytes[0..2].try_into().expect("checked length");
        if scheme != BLOB_REF_SCHEME {
            return Err(CidError::UnknownScheme(scheme));
        }
        let tagged = TaggedHash::from_bytes(&bytes[2..35])?;
        let size_slice = &bytes[35..];
        let mut size_buf = [0u8; 8];
        let n = size_slice.len().min(8);
        size_buf[..n].copy_from_slice(&size_slice[..n]);
        Ok(Self {
            hash: tagged.hash,
            size: u64::from_le_bytes(size_buf),
        })
    }

    pub fn to_cid(&self) -> String {
        multibase::encode(multibase::Base::Base32Lower, self.to_bytes())
    }

    pub fn from_cid(s: &str) -> Result<Self, CidError> {
        let (_, bytes) = multibase::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

/// Verifies that `bytes` hashes to the hash encoded by `cid`.
///
/// Used by the advanced CID surface's `verifyCID` operation (§6.4).
pub fn verify_cid(cid: &str, bytes: &[u8]) -> S5Result<()> {
    let expected = BlobRef::from_cid(cid)
        .map(|r| r.hash)
        .or_else(|_| RawCid::decode(cid))
        .map_err(|e| Error::Crypto(format!("malformed CID: {e}")))?;
    let actual = Hash::new(bytes);
    if actual == expected {
        Ok(())
    } else {
        Err(Error::IntegrityFailure {
            context: "verify_cid".into(),
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_cid_round_trips() {
        let hash = Hash::new(b"hello");
        let cid = RawCid::encode(&hash);
        assert_eq!(cid.len(), 53);
        assert_eq!(RawCid::decode(&cid).unwrap(), hash);
    }

    #[test]
    fn blob_ref_round_trips() {
        let hash = Hash::new(b"world");
        let blob_ref = BlobRef::new(hash, 1234);
        let cid = blob_ref.to_cid();
        let decoded = BlobRef::from_cid(&cid).unwrap();
        assert_eq!(decoded, blob_ref);
    }

    #[test]
    fn blob_ref_accepts_legacy_tag_on_decode() {
        let hash = Hash::new(b"legacy");
        let blob_ref = BlobRef::new(hash, 42);
        let mut bytes = blob_ref.to_bytes();
        bytes[2] = MULTIHASH_BLAKE3_LEGACY;
        let decoded = BlobRef::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.hash, hash);
    }

    #[test]
    fn verify_cid_detects_mismatch() {
        let blob_ref = BlobRef::new(Hash::new(b"a"), 1);
        let cid = blob_ref.to_cid();
        assert!(verify_cid(&cid, b"a").is_ok());
        assert!(verify_cid(&cid, b"b").is_err());
    }
}

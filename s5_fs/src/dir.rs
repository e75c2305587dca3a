//! The canonical directory encoding (spec §3.1, §4.7): a deterministic CBOR
//! mapping of names to [`FileRef`]/[`DirRef`] entries, or — once a
//! directory grows past its sharding threshold — a [`crate::hamt::HamtNode`]
//! root.
//!
//! Canonical encoding relies on two properties minicbor and `BTreeMap`
//! already give us: minicbor picks the minimal integer width for a given
//! value, and `BTreeMap<String, _>` iterates in byte-lexicographic key
//! order, which for valid UTF-8 agrees with codepoint order. As long as
//! every struct's `#[n(..)]` field tags are declared in ascending order
//! (they are, throughout this module), two directories with equal logical
//! contents always serialise to the identical byte string.
//!
//! Grounded on `examples/s5-dev-s5-rs/s5_fs/src/dir.rs`'s `DirV1`/`DirRef`/
//! `FileRef` and its `encrypt_dir_bytes`/`decrypt_dir_bytes` pair, trimmed
//! to this spec's entry shape (no version-chain/tombstone fields — the
//! core's `delete` is a plain entry removal, not a tombstone) and extended
//! with the HAMT-sharded body variant §4.8 requires.

use crate::hamt::HamtNode;
use minicbor::{Decode, Encode};
use s5_core::crypto::TaggedPublicKey;
use std::collections::BTreeMap;
use std::convert::Infallible;

/// Tag identifying the per-file encryption algorithm in a [`FileEncryption`]
/// descriptor. Only one algorithm is defined by this format.
pub const FILE_ENCRYPTION_XCHACHA20_POLY1305: u8 = 0x02;

#[derive(Encode, Decode, Clone, Debug)]
#[cbor(map)]
pub struct DirHeader {
    /// Set only when `body` is [`DirBody::Sharded`]: which hash function
    /// selected child slots in that HAMT (spec §4.8).
    #[n(0)]
    pub hamt_hash_fn_selector: Option<u8>,
}

impl DirHeader {
    pub fn new() -> Self {
        Self { hamt_hash_fn_selector: None }
    }
}

impl Default for DirHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// A directory snapshot: header plus either the inline entry maps or a
/// HAMT root (spec §4.8 "Activation").
#[derive(Encode, Decode, Clone, Debug)]
#[cbor(map)]
pub struct DirV1 {
    #[n(0)]
    pub header: DirHeader,
    #[n(1)]
    pub body: DirBody,
}

#[derive(Encode, Decode, Clone, Debug)]
#[cbor(map)]
pub enum DirBody {
    /// One name-sorted map shared by both entry kinds (spec §4.7: "a
    /// mapping whose keys are sorted" — a single namespace, so the same
    /// name can never exist simultaneously as a file and a directory).
    #[n(0)]
    Inline(#[n(0)] BTreeMap<String, DirectoryEntry>),
    #[n(1)]
    Sharded(#[n(0)] HamtNode),
}

impl DirV1 {
    /// An empty, unsharded directory.
    pub fn empty() -> Self {
        Self { header: DirHeader::new(), body: DirBody::Inline(BTreeMap::new()) }
    }

    pub fn is_sharded(&self) -> bool {
        matches!(self.body, DirBody::Sharded(_))
    }

    /// Total entry count (inline form only; for a sharded directory use
    /// the HAMT node's own count).
    pub fn inline_len(&self) -> Option<usize> {
        match &self.body {
            DirBody::Inline(entries) => Some(entries.len()),
            DirBody::Sharded(_) => None,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<DirV1, minicbor::decode::Error> {
        minicbor::decode(bytes)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, minicbor::encode::Error<Infallible>> {
        minicbor::to_vec(self)
    }
}

/// A reference to a child directory (spec §3.1). The key that names this
/// child lives in the parent's entry map, not in the `DirRef` itself.
#[derive(Encode, Decode, Clone, Debug)]
#[cbor(map)]
pub struct DirRef {
    /// The child's registry public key.
    #[n(0)]
    #[cbor(with = "minicbor::bytes")]
    pub public_key: TaggedPublicKey,
    #[n(1)]
    pub created_at: Option<u32>,
    /// AEAD envelope (spec §4.5) of the child's 32-byte write seed under
    /// the parent's write key.
    #[n(2)]
    #[cbor(with = "minicbor::bytes")]
    pub encrypted_write_key: Vec<u8>,
    /// Set only if the child directory is itself encrypted.
    #[n(3)]
    pub encryption_key: Option<[u8; 32]>,
}

/// A reference to a file's content (spec §3.1).
#[derive(Encode, Decode, Clone, Debug)]
#[cbor(map)]
pub struct FileRef {
    #[n(0)]
    #[cbor(with = "minicbor::bytes")]
    pub hash: [u8; 32],
    #[n(1)]
    pub size: u64,
    #[n(2)]
    pub media_type: Option<String>,
    #[n(3)]
    pub timestamp: Option<u32>,
    #[n(4)]
    pub encryption: Option<FileEncryption>,
}

impl FileRef {
    pub fn new(hash: [u8; 32], size: u64) -> Self {
        Self { hash, size, media_type: None, timestamp: None, encryption: None }
    }
}

/// The per-file encryption descriptor carried in a [`FileRef`]'s extras
/// (spec §4.6).
#[derive(Encode, Decode, Clone, Debug)]
#[cbor(map)]
pub struct FileEncryption {
    #[n(0)]
    pub algorithm: u8,
    #[n(1)]
    pub key: [u8; 32],
    #[n(2)]
    #[cbor(with = "minicbor::bytes")]
    pub plaintext_hash: [u8; 32],
    #[n(3)]
    pub chunk_size: u32,
    /// The original plaintext length (spec §4.6 "chunk boundaries are
    /// implied by chunk size and the known plaintext size"): the final
    /// chunk is zero-padded out to `chunk_size` before encryption, so
    /// this is the only way to trim that padding back off on decrypt.
    #[n(4)]
    pub plaintext_len: u64,
}

/// A tagged sum of the two entry kinds a directory holds (spec §9
/// "Polymorphism": `DirectoryEntry`).
#[derive(Encode, Decode, Clone, Debug)]
#[cbor(map)]
pub enum DirectoryEntry {
    #[n(0)]
    File(#[n(0)] FileRef),
    #[n(1)]
    Dir(#[n(0)] DirRef),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dir() -> DirV1 {
        let mut entries = BTreeMap::new();
        entries.insert(
            "photos".to_string(),
            DirectoryEntry::Dir(DirRef {
                public_key: [1u8; 33],
                created_at: Some(100),
                encrypted_write_key: vec![1, 2, 3],
                encryption_key: None,
            }),
        );
        entries.insert("a.txt".to_string(), DirectoryEntry::File(FileRef::new([9u8; 32], 2)));
        DirV1 { header: DirHeader::new(), body: DirBody::Inline(entries) }
    }

    #[test]
    fn a_name_cannot_be_both_a_file_and_a_directory() {
        let mut entries = BTreeMap::new();
        entries.insert("docs".to_string(), DirectoryEntry::File(FileRef::new([1u8; 32], 1)));
        entries.insert(
            "docs".to_string(),
            DirectoryEntry::Dir(DirRef {
                public_key: [2u8; 33],
                created_at: None,
                encrypted_write_key: vec![],
                encryption_key: None,
            }),
        );
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries.get("docs"), Some(DirectoryEntry::Dir(_))));
    }

    #[test]
    fn encode_decode_round_trips() {
        let dir = sample_dir();
        let bytes = dir.to_vec().unwrap();
        let decoded = DirV1::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.inline_len(), Some(2));
    }

    #[test]
    fn equal_directories_encode_identically() {
        let a = sample_dir();
        let b = sample_dir();
        assert_eq!(a.to_vec().unwrap(), b.to_vec().unwrap());
    }

    #[test]
    fn empty_directory_round_trips() {
        let dir = DirV1::empty();
        let bytes = dir.to_vec().unwrap();
        let decoded = DirV1::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.inline_len(), Some(0));
    }
}

//! Tunables and per-call options (spec §9 "Configuration surface"): every
//! knob named in the spec is a struct field with a documented default,
//! never a compile-time constant.

use std::time::Duration;

/// Which keyed hash function a HAMT uses to place names into its bitmap
/// (spec §4.8, `SPEC_FULL.md` Open Question 1). `Xxh3_64` is the default;
/// `Blake3Keyed` is reserved for callers that want a cryptographic hash
/// and is never chosen automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HamtHashFn {
    #[default]
    Xxh3_64,
    Blake3Keyed,
}

impl HamtHashFn {
    pub(crate) fn selector_bit(self) -> u8 {
        match self {
            HamtHashFn::Xxh3_64 => 0,
            HamtHashFn::Blake3Keyed => 1,
        }
    }

    pub(crate) fn from_selector_bit(bit: u8) -> Self {
        if bit & 1 == 1 { HamtHashFn::Blake3Keyed } else { HamtHashFn::Xxh3_64 }
    }
}

/// Every tunable a client instance needs, gathered in one place so embedders
/// can override defaults without touching call sites.
#[derive(Clone, Debug)]
pub struct FsConfig {
    /// File-content chunk size for chunked AEAD encryption (spec §4.6).
    pub chunk_size: usize,
    /// Entry count above which a directory switches to HAMT sharding
    /// (spec §4.8; default per `SPEC_FULL.md` Open Question 2).
    pub hamt_threshold: usize,
    /// Bits of the keyed hash consumed per HAMT level (spec §4.8).
    pub hamt_bits_per_level: u32,
    /// Which hash function new HAMT nodes are built with.
    pub hamt_hash_fn: HamtHashFn,
    /// Maximum entries held inline in one HAMT leaf before it splits.
    pub hamt_max_inline_entries: usize,
    /// Registry-entry fresh-write cache TTL (spec §3.1).
    pub registry_cache_ttl: Duration,
    /// Registry-entry cache soft size limit (spec §3.2).
    pub registry_cache_soft_limit: usize,
    /// Blob fresh-write cache TTL (spec §3.1).
    pub blob_cache_ttl: Duration,
    /// Blob cache soft size limit (spec §3.2).
    pub blob_cache_soft_limit: usize,
    /// Bounded retry count for registry-conflict and network-error retries
    /// (spec §4.10, §7).
    pub retry_count: u32,
    /// How long a registry read waits for a fresher revision to arrive
    /// over the network (spec §4.4).
    pub registry_read_wait: Duration,
    /// Brief grace period given to the network even when a local entry is
    /// already present (spec §4.4).
    pub registry_read_grace: Duration,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256 * 1024,
            hamt_threshold: 1000,
            hamt_bits_per_level: 5,
            hamt_hash_fn: HamtHashFn::default(),
            hamt_max_inline_entries: 1000,
            registry_cache_ttl: Duration::from_secs(60),
            registry_cache_soft_limit: 100,
            blob_cache_ttl: Duration::from_secs(5 * 60),
            blob_cache_soft_limit: 50,
            retry_count: 3,
            registry_read_wait: Duration::from_millis(2500),
            registry_read_grace: Duration::from_millis(250),
        }
    }
}

/// Encryption request for [`crate::fs::Filesystem::put`].
#[derive(Clone, Debug)]
pub struct EncryptionOptions {
    /// Caller-supplied 32-byte key; a fresh random key is generated if
    /// omitted.
    pub key: Option<[u8; 32]>,
}

/// Options accepted by [`crate::fs::Filesystem::put`].
#[derive(Clone, Debug, Default)]
pub struct PutOptions {
    pub media_type: Option<String>,
    pub timestamp: Option<u32>,
    pub encryption: Option<EncryptionOptions>,
}

/// Options accepted by [`crate::fs::Filesystem::list`].
#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    pub cursor: Option<String>,
    pub limit: usize,
}

impl ListOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self { cursor: None, limit }
    }
}

/// The kind of entry [`crate::fs::Filesystem::get_metadata`] describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Metadata returned by `getMetadata` (spec §4.10). Content hashes are
/// deliberately not exposed here; they are only reachable through the
/// advanced CID surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    pub kind: EntryKind,
    /// File size in bytes; `None` for directories.
    pub size: Option<u64>,
    pub media_type: Option<String>,
    pub timestamp: Option<u32>,
    /// Set only for directories.
    pub file_count: Option<u64>,
    /// Set only for directories.
    pub directory_count: Option<u64>,
}

/// One item yielded by [`crate::fs::Filesystem::list`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub name: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub media_type: Option<String>,
    pub timestamp: Option<u32>,
    pub cursor: String,
}

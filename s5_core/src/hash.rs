//! The content hash type used throughout S5 (BLAKE3, 32 bytes).
//!
//! Grounded on `examples/s5-dev-s5-rs/s5_core/src/hash.rs`: wraps
//! `blake3::Hash` directly rather than a bare `[u8; 32]`, so `to_hex`
//! comes from blake3 itself instead of a hand-rolled loop, and depends on
//! `data-encoding` for the short form exactly as the teacher does.

use std::fmt;

/// A 32-byte BLAKE3 content hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash(blake3::Hash);

impl Hash {
    /// Hashes `buf` with BLAKE3.
    pub fn new(buf: impl AsRef<[u8]>) -> Self {
        Hash(blake3::hash(buf.as_ref()))
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(blake3::Hash::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// A short hex prefix (first 5 bytes) for friendly log output.
    pub fn fmt_short(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.as_bytes()[..5])
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<[u8; 32]> for Hash {
    fn from(value: [u8; 32]) -> Self {
        Hash::from_bytes(value)
    }
}

impl From<Hash> for [u8; 32] {
    fn from(value: Hash) -> Self {
        *value.0.as_bytes()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hash").field(&self.to_hex()).finish()
    }
}

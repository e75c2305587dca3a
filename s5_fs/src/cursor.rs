//! Opaque listing cursors (spec §3.1, §4.10): a base64url token that
//! resumes a `list` call at the position it was issued from, scoped to
//! one directory so a cursor from a different directory is rejected
//! rather than silently misinterpreted.

use minicbor::{Decode, Encode};
use s5_core::error::{Error, S5Result};

/// Where a cursor points within a directory's listing.
#[derive(Encode, Decode, Clone, Debug, PartialEq, Eq)]
#[cbor(map)]
pub enum CursorPosition {
    /// An inline (unsharded) directory: the sort key of the last entry
    /// already yielded.
    #[n(0)]
    Inline {
        #[n(0)]
        last_key: String,
    },
    /// A HAMT-sharded directory: the child-index path from the root down
    /// to the last-yielded leaf, plus that entry's index within the leaf.
    #[n(1)]
    Hamt {
        #[n(0)]
        path: Vec<u8>,
        #[n(1)]
        leaf_index: u32,
    },
}

/// A cursor scoped to the directory it was issued from.
#[derive(Encode, Decode, Clone, Debug, PartialEq, Eq)]
#[cbor(map)]
pub struct Cursor {
    /// Fingerprint (blake3 of the registry public key) of the directory
    /// this cursor was issued from.
    #[n(0)]
    #[cbor(with = "minicbor::bytes")]
    directory_fingerprint: [u8; 32],
    #[n(1)]
    pub position: CursorPosition,
}

impl Cursor {
    pub fn new(directory_fingerprint: [u8; 32], position: CursorPosition) -> Self {
        Self { directory_fingerprint, position }
    }

    /// Encodes the cursor as an opaque base64url token.
    pub fn encode(&self) -> String {
        let bytes = minicbor::to_vec(self).expect("cursor encoding cannot fail");
        base64_url_encode(&bytes)
    }

    /// Decodes a token previously returned by [`Cursor::encode`], verifying
    /// it was issued for `directory_fingerprint`. Any malformed token or a
    /// fingerprint mismatch fails with [`Error::InvalidCursor`].
    pub fn decode(token: &str, directory_fingerprint: [u8; 32]) -> S5Result<Self> {
        let bytes = base64_url_decode(token).ok_or(Error::InvalidCursor)?;
        let cursor: Cursor = minicbor::decode(&bytes).map_err(|_| Error::InvalidCursor)?;
        if cursor.directory_fingerprint != directory_fingerprint {
            return Err(Error::InvalidCursor);
        }
        Ok(cursor)
    }
}

fn base64_url_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn base64_url_decode(s: &str) -> Option<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_inline_cursor() {
        let fp = [7u8; 32];
        let cursor = Cursor::new(fp, CursorPosition::Inline { last_key: "b.txt".into() });
        let token = cursor.encode();
        let decoded = Cursor::decode(&token, fp).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn rejects_cursor_from_a_different_directory() {
        let cursor = Cursor::new([1u8; 32], CursorPosition::Inline { last_key: "a".into() });
        let token = cursor.encode();
        assert!(Cursor::decode(&token, [2u8; 32]).is_err());
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(Cursor::decode("not-a-real-cursor!!", [0u8; 32]).is_err());
    }
}

//! Root-CID parsing and per-segment key-set resolution (spec §4.9, §6.5).
//!
//! [`step_into_child`] is the one piece of this module [`crate::fs`] calls
//! directly while walking an ordinary `home/`/`archive/` path; [`parse_uri`]
//! exists for the advanced CID surface (§6.4), which lets a caller open an
//! arbitrary root by CID rather than by identity.
//!
//! Grounded on `examples/s5-dev-s5-rs/s5_core/src/cid.rs`'s tagged-CID
//! encoding (reused here for the public-key root-CID variants) and this
//! crate's own [`s5_core::blob_envelope`] for unwrapping a child's write
//! seed.

use crate::dir::DirRef;
use s5_core::cid::{CidError, TaggedHash, MULTIHASH_BLAKE3, MULTIHASH_BLAKE3_LEGACY};
use s5_core::crypto::{Crypto, TaggedPublicKey, ED25519_SCHEME_TAG};
use s5_core::error::{Error, S5Result};
use s5_core::hash::Hash;

/// What a root CID self-describes as (spec §4.9 "parse the root CID").
#[derive(Clone, Debug)]
pub enum RootRef {
    PublicKey(TaggedPublicKey),
    PublicKeyEncrypted { public_key: TaggedPublicKey, encryption_key: [u8; 32] },
    Immutable(Hash),
}

/// The resolved capability set for one node in a tree (spec §3.1 "Key
/// set"). Computed at resolve time, never persisted.
#[derive(Clone, Debug)]
pub struct KeySet {
    pub public_key: TaggedPublicKey,
    /// Present only if the caller holds write access to this node. Doubles
    /// as the Ed25519 signing seed and, for a directory, as the AEAD key
    /// that wraps its children's write seeds (spec §4.7).
    pub write_seed: Option<[u8; 32]>,
    /// Present only if this node's contents are encrypted.
    pub encryption_key: Option<[u8; 32]>,
}

impl KeySet {
    /// Builds a key set for a node this identity can write to.
    pub fn writable(crypto: &dyn Crypto, write_seed: [u8; 32], encryption_key: Option<[u8; 32]>) -> Self {
        let (_, public_key) = crypto.ed25519_keypair(&write_seed);
        Self { public_key, write_seed: Some(write_seed), encryption_key }
    }
}

/// Splits a path per the §6.5 grammar: forward-slash-separated segments,
/// an optional leading slash stripped, empty path meaning "root". Fails
/// with [`Error::PathInvalid`] on an empty segment (e.g. `a//b`).
pub fn split_path(path: &str) -> S5Result<Vec<&str>> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::PathInvalid(path.to_string()));
    }
    Ok(segments)
}

/// Advances from `parent`'s key set into one of its children given the
/// child's [`DirRef`] (spec §4.9): decrypts the child's write seed under
/// the parent's write key, then derives its Ed25519 public key. If the
/// caller has no write access to `parent`, the child's own (unverifiable
/// without the write seed) public key is used read-only.
pub fn step_into_child(crypto: &dyn Crypto, parent: &KeySet, dir_ref: &DirRef) -> S5Result<KeySet> {
    let write_seed = match parent.write_seed {
        Some(parent_write_seed) => {
            let plaintext =
                s5_core::blob_envelope::decode(crypto, &parent_write_seed, &dir_ref.encrypted_write_key)?;
            let seed: [u8; 32] = plaintext
                .try_into()
                .map_err(|_| Error::Crypto("decrypted write seed is not 32 bytes".into()))?;
            Some(seed)
        }
        None => None,
    };

    let public_key = match write_seed {
        Some(seed) => crypto.ed25519_keypair(&seed).1,
        None => dir_ref.public_key,
    };

    Ok(KeySet { public_key, write_seed, encryption_key: dir_ref.encryption_key })
}

/// Parses a virtual URI of the form `scheme://<root-cid>[/<segment>]*`
/// (spec §4.9) into a root reference and the remaining path segments.
pub fn parse_uri(uri: &str) -> S5Result<(RootRef, Vec<&str>)> {
    let rest = uri
        .splitn(2, "://")
        .nth(1)
        .ok_or_else(|| Error::PathInvalid(uri.to_string()))?;
    let mut parts = rest.splitn(2, '/');
    let root_cid = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| Error::PathInvalid(uri.to_string()))?;
    let segments = match parts.next() {
        Some(tail) if !tail.is_empty() => split_path(tail)?,
        _ => Vec::new(),
    };
    Ok((parse_root_cid(root_cid)?, segments))
}

fn parse_root_cid(s: &str) -> S5Result<RootRef> {
    let (_, bytes) =
        multibase::decode(s).map_err(|e| Error::PathInvalid(format!("malformed root CID: {e}")))?;
    match bytes.first().copied() {
        Some(ED25519_SCHEME_TAG) => match bytes.len() {
            33 => {
                let public_key: TaggedPublicKey = bytes.try_into().expect("checked length");
                Ok(RootRef::PublicKey(public_key))
            }
            65 => {
                let public_key: TaggedPublicKey = bytes[..33].try_into().expect("checked length");
                let encryption_key: [u8; 32] = bytes[33..].try_into().expect("checked length");
                Ok(RootRef::PublicKeyEncrypted { public_key, encryption_key })
            }
            n => Err(Error::PathInvalid(format!("unrecognised public-key root CID length {n}"))),
        },
        Some(MULTIHASH_BLAKE3) | Some(MULTIHASH_BLAKE3_LEGACY) => {
            let tagged = TaggedHash::from_bytes(&bytes).map_err(|e: CidError| Error::PathInvalid(e.to_string()))?;
            Ok(RootRef::Immutable(tagged.hash))
        }
        _ => Err(Error::PathInvalid(format!("unrecognised root CID: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dir::DirRef;
    use s5_core::crypto::DefaultCrypto;

    #[test]
    fn split_path_strips_leading_slash_and_rejects_empty_segments() {
        assert_eq!(split_path("/home/a.txt").unwrap(), vec!["home", "a.txt"]);
        assert_eq!(split_path("home/a.txt").unwrap(), vec!["home", "a.txt"]);
        assert_eq!(split_path("").unwrap(), Vec::<&str>::new());
        assert!(split_path("home//a.txt").is_err());
    }

    #[test]
    fn step_into_child_recovers_the_derived_public_key() {
        let crypto = DefaultCrypto;
        let parent = KeySet::writable(&crypto, [1u8; 32], None);
        let child_write_seed = [2u8; 32];
        let (_, child_public) = crypto.ed25519_keypair(&child_write_seed);
        let wrapped = s5_core::blob_envelope::encode(&crypto, &parent.write_seed.unwrap(), &child_write_seed);
        let dir_ref = DirRef {
            public_key: child_public,
            created_at: None,
            encrypted_write_key: wrapped,
            encryption_key: None,
        };

        let child = step_into_child(&crypto, &parent, &dir_ref).unwrap();
        assert_eq!(child.public_key, child_public);
        assert_eq!(child.write_seed, Some(child_write_seed));
    }

    #[test]
    fn parse_uri_splits_root_and_segments() {
        let crypto = DefaultCrypto;
        let (_, public_key) = crypto.ed25519_keypair(&[9u8; 32]);
        let cid = multibase::encode(multibase::Base::Base32Lower, public_key);
        let uri = format!("s5://{cid}/a/b.txt");
        let (root, segments) = parse_uri(&uri).unwrap();
        assert!(matches!(root, RootRef::PublicKey(k) if k == public_key));
        assert_eq!(segments, vec!["a", "b.txt"]);
    }
}

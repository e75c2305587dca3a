//! In-memory [`Network`] test double used by this crate's and `s5_fs`'s
//! integration tests. Not a fixture of the production network: there is no
//! peer discovery, no persistence, and every call succeeds unless the
//! stored data itself fails an integrity check.

use crate::cid::BlobRef;
use crate::crypto::{Crypto, DefaultCrypto, TaggedPublicKey};
use crate::error::{Error, S5Result};
use crate::network::Network;
use crate::registry::{validate_incoming, RegistryEntry};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// An in-process [`Network`] backed by two `HashMap`s, guarded by a tokio
/// mutex each. Blob integrity and registry revision/signature checks run
/// exactly as a real implementation's would.
#[derive(Default)]
pub struct MemoryNetwork {
    blobs: Mutex<HashMap<[u8; 32], Bytes>>,
    registry: Mutex<HashMap<TaggedPublicKey, RegistryEntry>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads back whatever bytes are stored under `hash`, bypassing the
    /// `Network` trait's hash-addressed API. For tests that need to
    /// inspect a blob's raw (possibly ciphertext) contents directly.
    pub async fn raw_blob(&self, hash: [u8; 32]) -> Option<Bytes> {
        self.blobs.lock().await.get(&hash).cloned()
    }
}

#[async_trait]
impl Network for MemoryNetwork {
    async fn upload_blob(&self, bytes: Bytes) -> S5Result<BlobRef> {
        let crypto = DefaultCrypto;
        let hash = crypto.blake3(&bytes);
        self.blobs.lock().await.insert(hash, bytes.clone());
        Ok(BlobRef {
            hash: crate::hash::Hash::from_bytes(hash),
            size: bytes.len() as u64,
        })
    }

    async fn download_blob(&self, blob_ref: BlobRef) -> S5Result<Bytes> {
        let bytes = self
            .blobs
            .lock()
            .await
            .get(blob_ref.hash.as_bytes())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("blob {}", blob_ref.hash)))?;

        let crypto = DefaultCrypto;
        let actual = crypto.blake3(&bytes);
        if actual != *blob_ref.hash.as_bytes() {
            return Err(Error::IntegrityFailure {
                context: "blob download".into(),
                expected: blob_ref.hash,
                actual: crate::hash::Hash::from_bytes(actual),
            });
        }
        Ok(bytes)
    }

    async fn registry_get(&self, public_key: &TaggedPublicKey) -> S5Result<Option<RegistryEntry>> {
        Ok(self.registry.lock().await.get(public_key).cloned())
    }

    async fn registry_set(&self, entry: RegistryEntry) -> S5Result<()> {
        let crypto = DefaultCrypto;
        let mut guard = self.registry.lock().await;
        let existing = guard.get(&entry.public_key);
        validate_incoming(&crypto, existing, &entry)?;
        guard.insert(entry.public_key, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCrypto;

    #[tokio::test]
    async fn blob_round_trips() {
        let net = MemoryNetwork::new();
        let blob_ref = net.upload_blob(Bytes::from_static(b"hello")).await.unwrap();
        let back = net.download_blob(blob_ref).await.unwrap();
        assert_eq!(back, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn download_of_unknown_blob_is_not_found() {
        let net = MemoryNetwork::new();
        let crypto = DefaultCrypto;
        let hash = crate::hash::Hash::from_bytes(crypto.blake3(b"nope"));
        let err = net
            .download_blob(BlobRef { hash, size: 4 })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn registry_enforces_revision_monotonicity() {
        let net = MemoryNetwork::new();
        let crypto = DefaultCrypto;
        let (priv_seed, public) = crypto.ed25519_keypair(&[11u8; 32]);

        let first = RegistryEntry::sign(&crypto, public, &priv_seed, 1, vec![1]).unwrap();
        net.registry_set(first).await.unwrap();

        let stale = RegistryEntry::sign(&crypto, public, &priv_seed, 1, vec![2]).unwrap();
        assert!(net.registry_set(stale).await.is_err());

        let next = RegistryEntry::sign(&crypto, public, &priv_seed, 2, vec![3]).unwrap();
        net.registry_set(next).await.unwrap();

        let latest = net.registry_get(&public).await.unwrap().unwrap();
        assert_eq!(latest.revision, 2);
    }
}

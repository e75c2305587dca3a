//! Top-level client wiring (spec §5 "Shared resources", §3.2 "Lifecycle"):
//! the network, crypto, per-instance caches, and the two reserved
//! filesystem roots derived once per identity.
//!
//! Grounded on `examples/s5-dev-s5-rs/s5_fs/src/context.rs`'s role as the
//! thing every operation borrows from, generalized to own this spec's
//! three caches (registry, blob, HAMT node) instead of the teacher's
//! store/registry trait objects.

use crate::resolver::KeySet;
use async_trait::async_trait;
use bytes::Bytes;
use s5_core::cache::TtlCache;
use s5_core::cid::BlobRef;
use s5_core::crypto::{Crypto, TaggedPublicKey};
use s5_core::derive::derive_int;
use s5_core::error::S5Result;
use s5_core::identity::{Identity, Slot};
use s5_core::network::Network;
use s5_core::registry::RegistryEntry;

use crate::options::FsConfig;

/// Tweak distinguishing `home` and `archive` under the identity's
/// filesystem sub-seed (spec §3.2: "each with a directory-specific key set
/// derived from the identity's filesystem sub-seed").
const HOME_ROOT_TWEAK: u64 = 0;
const ARCHIVE_ROOT_TWEAK: u64 = 1;

pub const HOME_ROOT: &str = "home";
pub const ARCHIVE_ROOT: &str = "archive";

/// Everything a [`crate::fs::Filesystem`] or [`crate::hidden_store::HiddenStore`]
/// operation borrows from: the abstract network and crypto facades, the
/// tunables, and the per-instance caches (spec §5 "owned by the client
/// instance, not shared across instances").
pub struct Client {
    pub network: Box<dyn Network>,
    pub crypto: Box<dyn Crypto>,
    pub config: FsConfig,
    pub(crate) registry_cache: TtlCache<[u8; 33], RegistryEntry>,
    pub(crate) blob_cache: TtlCache<[u8; 32], Bytes>,
    pub(crate) node_cache: TtlCache<[u8; 32], Bytes>,
    home: KeySet,
    archive: KeySet,
    pub(crate) hidden_store_seed: [u8; 32],
}

impl Client {
    /// Initialises the two reserved roots for `identity` (spec §3.2: done
    /// once per identity on first use — idempotent, since both key sets
    /// are pure functions of the identity's filesystem sub-seed).
    pub fn new(
        network: Box<dyn Network>,
        crypto: Box<dyn Crypto>,
        identity: &Identity,
        config: FsConfig,
    ) -> Self {
        let fs_seed = identity.sub_seed(Slot::Filesystem);
        let home_seed = derive_int(fs_seed, HOME_ROOT_TWEAK);
        let archive_seed = derive_int(fs_seed, ARCHIVE_ROOT_TWEAK);
        let home = KeySet::writable(crypto.as_ref(), home_seed, None);
        let archive = KeySet::writable(crypto.as_ref(), archive_seed, None);
        let hidden_store_seed = *identity.sub_seed(Slot::HiddenStore);

        Self {
            registry_cache: TtlCache::new(config.registry_cache_ttl, config.registry_cache_soft_limit),
            blob_cache: TtlCache::new(config.blob_cache_ttl, config.blob_cache_soft_limit),
            node_cache: TtlCache::new(config.blob_cache_ttl, config.blob_cache_soft_limit),
            network,
            crypto,
            config,
            home,
            archive,
            hidden_store_seed,
        }
    }

    /// The key set for one of the two reserved roots, or `None` if `name`
    /// is not one of them.
    pub fn reserved_root(&self, name: &str) -> Option<&KeySet> {
        match name {
            HOME_ROOT => Some(&self.home),
            ARCHIVE_ROOT => Some(&self.archive),
            _ => None,
        }
    }

    pub fn is_reserved_root(name: &str) -> bool {
        name == HOME_ROOT || name == ARCHIVE_ROOT
    }

    /// A [`Network`] view backed by `cache`: reads check the cache first,
    /// writes populate it (spec §3.1 "fresh-write cache"). Used to give
    /// blob uploads/downloads and HAMT node traffic their own cache pool
    /// without duplicating the read-through/write-through policy at each
    /// call site.
    pub(crate) fn cached_network<'a>(&'a self, cache: &'a TtlCache<[u8; 32], Bytes>) -> CachingNetwork<'a> {
        CachingNetwork { inner: self.network.as_ref(), cache }
    }

    /// The latest registry entry for `public_key`, checking the
    /// fresh-write cache before the network (spec §3.1).
    pub(crate) async fn registry_entry(&self, public_key: &TaggedPublicKey) -> S5Result<Option<RegistryEntry>> {
        if let Some(entry) = self.registry_cache.get(public_key).await {
            tracing::debug!("registry cache hit");
            return Ok(Some(entry));
        }
        let entry = self.network.registry_get(public_key).await?;
        if let Some(e) = &entry {
            self.registry_cache.insert(*public_key, e.clone()).await;
        }
        Ok(entry)
    }
}

pub(crate) struct CachingNetwork<'a> {
    inner: &'a dyn Network,
    cache: &'a TtlCache<[u8; 32], Bytes>,
}

#[async_trait]
impl<'a> Network for CachingNetwork<'a> {
    async fn upload_blob(&self, bytes: Bytes) -> S5Result<BlobRef> {
        let blob_ref = self.inner.upload_blob(bytes.clone()).await?;
        self.cache.insert(*blob_ref.hash.as_bytes(), bytes).await;
        Ok(blob_ref)
    }

    async fn download_blob(&self, blob_ref: BlobRef) -> S5Result<Bytes> {
        if let Some(cached) = self.cache.get(blob_ref.hash.as_bytes()).await {
            tracing::debug!("blob cache hit for {}", blob_ref.hash);
            return Ok(cached);
        }
        tracing::debug!("blob cache miss for {}", blob_ref.hash);
        let bytes = self.inner.download_blob(blob_ref).await?;
        self.cache.insert(*blob_ref.hash.as_bytes(), bytes.clone()).await;
        Ok(bytes)
    }

    async fn registry_get(&self, public_key: &TaggedPublicKey) -> S5Result<Option<RegistryEntry>> {
        self.inner.registry_get(public_key).await
    }

    async fn registry_set(&self, entry: RegistryEntry) -> S5Result<()> {
        self.inner.registry_set(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s5_core::crypto::DefaultCrypto;
    use s5_core::testutil::MemoryNetwork;

    fn sample_identity() -> Identity {
        Identity::from_bytes(&DefaultCrypto, &[3u8; 11 * 32]).unwrap()
    }

    #[test]
    fn home_and_archive_have_distinct_but_deterministic_keys() {
        let identity = sample_identity();
        let a = Client::new(Box::new(MemoryNetwork::new()), Box::new(DefaultCrypto), &identity, FsConfig::default());
        let b = Client::new(Box::new(MemoryNetwork::new()), Box::new(DefaultCrypto), &identity, FsConfig::default());

        assert_eq!(a.reserved_root("home").unwrap().public_key, b.reserved_root("home").unwrap().public_key);
        assert_ne!(
            a.reserved_root("home").unwrap().public_key,
            a.reserved_root("archive").unwrap().public_key
        );
        assert!(a.reserved_root("other").is_none());
    }
}

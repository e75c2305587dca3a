//! The abstract network capability (spec §6.1) the core consumes. The P2P
//! transport and peer-gossip protocol themselves are out of scope (§1);
//! this trait is the entire contract the core requires from them.

use crate::cid::BlobRef;
use crate::crypto::TaggedPublicKey;
use crate::error::S5Result;
use crate::registry::RegistryEntry;
use async_trait::async_trait;
use bytes::Bytes;

/// Everything the core needs from the transport layer.
#[async_trait]
pub trait Network: Send + Sync {
    /// Uploads `bytes`, returning a [`BlobRef`]. Implementations MUST fail
    /// with `Error::IntegrityFailure` if the hash they compute/receive back
    /// does not match the caller-supplied hash of `bytes`.
    async fn upload_blob(&self, bytes: Bytes) -> S5Result<BlobRef>;

    /// Downloads the blob addressed by `blob_ref`. Implementations MUST
    /// verify the downloaded bytes hash to `blob_ref.hash` before
    /// returning, failing with `Error::IntegrityFailure` otherwise.
    async fn download_blob(&self, blob_ref: BlobRef) -> S5Result<Bytes>;

    /// Returns the latest accepted registry entry for `public_key`, if any.
    async fn registry_get(&self, public_key: &TaggedPublicKey) -> S5Result<Option<RegistryEntry>>;

    /// Publishes `entry`. Implementations validate the signature and
    /// revision monotonicity before propagating (spec §4.4).
    async fn registry_set(&self, entry: RegistryEntry) -> S5Result<()>;
}

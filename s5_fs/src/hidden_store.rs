//! The hidden store (spec §4.11): a single-process key/value store keyed
//! by arbitrary path strings, each entry persisted as if it were a file
//! with its own per-path keypair rather than living under `home`/`archive`.
//!
//! Grounded on [`crate::fs::Filesystem`]'s `publish_entry_change` retry
//! loop, specialised from "one directory among many siblings" down to
//! "one registry entry per path" since a hidden-store value has no
//! parent directory to republish. Not present in the teacher at all (it
//! has no portal-account concept); built from scratch in the teacher's
//! idiom, reusing [`s5_core::blob_envelope`] exactly as `fs` does.

use crate::client::Client;
use crate::resolver::split_path;
use s5_core::cid::BlobRef;
use s5_core::crypto::Crypto;
use s5_core::derive::{derive_bytes, derive_int};
use s5_core::error::{Error, S5Result};
use s5_core::registry::RegistryEntry;

const PATH_KEY_TWEAK: u64 = 1;
const WRITE_KEY_TWEAK: u64 = 2;
const ENCRYPTION_KEY_TWEAK: u64 = 3;

/// The three keys a hidden-store path resolves to (spec §4.11).
struct PathKeys {
    write_seed: [u8; 32],
    encryption_key: [u8; 32],
}

fn path_keys(base_seed: &[u8; 32], segments: &[&str]) -> PathKeys {
    let mut folded = *base_seed;
    for segment in segments {
        folded = derive_bytes(&folded, segment.as_bytes());
    }
    let path_key = derive_int(&folded, PATH_KEY_TWEAK);
    PathKeys {
        write_seed: derive_int(&path_key, WRITE_KEY_TWEAK),
        encryption_key: derive_int(&path_key, ENCRYPTION_KEY_TWEAK),
    }
}

/// A key/value store over JSON values, addressed by path and backed by
/// one registry entry per path (spec §4.11). Used internally to persist
/// portal-account lists; exposed here as a small standalone surface since
/// nothing else in this crate depends on it.
pub struct HiddenStore<'a> {
    client: &'a Client,
}

impl<'a> HiddenStore<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Reads the JSON value stored at `path`, or `None` if nothing has
    /// ever been written there.
    pub async fn get_json(&self, path: &str) -> S5Result<Option<serde_json::Value>> {
        let segments = split_path(path)?;
        let keys = path_keys(&self.client.hidden_store_seed, &segments);
        let (_, public_key) = self.client.crypto.ed25519_keypair(&keys.write_seed);

        let Some(entry) = self.client.registry_entry(&public_key).await? else {
            return Ok(None);
        };
        let blob_ref = BlobRef::from_bytes(&entry.data)
            .map_err(|e| Error::Network(format!("malformed hidden-store registry entry: {e}")))?;
        let network = self.client.cached_network(&self.client.blob_cache);
        let bytes = s5_core::network::Network::download_blob(&network, blob_ref).await?;
        let plaintext = s5_core::blob_envelope::decode(self.client.crypto.as_ref(), &keys.encryption_key, &bytes)?;
        let value = serde_json::from_slice(&plaintext)
            .map_err(|e| Error::Network(format!("corrupt hidden-store value at {path}: {e}")))?;
        Ok(Some(value))
    }

    /// Stores `value` at `path`, retrying against the latest revision on
    /// a lost race (spec §4.11: "the same revision-conflict retry loop as
    /// §4.10").
    pub async fn set_json(&self, path: &str, value: &serde_json::Value) -> S5Result<()> {
        let segments = split_path(path)?;
        let keys = path_keys(&self.client.hidden_store_seed, &segments);
        let (_, public_key) = self.client.crypto.ed25519_keypair(&keys.write_seed);

        let plaintext = serde_json::to_vec(value).expect("serde_json::Value encoding cannot fail");
        let ciphertext =
            s5_core::blob_envelope::encode(self.client.crypto.as_ref(), &keys.encryption_key, &plaintext);
        let network = self.client.cached_network(&self.client.blob_cache);
        let blob_ref = s5_core::network::Network::upload_blob(&network, ciphertext.into()).await?;

        let mut attempts = 0u32;
        loop {
            let revision = match self.client.registry_entry(&public_key).await? {
                Some(entry) => entry.revision + 1,
                None => 1,
            };
            let entry = RegistryEntry::sign(
                self.client.crypto.as_ref(),
                public_key,
                &keys.write_seed,
                revision,
                blob_ref.to_bytes(),
            )
            .map_err(|e| Error::Crypto(e.to_string()))?;

            match self.client.network.registry_set(entry.clone()).await {
                Ok(()) => {
                    self.client.registry_cache.insert(public_key, entry).await;
                    return Ok(());
                }
                Err(Error::RevisionConflict { .. }) => {
                    attempts += 1;
                    self.client.registry_cache.remove(&public_key).await;
                    if attempts >= self.client.config.retry_count {
                        return Err(Error::RevisionConflict { attempts });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s5_core::crypto::DefaultCrypto;
    use s5_core::identity::Identity;
    use s5_core::testutil::MemoryNetwork;

    fn client() -> Client {
        let identity = Identity::from_bytes(&DefaultCrypto, &[5u8; 11 * 32]).unwrap();
        Client::new(Box::new(MemoryNetwork::new()), Box::new(DefaultCrypto), &identity, crate::options::FsConfig::default())
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let client = client();
        let store = HiddenStore::new(&client);
        let value = serde_json::json!({"accounts": ["a", "b"]});

        store.set_json("portal-accounts/list", &value).await.unwrap();
        let read_back = store.get_json("portal-accounts/list").await.unwrap().unwrap();
        assert_eq!(read_back, value);
    }

    #[tokio::test]
    async fn get_on_unwritten_path_returns_none() {
        let client = client();
        let store = HiddenStore::new(&client);
        assert!(store.get_json("never/written").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn distinct_paths_do_not_collide() {
        let client = client();
        let store = HiddenStore::new(&client);
        store.set_json("a", &serde_json::json!(1)).await.unwrap();
        store.set_json("b", &serde_json::json!(2)).await.unwrap();

        assert_eq!(store.get_json("a").await.unwrap().unwrap(), serde_json::json!(1));
        assert_eq!(store.get_json("b").await.unwrap().unwrap(), serde_json::json!(2));
    }

    #[tokio::test]
    async fn overwriting_a_path_bumps_the_revision() {
        let client = client();
        let store = HiddenStore::new(&client);
        store.set_json("k", &serde_json::json!("first")).await.unwrap();
        store.set_json("k", &serde_json::json!("second")).await.unwrap();
        assert_eq!(store.get_json("k").await.unwrap().unwrap(), serde_json::json!("second"));
    }
}

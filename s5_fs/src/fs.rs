//! The path-based filesystem API (spec §4.10): `put`/`get`/`get_metadata`/
//! `delete`/`list` over the two reserved roots, dispatching on a
//! directory's inline-vs-HAMT body and driving the registry-write
//! retry loop on every mutation.
//!
//! Grounded on `examples/s5-dev-s5-rs/s5_fs/src/api.rs` (`FS5`, the one
//! type callers hold) and `examples/s5-dev-s5-rs/s5_fs/src/actor/persistence.rs`
//! (sign-then-publish) / `actor/merge.rs` (re-fetch-and-retry on a lost
//! revision race), generalized from the teacher's actor-message dispatch
//! to direct async calls since this crate has no actor layer of its own.

use crate::chunked;
use crate::client::Client;
use crate::cursor::{Cursor, CursorPosition};
use crate::dir::{
    DirBody, DirRef, DirV1, DirectoryEntry, FileEncryption, FileRef, FILE_ENCRYPTION_XCHACHA20_POLY1305,
};
use crate::hamt::{HamtNode, HamtOps};
use crate::options::{EntryKind, FsConfig, HamtHashFn, ListItem, ListOptions, Metadata, PutOptions};
use crate::resolver::{split_path, step_into_child, KeySet};
use s5_core::cid::BlobRef;
use s5_core::error::{Error, S5Result};
use s5_core::hash::Hash;
use s5_core::network::Network;
use std::collections::BTreeMap;

/// The value a caller asks to store at a path (spec §4.10 "put"): raw
/// bytes pass straight through, text is stored as its UTF-8 encoding. The
/// spec's third tier — "any other value, canonically encoded" — has no
/// counterpart here since this crate carries no generic, reflective value
/// type; a caller with a structured value encodes it themselves (e.g. with
/// `minicbor` or `serde_json`) and passes the result as `Bytes`.
#[derive(Clone, Debug)]
pub enum PutData {
    Bytes(Vec<u8>),
    Text(String),
}

/// The value a caller receives back from `get` (spec §4.10 "permissive
/// decode"): a JSON parse is tried first, then a UTF-8 decode, falling
/// back to raw bytes. The spec's leading "canonical decode" tier is
/// dropped for the same reason `PutData` drops its encoding tier.
#[derive(Clone, Debug, PartialEq)]
pub enum GetValue {
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
}

fn permissive_decode(bytes: Vec<u8>) -> GetValue {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
        return GetValue::Json(value);
    }
    if let Ok(text) = String::from_utf8(bytes.clone()) {
        return GetValue::Text(text);
    }
    GetValue::Bytes(bytes)
}

fn now_unix() -> u32 {
    chrono::Utc::now().timestamp() as u32
}

/// What a path resolves to, short of actually loading its content.
enum Resolved {
    /// `path` names one of the two reserved roots directly.
    Root(KeySet),
    /// `path` names an entry inside `parent`; `entry` is `None` if it does
    /// not exist.
    Entry { parent: KeySet, entry: Option<DirectoryEntry> },
}

/// A pending change to one named entry of a directory (spec §4.10): every
/// mutating operation boils down to one of these, reapplied against
/// whatever revision is current each time the write loop retries.
enum EntryChange {
    Set(DirectoryEntry),
    Remove,
}

/// The path-based filesystem over a [`Client`]'s two reserved roots.
pub struct Filesystem {
    client: Client,
}

impl Filesystem {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &FsConfig {
        &self.client.config
    }

    // --- reads -----------------------------------------------------------

    async fn load_dir_with_revision(&self, key_set: &KeySet) -> S5Result<(DirV1, u64)> {
        let Some(entry) = self.client.registry_entry(&key_set.public_key).await? else {
            return Ok((DirV1::empty(), 0));
        };
        let blob_ref = BlobRef::from_bytes(&entry.data)
            .map_err(|e| Error::Network(format!("malformed directory registry entry: {e}")))?;
        let network = self.client.cached_network(&self.client.blob_cache);
        let bytes = network.download_blob(blob_ref).await?;
        let plaintext = match key_set.encryption_key {
            Some(key) => s5_core::blob_envelope::decode(self.client.crypto.as_ref(), &key, &bytes)?,
            None => bytes.to_vec(),
        };
        let dir = DirV1::from_bytes(&plaintext)
            .map_err(|e| Error::Network(format!("corrupt directory at {}: {e}", blob_ref.hash)))?;
        Ok((dir, entry.revision))
    }

    async fn load_dir(&self, key_set: &KeySet) -> S5Result<DirV1> {
        Ok(self.load_dir_with_revision(key_set).await?.0)
    }

    async fn lookup_entry(&self, dir: &DirV1, name: &str) -> S5Result<Option<DirectoryEntry>> {
        match &dir.body {
            DirBody::Inline(entries) => Ok(entries.get(name).cloned()),
            DirBody::Sharded(root) => {
                let caching = self.client.cached_network(&self.client.node_cache);
                let ops = HamtOps {
                    network: &caching,
                    hash_fn: self.hash_fn_for(dir),
                    bits_per_level: self.client.config.hamt_bits_per_level,
                    max_inline_entries: self.client.config.hamt_max_inline_entries,
                };
                ops.lookup(root, name).await
            }
        }
    }

    /// Counts files and directories directly under `dir` (not recursive),
    /// returning `(file_count, directory_count)`.
    async fn count_entries(&self, dir: &DirV1) -> S5Result<(u64, u64)> {
        match &dir.body {
            DirBody::Inline(entries) => {
                let (mut file_count, mut directory_count) = (0u64, 0u64);
                for entry in entries.values() {
                    match entry {
                        DirectoryEntry::File(_) => file_count += 1,
                        DirectoryEntry::Dir(_) => directory_count += 1,
                    }
                }
                Ok((file_count, directory_count))
            }
            DirBody::Sharded(root) => {
                let caching = self.client.cached_network(&self.client.node_cache);
                let ops = HamtOps {
                    network: &caching,
                    hash_fn: self.hash_fn_for(dir),
                    bits_per_level: self.client.config.hamt_bits_per_level,
                    max_inline_entries: self.client.config.hamt_max_inline_entries,
                };
                let all = ops.list_all(root).await?;
                let (mut file_count, mut directory_count) = (0u64, 0u64);
                for (_, entry) in all {
                    match entry {
                        DirectoryEntry::File(_) => file_count += 1,
                        DirectoryEntry::Dir(_) => directory_count += 1,
                    }
                }
                Ok((file_count, directory_count))
            }
        }
    }

    fn hash_fn_for(&self, dir: &DirV1) -> HamtHashFn {
        dir.header
            .hamt_hash_fn_selector
            .map(HamtHashFn::from_selector_bit)
            .unwrap_or(self.client.config.hamt_hash_fn)
    }

    /// Resolves `segments` to whatever they currently name, without
    /// loading the target's own content. Fails with [`Error::NotFound`] if
    /// an intermediate segment doesn't exist, [`Error::IsFile`] if one
    /// names a file instead of a directory.
    async fn resolve(&self, segments: &[&str]) -> S5Result<Resolved> {
        if segments.is_empty() {
            return Err(Error::PathInvalid(String::new()));
        }
        if !Client::is_reserved_root(segments[0]) {
            return Err(Error::PathInvalid(segments.join("/")));
        }
        let root = self.client.reserved_root(segments[0]).cloned().expect("checked above");
        if segments.len() == 1 {
            return Ok(Resolved::Root(root));
        }

        let mut current = root;
        for &seg in &segments[1..segments.len() - 1] {
            let dir = self.load_dir(&current).await?;
            match self.lookup_entry(&dir, seg).await? {
                Some(DirectoryEntry::Dir(dir_ref)) => {
                    current = step_into_child(self.client.crypto.as_ref(), &current, &dir_ref)?;
                }
                Some(DirectoryEntry::File(_)) => return Err(Error::IsFile(segments.join("/"))),
                None => return Err(Error::NotFound(segments.join("/"))),
            }
        }

        let dir = self.load_dir(&current).await?;
        let name = segments[segments.len() - 1];
        let entry = self.lookup_entry(&dir, name).await?;
        Ok(Resolved::Entry { parent: current, entry })
    }

    /// Retrieves the value stored at `path` (spec §4.10 "get"). Returns
    /// `None` if nothing exists there. Fails with [`Error::IsDirectory`]
    /// if `path` names a directory.
    pub async fn get(&self, path: &str) -> S5Result<Option<GetValue>> {
        let segments = split_path(path)?;
        let resolved = match self.resolve(&segments).await {
            Ok(r) => r,
            Err(Error::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        match resolved {
            Resolved::Root(_) => Err(Error::IsDirectory(path.to_string())),
            Resolved::Entry { entry: None, .. } => Ok(None),
            Resolved::Entry { entry: Some(DirectoryEntry::Dir(_)), .. } => Err(Error::IsDirectory(path.to_string())),
            Resolved::Entry { entry: Some(DirectoryEntry::File(file_ref)), .. } => {
                let blob_ref = BlobRef::new(Hash::from_bytes(file_ref.hash), file_ref.size);
                let network = self.client.cached_network(&self.client.blob_cache);
                let bytes = network.download_blob(blob_ref).await?;
                let plaintext = match &file_ref.encryption {
                    Some(enc) => chunked::decrypt(
                        self.client.crypto.as_ref(),
                        &enc.key,
                        enc.chunk_size as usize,
                        enc.plaintext_len,
                        &bytes,
                    )?,
                    None => bytes.to_vec(),
                };
                Ok(Some(permissive_decode(plaintext)))
            }
        }
    }

    /// Describes the entry at `path` without fetching a file's content
    /// (spec §4.10 "getMetadata"). Returns `None` if nothing exists there.
    pub async fn get_metadata(&self, path: &str) -> S5Result<Option<Metadata>> {
        let segments = split_path(path)?;
        let resolved = match self.resolve(&segments).await {
            Ok(r) => r,
            Err(Error::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let name = segments.last().copied().unwrap_or("").to_string();
        match resolved {
            Resolved::Root(root) => {
                let dir = self.load_dir(&root).await?;
                let (file_count, directory_count) = self.count_entries(&dir).await?;
                Ok(Some(Metadata {
                    name,
                    kind: EntryKind::Directory,
                    size: None,
                    media_type: None,
                    timestamp: None,
                    file_count: Some(file_count),
                    directory_count: Some(directory_count),
                }))
            }
            Resolved::Entry { entry: None, .. } => Ok(None),
            Resolved::Entry { entry: Some(DirectoryEntry::File(f)), .. } => Ok(Some(Metadata {
                name,
                kind: EntryKind::File,
                size: Some(f.size),
                media_type: f.media_type,
                timestamp: f.timestamp,
                file_count: None,
                directory_count: None,
            })),
            Resolved::Entry { entry: Some(DirectoryEntry::Dir(dir_ref)), parent } => {
                let key_set = step_into_child(self.client.crypto.as_ref(), &parent, &dir_ref)?;
                let dir = self.load_dir(&key_set).await?;
                let (file_count, directory_count) = self.count_entries(&dir).await?;
                Ok(Some(Metadata {
                    name,
                    kind: EntryKind::Directory,
                    size: None,
                    media_type: None,
                    timestamp: None,
                    file_count: Some(file_count),
                    directory_count: Some(directory_count),
                }))
            }
        }
    }

    /// Lists the entries directly under `path` (spec §4.10 "list"),
    /// resuming from `options.cursor` if given. `options.limit == 0` means
    /// no limit.
    pub async fn list(&self, path: &str, options: ListOptions) -> S5Result<Vec<ListItem>> {
        let segments = split_path(path)?;
        let resolved = self.resolve(&segments).await?;
        let key_set = match resolved {
            Resolved::Root(root) => root,
            Resolved::Entry { parent, entry: Some(DirectoryEntry::Dir(dir_ref)) } => {
                step_into_child(self.client.crypto.as_ref(), &parent, &dir_ref)?
            }
            Resolved::Entry { entry: Some(DirectoryEntry::File(_)), .. } => return Err(Error::IsFile(path.to_string())),
            Resolved::Entry { entry: None, .. } => return Err(Error::NotFound(path.to_string())),
        };

        let dir = self.load_dir(&key_set).await?;
        let fingerprint = self.client.crypto.blake3(&key_set.public_key);
        let position = match &options.cursor {
            Some(token) => Some(Cursor::decode(token, fingerprint)?.position),
            None => None,
        };
        let limit = if options.limit == 0 { usize::MAX } else { options.limit };

        match &dir.body {
            DirBody::Inline(entries) => {
                // `entries` already iterates in name order (`BTreeMap`).
                let names: Vec<&String> = entries.keys().collect();
                let start = match &position {
                    None => 0,
                    Some(CursorPosition::Inline { last_key }) => names
                        .iter()
                        .position(|n| *n == last_key)
                        .map(|i| i + 1)
                        .ok_or(Error::InvalidCursor)?,
                    Some(CursorPosition::Hamt { .. }) => return Err(Error::InvalidCursor),
                };
                let end = start.saturating_add(limit).min(names.len());
                Ok(names[start..end]
                    .iter()
                    .map(|name| {
                        let entry = &entries[*name];
                        let cursor = Cursor::new(fingerprint, CursorPosition::Inline { last_key: (*name).clone() }).encode();
                        list_item_from((*name).clone(), entry, cursor)
                    })
                    .collect())
            }
            DirBody::Sharded(root) => {
                let caching = self.client.cached_network(&self.client.node_cache);
                let ops = HamtOps {
                    network: &caching,
                    hash_fn: self.hash_fn_for(&dir),
                    bits_per_level: self.client.config.hamt_bits_per_level,
                    max_inline_entries: self.client.config.hamt_max_inline_entries,
                };
                let resume = match position {
                    None => None,
                    Some(CursorPosition::Hamt { path, leaf_index }) => Some((path, leaf_index)),
                    Some(CursorPosition::Inline { .. }) => return Err(Error::InvalidCursor),
                };
                let page = ops.list_with_positions(root, resume, limit).await?;
                Ok(page
                    .into_iter()
                    .map(|(name, entry, (path, leaf_index))| {
                        let cursor = Cursor::new(fingerprint, CursorPosition::Hamt { path, leaf_index }).encode();
                        list_item_from(name, &entry, cursor)
                    })
                    .collect())
            }
        }
    }

    // --- writes ------------------------------------------------------------

    /// Stores `data` at `path`, creating intermediate directories as needed
    /// (spec §4.10 "put"). `path` must name an entry inside one of the two
    /// reserved roots, never a root directly.
    pub async fn put(&self, path: &str, data: PutData, options: PutOptions) -> S5Result<()> {
        let segments = split_path(path)?;
        if segments.len() < 2 {
            return Err(Error::PathInvalid(path.to_string()));
        }
        let parent = self.ensure_dir_path(&segments[..segments.len() - 1]).await?;
        let name = segments[segments.len() - 1];

        let plaintext: Vec<u8> = match data {
            PutData::Bytes(b) => b,
            PutData::Text(s) => s.into_bytes(),
        };

        let (content, encryption) = match options.encryption {
            Some(enc_opts) => {
                let plaintext_hash = self.client.crypto.blake3(&plaintext);
                let key = enc_opts.key.unwrap_or_else(|| {
                    let random = self.client.crypto.random(32);
                    let mut key = [0u8; 32];
                    key.copy_from_slice(&random);
                    key
                });
                let chunk_size = self.client.config.chunk_size;
                let plaintext_len = plaintext.len() as u64;
                let ciphertext = chunked::encrypt(self.client.crypto.as_ref(), &key, chunk_size, &plaintext);
                let descriptor = FileEncryption {
                    algorithm: FILE_ENCRYPTION_XCHACHA20_POLY1305,
                    key,
                    plaintext_hash,
                    chunk_size: chunk_size as u32,
                    plaintext_len,
                };
                (ciphertext, Some(descriptor))
            }
            None => (plaintext, None),
        };

        let network = self.client.cached_network(&self.client.blob_cache);
        let blob_ref = network.upload_blob(content.into()).await?;

        let file_ref = FileRef {
            hash: *blob_ref.hash.as_bytes(),
            size: blob_ref.size,
            media_type: options.media_type,
            timestamp: options.timestamp,
            encryption,
        };

        self.publish_entry_change(&parent, name, EntryChange::Set(DirectoryEntry::File(file_ref))).await
    }

    /// Removes the entry at `path` (spec §4.10 "delete"), returning
    /// whether anything was removed. Fails with [`Error::RootImmutable`]
    /// if `path` names a reserved root, and [`Error::DirectoryNotEmpty`]
    /// if it names a non-empty directory.
    pub async fn delete(&self, path: &str) -> S5Result<bool> {
        let segments = split_path(path)?;
        if segments.len() == 1 && Client::is_reserved_root(segments[0]) {
            return Err(Error::RootImmutable(segments[0].to_string()));
        }

        let resolved = match self.resolve(&segments).await {
            Ok(r) => r,
            Err(Error::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        let Resolved::Entry { parent, entry } = resolved else {
            return Err(Error::RootImmutable(path.to_string()));
        };
        let name = segments[segments.len() - 1];

        match entry {
            None => Ok(false),
            Some(DirectoryEntry::Dir(dir_ref)) => {
                let child_key_set = step_into_child(self.client.crypto.as_ref(), &parent, &dir_ref)?;
                let child_dir = self.load_dir(&child_key_set).await?;
                let (file_count, directory_count) = self.count_entries(&child_dir).await?;
                if file_count + directory_count > 0 {
                    return Err(Error::DirectoryNotEmpty(path.to_string()));
                }
                self.publish_entry_change(&parent, name, EntryChange::Remove).await?;
                Ok(true)
            }
            Some(DirectoryEntry::File(_)) => {
                self.publish_entry_change(&parent, name, EntryChange::Remove).await?;
                Ok(true)
            }
        }
    }

    /// Walks `segments` from a reserved root, creating any missing
    /// intermediate directory along the way (spec §4.10 "put ... creating
    /// intermediate directories as needed").
    async fn ensure_dir_path(&self, segments: &[&str]) -> S5Result<KeySet> {
        if segments.is_empty() {
            return Err(Error::PathInvalid(String::new()));
        }
        if !Client::is_reserved_root(segments[0]) {
            return Err(Error::PathInvalid(segments.join("/")));
        }
        let mut current = self.client.reserved_root(segments[0]).cloned().expect("checked above");
        for &seg in &segments[1..] {
            let dir = self.load_dir(&current).await?;
            match self.lookup_entry(&dir, seg).await? {
                Some(DirectoryEntry::Dir(dir_ref)) => {
                    current = step_into_child(self.client.crypto.as_ref(), &current, &dir_ref)?;
                }
                Some(DirectoryEntry::File(_)) => return Err(Error::IsFile(seg.to_string())),
                None => current = self.create_child_dir(&current, seg).await?,
            }
        }
        Ok(current)
    }

    /// Creates a fresh, unencrypted child directory named `name` under
    /// `parent`, publishing its `DirRef` into `parent` (spec §4.7).
    async fn create_child_dir(&self, parent: &KeySet, name: &str) -> S5Result<KeySet> {
        let raw_seed = self.client.crypto.random(32);
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&raw_seed);
        let child = KeySet::writable(self.client.crypto.as_ref(), seed, None);

        let parent_write_seed = parent
            .write_seed
            .ok_or_else(|| Error::MissingEncryptionKey(format!("no write access to parent of {name}")))?;
        let encrypted_write_key = s5_core::blob_envelope::encode(self.client.crypto.as_ref(), &parent_write_seed, &seed);
        let dir_ref = DirRef {
            public_key: child.public_key,
            created_at: Some(now_unix()),
            encrypted_write_key,
            encryption_key: None,
        };

        self.publish_entry_change(parent, name, EntryChange::Set(DirectoryEntry::Dir(dir_ref))).await?;
        Ok(child)
    }

    /// Publishes `change` for `name` under `key_set`'s directory, retrying
    /// against the latest revision on a lost race (spec §4.10, §7
    /// `RevisionConflict`).
    async fn publish_entry_change(&self, key_set: &KeySet, name: &str, change: EntryChange) -> S5Result<()> {
        let write_seed = key_set
            .write_seed
            .ok_or_else(|| Error::MissingEncryptionKey(format!("no write access to {name}")))?;

        let mut attempts = 0u32;
        loop {
            let (mut dir, revision) = self.load_dir_with_revision(key_set).await?;
            self.apply_entry_change(&mut dir, name, &change).await?;

            let plaintext = dir.to_vec().expect("directory encoding cannot fail");
            let payload = match key_set.encryption_key {
                Some(key) => s5_core::blob_envelope::encode(self.client.crypto.as_ref(), &key, &plaintext),
                None => plaintext,
            };
            let network = self.client.cached_network(&self.client.blob_cache);
            let blob_ref = network.upload_blob(payload.into()).await?;

            let entry = s5_core::registry::RegistryEntry::sign(
                self.client.crypto.as_ref(),
                key_set.public_key,
                &write_seed,
                revision + 1,
                blob_ref.to_bytes(),
            )
            .map_err(|e| Error::Crypto(e.to_string()))?;

            match self.client.network.registry_set(entry.clone()).await {
                Ok(()) => {
                    self.client.registry_cache.insert(key_set.public_key, entry).await;
                    return Ok(());
                }
                Err(Error::RevisionConflict { .. }) => {
                    attempts += 1;
                    tracing::debug!("publish_entry_change: lost revision race for {name}, attempt {attempts}");
                    self.client.registry_cache.remove(&key_set.public_key).await;
                    if attempts >= self.client.config.retry_count {
                        tracing::warn!("publish_entry_change: exhausted retry budget for {name} after {attempts} attempts");
                        return Err(Error::RevisionConflict { attempts });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Applies `change` to `dir`'s body in place, switching between the
    /// inline and HAMT-sharded representations as the entry count crosses
    /// `hamt_threshold` in either direction (spec §4.8 "Activation"). The
    /// downgrade direction isn't named explicitly by that section, but is
    /// required for a shrunk directory to regain the inline form's
    /// lexicographic iteration order.
    async fn apply_entry_change(&self, dir: &mut DirV1, name: &str, change: &EntryChange) -> S5Result<()> {
        let hash_fn = self.hash_fn_for(dir);
        let caching = self.client.cached_network(&self.client.node_cache);
        let ops = HamtOps {
            network: &caching,
            hash_fn,
            bits_per_level: self.client.config.hamt_bits_per_level,
            max_inline_entries: self.client.config.hamt_max_inline_entries,
        };
        let threshold = self.client.config.hamt_threshold;

        let placeholder = DirBody::Inline(BTreeMap::new());
        let new_body = match std::mem::replace(&mut dir.body, placeholder) {
            DirBody::Inline(mut entries) => {
                match change {
                    EntryChange::Set(entry) => {
                        entries.insert(name.to_string(), entry.clone());
                    }
                    EntryChange::Remove => {
                        entries.remove(name);
                    }
                }

                if entries.len() > threshold {
                    let mut root = HamtNode::empty(0);
                    for (n, e) in entries {
                        root = ops.insert(root, &n, e).await?.0;
                    }
                    tracing::debug!("apply_entry_change: shard ({} entries over threshold {threshold})", root.count);
                    dir.header.hamt_hash_fn_selector = Some(hash_fn.selector_bit());
                    DirBody::Sharded(root)
                } else {
                    DirBody::Inline(entries)
                }
            }
            DirBody::Sharded(root) => {
                let (new_root, _) = match change {
                    EntryChange::Set(entry) => ops.insert(root, name, entry.clone()).await?,
                    EntryChange::Remove => ops.delete(root, name).await?,
                };

                if new_root.count as usize <= threshold {
                    let all = ops.list_all(&new_root).await?;
                    let entries: BTreeMap<String, DirectoryEntry> = all.into_iter().collect();
                    tracing::debug!("apply_entry_change: unshard ({} entries at or below threshold {threshold})", new_root.count);
                    dir.header.hamt_hash_fn_selector = None;
                    DirBody::Inline(entries)
                } else {
                    DirBody::Sharded(new_root)
                }
            }
        };
        dir.body = new_body;
        Ok(())
    }
}

fn list_item_from(name: String, entry: &DirectoryEntry, cursor: String) -> ListItem {
    match entry {
        DirectoryEntry::File(f) => ListItem {
            name,
            kind: EntryKind::File,
            size: Some(f.size),
            media_type: f.media_type.clone(),
            timestamp: f.timestamp,
            cursor,
        },
        DirectoryEntry::Dir(_) => ListItem { name, kind: EntryKind::Directory, size: None, media_type: None, timestamp: None, cursor },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::options::EncryptionOptions;
    use s5_core::crypto::DefaultCrypto;
    use s5_core::identity::Identity;
    use s5_core::testutil::MemoryNetwork;

    fn filesystem() -> Filesystem {
        let identity = Identity::from_bytes(&DefaultCrypto, &[9u8; 11 * 32]).unwrap();
        let client = Client::new(Box::new(MemoryNetwork::new()), Box::new(DefaultCrypto), &identity, FsConfig::default());
        Filesystem::new(client)
    }

    #[tokio::test]
    async fn put_then_get_round_trips_text() {
        let fs = filesystem();
        fs.put("home/notes/todo.txt", PutData::Text("buy milk".into()), PutOptions::default()).await.unwrap();

        let value = fs.get("home/notes/todo.txt").await.unwrap().unwrap();
        assert_eq!(value, GetValue::Text("buy milk".into()));
    }

    #[tokio::test]
    async fn get_on_missing_path_returns_none() {
        let fs = filesystem();
        assert!(fs.get("home/nope.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_on_a_directory_fails_with_is_directory() {
        let fs = filesystem();
        fs.put("home/a/b.txt", PutData::Bytes(vec![1]), PutOptions::default()).await.unwrap();
        let err = fs.get("home/a").await.unwrap_err();
        assert!(matches!(err, Error::IsDirectory(_)));
    }

    #[tokio::test]
    async fn delete_on_a_reserved_root_is_rejected() {
        let fs = filesystem();
        let err = fs.delete("home").await.unwrap_err();
        assert!(matches!(err, Error::RootImmutable(_)));
    }

    #[tokio::test]
    async fn delete_on_a_non_empty_directory_is_rejected() {
        let fs = filesystem();
        fs.put("home/docs/a.txt", PutData::Bytes(vec![1]), PutOptions::default()).await.unwrap();
        let err = fs.delete("home/docs").await.unwrap_err();
        assert!(matches!(err, Error::DirectoryNotEmpty(_)));
    }

    #[tokio::test]
    async fn delete_then_get_returns_none() {
        let fs = filesystem();
        fs.put("home/a.txt", PutData::Bytes(vec![1, 2, 3]), PutOptions::default()).await.unwrap();
        assert!(fs.delete("home/a.txt").await.unwrap());
        assert!(fs.get("home/a.txt").await.unwrap().is_none());
        assert!(!fs.delete("home/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn list_yields_sorted_entries_and_resumes_from_cursor() {
        let fs = filesystem();
        for name in ["c.txt", "a.txt", "b.txt"] {
            fs.put(&format!("home/{name}"), PutData::Bytes(vec![0]), PutOptions::default()).await.unwrap();
        }

        let page = fs.list("home", ListOptions::with_limit(2)).await.unwrap();
        assert_eq!(page.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);

        let rest = fs.list("home", ListOptions { cursor: Some(page[1].cursor.clone()), limit: 10 }).await.unwrap();
        assert_eq!(rest.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(), vec!["c.txt"]);
    }

    #[tokio::test]
    async fn encrypted_put_round_trips_and_ciphertext_is_not_plaintext() {
        let fs = filesystem();
        fs.put(
            "home/secret.txt",
            PutData::Text("sensitive".into()),
            PutOptions { encryption: Some(EncryptionOptions { key: None }), ..Default::default() },
        )
        .await
        .unwrap();

        let value = fs.get("home/secret.txt").await.unwrap().unwrap();
        assert_eq!(value, GetValue::Text("sensitive".into()));

        let metadata = fs.get_metadata("home/secret.txt").await.unwrap().unwrap();
        assert_eq!(metadata.kind, EntryKind::File);
    }

    #[tokio::test]
    async fn directory_shards_above_threshold_and_lists_completely() {
        let identity = Identity::from_bytes(&DefaultCrypto, &[4u8; 11 * 32]).unwrap();
        let mut config = FsConfig::default();
        config.hamt_threshold = 8;
        config.hamt_max_inline_entries = 4;
        let client = Client::new(Box::new(MemoryNetwork::new()), Box::new(DefaultCrypto), &identity, config);
        let fs = Filesystem::new(client);

        for i in 0..20 {
            fs.put(&format!("home/f{i:03}.bin"), PutData::Bytes(vec![i as u8]), PutOptions::default()).await.unwrap();
        }

        let metadata = fs.get_metadata("home").await.unwrap().unwrap();
        assert_eq!(metadata.file_count, Some(20));

        let mut seen = std::collections::HashSet::new();
        let mut cursor = None;
        loop {
            let options = match &cursor {
                Some(c) => ListOptions { cursor: Some(c.clone()), limit: 3 },
                None => ListOptions::with_limit(3),
            };
            let page = fs.list("home", options).await.unwrap();
            if page.is_empty() {
                break;
            }
            for item in &page {
                seen.insert(item.name.clone());
            }
            cursor = page.last().map(|i| i.cursor.clone());
            if page.len() < 3 {
                break;
            }
        }
        assert_eq!(seen.len(), 20);
    }
}

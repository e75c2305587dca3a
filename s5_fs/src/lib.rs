//! # s5_fs
//!
//! A path-based filesystem over a decentralised, content-addressed
//! storage network: files and directories are immutable blobs; mutability
//! is simulated through a registry entry that each write re-signs at the
//! next revision.
//!
//! ## Layers
//! 1. `dir`      – the canonical directory encoding (pure data + CBOR).
//! 2. `hamt`     – the sharded representation a directory grows into.
//! 3. `chunked`  – per-file chunked AEAD encryption.
//! 4. `cursor`   – opaque, directory-scoped listing cursors.
//! 5. `resolver` – root-CID parsing and per-segment key-set derivation.
//! 6. `client`   – shared wiring: network, crypto, caches, reserved roots.
//! 7. `fs`       – the `put`/`get`/`list`/`delete` façade applications use.
//! 8. `hidden_store` – a small JSON key/value store for internal state.

pub mod chunked;
pub mod client;
pub mod cursor;
pub mod dir;
pub mod fs;
pub mod hamt;
pub mod hidden_store;
pub mod options;
pub mod resolver;

pub use client::Client;
pub use fs::{Filesystem, GetValue, PutData};
pub use hidden_store::HiddenStore;
pub use options::{EncryptionOptions, EntryKind, FsConfig, ListItem, ListOptions, Metadata, PutOptions};

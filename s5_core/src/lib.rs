//! Core types and traits for an S5-protocol client: the crypto facade, key
//! derivation, identity, content identifiers, registry entries and the
//! mutable-blob envelope. `s5_fs` builds the directory/HAMT/filesystem
//! layer on top of what this crate exports.
//!
//! Nothing in this crate performs network I/O itself; [`network::Network`]
//! and [`crypto::Crypto`] are the two capability traits the rest of the
//! stack is built against, so embedders can substitute their own
//! transport and crypto backends without touching the protocol logic.

pub mod blob_envelope;
pub mod cache;
pub mod cid;
pub mod crypto;
pub mod derive;
pub mod error;
pub mod hash;
pub mod identity;
pub mod network;
pub mod registry;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use crypto::{Crypto, DefaultCrypto, TaggedPublicKey};
pub use error::{Error, S5Result};
pub use hash::Hash;
pub use identity::{Identity, Slot};
pub use network::Network;
pub use registry::RegistryEntry;

//! Identity: seed phrase ⇄ entropy ⇄ root seed ⇄ a fixed slot-map of
//! per-purpose sub-seeds (spec §3.1, §4.3).
//!
//! Grounded on `examples/s5-dev-s5-rs/s5_fs/src/context.rs`'s use of a
//! single signing seed fanned out into purpose-specific key material, but
//! this module follows the spec's own two-level tweak-hash derivation
//! rather than the teacher's context-object shape.

mod wordlist;

use crate::crypto::{Crypto, TaggedPublicKey};
use crate::derive::derive_int;
use crate::error::{Error, S5Result};

const WORD_COUNT: usize = 15;
const ENTROPY_WORD_COUNT: usize = 13;
const LAST_ENTROPY_WORD_RANGE: u16 = 256;
const ENTROPY_LEN: usize = 16;
const CHECKSUM_BITS: u32 = 20;

/// A named sub-seed slot (spec §3.1 GLOSSARY "Identity").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Signing,
    Encryption,
    Resolver,
    PublicReserved1,
    PublicReserved2,
    PortalAccounts,
    HiddenStore,
    Filesystem,
    PrivateReserved1,
    PrivateReserved2,
    Extension,
}

impl Slot {
    /// All slots, in the fixed declaration order used for serialisation
    /// (§6.3) and for tweak assignment (`SPEC_FULL.md` Open Question 4).
    const ALL: [Slot; 11] = [
        Slot::Signing,
        Slot::Encryption,
        Slot::Resolver,
        Slot::PublicReserved1,
        Slot::PublicReserved2,
        Slot::PortalAccounts,
        Slot::HiddenStore,
        Slot::Filesystem,
        Slot::PrivateReserved1,
        Slot::PrivateReserved2,
        Slot::Extension,
    ];

    /// Whether this slot derives from the public or private sub-root.
    fn is_public(self) -> bool {
        matches!(
            self,
            Slot::Signing | Slot::Encryption | Slot::Resolver
                | Slot::PublicReserved1 | Slot::PublicReserved2
        )
    }

    /// Tweak used against this slot's group sub-root: `0..=4` for the
    /// public group, `0..=5` for the private group, in declaration order.
    fn tweak(self) -> u64 {
        match self {
            Slot::Signing | Slot::PortalAccounts => 0,
            Slot::Encryption | Slot::HiddenStore => 1,
            Slot::Resolver | Slot::Filesystem => 2,
            Slot::PublicReserved1 | Slot::PrivateReserved1 => 3,
            Slot::PublicReserved2 | Slot::PrivateReserved2 => 4,
            Slot::Extension => 5,
        }
    }
}

/// A fully derived identity: a slot map of 32-byte sub-seeds, plus the
/// signing keypair derived from the `signing` slot.
pub struct Identity {
    seeds: [[u8; 32]; 11],
    pub signing_public_key: TaggedPublicKey,
    signing_priv_seed: [u8; 32],
}

impl Identity {
    fn slot_index(slot: Slot) -> usize {
        Slot::ALL.iter().position(|s| *s == slot).expect("Slot::ALL is exhaustive")
    }

    pub fn sub_seed(&self, slot: Slot) -> &[u8; 32] {
        &self.seeds[Self::slot_index(slot)]
    }

    pub fn signing_priv_seed(&self) -> &[u8; 32] {
        &self.signing_priv_seed
    }

    /// Derives a complete [`Identity`] from a 15-word seed phrase (spec
    /// §4.3). Fails with [`Error::InvalidSeedPhrase`] at the first failed
    /// validation step: word count, unknown prefix, out-of-range word 13,
    /// or checksum mismatch.
    pub fn from_seed_phrase(crypto: &dyn Crypto, phrase: &str) -> S5Result<Self> {
        let entropy = decode_entropy(phrase)?;
        let root_seed = crypto.blake3(&entropy);

        let main = derive_int(&root_seed, 0);
        let public_seed = derive_int(&main, 1);
        let private_seed = derive_int(&main, 64);
        let public_subroot = derive_int(&public_seed, 0);
        let private_subroot = derive_int(&private_seed, 0);

        let mut seeds = [[0u8; 32]; 11];
        for (i, slot) in Slot::ALL.into_iter().enumerate() {
            let subroot = if slot.is_public() { &public_subroot } else { &private_subroot };
            seeds[i] = derive_int(subroot, slot.tweak());
        }

        let signing_seed = seeds[Self::slot_index(Slot::Signing)];
        let (signing_priv_seed, signing_public_key) = crypto.ed25519_keypair(&signing_seed);

        Ok(Self { seeds, signing_public_key, signing_priv_seed })
    }

    /// Serialises the slot map to a stable binary form for local
    /// persistence (spec §6.3): the 11 sub-seeds concatenated in
    /// [`Slot::ALL`] order, 32 bytes each.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.seeds.concat()
    }

    /// Restores an [`Identity`] previously written by [`Identity::to_bytes`].
    pub fn from_bytes(crypto: &dyn Crypto, bytes: &[u8]) -> S5Result<Self> {
        if bytes.len() != 11 * 32 {
            return Err(Error::InvalidSeedPhrase("persisted identity has wrong length".into()));
        }
        let mut seeds = [[0u8; 32]; 11];
        for (i, chunk) in bytes.chunks_exact(32).enumerate() {
            seeds[i].copy_from_slice(chunk);
        }
        let signing_seed = seeds[Self::slot_index(Slot::Signing)];
        let (signing_priv_seed, signing_public_key) = crypto.ed25519_keypair(&signing_seed);
        Ok(Self { seeds, signing_public_key, signing_priv_seed })
    }
}

/// Normalises a phrase (lowercase, collapse whitespace) into its words.
fn normalize(phrase: &str) -> Vec<String> {
    phrase
        .split_whitespace()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Validates and decodes a seed phrase into its 16 bytes of entropy (spec
/// §4.3 steps 1-2).
fn decode_entropy(phrase: &str) -> S5Result<[u8; ENTROPY_LEN]> {
    let words = normalize(phrase);
    if words.len() != WORD_COUNT {
        return Err(Error::InvalidSeedPhrase(format!(
            "expected {WORD_COUNT} words, got {}",
            words.len()
        )));
    }

    let mut indices = [0u16; WORD_COUNT];
    for (i, word) in words.iter().enumerate() {
        let idx = wordlist::index_of_prefix(word)
            .ok_or_else(|| Error::InvalidSeedPhrase(format!("unknown word at position {}", i + 1)))?;
        if i == ENTROPY_WORD_COUNT - 1 && idx >= LAST_ENTROPY_WORD_RANGE {
            return Err(Error::InvalidSeedPhrase(
                "word 13 must be within the first 256 dictionary entries".into(),
            ));
        }
        indices[i] = idx;
    }

    // Pack 12 * 10-bit + 1 * 8-bit = 128 bits of entropy, MSB-first.
    let mut acc: u128 = 0;
    for idx in &indices[..ENTROPY_WORD_COUNT - 1] {
        acc = (acc << 10) | *idx as u128;
    }
    acc = (acc << 8) | indices[ENTROPY_WORD_COUNT - 1] as u128;
    let entropy = acc.to_be_bytes();

    // Checksum: the 20 bits carried by words 14-15 must match the top 20
    // bits of blake3(entropy).
    let given_checksum = ((indices[13] as u32) << 10) | indices[14] as u32;
    let digest = blake3::hash(&entropy);
    let expected_checksum = checksum_bits(digest.as_bytes());
    if given_checksum != expected_checksum {
        return Err(Error::InvalidSeedPhrase("checksum mismatch".into()));
    }

    Ok(entropy)
}

/// The top `CHECKSUM_BITS` bits of `digest`, as the low bits of a `u32`.
fn checksum_bits(digest: &[u8; 32]) -> u32 {
    let first3 = u32::from_be_bytes([0, digest[0], digest[1], digest[2]]);
    first3 >> (24 - CHECKSUM_BITS)
}

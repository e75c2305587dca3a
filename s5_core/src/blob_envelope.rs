//! Mutable-blob framing (spec §4.5): the AEAD envelope used to encrypt
//! small mutable payloads (directory snapshots, hidden-store values)
//! before upload. Padding classes make identical-size plaintexts produce
//! identical-size ciphertexts across clients, which is the whole point of
//! padding a *mutable* blob (an immutable file blob has no such leak to
//! plug, which is why §4.6's file chunking has no padding step).

use crate::crypto::Crypto;
use crate::error::{Error, S5Result};

const MAGIC: u8 = 0x8d;
const VERSION: u8 = 0x01;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const LENGTH_PREFIX_LEN: usize = 4;
const HEADER_LEN: usize = 2; // magic + version

/// Fixed overhead a padded plaintext must clear before it becomes a
/// complete blob: header + nonce + AEAD tag.
const FIXED_OVERHEAD: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

/// The deterministic padded-size-class schedule (see `SPEC_FULL.md` Open
/// Question 5: wire compatibility is explicitly a non-goal, so this
/// schedule is free to choose as long as it is stable and monotonic).
///
/// Classes are powers of two starting at 4096, with one halfway class
/// between each consecutive pair: 4096, 6144, 8192, 12288, 16384, ...
pub struct PaddingSchedule;

impl PaddingSchedule {
    const MIN_CLASS: usize = 4096;

    /// Smallest class `>= needed`.
    pub fn class_for(needed: usize) -> usize {
        let mut class = Self::MIN_CLASS;
        loop {
            if class >= needed {
                return class;
            }
            let halfway = class + class / 2;
            if halfway >= needed {
                return halfway;
            }
            class *= 2;
        }
    }
}

/// Encodes `plaintext` into a self-describing, padded, encrypted blob.
///
/// Layout: `magic(1) ‖ version(1) ‖ nonce(24) ‖ ciphertext`, where the
/// ciphertext decrypts to `len_prefix(4, little-endian) ‖ plaintext ‖ pad`.
pub fn encode(crypto: &dyn Crypto, key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    let raw_len = LENGTH_PREFIX_LEN + plaintext.len();
    let blob_class = PaddingSchedule::class_for(FIXED_OVERHEAD + raw_len);
    let padded_payload_len = blob_class - FIXED_OVERHEAD;
    debug_assert!(padded_payload_len >= raw_len);

    let mut payload = Vec::with_capacity(padded_payload_len);
    payload.extend_from_slice(&(plaintext.len() as u32).to_le_bytes());
    payload.extend_from_slice(plaintext);
    payload.resize(padded_payload_len, 0);

    let nonce: [u8; NONCE_LEN] = crypto
        .random(NONCE_LEN)
        .try_into()
        .expect("random(24) returns exactly 24 bytes");
    let ciphertext = crypto.xchacha20_poly1305_encrypt(key, &nonce, &payload);

    let mut out = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
    out.push(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    debug_assert_eq!(out.len(), blob_class);
    out
}

/// Decodes a blob produced by [`encode`]. Fails with [`Error::Crypto`]
/// (wrong key / corrupt ciphertext, per spec's `WrongKey` case — modelled
/// here as a `Crypto` error since this crate's error table folds that
/// into the same kind) if the AEAD tag does not verify, or with a
/// validation error wrapped in [`Error::Crypto`] if the framing is
/// malformed.
pub fn decode(crypto: &dyn Crypto, key: &[u8; 32], blob: &[u8]) -> S5Result<Vec<u8>> {
    if blob.len() < HEADER_LEN + NONCE_LEN {
        return Err(Error::Crypto("mutable-blob envelope too short".into()));
    }
    if blob[0] != MAGIC || blob[1] != VERSION {
        return Err(Error::Crypto("mutable-blob envelope magic/version mismatch".into()));
    }
    if !is_padded_class(blob.len()) {
        return Err(Error::Crypto("mutable-blob length is not a padded class".into()));
    }

    let nonce: [u8; NONCE_LEN] = blob[HEADER_LEN..HEADER_LEN + NONCE_LEN]
        .try_into()
        .expect("checked length above");
    let ciphertext = &blob[HEADER_LEN + NONCE_LEN..];

    let payload = crypto.xchacha20_poly1305_decrypt(key, &nonce, ciphertext)?;
    if payload.len() < LENGTH_PREFIX_LEN {
        return Err(Error::Crypto("mutable-blob payload missing length prefix".into()));
    }
    let len = u32::from_le_bytes(payload[0..4].try_into().expect("checked length")) as usize;
    if LENGTH_PREFIX_LEN + len > payload.len() {
        return Err(Error::Crypto("mutable-blob length prefix exceeds payload".into()));
    }
    Ok(payload[LENGTH_PREFIX_LEN..LENGTH_PREFIX_LEN + len].to_vec())
}

fn is_padded_class(len: usize) -> bool {
    PaddingSchedule::class_for(len) == len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCrypto;

    #[test]
    fn round_trips_for_various_sizes() {
        let crypto = DefaultCrypto;
        let key = [6u8; 32];
        for len in [0usize, 1, 100, 4096, 5000, 100_000] {
            let plaintext = vec![0xab; len];
            let blob = encode(&crypto, &key, &plaintext);
            assert!(is_padded_class(blob.len()), "len={len}");
            let decoded = decode(&crypto, &key, &blob).unwrap();
            assert_eq!(decoded, plaintext);
        }
    }

    #[test]
    fn equal_size_classes_for_equal_length_plaintexts() {
        let crypto = DefaultCrypto;
        let key = [6u8; 32];
        let a = encode(&crypto, &key, &[1; 50]);
        let b = encode(&crypto, &key, &[2; 50]);
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn tampered_ciphertext_fails_to_decrypt() {
        let crypto = DefaultCrypto;
        let key = [6u8; 32];
        let mut blob = encode(&crypto, &key, b"hello");
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert!(decode(&crypto, &key, &blob).is_err());
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let crypto = DefaultCrypto;
        let blob = encode(&crypto, &[1u8; 32], b"hello");
        assert!(decode(&crypto, &[2u8; 32], &blob).is_err());
    }
}

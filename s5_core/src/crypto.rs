//! The crypto facade (spec §4.1): an abstract capability set the core
//! consumes rather than calling primitives directly. This keeps the core
//! testable with deterministic randomness and lets embedders swap in a
//! hardware-backed or WASM-friendly implementation without touching the
//! directory/registry/HAMT logic.
//!
//! Ed25519 public keys are always presented prefixed with a 1-byte scheme
//! tag (33 bytes total); content hashes are presented bare (32 bytes) and
//! get their 1-byte algorithm tag only at the CID layer (see
//! [`crate::cid`]).

use crate::error::{Error, S5Result};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Scheme tag prepended to every Ed25519 public key this crate hands out.
pub const ED25519_SCHEME_TAG: u8 = 0xed;

/// A tagged Ed25519 public key: `[scheme_tag] ++ [32-byte point]`.
pub type TaggedPublicKey = [u8; 33];

/// The abstract crypto capability set consumed by the rest of the core.
///
/// Implementations must be deterministic for `blake3`/`blake3_stream` and
/// for `ed25519_*` (same inputs, same outputs); only `random` is allowed
/// to vary between calls.
pub trait Crypto: Send + Sync {
    /// Fills and returns `n` cryptographically secure random bytes.
    fn random(&self, n: usize) -> Vec<u8>;

    /// One-shot BLAKE3 hash.
    fn blake3(&self, bytes: &[u8]) -> [u8; 32];

    /// Streaming BLAKE3 hash over an ordered sequence of chunks, equivalent
    /// to hashing the concatenation of `chunks`.
    fn blake3_stream(&self, chunks: &[&[u8]]) -> [u8; 32];

    /// Derives an Ed25519 keypair from a 32-byte seed.
    fn ed25519_keypair(&self, seed: &[u8; 32]) -> ([u8; 32], TaggedPublicKey);

    /// Signs `msg` with the 32-byte private seed, returning a 64-byte signature.
    fn ed25519_sign(&self, priv_seed: &[u8; 32], msg: &[u8]) -> [u8; 64];

    /// Verifies a 64-byte signature against a tagged (33-byte) public key.
    fn ed25519_verify(&self, public: &TaggedPublicKey, msg: &[u8], sig: &[u8; 64]) -> bool;

    /// XChaCha20-Poly1305 AEAD encrypt with a 32-byte key and 24-byte nonce.
    fn xchacha20_poly1305_encrypt(&self, key: &[u8; 32], nonce: &[u8; 24], pt: &[u8]) -> Vec<u8>;

    /// XChaCha20-Poly1305 AEAD decrypt. Fails with [`Error::Crypto`] if the
    /// authentication tag does not verify.
    fn xchacha20_poly1305_decrypt(
        &self,
        key: &[u8; 32],
        nonce: &[u8; 24],
        ct: &[u8],
    ) -> S5Result<Vec<u8>>;
}

/// The default, production [`Crypto`] implementation backed by `blake3`,
/// `ed25519-dalek` and `chacha20poly1305`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCrypto;

impl Crypto for DefaultCrypto {
    fn random(&self, n: usize) -> Vec<u8> {
        use rand::RngCore;
        let mut buf = vec![0u8; n];
        rand::rngs::OsRng.fill_bytes(&mut buf);
        buf
    }

    fn blake3(&self, bytes: &[u8]) -> [u8; 32] {
        *blake3::hash(bytes).as_bytes()
    }

    fn blake3_stream(&self, chunks: &[&[u8]]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        for chunk in chunks {
            hasher.update(chunk);
        }
        *hasher.finalize().as_bytes()
    }

    fn ed25519_keypair(&self, seed: &[u8; 32]) -> ([u8; 32], TaggedPublicKey) {
        let signing_key = SigningKey::from_bytes(seed);
        let verifying_key = signing_key.verifying_key();
        let mut tagged = [0u8; 33];
        tagged[0] = ED25519_SCHEME_TAG;
        tagged[1..].copy_from_slice(verifying_key.as_bytes());
        (*seed, tagged)
    }

    fn ed25519_sign(&self, priv_seed: &[u8; 32], msg: &[u8]) -> [u8; 64] {
        let signing_key = SigningKey::from_bytes(priv_seed);
        signing_key.sign(msg).to_bytes()
    }

    fn ed25519_verify(&self, public: &TaggedPublicKey, msg: &[u8], sig: &[u8; 64]) -> bool {
        let Ok(point): Result<[u8; 32], _> = public[1..].try_into() else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&point) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(sig);
        verifying_key.verify(msg, &signature).is_ok()
    }

    fn xchacha20_poly1305_encrypt(&self, key: &[u8; 32], nonce: &[u8; 24], pt: &[u8]) -> Vec<u8> {
        let cipher = XChaCha20Poly1305::new(key.into());
        cipher
            .encrypt(XNonce::from_slice(nonce), pt)
            .expect("XChaCha20-Poly1305 encryption does not fail for valid-size inputs")
    }

    fn xchacha20_poly1305_decrypt(
        &self,
        key: &[u8; 32],
        nonce: &[u8; 24],
        ct: &[u8],
    ) -> S5Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new(key.into());
        cipher
            .decrypt(XNonce::from_slice(nonce), ct)
            .map_err(|_| Error::Crypto("AEAD tag verification failed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_round_trip() {
        let crypto = DefaultCrypto;
        let seed = [7u8; 32];
        let (priv_seed, public) = crypto.ed25519_keypair(&seed);
        let msg = b"hello s5";
        let sig = crypto.ed25519_sign(&priv_seed, msg);
        assert!(crypto.ed25519_verify(&public, msg, &sig));

        let mut flipped = sig;
        flipped[0] ^= 0xff;
        assert!(!crypto.ed25519_verify(&public, msg, &flipped));
    }

    #[test]
    fn aead_round_trip() {
        let crypto = DefaultCrypto;
        let key = [1u8; 32];
        let nonce = [2u8; 24];
        let pt = b"super secret payload";
        let ct = crypto.xchacha20_poly1305_encrypt(&key, &nonce, pt);
        let decrypted = crypto.xchacha20_poly1305_decrypt(&key, &nonce, &ct).unwrap();
        assert_eq!(decrypted, pt);

        let mut tampered = ct.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 0x01;
        assert!(crypto.xchacha20_poly1305_decrypt(&key, &nonce, &tampered).is_err());
    }
}

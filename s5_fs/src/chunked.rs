//! File-content chunked AEAD encryption (spec §4.6): splits a file's
//! plaintext into fixed-size chunks and encrypts each under the same key
//! with a nonce whose low 8 bytes carry the chunk's sequential index, so
//! no two chunks of one file ever reuse a nonce under that key. The final
//! chunk is zero-padded out to `chunk_size` before encryption — there is
//! no per-chunk length or header, so without padding the boundary between
//! real plaintext and "nothing left" would be ambiguous from the
//! ciphertext alone (spec §8 testable property 5: ciphertext length is
//! exactly `ceil(L/chunk) * (chunk + tag)`). Decryption trims the result
//! back to the known plaintext length.
//!
//! Grounded on [`s5_core::blob_envelope`]'s AEAD-encrypt-per-unit pattern,
//! generalized from one padded unit to a sequence of fixed-size ones.

use s5_core::crypto::Crypto;
use s5_core::error::S5Result;

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

fn nonce_for_chunk(index: u64) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[16..].copy_from_slice(&index.to_le_bytes());
    nonce
}

/// Encrypts `plaintext` as a sequence of `chunk_size`-byte chunks under
/// `key`, returning the concatenated ciphertext. The final chunk is
/// zero-padded to `chunk_size` before encryption, so
/// `encrypt(..).len() == ceil(plaintext.len() / chunk_size) * (chunk_size + TAG_LEN)`.
pub fn encrypt(crypto: &dyn Crypto, key: &[u8; 32], chunk_size: usize, plaintext: &[u8]) -> Vec<u8> {
    let chunk_size = chunk_size.max(1);
    let chunk_count = plaintext.len().div_ceil(chunk_size);
    let mut out = Vec::with_capacity(chunk_count * (chunk_size + TAG_LEN));
    for index in 0..chunk_count {
        let start = index * chunk_size;
        let end = (start + chunk_size).min(plaintext.len());
        let mut chunk = vec![0u8; chunk_size];
        chunk[..end - start].copy_from_slice(&plaintext[start..end]);
        let nonce = nonce_for_chunk(index as u64);
        out.extend(crypto.xchacha20_poly1305_encrypt(key, &nonce, &chunk));
    }
    out
}

/// Decrypts ciphertext produced by [`encrypt`], trimming the final
/// chunk's zero padding back off using the known `plaintext_len`.
pub fn decrypt(crypto: &dyn Crypto, key: &[u8; 32], chunk_size: usize, plaintext_len: u64, ciphertext: &[u8]) -> S5Result<Vec<u8>> {
    let ct_chunk_size = chunk_size.max(1) + TAG_LEN;
    let mut out = Vec::with_capacity(ciphertext.len());
    for (index, ct_chunk) in ciphertext.chunks(ct_chunk_size).enumerate() {
        let nonce = nonce_for_chunk(index as u64);
        out.extend(crypto.xchacha20_poly1305_decrypt(key, &nonce, ct_chunk)?);
    }
    out.truncate(plaintext_len as usize);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use s5_core::crypto::DefaultCrypto;

    #[test]
    fn round_trips_across_chunk_boundaries() {
        let crypto = DefaultCrypto;
        let key = [4u8; 32];
        for len in [0usize, 1, 10, 256, 257, 1000] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let ciphertext = encrypt(&crypto, &key, 10, &plaintext);
            let decoded = decrypt(&crypto, &key, 10, len as u64, &ciphertext).unwrap();
            assert_eq!(decoded, plaintext, "len={len}");
        }
    }

    /// Spec §8 testable property 5: ciphertext length equals
    /// `ceil(L/chunk) * (chunk + tag)` exactly, including at a non-aligned
    /// final chunk.
    #[test]
    fn ciphertext_length_matches_the_padded_chunk_formula() {
        let crypto = DefaultCrypto;
        let key = [9u8; 32];
        for len in [0usize, 1, 9, 10, 11, 257, 1000] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let ciphertext = encrypt(&crypto, &key, 10, &plaintext);
            let expected = len.div_ceil(10) * (10 + TAG_LEN);
            assert_eq!(ciphertext.len(), expected, "len={len}");
        }
    }

    #[test]
    fn distinct_chunks_have_distinct_ciphertext_even_for_equal_plaintext() {
        let crypto = DefaultCrypto;
        let key = [5u8; 32];
        let plaintext = vec![0xaa; 20];
        let ciphertext = encrypt(&crypto, &key, 10, &plaintext);
        assert_ne!(&ciphertext[..18], &ciphertext[18..36]);
    }

    #[test]
    fn tampering_with_a_chunk_fails_decryption() {
        let crypto = DefaultCrypto;
        let key = [6u8; 32];
        let plaintext = vec![1u8; 50];
        let mut ciphertext = encrypt(&crypto, &key, 10, &plaintext);
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 1;
        assert!(decrypt(&crypto, &key, 10, 50, &ciphertext).is_err());
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let crypto = DefaultCrypto;
        let key = [7u8; 32];
        let ciphertext = encrypt(&crypto, &key, 256 * 1024, &[]);
        assert!(ciphertext.is_empty());
        let decoded = decrypt(&crypto, &key, 256 * 1024, 0, &ciphertext).unwrap();
        assert!(decoded.is_empty());
    }
}

//! Key derivation (spec §4.2): the only way child key material is ever
//! produced. Both forms are pure functions of a 32-byte base and a tweak;
//! neither allocates state and neither depends on the [`crate::crypto::Crypto`]
//! facade, since BLAKE3 derivation is always done directly (the facade's
//! `blake3` method is equivalent and could be substituted, but key
//! derivation is considered a protocol-level primitive, not a pluggable
//! capability).

/// Derives a child key from `base` and an integer tweak.
///
/// `derive(base, tweak)` ≡ `blake3(base ‖ le(tweak, 32))`: the tweak is
/// zero-extended to a 32-byte little-endian buffer before hashing.
pub fn derive_int(base: &[u8; 32], tweak: u64) -> [u8; 32] {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(base);
    buf[32..40].copy_from_slice(&tweak.to_le_bytes());
    *blake3::hash(&buf).as_bytes()
}

/// Derives a child key from `base` and an arbitrary byte-string tweak.
///
/// `derive(base, bytes)` ≡ `blake3(base ‖ blake3(bytes))`.
pub fn derive_bytes(base: &[u8; 32], tweak: &[u8]) -> [u8; 32] {
    let tweak_hash = blake3::hash(tweak);
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(base);
    buf[32..].copy_from_slice(tweak_hash.as_bytes());
    *blake3::hash(&buf).as_bytes()
}

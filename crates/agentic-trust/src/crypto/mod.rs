//! Cryptographic primitives for AgenticTrust.
//!
//! - Ed25519 issuer keys, signing and verification
//! - HKDF-SHA256 scope-key derivation from the issuer root
//! - Argon2id + ChaCha20-Poly1305 sealing for the issuer key file
//! - BLAKE3 credential fingerprints
//! - Cryptographically secure random nonces

pub mod derivation;
pub mod encryption;
pub mod keys;
pub mod random;
pub mod signing;

/// BLAKE3 fingerprint of arbitrary bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

//! Passphrase sealing for secrets at rest.
//!
//! passphrase → Argon2id(salt) → HKDF-SHA256(context) → ChaCha20-Poly1305.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::derivation;
use crate::crypto::random::random_bytes;
use crate::error::{Result, TrustError};

const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

/// A ciphertext with everything except the passphrase needed to open it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedBox {
    pub algorithm: String,
    pub kdf: String,
    /// Base64 Argon2id salt (16 bytes).
    pub salt: String,
    /// Base64 ChaCha20-Poly1305 nonce (12 bytes).
    pub nonce: String,
    /// Base64 ciphertext including the Poly1305 tag.
    pub ciphertext: String,
}

fn b64(bytes: &[u8]) -> String {
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
}

fn unb64(label: &str, s: &str) -> Result<Vec<u8>> {
    base64::Engine::decode(&base64::engine::general_purpose::STANDARD, s)
        .map_err(|e| TrustError::InvalidFileFormat(format!("invalid {label} base64: {e}")))
}

fn passphrase_key(passphrase: &[u8], salt: &[u8; 16]) -> Result<[u8; 32]> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| TrustError::DerivationFailed(format!("Argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut master = [0u8; 32];
    argon2
        .hash_password_into(passphrase, salt, &mut master)
        .map_err(|e| TrustError::DerivationFailed(format!("Argon2 hash: {e}")))?;

    let key = derivation::derive_key(&master, &derivation::key_file_context());
    master.zeroize();
    key
}

/// Encrypt `plaintext` under a key derived from `passphrase`.
pub fn seal(passphrase: &str, plaintext: &[u8]) -> Result<SealedBox> {
    let salt: [u8; 16] = random_bytes();
    let nonce_bytes: [u8; 12] = random_bytes();

    let mut key = passphrase_key(passphrase.as_bytes(), &salt)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| TrustError::EncryptionFailed(format!("cipher init: {e}")));
    key.zeroize();

    let ciphertext = cipher?
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| TrustError::EncryptionFailed(format!("encrypt: {e}")))?;

    Ok(SealedBox {
        algorithm: "chacha20-poly1305".to_string(),
        kdf: "argon2id+hkdf-sha256".to_string(),
        salt: b64(&salt),
        nonce: b64(&nonce_bytes),
        ciphertext: b64(&ciphertext),
    })
}

/// Decrypt a [`SealedBox`]. A wrong passphrase surfaces as
/// `InvalidPassphrase` because AEAD authentication fails.
pub fn open(passphrase: &str, sealed: &SealedBox) -> Result<Vec<u8>> {
    let salt: [u8; 16] = unb64("salt", &sealed.salt)?
        .try_into()
        .map_err(|_| TrustError::InvalidFileFormat("salt must be 16 bytes".into()))?;
    let nonce_bytes = unb64("nonce", &sealed.nonce)?;
    if nonce_bytes.len() != 12 {
        return Err(TrustError::InvalidFileFormat("nonce must be 12 bytes".into()));
    }
    let ciphertext = unb64("ciphertext", &sealed.ciphertext)?;

    let mut key = passphrase_key(passphrase.as_bytes(), &salt)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| TrustError::DecryptionFailed(format!("cipher init: {e}")));
    key.zeroize();

    cipher?
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| TrustError::InvalidPassphrase)
}

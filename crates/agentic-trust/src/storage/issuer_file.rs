//! Issuer key file: the passphrase-sealed issuer root key.
//!
//! File format (JSON):
//! ```json
//! {
//!     "version": 1,
//!     "format": "atk-v1",
//!     "public_key": "<base64 ed25519 public key>",
//!     "created_at": 1700000000000000,
//!     "sealed_key": {
//!         "algorithm": "chacha20-poly1305",
//!         "kdf": "argon2id+hkdf-sha256",
//!         "salt": "<base64-16-bytes>",
//!         "nonce": "<base64-12-bytes>",
//!         "ciphertext": "<base64>"
//!     }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::credential::CredentialIssuer;
use crate::crypto::encryption::{self, SealedBox};
use crate::error::{Result, TrustError};

use super::file_store::write_atomic;

// ── File format constants ─────────────────────────────────────────────────────

const ATK_VERSION: u32 = 1;
const ATK_FORMAT: &str = "atk-v1";

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct IssuerKeyFile {
    pub version: u32,
    pub format: String,
    /// Root public key, readable without the passphrase.
    pub public_key: String,
    pub created_at: u64,
    pub sealed_key: SealedBox,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Seal the issuer root key with `passphrase` and write it atomically.
pub fn save_issuer(issuer: &CredentialIssuer, path: &Path, passphrase: &str) -> Result<()> {
    let mut key_bytes = issuer.root_key_bytes();
    let sealed = encryption::seal(passphrase, &key_bytes);
    key_bytes.zeroize();

    let file = IssuerKeyFile {
        version: ATK_VERSION,
        format: ATK_FORMAT.to_string(),
        public_key: issuer.public_key_base64(),
        created_at: issuer.created_at,
        sealed_key: sealed?,
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| TrustError::Serialization(e.to_string()))?;
    write_atomic(path, json.as_bytes())?;

    log::info!("issuer key written to {}", path.display());
    Ok(())
}

/// Load and unseal the issuer root key.
///
/// A wrong passphrase is `InvalidPassphrase`. A key that unseals but does
/// not match the stored public key is `InvalidFileFormat`.
pub fn load_issuer(path: &Path, passphrase: &str) -> Result<CredentialIssuer> {
    let file = read_key_file(path)?;

    let mut plaintext = encryption::open(passphrase, &file.sealed_key)?;
    let key_bytes: std::result::Result<[u8; 32], _> = plaintext.as_slice().try_into();
    plaintext.zeroize();
    let mut key_bytes =
        key_bytes.map_err(|_| TrustError::InvalidKey("issuer key must be 32 bytes".into()))?;

    let issuer = CredentialIssuer::from_key_bytes(&key_bytes, file.created_at);
    key_bytes.zeroize();

    if issuer.public_key_base64() != file.public_key {
        return Err(TrustError::InvalidFileFormat(
            "issuer key does not match stored public key".into(),
        ));
    }
    Ok(issuer)
}

/// Read the plaintext public key without the passphrase.
pub fn read_issuer_public_key(path: &Path) -> Result<String> {
    Ok(read_key_file(path)?.public_key)
}

fn read_key_file(path: &Path) -> Result<IssuerKeyFile> {
    let bytes = std::fs::read(path)?;
    let file: IssuerKeyFile = serde_json::from_slice(&bytes).map_err(|e| {
        TrustError::InvalidFileFormat(format!("failed to parse issuer key file: {e}"))
    })?;

    if file.version != ATK_VERSION || file.format != ATK_FORMAT {
        return Err(TrustError::InvalidFileFormat(format!(
            "unsupported issuer key file version={} format={}",
            file.version, file.format,
        )));
    }
    Ok(file)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Scope-key derivation using HKDF-SHA256.
//!
//! The issuer never signs credentials with its root key directly. Each
//! scope (the global namespace or one trust domain) gets its own signing
//! key derived from the root, so a credential minted for one domain can
//! never verify under another.

use ed25519_dalek::SigningKey;
use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{Result, TrustError};

/// Key id used for global identities.
pub const GLOBAL_KEY_ID: &str = "global";

/// Derive a 32-byte child key from a root key and context string.
pub fn derive_key(root_key_bytes: &[u8; 32], context: &str) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, root_key_bytes);
    let mut output = [0u8; 32];
    hk.expand(context.as_bytes(), &mut output)
        .map_err(|e| TrustError::DerivationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}

/// Derive an Ed25519 signing key from a root key and context.
pub fn derive_signing_key(root_key_bytes: &[u8; 32], context: &str) -> Result<SigningKey> {
    let derived = derive_key(root_key_bytes, context)?;
    Ok(SigningKey::from_bytes(&derived))
}

/// Derivation context for a credential scope key.
///
/// `key_id` is either [`GLOBAL_KEY_ID`] or a trust domain name.
pub fn scope_context(key_id: &str) -> String {
    format!("agentic-trust/scope/{key_id}")
}

/// Derivation context for revocation signatures.
pub fn revocation_context() -> String {
    "agentic-trust/revocation".to_string()
}

/// Derivation context for the key-file encryption key.
pub fn key_file_context() -> String {
    "agentic-trust/key-file".to_string()
}

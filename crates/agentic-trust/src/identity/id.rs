//! Identity identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Unique identifier for an issued identity.
///
/// Format: `aid_` + base58 of the first 16 bytes of
/// SHA-256(name, trust domain, nonce, creation time). The id is assigned
/// at issuance and survives every reissue, so it does not encode anything
/// callers may later change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityId(pub String);

impl IdentityId {
    /// Mint a fresh id for `name` in `trust_domain` (`None` for global).
    pub fn generate(name: &str, trust_domain: Option<&str>) -> Self {
        let input = format!(
            "identity:{}:{}:{}:{}",
            name,
            trust_domain.unwrap_or("-"),
            crate::crypto::random::nonce_hex(),
            crate::time::now_micros(),
        );
        let hash = Sha256::digest(input.as_bytes());
        Self(format!("aid_{}", bs58::encode(&hash[..16]).into_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

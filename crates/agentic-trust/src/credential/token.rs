//! The credential token format.
//!
//! ```text
//! atok1.<base64(json claims)>.<base64(ed25519 signature)>
//! ```
//!
//! The signature covers `atok1.<base64(json claims)>` and is made with the
//! scope key named by `key_id`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::identity::IdentityId;

pub const TOKEN_PREFIX: &str = "atok1";

/// Claims carried inside a credential token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    pub sub: IdentityId,
    pub name: String,
    pub trust_domain: Option<String>,
    pub generation: u64,
    pub issued_at: u64,
    pub expires_at: Option<u64>,
    pub nonce: String,
    pub key_id: String,
}

impl CredentialClaims {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

/// A token split into its signed part, claims and signature.
pub(crate) struct ParsedToken {
    pub signed: String,
    pub claims: CredentialClaims,
    pub signature: String,
}

/// Build the signed part of a token: `atok1.<base64 claims>`.
pub(crate) fn signed_part(claims: &CredentialClaims) -> Result<String> {
    let json =
        serde_json::to_vec(claims).map_err(|e| TrustError::Serialization(e.to_string()))?;
    let body = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, json);
    Ok(format!("{TOKEN_PREFIX}.{body}"))
}

/// Split and decode a token without checking its signature.
pub(crate) fn parse(token: &str) -> Result<ParsedToken> {
    let mut parts = token.split('.');
    let (Some(prefix), Some(body), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TrustError::CredentialInvalid("malformed token".into()));
    };

    if prefix != TOKEN_PREFIX {
        return Err(TrustError::CredentialInvalid(format!(
            "unsupported token version: {prefix}"
        )));
    }

    let json = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, body)
        .map_err(|_| TrustError::CredentialInvalid("token body is not base64".into()))?;
    let claims: CredentialClaims = serde_json::from_slice(&json)
        .map_err(|_| TrustError::CredentialInvalid("token claims unreadable".into()))?;

    Ok(ParsedToken {
        signed: format!("{prefix}.{body}"),
        claims,
        signature: signature.to_string(),
    })
}

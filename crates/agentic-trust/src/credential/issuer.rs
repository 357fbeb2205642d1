//! The credential issuer.
//!
//! Holds the issuer root key and mints/opens tokens. Every scope signs
//! with its own HKDF-derived key; the root key itself never signs.

use std::time::Duration;

use zeroize::Zeroize;

use crate::crypto::derivation;
use crate::crypto::keys::Ed25519KeyPair;
use crate::crypto::{fingerprint, random, signing};
use crate::error::{Result, TrustError};
use crate::identity::{CredentialMaterial, IdentityId, Scope};

use super::token::{self, CredentialClaims};

/// Issues and opens credential tokens.
pub struct CredentialIssuer {
    root: Ed25519KeyPair,
    /// Creation timestamp of the root key (microseconds since Unix epoch).
    pub created_at: u64,
}

impl CredentialIssuer {
    /// Create an issuer with a fresh root key.
    pub fn generate() -> Self {
        Self {
            root: Ed25519KeyPair::generate(),
            created_at: crate::time::now_micros(),
        }
    }

    /// Reconstruct an issuer from stored root key bytes.
    pub fn from_key_bytes(root_key: &[u8; 32], created_at: u64) -> Self {
        Self {
            root: Ed25519KeyPair::from_signing_key_bytes(root_key),
            created_at,
        }
    }

    /// Root public key as base64.
    pub fn public_key_base64(&self) -> String {
        self.root.public_key_base64()
    }

    /// Root signing key bytes. Caller must zeroize after use.
    pub fn root_key_bytes(&self) -> [u8; 32] {
        self.root.signing_key_bytes()
    }

    fn derived(&self, context: &str) -> Result<Ed25519KeyPair> {
        let mut root = self.root.signing_key_bytes();
        let key = derivation::derive_signing_key(&root, context);
        root.zeroize();
        Ok(Ed25519KeyPair::from_signing_key(key?))
    }

    /// Signing key for a credential scope (`global` or a trust domain).
    pub fn scope_key(&self, key_id: &str) -> Result<Ed25519KeyPair> {
        self.derived(&derivation::scope_context(key_id))
    }

    /// Signing key for revocation records.
    pub fn revocation_key(&self) -> Result<Ed25519KeyPair> {
        self.derived(&derivation::revocation_context())
    }

    /// Mint credential material for `id` at `generation`.
    pub fn mint(
        &self,
        id: &IdentityId,
        name: &str,
        scope: &Scope,
        generation: u64,
        ttl: Option<Duration>,
    ) -> Result<CredentialMaterial> {
        let now = crate::time::now_micros();
        let claims = CredentialClaims {
            sub: id.clone(),
            name: name.to_string(),
            trust_domain: scope.trust_domain().map(str::to_string),
            generation,
            issued_at: now,
            expires_at: ttl.map(|t| now.saturating_add(u64::try_from(t.as_micros()).unwrap_or(u64::MAX))),
            nonce: random::nonce_hex(),
            key_id: scope.key_id().to_string(),
        };

        let signed = token::signed_part(&claims)?;
        let key = self.scope_key(&claims.key_id)?;
        let signature = signing::sign_to_base64(key.signing_key(), signed.as_bytes());
        let token = format!("{signed}.{signature}");

        Ok(CredentialMaterial {
            fingerprint: fingerprint(token.as_bytes()),
            token,
            generation,
            issued_at: now,
            expires_at: claims.expires_at,
        })
    }

    /// Parse a token and check its signature under the scope key it names.
    ///
    /// Everything wrong with the token itself (shape, signature, a key id
    /// that disagrees with the claimed domain) is `CredentialInvalid`.
    /// Expiry and record matching are the verifier's job.
    pub fn open(&self, token: &str) -> Result<CredentialClaims> {
        let parsed = token::parse(token)?;
        let claims = parsed.claims;

        let expected_key_id = claims
            .trust_domain
            .as_deref()
            .unwrap_or(derivation::GLOBAL_KEY_ID);
        if claims.key_id != expected_key_id {
            return Err(TrustError::CredentialInvalid(
                "key id does not match token scope".into(),
            ));
        }

        let key = self.scope_key(&claims.key_id)?;
        signing::verify_from_base64(key.verifying_key(), parsed.signed.as_bytes(), &parsed.signature)
            .map_err(|_| TrustError::CredentialInvalid("signature check failed".into()))?;

        Ok(claims)
    }
}

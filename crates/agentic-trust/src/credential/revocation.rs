//! Revocation records.
//!
//! Revoking an identity stores an issuer-signed record naming the
//! identity, the credential generation that was live, the reason and the
//! time. The record is what `revoke` returns, including on repeat calls.

use serde::{Deserialize, Serialize};

use crate::crypto::keys::Ed25519KeyPair;
use crate::crypto::signing;
use crate::error::{Result, TrustError};
use crate::identity::IdentityId;

/// Reason for revocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RevocationReason {
    /// The agent's credential or host was compromised.
    Compromised,
    /// The agent violated one of its policies.
    PolicyViolation,
    /// The agent was retired.
    Decommissioned,
    /// Manual revocation by an operator.
    ManualRevocation,
    Custom(String),
}

impl RevocationReason {
    /// Return a stable string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Compromised => "compromised",
            Self::PolicyViolation => "policy_violation",
            Self::Decommissioned => "decommissioned",
            Self::ManualRevocation => "manual_revocation",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Parse a reason tag; unknown tags become `Custom`.
    pub fn parse(s: &str) -> Self {
        match s {
            "compromised" => Self::Compromised,
            "policy_violation" => Self::PolicyViolation,
            "decommissioned" => Self::Decommissioned,
            "manual_revocation" | "manual" => Self::ManualRevocation,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// A revocation of one identity's credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedRecord {
    pub identity_id: IdentityId,
    pub reason: RevocationReason,
    /// Credential generation that was live when revoked.
    pub generation: u64,
    /// Revocation timestamp (microseconds since epoch).
    pub revoked_at: u64,
    /// Issuer revocation public key (base64).
    pub revoker_key: String,
    /// Signature over identity + generation + time + reason.
    pub signature: String,
}

impl RevokedRecord {
    pub fn create(
        identity_id: IdentityId,
        generation: u64,
        reason: RevocationReason,
        key: &Ed25519KeyPair,
    ) -> Self {
        let revoked_at = crate::time::now_micros();
        let to_sign = signing_payload(&identity_id, generation, revoked_at, &reason);
        let signature = signing::sign_to_base64(key.signing_key(), to_sign.as_bytes());

        Self {
            identity_id,
            reason,
            generation,
            revoked_at,
            revoker_key: key.public_key_base64(),
            signature,
        }
    }

    /// Verify the record signature against the embedded revoker key.
    pub fn verify_signature(&self) -> Result<()> {
        let pub_bytes =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &self.revoker_key)
                .map_err(|e| TrustError::InvalidKey(format!("invalid base64 revoker key: {e}")))?;
        let key_bytes: [u8; 32] = pub_bytes
            .try_into()
            .map_err(|_| TrustError::InvalidKey("revoker key must be 32 bytes".into()))?;
        let verifying_key = Ed25519KeyPair::verifying_key_from_bytes(&key_bytes)?;

        let to_verify = signing_payload(
            &self.identity_id,
            self.generation,
            self.revoked_at,
            &self.reason,
        );
        signing::verify_from_base64(&verifying_key, to_verify.as_bytes(), &self.signature)
    }
}

fn signing_payload(
    id: &IdentityId,
    generation: u64,
    revoked_at: u64,
    reason: &RevocationReason,
) -> String {
    format!("revoke:{}:{}:{}:{}", id.0, generation, revoked_at, reason.as_str())
}

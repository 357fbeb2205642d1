//! The stored identity record.

use serde::{Deserialize, Serialize};

use crate::credential::RevokedRecord;
use crate::graph::{Edge, EdgeKind};
use crate::policy::Policy;

use super::{IdentityId, Scope};

/// Credential lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    Active,
    Revoked,
}

/// The credential currently bound to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialMaterial {
    /// Opaque signed token handed to the agent.
    pub token: String,
    /// Incremented on every (re)issue; tokens with a lower generation are stale.
    pub generation: u64,
    pub issued_at: u64,
    pub expires_at: Option<u64>,
    /// BLAKE3 of the token, used to match presented tokens to this record.
    pub fingerprint: String,
}

/// A durable identity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub name: String,
    pub scope: Scope,
    pub state: CredentialState,
    pub credential: CredentialMaterial,
    pub parent: Option<IdentityId>,
    /// Outbound explicit links, first-seen order, no duplicates.
    pub links: Vec<IdentityId>,
    /// Foreign trust domains whose identities may act as requesters.
    #[serde(default)]
    pub approved_trust_domains: Vec<String>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    pub created_at: u64,
    pub updated_at: u64,
    /// Set while the identity is revoked.
    #[serde(default)]
    pub revocation: Option<RevokedRecord>,
    /// Revocations cleared by a later reissue.
    #[serde(default)]
    pub revocation_history: Vec<RevokedRecord>,
}

impl Identity {
    pub fn is_active(&self) -> bool {
        self.state == CredentialState::Active
    }

    pub fn is_global(&self) -> bool {
        self.scope.is_global()
    }

    pub fn trust_domain(&self) -> Option<&str> {
        self.scope.trust_domain()
    }

    /// Outbound trust-graph edges: the parent edge first, then links.
    pub fn outbound_edges(&self) -> Vec<Edge> {
        let parent = self.parent.iter().map(|p| Edge {
            from: self.id.clone(),
            to: p.clone(),
            kind: EdgeKind::Parent,
        });
        let links = self.links.iter().map(|l| Edge {
            from: self.id.clone(),
            to: l.clone(),
            kind: EdgeKind::Link,
        });
        parent.chain(links).collect()
    }

    /// `true` if this record has a direct parent or link edge to `other`.
    pub fn points_to(&self, other: &IdentityId) -> bool {
        self.parent.as_ref() == Some(other) || self.links.contains(other)
    }

    /// `true` if the identity accepts requesters from `domain`.
    pub fn approves_domain(&self, domain: &str) -> bool {
        self.trust_domain() == Some(domain)
            || self.approved_trust_domains.iter().any(|d| d == domain)
    }
}

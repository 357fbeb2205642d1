//! AgenticTrust: identity issuance and trust graph for software agents.
//!
//! Issues signed, revocable identities to agents, links them into a
//! directed trust graph partitioned by trust domain, verifies credentials
//! and graph connectivity, evaluates per-identity access policies and
//! answers domain-scoped discovery queries.

pub mod config;
pub mod credential;
pub mod crypto;
pub mod deadline;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod graph;
pub mod identity;
pub mod policy;
pub mod storage;
pub mod time;
pub mod verify;

// Re-export primary types
pub use config::EngineConfig;
pub use deadline::{CancelFlag, Deadline};
pub use engine::{Bounded, TrustEngine};
pub use error::{Result, TrustError};
pub use identity::{
    CredentialMaterial, CredentialState, Identity, IdentityId, Scope, ScopeConfig, TrustDomains,
};
pub use verify::Verifier;

// Re-export credential types
pub use credential::{CredentialClaims, CredentialIssuer, RevocationReason, RevokedRecord};

// Re-export graph and discovery types
pub use discovery::{Caller, DiscoveryFilter, DiscoveryIndex};
pub use graph::{Edge, EdgeKind, TrustGraph};

// Re-export policy types
pub use policy::{
    is_action_allowed, lookup_policy_by_code, Condition, Effect, Policy, PolicyDecision,
    PolicyDocument, PolicyField, RequestContext, Statement,
};

// Re-export storage types
pub use storage::{FileStore, IdentityStore, MemoryStore};

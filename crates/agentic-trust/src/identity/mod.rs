//! Identity records: ids, scopes, credential material and lifecycle state.
//!
//! An [`Identity`] is the durable record the store keeps for one agent.
//! It is created on issuance, replaced wholesale on reissue or revoke,
//! and never deleted.

pub mod id;
pub mod record;
pub mod scope;

pub use id::IdentityId;
pub use record::{CredentialMaterial, CredentialState, Identity};
pub use scope::{validate_name, Scope, ScopeConfig, TrustDomains};

//! The trust engine: one facade over store, issuer, graph, verifier,
//! policy engine and discovery.
//!
//! Every operation is available in two forms: directly on [`TrustEngine`]
//! (no time limit) and on the [`Bounded`] handle returned by
//! [`TrustEngine::within`], which carries a [`Deadline`].
//!
//! Mutations lock the identity id first, then (for name registration) the
//! `(scope, name)` namespace key. The deadline is checked once more right
//! before the record is written, so a timed-out call changes nothing.

pub mod locks;
mod mutate;
mod query;

use crate::config::EngineConfig;
use crate::credential::{CredentialIssuer, RevocationReason, RevokedRecord};
use crate::deadline::Deadline;
use crate::discovery::{Caller, DiscoveryFilter};
use crate::error::Result;
use crate::identity::{Identity, IdentityId, ScopeConfig, TrustDomains};
use crate::policy::{Policy, PolicyDecision, RequestContext};
use crate::storage::{IdentityStore, MemoryStore};
use crate::verify::Verifier;

use locks::LockTable;

/// The identity and trust-graph service.
pub struct TrustEngine<S: IdentityStore = MemoryStore> {
    store: S,
    issuer: CredentialIssuer,
    config: EngineConfig,
    ids: LockTable<IdentityId>,
    namespaces: LockTable<String>,
}

impl TrustEngine<MemoryStore> {
    /// In-memory engine with a fresh issuer key.
    pub fn in_memory(config: EngineConfig) -> Result<Self> {
        Self::new(MemoryStore::new(), CredentialIssuer::generate(), config)
    }
}

impl<S: IdentityStore> TrustEngine<S> {
    pub fn new(store: S, issuer: CredentialIssuer, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let poll = config.lock_poll_interval();
        log::debug!(
            "trust engine ready: {} trust domain(s), max graph depth {}",
            config.trust_domains.len(),
            config.max_graph_depth
        );
        Ok(Self {
            store,
            issuer,
            config,
            ids: LockTable::new(poll),
            namespaces: LockTable::new(poll),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn issuer(&self) -> &CredentialIssuer {
        &self.issuer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The whitelisted trust domains.
    pub fn whitelisted_domains(&self) -> &TrustDomains {
        &self.config.trust_domains
    }

    pub fn verifier(&self) -> Verifier<'_, S> {
        Verifier::new(&self.store, &self.issuer, self.config.max_graph_depth)
    }

    /// Run operations under `deadline`.
    pub fn within(&self, deadline: Deadline) -> Bounded<'_, S> {
        Bounded {
            engine: self,
            deadline,
        }
    }

    fn unbounded(&self) -> Bounded<'_, S> {
        self.within(Deadline::none())
    }

    // ── Issuer ────────────────────────────────────────────────────────────────

    pub fn issue(&self, name: &str, config: &ScopeConfig) -> Result<Identity> {
        self.unbounded().issue(name, config)
    }

    pub fn reissue(&self, id: &IdentityId, config: Option<&ScopeConfig>) -> Result<Identity> {
        self.unbounded().reissue(id, config)
    }

    pub fn revoke(&self, id: &IdentityId, reason: RevocationReason) -> Result<RevokedRecord> {
        self.unbounded().revoke(id, reason)
    }

    // ── Verifier ──────────────────────────────────────────────────────────────

    pub fn verify_identity(&self, identity: &Identity) -> bool {
        self.unbounded().verify_identity(identity)
    }

    pub fn verify_identity_id(&self, id: &IdentityId) -> bool {
        self.unbounded().verify_identity_id(id)
    }

    pub fn verify_credential(&self, token: &str) -> Result<Identity> {
        self.unbounded().verify_credential(token)
    }

    pub fn verify_identity_by_name(&self, name: &str, trust_domain: Option<&str>) -> bool {
        self.unbounded().verify_identity_by_name(name, trust_domain)
    }

    pub fn verify_requester(&self, target: &IdentityId, requester: &IdentityId) -> bool {
        self.unbounded().verify_requester(target, requester)
    }

    pub fn verify_connection(&self, from: &IdentityId, to: &IdentityId) -> bool {
        self.unbounded().verify_connection(from, to)
    }

    pub fn connection_path(
        &self,
        from: &IdentityId,
        to: &IdentityId,
    ) -> Result<Option<Vec<IdentityId>>> {
        self.unbounded().connection_path(from, to)
    }

    // ── Lookup & discovery ────────────────────────────────────────────────────

    pub fn get_identity(&self, id: &IdentityId) -> Result<Identity> {
        self.unbounded().get_identity(id)
    }

    pub fn get_identity_by_name(&self, name: &str, trust_domain: Option<&str>) -> Result<Identity> {
        self.unbounded().get_identity_by_name(name, trust_domain)
    }

    pub fn list_identities(&self) -> Result<Vec<Identity>> {
        self.unbounded().list_identities()
    }

    pub fn discover(&self, caller: &Caller, filter: Option<&DiscoveryFilter>) -> Result<Vec<Identity>> {
        self.unbounded().discover(caller, filter)
    }

    // ── Policy ────────────────────────────────────────────────────────────────

    pub fn get_policy(&self, id: &IdentityId) -> Result<Vec<Policy>> {
        self.unbounded().get_policy(id)
    }

    pub fn policy_decision(
        &self,
        id: &IdentityId,
        action: &str,
        context: Option<&RequestContext>,
    ) -> Result<PolicyDecision> {
        self.unbounded().policy_decision(id, action, context)
    }

    pub fn is_action_allowed_for(
        &self,
        id: &IdentityId,
        action: &str,
        context: Option<&RequestContext>,
    ) -> bool {
        self.unbounded().is_action_allowed_for(id, action, context)
    }
}

/// A [`TrustEngine`] borrowed together with a [`Deadline`].
pub struct Bounded<'a, S: IdentityStore> {
    engine: &'a TrustEngine<S>,
    deadline: Deadline,
}

impl<S: IdentityStore> Bounded<'_, S> {
    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }
}

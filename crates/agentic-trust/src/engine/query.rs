//! Verification, lookup, discovery and policy queries.

use crate::discovery::{Caller, DiscoveryFilter, DiscoveryIndex};
use crate::error::Result;
use crate::identity::{Identity, IdentityId};
use crate::policy::{evaluate, Policy, PolicyDecision, RequestContext};
use crate::storage::IdentityStore;

use super::Bounded;

impl<S: IdentityStore> Bounded<'_, S> {
    // ── Verifier ──────────────────────────────────────────────────────────────

    pub fn verify_identity(&self, identity: &Identity) -> bool {
        self.deadline.check("verify").is_ok() && self.engine.verifier().verify_identity(identity)
    }

    pub fn verify_identity_id(&self, id: &IdentityId) -> bool {
        self.deadline.check("verify").is_ok() && self.engine.verifier().verify_identity_id(id)
    }

    pub fn verify_credential(&self, token: &str) -> Result<Identity> {
        self.deadline.check("verify")?;
        self.engine.verifier().verify_credential(token)
    }

    pub fn verify_identity_by_name(&self, name: &str, trust_domain: Option<&str>) -> bool {
        self.deadline.check("verify").is_ok()
            && self
                .engine
                .verifier()
                .verify_identity_by_name(name, trust_domain)
    }

    pub fn verify_requester(&self, target: &IdentityId, requester: &IdentityId) -> bool {
        self.deadline.check("verify").is_ok()
            && self.engine.verifier().verify_requester(target, requester)
    }

    pub fn verify_connection(&self, from: &IdentityId, to: &IdentityId) -> bool {
        self.engine
            .verifier()
            .verify_connection(from, to, &self.deadline)
    }

    pub fn connection_path(
        &self,
        from: &IdentityId,
        to: &IdentityId,
    ) -> Result<Option<Vec<IdentityId>>> {
        self.engine
            .verifier()
            .connection_path(from, to, &self.deadline)
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    pub fn get_identity(&self, id: &IdentityId) -> Result<Identity> {
        self.deadline.check("get identity")?;
        log::debug!("get identity {id}");
        self.engine.store.require(id)
    }

    /// `trust_domain = None` looks in the global namespace.
    pub fn get_identity_by_name(&self, name: &str, trust_domain: Option<&str>) -> Result<Identity> {
        self.deadline.check("get identity")?;
        self.engine.verifier().find_by_name(name, trust_domain)
    }

    /// Every identity, ordered by name then id.
    pub fn list_identities(&self) -> Result<Vec<Identity>> {
        self.deadline.check("list identities")?;
        let mut all = self.engine.store.list()?;
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    // ── Discovery ─────────────────────────────────────────────────────────────

    /// Identities visible to `caller`, or with `filter`, the members of one
    /// domain visible to the filter's requestor.
    ///
    /// A caller or requestor that fails verification is not an error: the
    /// caller is treated as anonymous, the requestor gets an empty list.
    pub fn discover(&self, caller: &Caller, filter: Option<&DiscoveryFilter>) -> Result<Vec<Identity>> {
        self.deadline.check("discover")?;
        let engine = self.engine;
        let verifier = engine.verifier();
        let index = DiscoveryIndex::build(engine.store.list()?, engine.config.max_graph_depth);

        if let Some(filter) = filter {
            let requestor = match engine.store.get(&filter.requestor_identity)? {
                Some(r) if verifier.verify_identity(&r) => r,
                _ => {
                    log::warn!(
                        "discover: requestor {} did not verify",
                        filter.requestor_identity
                    );
                    return Ok(Vec::new());
                }
            };
            return index.in_domain_for(filter, &requestor, &self.deadline);
        }

        let authenticated = match caller {
            Caller::Anonymous => None,
            Caller::Identity(id) => engine
                .store
                .get(id)?
                .filter(|r| verifier.verify_identity(r)),
            Caller::Credential(token) => verifier.verify_credential(token).ok(),
        };
        if authenticated.is_none() && !matches!(caller, Caller::Anonymous) {
            log::warn!("discover: caller did not verify, treating as anonymous");
        }
        index.visible_to(authenticated.as_ref(), &self.deadline)
    }

    // ── Policy ────────────────────────────────────────────────────────────────

    /// Policies attached to `id` in attachment order.
    pub fn get_policy(&self, id: &IdentityId) -> Result<Vec<Policy>> {
        self.deadline.check("get policy")?;
        Ok(self.engine.store.require(id)?.policies)
    }

    /// Evaluate `action` against every policy of `id`. A revoked identity is
    /// denied without consulting its policies.
    pub fn policy_decision(
        &self,
        id: &IdentityId,
        action: &str,
        context: Option<&RequestContext>,
    ) -> Result<PolicyDecision> {
        self.deadline.check("policy check")?;
        let record = self.engine.store.require(id)?;
        if !record.is_active() {
            log::warn!("policy check for revoked {id}: {action} denied");
            return Ok(PolicyDecision::denied());
        }
        let decision = evaluate(&record.policies, action, context);
        log::debug!("policy check {id} {action}: allowed={}", decision.allowed);
        Ok(decision)
    }

    pub fn is_action_allowed_for(
        &self,
        id: &IdentityId,
        action: &str,
        context: Option<&RequestContext>,
    ) -> bool {
        self.policy_decision(id, action, context)
            .map(|d| d.allowed)
            .unwrap_or(false)
    }
}

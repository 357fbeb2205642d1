//! Verification: credential validity and graph connectivity.
//!
//! Credential checks, in order:
//! 1. Token shape and signature under the scope key it names
//! 2. A stored record for the token subject
//! 3. Record state (revoked identities never verify)
//! 4. Generation (older than the record's is stale, even if also expired)
//! 5. Expiry
//! 6. Exact match against the record's current credential, name and domain
//!
//! Connectivity is a directed, depth-bounded search over parent and link
//! edges. Boolean helpers fold every error into `false`.

use crate::credential::CredentialIssuer;
use crate::crypto::fingerprint;
use crate::deadline::Deadline;
use crate::error::{Result, TrustError};
use crate::graph::find_path;
use crate::identity::{Identity, IdentityId, Scope};
use crate::storage::IdentityStore;

/// Read-only view over a store and issuer that answers verification queries.
pub struct Verifier<'a, S: IdentityStore + ?Sized> {
    store: &'a S,
    issuer: &'a CredentialIssuer,
    max_depth: usize,
}

impl<'a, S: IdentityStore + ?Sized> Verifier<'a, S> {
    pub fn new(store: &'a S, issuer: &'a CredentialIssuer, max_depth: usize) -> Self {
        Self {
            store,
            issuer,
            max_depth,
        }
    }

    /// Verify a presented token and return the identity it belongs to.
    pub fn verify_credential(&self, token: &str) -> Result<Identity> {
        let claims = self.issuer.open(token)?;

        let record = self
            .store
            .get(&claims.sub)?
            .ok_or_else(|| TrustError::NotFound(format!("identity not found: {}", claims.sub)))?;

        if !record.is_active() {
            return Err(TrustError::Revoked(record.id.to_string()));
        }

        let current = record.credential.generation;
        if claims.generation < current {
            return Err(TrustError::CredentialStale {
                presented: claims.generation,
                current,
            });
        }
        if claims.is_expired(crate::time::now_micros()) {
            return Err(TrustError::CredentialInvalid(format!(
                "credential for {} expired",
                claims.sub
            )));
        }
        if claims.generation > current || fingerprint(token.as_bytes()) != record.credential.fingerprint
        {
            return Err(TrustError::CredentialInvalid(format!(
                "credential does not match record {}",
                record.id
            )));
        }
        if claims.name != record.name || claims.trust_domain.as_deref() != record.trust_domain() {
            return Err(TrustError::CredentialInvalid(format!(
                "credential scope does not match record {}",
                record.id
            )));
        }

        Ok(record)
    }

    /// Typed form of [`verify_identity`](Self::verify_identity).
    pub fn check_identity(&self, identity: &Identity) -> Result<Identity> {
        let record = self.verify_credential(&identity.credential.token)?;
        if record.id != identity.id {
            return Err(TrustError::CredentialInvalid(format!(
                "credential belongs to {}, not {}",
                record.id, identity.id
            )));
        }
        Ok(record)
    }

    /// `true` if `identity` carries a valid, current credential and is active.
    pub fn verify_identity(&self, identity: &Identity) -> bool {
        self.report(&identity.id, self.check_identity(identity))
    }

    /// Verify the stored record for `id` against its own credential.
    pub fn verify_identity_id(&self, id: &IdentityId) -> bool {
        let checked = self
            .store
            .require(id)
            .and_then(|record| self.check_identity(&record));
        self.report(id, checked)
    }

    /// Resolve `name` in the global namespace (`trust_domain = None`) or in
    /// the given domain, then verify it.
    pub fn verify_identity_by_name(&self, name: &str, trust_domain: Option<&str>) -> bool {
        match self.find_by_name(name, trust_domain) {
            Ok(record) => self.verify_identity(&record),
            Err(e) => {
                log::warn!("verify {name}: {e}");
                false
            }
        }
    }

    pub fn find_by_name(&self, name: &str, trust_domain: Option<&str>) -> Result<Identity> {
        let scope = match trust_domain {
            None => Scope::Global,
            Some(d) => Scope::Domain(d.trim().to_ascii_lowercase()),
        };
        self.store
            .find_by_name(&scope, name)?
            .ok_or_else(|| TrustError::NotFound(format!("no identity named {name} in {scope}")))
    }

    /// `true` if both identities verify and `requester` may act towards
    /// `target`: the requester is global, shares the target's domain, or
    /// comes from a domain the target approved.
    pub fn verify_requester(&self, target: &IdentityId, requester: &IdentityId) -> bool {
        let (Ok(target_rec), Ok(requester_rec)) = (self.store.require(target), self.store.require(requester))
        else {
            log::warn!("verify requester {requester} -> {target}: unknown identity");
            return false;
        };
        if !self.verify_identity(&target_rec) || !self.verify_identity(&requester_rec) {
            return false;
        }
        let allowed = match requester_rec.trust_domain() {
            None => true,
            Some(domain) => target_rec.approves_domain(domain),
        };
        if !allowed {
            log::warn!(
                "requester {requester} from {} not approved by {target}",
                requester_rec.scope
            );
        }
        allowed
    }

    /// Shortest directed path `from → to`, if one exists within the depth
    /// bound. Both endpoints must exist.
    pub fn connection_path(
        &self,
        from: &IdentityId,
        to: &IdentityId,
        deadline: &Deadline,
    ) -> Result<Option<Vec<IdentityId>>> {
        self.store.require(from)?;
        self.store.require(to)?;
        log::debug!("searching {from} -> {to} (max depth {})", self.max_depth);

        find_path(from, to, self.max_depth, deadline, |node| {
            Ok(self
                .store
                .get(node)?
                .map(|r| r.outbound_edges().into_iter().map(|e| e.to).collect())
                .unwrap_or_default())
        })
    }

    /// `true` iff a directed path `from → to` exists within the depth bound.
    pub fn verify_connection(&self, from: &IdentityId, to: &IdentityId, deadline: &Deadline) -> bool {
        match self.connection_path(from, to, deadline) {
            Ok(path) => path.is_some(),
            Err(e) => {
                log::warn!("connection {from} -> {to}: {e}");
                false
            }
        }
    }

    fn report(&self, id: &IdentityId, checked: Result<Identity>) -> bool {
        match checked {
            Ok(_) => true,
            Err(e) => {
                log::warn!("verification of {id} failed: {e}");
                false
            }
        }
    }
}

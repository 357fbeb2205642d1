//! Issue, reissue and revoke.

use crate::credential::{RevocationReason, RevokedRecord};
use crate::error::{Result, TrustError};
use crate::identity::{
    validate_name, CredentialState, Identity, IdentityId, Scope, ScopeConfig,
};
use crate::policy::{Policy, PolicyDocument};
use crate::storage::IdentityStore;

use super::Bounded;

/// A scope configuration after validation against the whitelist and store.
struct Resolved {
    scope: Scope,
    parent: Option<IdentityId>,
    links: Vec<IdentityId>,
    approved: Vec<String>,
    policies: Option<Vec<PolicyDocument>>,
}

fn namespace_key(scope: &Scope, name: &str) -> String {
    format!("{scope}/{name}")
}

fn attach_all(id: &IdentityId, documents: Vec<PolicyDocument>) -> Vec<Policy> {
    documents
        .into_iter()
        .enumerate()
        .map(|(i, doc)| Policy::attach(id, doc, i))
        .collect()
}

impl<S: IdentityStore> Bounded<'_, S> {
    /// Validate `config` in the documented order. `subject` is the identity
    /// being reissued, if any, and may not be its own parent or link.
    fn resolve(&self, config: &ScopeConfig, subject: Option<&IdentityId>) -> Result<Resolved> {
        let engine = self.engine;
        let domains = &engine.config.trust_domains;

        let scope = config.resolve_scope(domains)?;
        let links = config.unique_links();

        if let Some(me) = subject {
            if config.parent_identity.as_ref() == Some(me) {
                return Err(TrustError::Validation(format!("{me} cannot be its own parent")));
            }
            if links.contains(me) {
                return Err(TrustError::Validation(format!("{me} cannot link to itself")));
            }
        }

        if let Some(parent) = &config.parent_identity {
            match engine.store.get(parent)? {
                None => {
                    return Err(TrustError::Validation(format!(
                        "parent identity not found: {parent}"
                    )))
                }
                Some(p) if !p.is_active() => {
                    return Err(TrustError::Validation(format!(
                        "parent identity is revoked: {parent}"
                    )))
                }
                Some(_) => {}
            }
        }

        for target in &links {
            if !engine.store.contains(target)? {
                return Err(TrustError::Validation(format!(
                    "link target not found: {target}"
                )));
            }
        }

        let approved = config.resolve_approved_domains(domains)?;
        if let Some(docs) = &config.policies {
            for doc in docs {
                doc.validate()?;
            }
        }

        Ok(Resolved {
            scope,
            parent: config.parent_identity.clone(),
            links,
            approved,
            policies: config.policies.clone(),
        })
    }

    /// Issue a new identity named `name`.
    pub fn issue(&self, name: &str, config: &ScopeConfig) -> Result<Identity> {
        let engine = self.engine;
        let resolved = self.resolve(config, None)?;
        validate_name(name)?;

        let _ns = engine
            .namespaces
            .acquire(&namespace_key(&resolved.scope, name), &self.deadline)?;
        if engine.store.find_by_name(&resolved.scope, name)?.is_some() {
            return Err(TrustError::Validation(format!(
                "name {name} already taken in {}",
                resolved.scope
            )));
        }

        let id = IdentityId::generate(name, resolved.scope.trust_domain());
        let credential =
            engine
                .issuer
                .mint(&id, name, &resolved.scope, 1, engine.config.credential_ttl())?;
        let documents = resolved
            .policies
            .unwrap_or_else(|| vec![engine.config.default_policy.clone()]);
        let now = crate::time::now_micros();

        let identity = Identity {
            policies: attach_all(&id, documents),
            id,
            name: name.to_string(),
            scope: resolved.scope,
            state: CredentialState::Active,
            credential,
            parent: resolved.parent,
            links: resolved.links,
            approved_trust_domains: resolved.approved,
            created_at: now,
            updated_at: now,
            revocation: None,
            revocation_history: Vec::new(),
        };

        self.deadline.check("issue")?;
        engine.store.put(&identity)?;
        log::info!(
            "issued {} ({}) in {}",
            identity.id,
            identity.name,
            identity.scope
        );
        Ok(identity)
    }

    /// Mint a fresh credential for `id`, optionally replacing its scope,
    /// parent, links, approved domains and policies. Reactivates a revoked
    /// identity.
    pub fn reissue(&self, id: &IdentityId, config: Option<&ScopeConfig>) -> Result<Identity> {
        let engine = self.engine;
        let _lock = engine.ids.acquire(id, &self.deadline)?;
        let current = engine.store.require(id)?;
        let mut next = current.clone();

        let mut _ns = None;
        if let Some(config) = config {
            let resolved = self.resolve(config, Some(id))?;

            if resolved.scope != current.scope {
                _ns = Some(
                    engine
                        .namespaces
                        .acquire(&namespace_key(&resolved.scope, &current.name), &self.deadline)?,
                );
                if let Some(other) = engine.store.find_by_name(&resolved.scope, &current.name)? {
                    if &other.id != id {
                        return Err(TrustError::Validation(format!(
                            "name {} already taken in {}",
                            current.name, resolved.scope
                        )));
                    }
                }
            }

            next.scope = resolved.scope;
            next.parent = resolved.parent;
            next.links = resolved.links;
            next.approved_trust_domains = resolved.approved;
            if let Some(documents) = resolved.policies {
                next.policies = attach_all(id, documents);
            }
        }

        next.credential = engine.issuer.mint(
            id,
            &next.name,
            &next.scope,
            current.credential.generation + 1,
            engine.config.credential_ttl(),
        )?;
        if let Some(revocation) = next.revocation.take() {
            next.revocation_history.push(revocation);
        }
        next.state = CredentialState::Active;
        next.updated_at = crate::time::now_micros();

        self.deadline.check("reissue")?;
        engine.store.put(&next)?;
        log::info!(
            "reissued {} at generation {}",
            next.id,
            next.credential.generation
        );
        Ok(next)
    }

    /// Revoke `id`. Revoking an already revoked identity returns the
    /// existing record unchanged.
    pub fn revoke(&self, id: &IdentityId, reason: RevocationReason) -> Result<RevokedRecord> {
        let engine = self.engine;
        let _lock = engine.ids.acquire(id, &self.deadline)?;
        let current = engine.store.require(id)?;

        if let Some(existing) = &current.revocation {
            log::debug!("{id} already revoked");
            return Ok(existing.clone());
        }

        let key = engine.issuer.revocation_key()?;
        let record = RevokedRecord::create(id.clone(), current.credential.generation, reason, &key);

        let mut next = current;
        next.state = CredentialState::Revoked;
        next.revocation = Some(record.clone());
        next.updated_at = record.revoked_at;

        self.deadline.check("revoke")?;
        engine.store.put(&next)?;
        log::info!("revoked {id}: {}", record.reason.as_str());
        Ok(record)
    }
}

//! Identity scope: global vs. trust-domain scoped, the domain whitelist,
//! and the caller-supplied scope configuration for issue/reissue.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::policy::PolicyDocument;

use super::IdentityId;

const MAX_NAME_LEN: usize = 128;

/// The whitelisted trust domains. Loaded once and injected into the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustDomains(BTreeSet<String>);

impl TrustDomains {
    pub fn new<I, D>(domains: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<str>,
    {
        Self(
            domains
                .into_iter()
                .map(|d| normalize_domain(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated list (the `ATRUST_TRUST_DOMAINS` format).
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.0.contains(&normalize_domain(domain))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate `domain` against the whitelist and return its normalized form.
    pub fn require(&self, domain: &str) -> Result<String> {
        let normalized = normalize_domain(domain);
        if normalized.is_empty() {
            return Err(TrustError::Validation("trust domain is empty".into()));
        }
        if !self.0.contains(&normalized) {
            return Err(TrustError::Validation(format!(
                "trust domain not whitelisted: {normalized}"
            )));
        }
        Ok(normalized)
    }
}

fn normalize_domain(domain: &str) -> String {
    domain.trim().to_ascii_lowercase()
}

/// Where an identity lives. Names are unique per scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "trust_domain", rename_all = "snake_case")]
pub enum Scope {
    Global,
    Domain(String),
}

impl Scope {
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    pub fn trust_domain(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Domain(d) => Some(d.as_str()),
        }
    }

    /// Key id for the scope's credential signing key, also used as the
    /// namespace lock key.
    pub fn key_id(&self) -> &str {
        match self {
            Self::Global => crate::crypto::derivation::GLOBAL_KEY_ID,
            Self::Domain(d) => d.as_str(),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Domain(d) => write!(f, "domain:{d}"),
        }
    }
}

/// Reject names that cannot serve as a display name or path segment.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TrustError::Validation("identity name is empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(TrustError::Validation(format!(
            "identity name longer than {MAX_NAME_LEN} bytes"
        )));
    }
    if name.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(TrustError::Validation(format!(
            "identity name may not contain whitespace or '/': {name:?}"
        )));
    }
    Ok(())
}

/// Scope configuration supplied on issue and (optionally) on reissue.
///
/// Field names follow the wire shape used by callers
/// (`isGlobalIdentity`, `trustDomain`, `parentIdentity`, `linkTo`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeConfig {
    #[serde(default)]
    pub is_global_identity: bool,
    #[serde(default)]
    pub trust_domain: Option<String>,
    #[serde(default)]
    pub parent_identity: Option<IdentityId>,
    #[serde(default)]
    pub link_to: Vec<IdentityId>,
    #[serde(default)]
    pub approved_trust_domains: Vec<String>,
    /// `None` attaches the configured default policy on issue and keeps
    /// the existing set on reissue.
    #[serde(default)]
    pub policies: Option<Vec<PolicyDocument>>,
}

impl ScopeConfig {
    pub fn global() -> Self {
        Self {
            is_global_identity: true,
            ..Self::default()
        }
    }

    pub fn domain(trust_domain: impl Into<String>) -> Self {
        Self {
            is_global_identity: false,
            trust_domain: Some(trust_domain.into()),
            ..Self::default()
        }
    }

    pub fn parent(mut self, parent: IdentityId) -> Self {
        self.parent_identity = Some(parent);
        self
    }

    pub fn link(mut self, target: IdentityId) -> Self {
        self.link_to.push(target);
        self
    }

    pub fn links(mut self, targets: impl IntoIterator<Item = IdentityId>) -> Self {
        self.link_to.extend(targets);
        self
    }

    pub fn approve_domain(mut self, domain: impl Into<String>) -> Self {
        self.approved_trust_domains.push(domain.into());
        self
    }

    pub fn policy(mut self, document: PolicyDocument) -> Self {
        self.policies.get_or_insert_with(Vec::new).push(document);
        self
    }

    /// Resolve the scope flag and domain into a [`Scope`].
    ///
    /// Rules (checked in order): a global identity may not name a trust
    /// domain; a scoped identity must name a whitelisted one.
    pub fn resolve_scope(&self, domains: &TrustDomains) -> Result<Scope> {
        match (self.is_global_identity, self.trust_domain.as_deref()) {
            (true, Some(d)) => Err(TrustError::Validation(format!(
                "conflicting scope: global identity cannot have trust domain {d}"
            ))),
            (true, None) => Ok(Scope::Global),
            (false, None) => Err(TrustError::Validation(
                "domain-scoped identity requires a trust domain".into(),
            )),
            (false, Some(d)) => Ok(Scope::Domain(domains.require(d)?)),
        }
    }

    /// Normalize and whitelist-check the approved domains, dropping duplicates.
    pub fn resolve_approved_domains(&self, domains: &TrustDomains) -> Result<Vec<String>> {
        let mut out: Vec<String> = Vec::new();
        for d in &self.approved_trust_domains {
            let d = domains.require(d)?;
            if !out.contains(&d) {
                out.push(d);
            }
        }
        Ok(out)
    }

    /// Link targets in first-seen order without duplicates.
    pub fn unique_links(&self) -> Vec<IdentityId> {
        let mut out: Vec<IdentityId> = Vec::new();
        for id in &self.link_to {
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
        out
    }
}

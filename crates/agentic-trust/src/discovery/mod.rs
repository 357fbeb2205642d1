//! Discovery index: which identities a caller may see.
//!
//! Without a filter a caller sees every active global identity, plus the
//! domain-scoped identities that share its domain, approve its domain, or
//! share a direct edge with it. With a [`DiscoveryFilter`] the result is
//! restricted to one domain and decided by the requestor's domain and
//! graph connectivity. Empty results are never an error.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::deadline::Deadline;
use crate::error::{Result, TrustError};
use crate::graph::TrustGraph;
use crate::identity::{Identity, IdentityId};

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Caller {
    /// Unauthenticated; sees global identities only.
    Anonymous,
    /// An identity id; authenticated by verifying the stored record.
    Identity(IdentityId),
    /// A presented credential token.
    Credential(String),
}

/// Restrict discovery to one domain, as seen by one requestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryFilter {
    pub trust_domain: String,
    pub requestor_identity: IdentityId,
    #[serde(default)]
    pub include_revoked: bool,
}

impl DiscoveryFilter {
    pub fn new(trust_domain: impl Into<String>, requestor_identity: IdentityId) -> Self {
        Self {
            trust_domain: trust_domain.into(),
            requestor_identity,
            include_revoked: false,
        }
    }

    pub fn include_revoked(mut self) -> Self {
        self.include_revoked = true;
        self
    }
}

/// A point-in-time index over every record plus the graph derived from them.
pub struct DiscoveryIndex {
    records: HashMap<IdentityId, Identity>,
    graph: TrustGraph,
    max_depth: usize,
}

impl DiscoveryIndex {
    pub fn build(records: Vec<Identity>, max_depth: usize) -> Self {
        let graph = TrustGraph::from_identities(&records);
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            graph,
            max_depth,
        }
    }

    pub fn graph(&self) -> &TrustGraph {
        &self.graph
    }

    /// Identities visible to an authenticated caller (`None` = anonymous).
    pub fn visible_to(&self, caller: Option<&Identity>, deadline: &Deadline) -> Result<Vec<Identity>> {
        deadline.check("discover")?;
        let out = self
            .records
            .values()
            .filter(|c| c.is_active())
            .filter(|c| match (c.trust_domain(), caller) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(domain), Some(me)) => {
                    me.trust_domain() == Some(domain)
                        || me.trust_domain().is_some_and(|d| c.approves_domain(d))
                        || self.graph.directly_linked(&me.id, &c.id)
                }
            })
            .cloned()
            .collect();
        Ok(sorted(out))
    }

    /// Identities in `filter.trust_domain` the verified `requestor` may see.
    ///
    /// A candidate is kept when the requestor belongs to that domain or is
    /// connected to the candidate in either direction. A search that hits
    /// the depth bound counts as not connected.
    pub fn in_domain_for(
        &self,
        filter: &DiscoveryFilter,
        requestor: &Identity,
        deadline: &Deadline,
    ) -> Result<Vec<Identity>> {
        let domain = filter.trust_domain.trim().to_ascii_lowercase();
        let same_domain = requestor.trust_domain() == Some(domain.as_str());

        let mut out = Vec::new();
        for id in self.graph.domain_members(&domain) {
            let Some(candidate) = self.records.get(id) else {
                continue;
            };
            if !candidate.is_active() && !filter.include_revoked {
                continue;
            }
            if same_domain || self.connected(&requestor.id, id, deadline)? {
                out.push(candidate.clone());
            }
        }
        log::debug!(
            "discover in {domain} for {}: {} result(s)",
            requestor.id,
            out.len()
        );
        Ok(sorted(out))
    }

    fn connected(&self, a: &IdentityId, b: &IdentityId, deadline: &Deadline) -> Result<bool> {
        match self.graph.connected_either_way(a, b, self.max_depth, deadline) {
            Ok(found) => Ok(found),
            Err(TrustError::GraphDepthExceeded(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn sorted(mut identities: Vec<Identity>) -> Vec<Identity> {
    identities.sort_by(|a, b| match a.name.cmp(&b.name) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
    identities
}

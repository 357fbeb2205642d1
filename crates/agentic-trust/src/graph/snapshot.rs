//! An in-memory view of the trust graph built from a set of records.

use std::collections::{BTreeSet, HashMap};

use crate::deadline::Deadline;
use crate::error::{Result, TrustError};
use crate::identity::{Identity, IdentityId};

use super::{find_path, Edge};

/// Adjacency built from identity records, with inbound edges indexed too.
#[derive(Debug, Default)]
pub struct TrustGraph {
    outbound: HashMap<IdentityId, Vec<Edge>>,
    inbound: HashMap<IdentityId, Vec<Edge>>,
    domains: HashMap<String, BTreeSet<IdentityId>>,
}

impl TrustGraph {
    pub fn from_identities<'a, I>(identities: I) -> Self
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        let mut graph = Self::default();
        for identity in identities {
            for edge in identity.outbound_edges() {
                graph
                    .inbound
                    .entry(edge.to.clone())
                    .or_default()
                    .push(edge.clone());
                graph
                    .outbound
                    .entry(edge.from.clone())
                    .or_default()
                    .push(edge);
            }
            if let Some(domain) = identity.trust_domain() {
                graph
                    .domains
                    .entry(domain.to_string())
                    .or_default()
                    .insert(identity.id.clone());
            }
        }
        graph
    }

    pub fn outbound(&self, id: &IdentityId) -> &[Edge] {
        self.outbound.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn inbound(&self, id: &IdentityId) -> &[Edge] {
        self.inbound.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Ids of the identities scoped to `domain`.
    pub fn domain_members(&self, domain: &str) -> impl Iterator<Item = &IdentityId> {
        self.domains.get(domain).into_iter().flatten()
    }

    pub fn edge_count(&self) -> usize {
        self.outbound.values().map(Vec::len).sum()
    }

    /// `true` if `a` and `b` share an edge in either direction.
    pub fn directly_linked(&self, a: &IdentityId, b: &IdentityId) -> bool {
        self.outbound(a).iter().any(|e| &e.to == b) || self.outbound(b).iter().any(|e| &e.to == a)
    }

    /// Directed shortest path along outbound edges.
    pub fn path(
        &self,
        from: &IdentityId,
        to: &IdentityId,
        max_depth: usize,
        deadline: &Deadline,
    ) -> Result<Option<Vec<IdentityId>>> {
        find_path(from, to, max_depth, deadline, |n| {
            Ok(self.outbound(n).iter().map(|e| e.to.clone()).collect())
        })
    }

    /// `true` if a directed path exists from `a` to `b` or from `b` to `a`.
    ///
    /// A direction that hits the depth bound counts as not found there;
    /// `GraphDepthExceeded` is returned only when neither direction finds
    /// a path and at least one was truncated.
    pub fn connected_either_way(
        &self,
        a: &IdentityId,
        b: &IdentityId,
        max_depth: usize,
        deadline: &Deadline,
    ) -> Result<bool> {
        let mut truncated = false;
        for (from, to) in [(a, b), (b, a)] {
            match self.path(from, to, max_depth, deadline) {
                Ok(Some(_)) => return Ok(true),
                Ok(None) => {}
                Err(TrustError::GraphDepthExceeded(_)) => truncated = true,
                Err(e) => return Err(e),
            }
        }
        if truncated {
            return Err(TrustError::GraphDepthExceeded(max_depth));
        }
        Ok(false)
    }
}

//! Trust-graph edges.

use serde::{Deserialize, Serialize};

use crate::identity::IdentityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Child to the parent that vouched for it at issuance.
    Parent,
    /// Explicit link.
    Link,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Link => "link",
        }
    }
}

/// A directed edge `from → to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: IdentityId,
    pub to: IdentityId,
    pub kind: EdgeKind,
}

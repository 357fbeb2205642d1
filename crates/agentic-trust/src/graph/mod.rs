//! Trust graph: directed parent/link edges between identities.
//!
//! Edges are never stored on their own; they are derived from identity
//! records ([`crate::Identity::outbound_edges`]). Searches are
//! breadth-first, cycle-safe and bounded by a maximum depth.

pub mod edge;
pub mod reachability;
pub mod snapshot;

pub use edge::{Edge, EdgeKind};
pub use reachability::find_path;
pub use snapshot::TrustGraph;

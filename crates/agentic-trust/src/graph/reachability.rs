//! Bounded breadth-first reachability.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::deadline::Deadline;
use crate::error::{Result, TrustError};
use crate::identity::IdentityId;

/// Find a shortest directed path `from → … → to`.
///
/// `neighbours` returns the outbound neighbours of a node. A path may have
/// at most `max_depth` edges. Returns:
/// - `Ok(Some(path))` with both endpoints included;
/// - `Ok(None)` when the search space is exhausted without reaching `to`;
/// - `Err(GraphDepthExceeded)` when unexplored nodes remain at the bound.
///
/// The deadline is checked before each level.
pub fn find_path<F>(
    from: &IdentityId,
    to: &IdentityId,
    max_depth: usize,
    deadline: &Deadline,
    mut neighbours: F,
) -> Result<Option<Vec<IdentityId>>>
where
    F: FnMut(&IdentityId) -> Result<Vec<IdentityId>>,
{
    if from == to {
        return Ok(Some(vec![from.clone()]));
    }

    let mut visited: HashSet<IdentityId> = HashSet::new();
    let mut came_from: HashMap<IdentityId, IdentityId> = HashMap::new();
    let mut frontier: VecDeque<IdentityId> = VecDeque::new();
    visited.insert(from.clone());
    frontier.push_back(from.clone());

    for depth in 0..max_depth {
        if frontier.is_empty() {
            return Ok(None);
        }
        deadline.check("graph search")?;

        let mut next = VecDeque::new();
        while let Some(node) = frontier.pop_front() {
            for n in neighbours(&node)? {
                if !visited.insert(n.clone()) {
                    continue;
                }
                came_from.insert(n.clone(), node.clone());
                if &n == to {
                    log::debug!("path {from} -> {to} found at depth {}", depth + 1);
                    return Ok(Some(rebuild(&came_from, from, to)));
                }
                next.push_back(n);
            }
        }
        frontier = next;
    }

    // Only a frontier that still leads somewhere new counts as truncated.
    for node in &frontier {
        if neighbours(node)?.iter().any(|n| !visited.contains(n)) {
            log::debug!("path {from} -> {to} unresolved at depth {max_depth}");
            return Err(TrustError::GraphDepthExceeded(max_depth));
        }
    }
    Ok(None)
}

fn rebuild(
    came_from: &HashMap<IdentityId, IdentityId>,
    from: &IdentityId,
    to: &IdentityId,
) -> Vec<IdentityId> {
    let mut path = vec![to.clone()];
    let mut cur = to;
    while cur != from {
        match came_from.get(cur) {
            Some(prev) => {
                path.push(prev.clone());
                cur = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

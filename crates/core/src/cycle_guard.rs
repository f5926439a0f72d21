//! Cycle gate for proposed edges.
//!
//! Decides, before anything is committed, whether the edge `source -> target`
//! would close a directed cycle. The proposed edge is never inserted: the
//! traversal starts at `source` and follows it as a virtual first arc, then
//! walks existing edges only.
//!
//! # Algorithm
//!
//! Iterative depth-first search with an explicit frame stack:
//! - `visited`: nodes already entered (never re-entered)
//! - `on_path`: nodes on the active path (the recursion stack)
//!
//! Reaching a successor that is still on the path is a back edge, i.e. a cycle.
//! Because the existing edge set is acyclic, any such cycle runs through the
//! virtual arc, so this covers both the reciprocal `target -> source` case and
//! longer paths back to `source`.
//!
//! # Complexity
//!
//! - Time: O(V + E) per proposed edge
//! - Space: O(V) for the frame stack and sets

use std::collections::{HashMap, HashSet};
use std::vec::IntoIter;

use crate::ids::NodeId;
use crate::model::Edge;

/// Returns `true` if admitting `source -> target` would create a cycle.
///
/// ```
/// use dagsmith_core::{cycle_guard, Edge};
///
/// let edges = vec![
///     Edge::new("a".into(), "b".into()),
///     Edge::new("b".into(), "c".into()),
/// ];
/// assert!(cycle_guard::would_create_cycle(&edges, &"c".into(), &"a".into()));
/// assert!(!cycle_guard::would_create_cycle(&edges, &"a".into(), &"c".into()));
/// ```
#[must_use]
pub fn would_create_cycle<'a, I>(edges: I, source: &'a NodeId, target: &'a NodeId) -> bool
where
    I: IntoIterator<Item = &'a Edge>,
{
    closing_cycle(edges, source, target).is_some()
}

/// The cycle `source -> target -> ... -> source` that admitting the edge would
/// close, or `None` if the edge is safe.
///
/// The returned path starts and ends with the same node.
#[must_use]
pub fn closing_cycle<'a, I>(edges: I, source: &'a NodeId, target: &'a NodeId) -> Option<Vec<NodeId>>
where
    I: IntoIterator<Item = &'a Edge>,
{
    let mut adjacency: HashMap<&'a NodeId, Vec<&'a NodeId>> = HashMap::new();
    for edge in edges {
        adjacency.entry(&edge.source).or_default().push(&edge.target);
    }

    let successors = |node: &'a NodeId| -> IntoIter<&'a NodeId> {
        let mut next: Vec<&'a NodeId> = Vec::new();
        if node == source {
            next.push(target);
        }
        if let Some(existing) = adjacency.get(node) {
            next.extend(existing.iter().copied());
        }
        next.into_iter()
    };

    let mut visited: HashSet<&'a NodeId> = HashSet::new();
    let mut on_path: HashSet<&'a NodeId> = HashSet::new();
    let mut stack: Vec<(&'a NodeId, IntoIter<&'a NodeId>)> = Vec::new();

    visited.insert(source);
    on_path.insert(source);
    stack.push((source, successors(source)));

    loop {
        let Some((node, pending)) = stack.last_mut() else {
            return None;
        };
        let node: &'a NodeId = *node;
        let step = pending.next();

        match step {
            Some(next) if on_path.contains(next) => {
                let mut path: Vec<NodeId> = stack
                    .iter()
                    .map(|(on_stack, _)| *on_stack)
                    .skip_while(|on_stack| *on_stack != next)
                    .cloned()
                    .collect();
                path.push(next.clone());
                return Some(path);
            }
            Some(next) => {
                if visited.insert(next) {
                    on_path.insert(next);
                    stack.push((next, successors(next)));
                }
            }
            None => {
                on_path.remove(node);
                stack.pop();
            }
        }
    }
}

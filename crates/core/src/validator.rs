//! Whole-graph validity diagnostics.
//!
//! Validity is weaker than the store's hard invariants and is never enforced:
//! a graph may be invalid while it is being edited. Every check runs and adds
//! its own reasons, in this order:
//!
//! 1. too few nodes
//! 2. self-loop edges (one reason per offending edge)
//! 3. nodes touched by no edge (one reason per node)
//! 4. a cycle anywhere in the graph (at most one reason)

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::slice::Iter;

use serde::{Serialize, Serializer};
use tracing::trace;

use crate::model::{Edge, Node};

/// Minimum node count a valid graph needs unless configured otherwise.
pub const DEFAULT_MIN_NODES: usize = 2;

/// One reason a graph is not a valid DAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    TooFewNodes { required: usize },
    SelfLoop,
    NotConnected { node: String },
    CycleDetected,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewNodes { required } => write!(f, "At least {required} nodes required."),
            Self::SelfLoop => f.write_str("Self-loops are not allowed."),
            Self::NotConnected { node } => write!(f, "Node \"{node}\" is not connected."),
            Self::CycleDetected => f.write_str("Cycle detected."),
        }
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Verdict of a validation pass: `valid` iff there are no reasons.
///
/// Serializes as `{"valid": bool, "reasons": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    valid: bool,
    reasons: Vec<Violation>,
}

impl ValidationReport {
    #[must_use]
    pub fn from_violations(reasons: Vec<Violation>) -> Self {
        Self {
            valid: reasons.is_empty(),
            reasons,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.reasons
    }

    /// Human-readable reasons, in check order.
    #[must_use]
    pub fn reasons(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }

    pub fn iter(&self) -> Iter<'_, Violation> {
        self.reasons.iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Violation;
    type IntoIter = Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.reasons.iter()
    }
}

/// Validates with the default minimum of two nodes.
#[must_use]
pub fn validate<'a, N, E>(nodes: N, edges: E) -> ValidationReport
where
    N: IntoIterator<Item = &'a Node>,
    E: IntoIterator<Item = &'a Edge>,
{
    validate_with_minimum(nodes, edges, DEFAULT_MIN_NODES)
}

/// Validates a raw node/edge set, trusting nothing about how it was built.
#[must_use]
pub fn validate_with_minimum<'a, N, E>(nodes: N, edges: E, min_nodes: usize) -> ValidationReport
where
    N: IntoIterator<Item = &'a Node>,
    E: IntoIterator<Item = &'a Edge>,
{
    let nodes: Vec<&Node> = nodes.into_iter().collect();
    let edges: Vec<&Edge> = edges.into_iter().collect();
    let mut reasons = Vec::new();

    if nodes.len() < min_nodes {
        reasons.push(Violation::TooFewNodes {
            required: min_nodes,
        });
    }

    reasons.extend(
        edges
            .iter()
            .filter(|edge| edge.is_self_loop())
            .map(|_| Violation::SelfLoop),
    );

    reasons.extend(
        nodes
            .iter()
            .filter(|node| !edges.iter().any(|edge| edge.touches(&node.id)))
            .map(|node| Violation::NotConnected {
                node: node.display_name().to_string(),
            }),
    );

    if has_cycle(&nodes, &edges) {
        reasons.push(Violation::CycleDetected);
    }

    trace!(
        nodes = nodes.len(),
        edges = edges.len(),
        violations = reasons.len(),
        "Validated graph"
    );

    ValidationReport::from_violations(reasons)
}

/// Depth-first search from every unvisited node; stops at the first back edge.
fn has_cycle(nodes: &[&Node], edges: &[&Edge]) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = nodes
        .iter()
        .map(|node| (node.id.as_str(), Vec::new()))
        .collect();
    for edge in edges {
        if let Some(targets) = adjacency.get_mut(edge.source.as_str()) {
            targets.push(edge.target.as_str());
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_path: HashSet<&str> = HashSet::new();

    for root in nodes.iter().map(|node| node.id.as_str()) {
        if !visited.insert(root) {
            continue;
        }
        on_path.insert(root);
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

        while let Some((node, cursor)) = stack.last_mut() {
            let node: &str = *node;
            let next = adjacency
                .get(node)
                .and_then(|targets| targets.get(*cursor))
                .copied();
            *cursor = cursor.saturating_add(1);

            match next {
                Some(target) if on_path.contains(target) => return true,
                Some(target) => {
                    if visited.insert(target) {
                        on_path.insert(target);
                        stack.push((target, 0));
                    }
                }
                None => {
                    on_path.remove(node);
                    stack.pop();
                }
            }
        }
    }

    false
}

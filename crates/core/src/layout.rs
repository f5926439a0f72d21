//! # Layered auto-layout
//!
//! One-shot positioning of every node:
//!
//! 1. Pick the edge set to layer. By default this is a synthesized chain over
//!    the nodes in their current order (`n0 -> n1 -> n2 -> ...`), which also
//!    replaces the real edges in the result.
//! 2. Rank every node by its longest-path distance from a source, walking a
//!    topological order of the layered edges.
//! 3. Place ranks along the primary axis (`rank * rank_spacing`) and spread
//!    nodes sharing a rank along the other axis, centred on the rank line.
//! 4. Convert each anchor to the top-left corner of the node's box.

use std::collections::{BTreeMap, HashMap};

use im::Vector;
use itertools::Itertools;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{info, warn};

use crate::config::{ChainPolicy, LayoutConfig, RankDirection};
use crate::ids::NodeId;
use crate::model::{Edge, Node, Position};

/// Nodes with their new positions plus the edge set callers must adopt.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub nodes: Vector<Node>,
    /// Authoritative post-layout edges (the synthesized chain when one was used).
    pub edges: Vector<Edge>,
    /// Rank of every laid-out node. Empty when layout was skipped.
    pub ranks: BTreeMap<NodeId, usize>,
    /// True if `edges` is a synthesized chain rather than the input edges.
    pub synthesized: bool,
}

impl LayoutResult {
    #[must_use]
    pub fn rank_of(&self, id: &NodeId) -> Option<usize> {
        self.ranks.get(id).copied()
    }

    fn unchanged(nodes: &Vector<Node>, edges: &Vector<Edge>) -> Self {
        Self {
            nodes: nodes.clone(),
            edges: edges.clone(),
            ranks: BTreeMap::new(),
            synthesized: false,
        }
    }
}

/// Lays out `nodes` according to `config`.
///
/// Fewer than two nodes are returned unchanged.
///
/// ```
/// use dagsmith_core::{layout, GraphStore, LayoutConfig};
///
/// let mut store = GraphStore::new();
/// let a = store.add_node("A");
/// let b = store.add_node("B");
/// let snapshot = store.snapshot();
/// let result = layout::layout(&snapshot.nodes, &snapshot.edges, &LayoutConfig::default());
///
/// assert_eq!(result.rank_of(&a), Some(0));
/// assert_eq!(result.rank_of(&b), Some(1));
/// assert_eq!(result.edges.len(), 1);
/// ```
#[must_use]
pub fn layout(nodes: &Vector<Node>, edges: &Vector<Edge>, config: &LayoutConfig) -> LayoutResult {
    if nodes.len() < 2 {
        return LayoutResult::unchanged(nodes, edges);
    }

    let use_chain = match config.chain_policy {
        ChainPolicy::Always => true,
        ChainPolicy::WhenEdgeless => edges.is_empty(),
    };

    let (layered, ranks, synthesized) = if use_chain {
        let chain = chain_edges(nodes);
        let ranks = assign_ranks(nodes, &chain).unwrap_or_default();
        (chain, ranks, true)
    } else if let Some(ranks) = assign_ranks(nodes, edges) {
        (edges.clone(), ranks, false)
    } else {
        warn!(
            edges = edges.len(),
            "Edge set is cyclic, layering along a chain instead"
        );
        let chain = chain_edges(nodes);
        let ranks = assign_ranks(nodes, &chain).unwrap_or_default();
        (chain, ranks, true)
    };

    let positioned = place(nodes, &ranks, config);

    info!(
        nodes = positioned.len(),
        direction = ?config.direction,
        synthesized,
        edges = layered.len(),
        "Auto-layout complete"
    );

    LayoutResult {
        nodes: positioned,
        edges: layered,
        ranks: ranks
            .into_iter()
            .map(|(id, rank)| (id.clone(), rank))
            .collect(),
        synthesized,
    }
}

/// A linear chain `n0 -> n1 -> ...` over the nodes in their current order.
#[must_use]
pub fn chain_edges(nodes: &Vector<Node>) -> Vector<Edge> {
    nodes
        .iter()
        .tuple_windows()
        .map(|(from, to)| Edge::new(from.id.clone(), to.id.clone()))
        .collect()
}

/// Longest-path rank of every node, or `None` if `edges` contain a cycle.
///
/// Edges whose endpoints are not among `nodes` are ignored; nodes without
/// incoming edges get rank 0.
#[must_use]
pub fn assign_ranks<'a>(
    nodes: &'a Vector<Node>,
    edges: &Vector<Edge>,
) -> Option<HashMap<&'a NodeId, usize>> {
    let mut graph: DiGraph<&'a NodeId, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    let index: HashMap<&NodeId, NodeIndex> = nodes
        .iter()
        .map(|node| (&node.id, graph.add_node(&node.id)))
        .collect();

    for edge in edges {
        if let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target)) {
            graph.update_edge(source, target, ());
        }
    }

    let order = toposort(&graph, None).ok()?;

    let mut rank_by_index: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
    for idx in order {
        let rank = graph
            .neighbors_directed(idx, Direction::Incoming)
            .filter_map(|pred| rank_by_index.get(&pred))
            .map(|pred_rank| pred_rank.saturating_add(1))
            .max()
            .unwrap_or(0);
        rank_by_index.insert(idx, rank);
    }

    Some(
        index
            .into_iter()
            .map(|(id, idx)| (id, rank_by_index.get(&idx).copied().unwrap_or(0)))
            .collect(),
    )
}

fn place(nodes: &Vector<Node>, ranks: &HashMap<&NodeId, usize>, config: &LayoutConfig) -> Vector<Node> {
    let rank_of = |node: &Node| ranks.get(&node.id).copied().unwrap_or(0);
    let rank_sizes = nodes.iter().map(rank_of).counts();
    let mut filled: HashMap<usize, usize> = HashMap::new();

    let (half_primary, half_secondary) = match config.direction {
        RankDirection::LeftRight => (config.node_width / 2.0, config.node_height / 2.0),
        RankDirection::TopBottom => (config.node_height / 2.0, config.node_width / 2.0),
    };

    nodes
        .iter()
        .map(|node| {
            let rank = rank_of(node);
            let slot = filled.entry(rank).or_insert(0);
            let order = *slot;
            *slot = slot.saturating_add(1);
            let size = rank_sizes.get(&rank).copied().unwrap_or(1);

            let primary = as_f64(rank) * config.rank_spacing() + half_primary;
            let centred = as_f64(order) - as_f64(size.saturating_sub(1)) / 2.0;
            let secondary = centred * config.node_spacing() + half_secondary;

            let anchor = match config.direction {
                RankDirection::LeftRight => Position::new(primary, secondary),
                RankDirection::TopBottom => Position::new(secondary, primary),
            };

            let mut placed = node.clone();
            placed.position = Position::new(
                anchor.x - config.node_width / 2.0,
                anchor.y - config.node_height / 2.0,
            );
            placed
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(value: usize) -> f64 {
    value as f64
}

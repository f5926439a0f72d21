//! # Graph store
//!
//! Canonical node and edge collections plus the only mutation entry points.
//!
//! Hard invariants hold after every call:
//! - at most one edge per ordered `(source, target)` pair
//! - no self-loops
//! - no edge references a missing node
//! - the edge set is acyclic
//!
//! Edge insertion is gated; everything else either succeeds or is a silent
//! no-op on an absent id. Validity (connectivity, minimum size) is *not*
//! enforced here; run [`crate::validator`] after mutating.

use im::Vector;
use rand::Rng;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::cycle_guard;
use crate::error::{DagError, DagResult};
use crate::ids::{EdgeId, IdAllocator, NodeId};
use crate::layout::{self, LayoutResult};
use crate::model::{Edge, GraphSnapshot, Node, Position};
use crate::validator::{self, ValidationReport};

const DEFAULT_SPAWN_EXTENT: f64 = 400.0;

/// Counts of what a bulk removal actually deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Removed {
    pub nodes: usize,
    pub edges: usize,
}

/// Owner of the node/edge set of one graph.
#[derive(Debug, Clone)]
pub struct GraphStore {
    ids: IdAllocator,
    nodes: Vector<Node>,
    edges: Vector<Edge>,
    spawn_extent: f64,
}

impl GraphStore {
    /// Create a new empty store
    ///
    /// # Examples
    ///
    /// ```
    /// use dagsmith_core::GraphStore;
    ///
    /// let store = GraphStore::new();
    /// assert_eq!(store.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            nodes: Vector::new(),
            edges: Vector::new(),
            spawn_extent: DEFAULT_SPAWN_EXTENT,
        }
    }

    /// New nodes without a position are placed in `[0, extent)²`.
    #[must_use]
    pub const fn with_spawn_extent(mut self, extent: f64) -> Self {
        self.spawn_extent = extent;
        self
    }

    /// Rebuild a store from an exported snapshot.
    ///
    /// Nodes keep their ids and order. Edges go through the same gate as
    /// [`GraphStore::add_edge`], so a snapshot that breaks a hard invariant is
    /// refused as a whole. New node ids continue after the largest `node_<n>`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshot` on a duplicate node id or a rejected edge.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> DagResult<Self> {
        let mut store = Self::new();

        for node in &snapshot.nodes {
            if store.contains_node(&node.id) {
                return Err(DagError::invalid_snapshot(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
            store.ids.reserve(&node.id);
            store.nodes.push_back(node.clone());
        }

        for edge in &snapshot.edges {
            let id = store
                .add_edge(edge.source.clone(), edge.target.clone())
                .map_err(|e| DagError::invalid_snapshot(format!("edge '{}': {e}", edge.id)))?;
            if let Some(annotation) = &edge.annotation {
                store.annotate_edge(&id, Some(annotation.clone()));
            }
        }

        debug!(
            nodes = store.node_count(),
            edges = store.edge_count(),
            "Loaded graph from snapshot"
        );
        Ok(store)
    }

    // ============================================================================
    // NODES
    // ============================================================================

    /// Add a node at a random position. Always succeeds.
    pub fn add_node(&mut self, label: impl Into<String>) -> NodeId {
        let position = self.random_position();
        self.add_node_at(label, position)
    }

    /// Add a node at `position`. Always succeeds.
    pub fn add_node_at(&mut self, label: impl Into<String>, position: Position) -> NodeId {
        let id = self.fresh_node_id();
        let node = Node::new(id.clone(), label, position);
        debug!(node = %id, label = %node.label, "Added node");
        self.nodes.push_back(node);
        id
    }

    /// Remove a node and every edge touching it.
    ///
    /// Returns the removed node, or `None` if the id was absent.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        let index = self.node_index(id)?;
        let node = self.nodes.remove(index);
        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        debug!(
            node = %id,
            cascaded_edges = before.saturating_sub(self.edges.len()),
            "Removed node"
        );
        Some(node)
    }

    /// Replace a node's note. Returns `false` (and does nothing) if absent.
    pub fn update_note(&mut self, id: &NodeId, text: impl Into<String>) -> bool {
        self.with_node(id, |node| node.note = text.into())
    }

    /// Replace a node's label. Returns `false` (and does nothing) if absent.
    pub fn relabel_node(&mut self, id: &NodeId, label: impl Into<String>) -> bool {
        self.with_node(id, |node| node.label = label.into())
    }

    /// Move a node. Returns `false` (and does nothing) if absent.
    pub fn reposition_node(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        self.with_node(id, |node| node.position = Position::new(x, y))
    }

    // ============================================================================
    // EDGES
    // ============================================================================

    /// Add the directed edge `source -> target`.
    ///
    /// Checked in order: both endpoints exist, no self-loop, no duplicate,
    /// no cycle. A rejected edge leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if either endpoint is missing
    /// - `SelfLoopDetected` if `source == target`
    /// - `EdgeAlreadyExists` if the ordered pair is already connected
    /// - `CycleDetected` if the edge would close a cycle
    ///
    /// # Examples
    ///
    /// ```
    /// use dagsmith_core::{DagError, GraphStore};
    ///
    /// let mut store = GraphStore::new();
    /// let a = store.add_node("A");
    /// let b = store.add_node("B");
    /// assert!(store.add_edge(a.clone(), b.clone()).is_ok());
    /// assert!(matches!(store.add_edge(b, a), Err(DagError::CycleDetected(_))));
    /// assert_eq!(store.edge_count(), 1);
    /// ```
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> DagResult<EdgeId> {
        match self.check_edge(&source, &target) {
            Ok(id) => {
                debug!(edge = %id, "Added edge");
                self.edges.push_back(Edge::new(source, target));
                Ok(id)
            }
            Err(err) => {
                debug!(
                    source = %source,
                    target = %target,
                    reason = err.rejection_code(),
                    "Rejected edge"
                );
                Err(err)
            }
        }
    }

    /// Would [`GraphStore::add_edge`] accept this edge? Never mutates.
    ///
    /// # Errors
    ///
    /// The same rejections as [`GraphStore::add_edge`].
    pub fn check_edge(&self, source: &NodeId, target: &NodeId) -> DagResult<EdgeId> {
        if !self.contains_node(source) {
            return Err(DagError::node_not_found(source.clone()));
        }
        if !self.contains_node(target) {
            return Err(DagError::node_not_found(target.clone()));
        }
        if source == target {
            return Err(DagError::self_loop(source.clone()));
        }

        let duplicate = self
            .edges
            .iter()
            .any(|edge| &edge.source == source && &edge.target == target);
        if duplicate {
            return Err(DagError::edge_already_exists(source.clone(), target.clone()));
        }

        if let Some(path) = cycle_guard::closing_cycle(&self.edges, source, target) {
            return Err(DagError::cycle_detected(path));
        }

        Ok(EdgeId::between(source, target))
    }

    /// Remove an edge. Returns the removed edge, or `None` if absent.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let index = self.edges.iter().position(|edge| &edge.id == id)?;
        let edge = self.edges.remove(index);
        debug!(edge = %id, "Removed edge");
        Some(edge)
    }

    /// Set or clear an edge's annotation. Returns `false` if the edge is absent.
    pub fn annotate_edge(&mut self, id: &EdgeId, annotation: Option<String>) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|edge| &edge.id == id) else {
            return false;
        };
        edge.annotation = annotation;
        true
    }

    /// Delete the given nodes and edges in one step.
    ///
    /// Edges touching a removed node are deleted even if they were not listed.
    /// Unknown ids are skipped.
    pub fn remove_selected<'a, N, E>(&mut self, node_ids: N, edge_ids: E) -> Removed
    where
        N: IntoIterator<Item = &'a NodeId>,
        E: IntoIterator<Item = &'a EdgeId>,
    {
        let node_ids: Vec<&NodeId> = node_ids.into_iter().collect();
        let edge_ids: Vec<&EdgeId> = edge_ids.into_iter().collect();

        let nodes_before = self.nodes.len();
        let edges_before = self.edges.len();

        self.nodes.retain(|node| !node_ids.contains(&&node.id));
        self.edges.retain(|edge| {
            !edge_ids.contains(&&edge.id) && !node_ids.iter().any(|id| edge.touches(id))
        });

        let removed = Removed {
            nodes: nodes_before.saturating_sub(self.nodes.len()),
            edges: edges_before.saturating_sub(self.edges.len()),
        };
        debug!(
            nodes = removed.nodes,
            edges = removed.edges,
            "Removed selection"
        );
        removed
    }

    // ============================================================================
    // LAYOUT
    // ============================================================================

    /// Run auto-layout and adopt its positions and edge set.
    pub fn auto_layout(&mut self, config: &LayoutConfig) -> LayoutResult {
        let result = layout::layout(&self.nodes, &self.edges, config);
        self.nodes = result.nodes.clone();
        self.edges = result.edges.clone();
        result
    }

    // ============================================================================
    // QUERIES
    // ============================================================================

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    #[must_use]
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| &edge.id == id)
    }

    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// A read-only copy sharing structure with the store.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    /// Validate the current graph.
    #[must_use]
    pub fn validate(&self, min_nodes: usize) -> ValidationReport {
        validator::validate_with_minimum(&self.nodes, &self.edges, min_nodes)
    }

    // ============================================================================
    // INTERNALS
    // ============================================================================

    /// Next allocator id not held by a live node. Only an imported id near
    /// `u64::MAX` makes the counter wrap onto ids in use.
    fn fresh_node_id(&mut self) -> NodeId {
        let mut id = self.ids.next_node_id();
        while self.contains_node(&id) {
            id = self.ids.next_node_id();
        }
        id
    }

    fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| &node.id == id)
    }

    fn with_node(&mut self, id: &NodeId, update: impl FnOnce(&mut Node)) -> bool {
        match self.nodes.iter_mut().find(|node| &node.id == id) {
            Some(node) => {
                update(node);
                true
            }
            None => false,
        }
    }

    fn random_position(&self) -> Position {
        if !(self.spawn_extent.is_finite() && self.spawn_extent > 0.0) {
            return Position::origin();
        }
        let mut rng = rand::thread_rng();
        Position::new(
            rng.gen_range(0.0..self.spawn_extent),
            rng.gen_range(0.0..self.spawn_extent),
        )
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

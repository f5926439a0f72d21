//! Node, edge and snapshot records.
//!
//! Field names are stable (`id`, `label`, `note`, `position` for nodes;
//! `id`, `source`, `target` for edges) so a snapshot can be handed to an
//! exporter as-is.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::error::{DagError, DagResult};
use crate::ids::{EdgeId, NodeId};

/// Top-left corner of a node's box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// A labeled node with an optional free-text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub position: Position,
}

impl Node {
    #[must_use]
    pub fn new(id: NodeId, label: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            label: label.into(),
            note: String::new(),
            position,
        }
    }

    /// The text used to name this node in diagnostics: its label, or its id
    /// when the label is empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            self.id.as_str()
        } else {
            &self.label
        }
    }
}

/// A directed edge between two existing nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl Edge {
    /// Builds the edge `source -> target` with its derived id.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
            annotation: None,
        }
    }

    /// True if `node` is either endpoint.
    #[must_use]
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Read-only copy of a graph, in node insertion order.
///
/// Backed by persistent vectors, so taking a snapshot after every mutation
/// shares structure with the live store instead of copying it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vector<Node>,
    pub edges: Vector<Edge>,
}

impl GraphSnapshot {
    #[must_use]
    pub const fn new(nodes: Vector<Node>, edges: Vector<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Pretty-printed JSON, as shown in the editor's preview pane.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshot` if a position is not representable in JSON.
    pub fn to_json_pretty(&self) -> DagResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DagError::invalid_snapshot(e.to_string()))
    }

    /// Parses a snapshot previously produced by [`GraphSnapshot::to_json_pretty`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshot` if the text is not a well-formed snapshot.
    pub fn from_json(text: &str) -> DagResult<Self> {
        serde_json::from_str(text).map_err(|e| DagError::invalid_snapshot(e.to_string()))
    }
}

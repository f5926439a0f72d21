//! # Editing session
//!
//! The boundary the rendering surface and the editing UI talk to. Gestures
//! arrive as discrete [`EditorEvent`]s; each one is applied to the
//! [`GraphStore`] and answered with an [`EventOutcome`]. After every committed
//! mutation the session prunes stale selection entries and re-runs the
//! validator, so [`Editor::verdict`] always describes the current graph.
//!
//! Events are processed one at a time to completion. A host that receives
//! gestures from several threads must funnel them through one `&mut Editor`
//! (a `Mutex<Editor>` or a single consumer of a queue).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{EditorConfig, RankDirection};
use crate::error::DagResult;
use crate::ids::{EdgeId, NodeId};
use crate::model::{GraphSnapshot, Position};
use crate::store::GraphStore;
use crate::validator::ValidationReport;

/// Labels and positions of a seeded session's starting nodes.
const SEED_NODES: [(&str, Position); 2] = [
    ("Node 1", Position::new(0.0, 0.0)),
    ("Node 2", Position::new(250.0, 0.0)),
];

/// A change reported by the rendering surface or the editing UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    NodeMoved {
        id: NodeId,
        x: f64,
        y: f64,
    },
    /// Replaces the node selection.
    NodesSelected {
        ids: Vec<NodeId>,
    },
    /// Replaces the edge selection.
    EdgesSelected {
        ids: Vec<EdgeId>,
    },
    EdgeDrawAttempt {
        source: NodeId,
        target: NodeId,
    },
    DeleteRequested {
        #[serde(default)]
        node_ids: Vec<NodeId>,
        #[serde(default)]
        edge_ids: Vec<EdgeId>,
    },
    DeleteSelection,
    /// Label as typed; surrounding whitespace is dropped and a blank label is
    /// ignored. Without a position the node lands at a random spot.
    CreateNode {
        label: String,
        #[serde(default)]
        position: Option<Position>,
    },
    /// Same label rules as `CreateNode`.
    RenameNode {
        node_id: NodeId,
        label: String,
    },
    SetNote {
        node_id: NodeId,
        text: String,
    },
    /// A blank annotation clears it.
    AnnotateEdge {
        edge_id: EdgeId,
        #[serde(default)]
        annotation: Option<String>,
    },
    /// Lays out with the configured direction unless one is given.
    AutoLayout {
        #[serde(default)]
        direction: Option<RankDirection>,
    },
}

/// What applying an event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    NodeCreated { id: NodeId },
    EdgeAdded { id: EdgeId },
    /// The edge was refused; the graph is unchanged.
    Rejected { code: &'static str, message: String },
    Removed { nodes: usize, edges: usize },
    LaidOut { synthesized: bool, edges: usize },
    /// The event changed state without producing anything new.
    Applied,
    /// The event referred to nothing that exists, or carried nothing to do.
    Ignored,
}

impl EventOutcome {
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// The state handed back to the rendering surface after each event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorView {
    pub graph: GraphSnapshot,
    pub verdict: ValidationReport,
    pub selected_nodes: Vec<NodeId>,
    pub selected_edges: Vec<EdgeId>,
}

/// One interactive editing session over a single graph.
#[derive(Debug, Clone)]
pub struct Editor {
    store: GraphStore,
    config: EditorConfig,
    selected_nodes: BTreeSet<NodeId>,
    selected_edges: BTreeSet<EdgeId>,
    verdict: ValidationReport,
}

impl Editor {
    /// Start an empty session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` does not validate.
    pub fn new(config: EditorConfig) -> DagResult<Self> {
        config.validate()?;
        let store = GraphStore::new().with_spawn_extent(config.spawn_extent);
        Ok(Self::with_store(store, config))
    }

    /// Start a session with two unconnected nodes, "Node 1" and "Node 2".
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` does not validate.
    ///
    /// # Examples
    ///
    /// ```
    /// use dagsmith_core::{Editor, EditorConfig};
    ///
    /// let editor = Editor::seeded(EditorConfig::default())?;
    /// assert_eq!(editor.store().node_count(), 2);
    /// assert!(!editor.verdict().is_valid());
    /// # Ok::<(), dagsmith_core::DagError>(())
    /// ```
    pub fn seeded(config: EditorConfig) -> DagResult<Self> {
        config.validate()?;
        let mut store = GraphStore::new().with_spawn_extent(config.spawn_extent);
        for (label, position) in SEED_NODES {
            store.add_node_at(label, position);
        }
        Ok(Self::with_store(store, config))
    }

    /// Resume a session from an exported snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad config and `InvalidSnapshot` if the
    /// snapshot breaks a graph invariant.
    pub fn from_snapshot(config: EditorConfig, snapshot: &GraphSnapshot) -> DagResult<Self> {
        config.validate()?;
        let store = GraphStore::from_snapshot(snapshot)?.with_spawn_extent(config.spawn_extent);
        Ok(Self::with_store(store, config))
    }

    fn with_store(store: GraphStore, config: EditorConfig) -> Self {
        let verdict = store.validate(config.min_nodes);
        Self {
            store,
            config,
            selected_nodes: BTreeSet::new(),
            selected_edges: BTreeSet::new(),
            verdict,
        }
    }

    /// Apply one event and refresh the verdict.
    pub fn apply(&mut self, event: EditorEvent) -> EventOutcome {
        trace!(?event, "Applying editor event");

        let outcome = match event {
            EditorEvent::NodeMoved { id, x, y } => {
                changed(self.store.reposition_node(&id, x, y))
            }
            EditorEvent::NodesSelected { ids } => {
                self.selected_nodes = ids.into_iter().collect();
                EventOutcome::Applied
            }
            EditorEvent::EdgesSelected { ids } => {
                self.selected_edges = ids.into_iter().collect();
                EventOutcome::Applied
            }
            EditorEvent::EdgeDrawAttempt { source, target } => {
                match self.store.add_edge(source, target) {
                    Ok(id) => EventOutcome::EdgeAdded { id },
                    Err(err) => EventOutcome::Rejected {
                        code: err.rejection_code(),
                        message: err.to_string(),
                    },
                }
            }
            EditorEvent::DeleteRequested { node_ids, edge_ids } => {
                self.remove(&node_ids, &edge_ids)
            }
            EditorEvent::DeleteSelection => {
                let nodes = std::mem::take(&mut self.selected_nodes);
                let edges = std::mem::take(&mut self.selected_edges);
                self.remove(nodes.iter(), edges.iter())
            }
            EditorEvent::CreateNode { label, position } => self.create_node(&label, position),
            EditorEvent::RenameNode { node_id, label } => {
                let label = label.trim();
                if label.is_empty() {
                    debug!(node = %node_id, "Ignored blank node label");
                    EventOutcome::Ignored
                } else {
                    changed(self.store.relabel_node(&node_id, label))
                }
            }
            EditorEvent::SetNote { node_id, text } => {
                changed(self.store.update_note(&node_id, text))
            }
            EditorEvent::AnnotateEdge {
                edge_id,
                annotation,
            } => {
                let annotation = annotation
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty());
                changed(self.store.annotate_edge(&edge_id, annotation))
            }
            EditorEvent::AutoLayout { direction } => {
                let layout = direction.map_or_else(
                    || self.config.layout.clone(),
                    |direction| self.config.layout.clone().with_direction(direction),
                );
                let result = self.store.auto_layout(&layout);
                EventOutcome::LaidOut {
                    synthesized: result.synthesized,
                    edges: result.edges.len(),
                }
            }
        };

        self.refresh();
        outcome
    }

    fn create_node(&mut self, label: &str, position: Option<Position>) -> EventOutcome {
        let label = label.trim();
        if label.is_empty() {
            debug!("Ignored blank node label");
            return EventOutcome::Ignored;
        }
        let id = match position {
            Some(position) => self.store.add_node_at(label, position),
            None => self.store.add_node(label),
        };
        EventOutcome::NodeCreated { id }
    }

    fn remove<'a, N, E>(&mut self, node_ids: N, edge_ids: E) -> EventOutcome
    where
        N: IntoIterator<Item = &'a NodeId>,
        E: IntoIterator<Item = &'a EdgeId>,
    {
        let removed = self.store.remove_selected(node_ids, edge_ids);
        if removed.nodes == 0 && removed.edges == 0 {
            return EventOutcome::Ignored;
        }
        EventOutcome::Removed {
            nodes: removed.nodes,
            edges: removed.edges,
        }
    }

    fn refresh(&mut self) {
        let store = &self.store;
        self.selected_nodes.retain(|id| store.contains_node(id));
        self.selected_edges.retain(|id| store.contains_edge(id));
        self.verdict = store.validate(self.config.min_nodes);
    }

    #[must_use]
    pub const fn store(&self) -> &GraphStore {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Validity of the graph as of the last event.
    #[must_use]
    pub const fn verdict(&self) -> &ValidationReport {
        &self.verdict
    }

    #[must_use]
    pub const fn selected_nodes(&self) -> &BTreeSet<NodeId> {
        &self.selected_nodes
    }

    #[must_use]
    pub const fn selected_edges(&self) -> &BTreeSet<EdgeId> {
        &self.selected_edges
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected_nodes.is_empty() || !self.selected_edges.is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        self.store.snapshot()
    }

    #[must_use]
    pub fn view(&self) -> EditorView {
        EditorView {
            graph: self.snapshot(),
            verdict: self.verdict.clone(),
            selected_nodes: self.selected_nodes.iter().cloned().collect(),
            selected_edges: self.selected_edges.iter().cloned().collect(),
        }
    }
}

const fn changed(applied: bool) -> EventOutcome {
    if applied {
        EventOutcome::Applied
    } else {
        EventOutcome::Ignored
    }
}

//! Error types for graph mutations.
//!
//! A rejected edge is an expected outcome, not a failure of the engine: the
//! caller branches on the variant and the graph is left untouched.

use thiserror::Error;

use crate::ids::NodeId;

/// Reasons a mutation, snapshot or configuration is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DagError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Self-loop detected: {0}")]
    SelfLoopDetected(NodeId),

    #[error("Edge already exists: {0} -> {1}")]
    EdgeAlreadyExists(NodeId, NodeId),

    #[error("Cycle detected involving nodes: {}", join_path(.0))]
    CycleDetected(Vec<NodeId>),

    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl DagError {
    pub fn node_not_found(id: impl Into<NodeId>) -> Self {
        Self::NodeNotFound(id.into())
    }

    pub fn self_loop(id: impl Into<NodeId>) -> Self {
        Self::SelfLoopDetected(id.into())
    }

    pub fn edge_already_exists(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self::EdgeAlreadyExists(from.into(), to.into())
    }

    #[must_use]
    pub const fn cycle_detected(path: Vec<NodeId>) -> Self {
        Self::CycleDetected(path)
    }

    pub fn invalid_snapshot(reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for the rejection.
    #[must_use]
    pub const fn rejection_code(&self) -> &'static str {
        match self {
            Self::NodeNotFound(_) => "missing_endpoint",
            Self::SelfLoopDetected(_) => "self_loop",
            Self::EdgeAlreadyExists(..) => "duplicate_edge",
            Self::CycleDetected(_) => "cycle",
            Self::InvalidSnapshot { .. } => "invalid_snapshot",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }
}

fn join_path(path: &[NodeId]) -> String {
    path.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for graph operations
pub type DagResult<T> = std::result::Result<T, DagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = DagError::cycle_detected(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "Cycle detected involving nodes: a -> b -> a");
        assert_eq!(err.rejection_code(), "cycle");
    }

    #[test]
    fn test_rejection_codes() {
        assert_eq!(DagError::node_not_found("x").rejection_code(), "missing_endpoint");
        assert_eq!(DagError::self_loop("x").rejection_code(), "self_loop");
        assert_eq!(
            DagError::edge_already_exists("a", "b").rejection_code(),
            "duplicate_edge"
        );
        assert_eq!(
            DagError::edge_already_exists("a", "b").to_string(),
            "Edge already exists: a -> b"
        );
    }
}

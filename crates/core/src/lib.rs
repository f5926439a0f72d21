//! # dagsmith-core
//!
//! Graph consistency and layered layout engine.
//!
//! This crate provides:
//! - A graph store that refuses structurally invalid edges before they land
//! - A cycle gate for proposed edges
//! - A whole-graph validator that explains why a graph is invalid
//! - Layered auto-layout
//! - An event-driven editing session on top of all of the above

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod cycle_guard;
pub mod editor;
pub mod error;
pub mod ids;
pub mod layout;
pub mod model;
pub mod store;
pub mod validator;

// Re-export commonly used items
pub use config::{ChainPolicy, EditorConfig, LayoutConfig, RankDirection};
pub use editor::{Editor, EditorEvent, EditorView, EventOutcome};
pub use error::{DagError, DagResult};
pub use ids::{EdgeId, IdAllocator, NodeId};
pub use layout::LayoutResult;
pub use model::{Edge, GraphSnapshot, Node, Position};
pub use store::{GraphStore, Removed};
pub use validator::{ValidationReport, Violation, validate};

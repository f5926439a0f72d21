//! Node and edge identifiers.
//!
//! Node ids come from a per-store counter (`node_0`, `node_1`, ...). Edge ids
//! are derived from their endpoints, so one ordered pair can only ever name a
//! single edge, and two different pairs never share a name.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

const NODE_PREFIX: &str = "node_";
const EDGE_PREFIX: &str = "edge";

/// Identifier of a node, unique for the lifetime of its graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps an existing identifier (e.g. one read back from a snapshot).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The counter value encoded in a `node_<n>` id, if this id has that shape.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(NODE_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of an edge, always `edge-<source>-<target>`.
///
/// A `-` or `\` inside an endpoint id is escaped with a backslash, so
/// `a -> b-c` and `a-b -> c` get different ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Derives the id of the directed edge `source -> target`.
    ///
    /// ```
    /// use dagsmith_core::{EdgeId, NodeId};
    ///
    /// let id = EdgeId::between(&NodeId::new("node_0"), &NodeId::new("node_1"));
    /// assert_eq!(id.as_str(), "edge-node_0-node_1");
    ///
    /// let dashed = EdgeId::between(&NodeId::new("a"), &NodeId::new("b-c"));
    /// assert_eq!(dashed.as_str(), r"edge-a-b\-c");
    /// ```
    #[must_use]
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!(
            "{EDGE_PREFIX}-{}-{}",
            escape(source.as_str()),
            escape(target.as_str())
        ))
    }

    /// Wraps an id as received from a collaborator (selection, delete request).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

fn escape(id: &str) -> Cow<'_, str> {
    if id.contains(['-', '\\']) {
        Cow::Owned(id.replace('\\', r"\\").replace('-', r"\-"))
    } else {
        Cow::Borrowed(id)
    }
}

/// Issues increasing node ids within one graph.
///
/// Each [`crate::GraphStore`] owns its own allocator, so independent graphs
/// never share a counter. The counter wraps to `node_0` after `u64::MAX`
/// instead of sticking there; the store skips candidates that are still in use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Hands out the next node id and advances the counter.
    pub fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(format!("{NODE_PREFIX}{}", self.next));
        self.next = self.next.checked_add(1).unwrap_or(0);
        id
    }

    /// Moves the counter past `id`'s value (wrapping if it is `u64::MAX`).
    pub fn reserve(&mut self, id: &NodeId) {
        let Some(seq) = id.sequence() else {
            return;
        };
        match seq.checked_add(1) {
            Some(after) => self.next = self.next.max(after),
            None => self.next = 0,
        }
    }

    /// The counter value the next node id will carry.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.next
    }
}

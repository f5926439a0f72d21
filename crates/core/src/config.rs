//! Configuration for editing sessions and auto-layout.

use serde::{Deserialize, Serialize};

use crate::error::{DagError, DagResult};
use crate::validator::DEFAULT_MIN_NODES;

/// Which axis ranks advance along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDirection {
    /// Ranks advance left to right (horizontal).
    #[default]
    #[serde(rename = "LR", alias = "horizontal")]
    LeftRight,
    /// Ranks advance top to bottom (vertical).
    #[serde(rename = "TB", alias = "vertical")]
    TopBottom,
}

impl RankDirection {
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight)
    }
}

/// When auto-layout replaces the edge set with a linear chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainPolicy {
    /// Always layer along a chain over the nodes and return it as the new edge set.
    #[default]
    Always,
    /// Only synthesize the chain when the graph has no edges.
    WhenEdgeless,
}

/// Auto-layout geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Width of every node's box.
    #[serde(default = "default_node_width")]
    pub node_width: f64,

    /// Height of every node's box.
    #[serde(default = "default_node_height")]
    pub node_height: f64,

    /// Gap between consecutive ranks along the rank axis.
    #[serde(default = "default_gap")]
    pub rank_gap: f64,

    /// Gap between nodes sharing a rank.
    #[serde(default = "default_gap")]
    pub node_gap: f64,

    #[serde(default)]
    pub direction: RankDirection,

    #[serde(default)]
    pub chain_policy: ChainPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: default_node_width(),
            node_height: default_node_height(),
            rank_gap: default_gap(),
            node_gap: default_gap(),
            direction: RankDirection::default(),
            chain_policy: ChainPolicy::default(),
        }
    }
}

impl LayoutConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the box is not a positive finite size or a
    /// gap is negative.
    pub fn validate(&self) -> DagResult<()> {
        if !(self.node_width.is_finite() && self.node_width > 0.0) {
            return Err(DagError::invalid_config(format!(
                "node_width must be positive, got {}",
                self.node_width
            )));
        }
        if !(self.node_height.is_finite() && self.node_height > 0.0) {
            return Err(DagError::invalid_config(format!(
                "node_height must be positive, got {}",
                self.node_height
            )));
        }
        if !(self.rank_gap.is_finite() && self.rank_gap >= 0.0) {
            return Err(DagError::invalid_config("rank_gap must be non-negative"));
        }
        if !(self.node_gap.is_finite() && self.node_gap >= 0.0) {
            return Err(DagError::invalid_config("node_gap must be non-negative"));
        }
        Ok(())
    }

    /// Distance between the anchors of consecutive ranks.
    #[must_use]
    pub fn rank_spacing(&self) -> f64 {
        let extent = if self.direction.is_horizontal() {
            self.node_width
        } else {
            self.node_height
        };
        extent + self.rank_gap
    }

    /// Distance between the anchors of neighbours within one rank.
    #[must_use]
    pub fn node_spacing(&self) -> f64 {
        let extent = if self.direction.is_horizontal() {
            self.node_height
        } else {
            self.node_width
        };
        extent + self.node_gap
    }

    #[must_use]
    pub const fn with_direction(mut self, direction: RankDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// Configuration for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub layout: LayoutConfig,

    /// New nodes without a position land uniformly in `[0, spawn_extent)²`.
    #[serde(default = "default_spawn_extent")]
    pub spawn_extent: f64,

    /// Minimum node count for a valid graph.
    #[serde(default = "default_min_nodes")]
    pub min_nodes: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            spawn_extent: default_spawn_extent(),
            min_nodes: default_min_nodes(),
        }
    }
}

impl EditorConfig {
    /// Create a new editor config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the text does not parse or fails validation.
    pub fn from_toml_str(text: &str) -> DagResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| DagError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if any value is out of range.
    pub fn validate(&self) -> DagResult<()> {
        self.layout.validate()?;
        if !(self.spawn_extent.is_finite() && self.spawn_extent > 0.0) {
            return Err(DagError::invalid_config(format!(
                "spawn_extent must be positive, got {}",
                self.spawn_extent
            )));
        }
        Ok(())
    }
}

const fn default_node_width() -> f64 {
    180.0
}

const fn default_node_height() -> f64 {
    60.0
}

const fn default_gap() -> f64 {
    50.0
}

const fn default_spawn_extent() -> f64 {
    400.0
}

const fn default_min_nodes() -> usize {
    DEFAULT_MIN_NODES
}

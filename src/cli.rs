//! CLI command definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dagsmith_core::RankDirection;

/// dagsmith - acyclic-by-construction graph editing
#[derive(Parser, Debug)]
#[command(name = "dagsmith")]
#[command(version)]
#[command(about = "Replay editing sessions, validate graphs and lay them out")]
#[command(
    long_about = "dagsmith drives the graph engine from files: it replays a script of editor events, validates an exported snapshot, or lays one out. Results are printed as JSON."
)]
pub struct Cli {
    /// Log debug events (rejections, commits, cascades) to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a script of editor events (one JSON event per line)
    Replay {
        /// Event script path
        script: PathBuf,

        /// Start from this snapshot instead of an empty graph
        #[arg(short, long, conflicts_with = "seeded")]
        snapshot: Option<PathBuf>,

        /// Start with the two default nodes
        #[arg(long, default_value_t = false)]
        seeded: bool,

        /// Editor configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Report why a snapshot is or is not a valid DAG
    Validate {
        /// Snapshot path (JSON)
        snapshot: PathBuf,

        /// Minimum node count
        #[arg(long)]
        min_nodes: Option<usize>,
    },

    /// Lay out a snapshot and print the result
    Layout {
        /// Snapshot path (JSON)
        snapshot: PathBuf,

        /// Rank direction (defaults to the configured one)
        #[arg(short, long, value_enum)]
        direction: Option<Direction>,

        /// Editor configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Rank direction as typed on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[value(alias = "lr")]
    Horizontal,
    #[value(alias = "tb")]
    Vertical,
}

impl From<Direction> for RankDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Horizontal => Self::LeftRight,
            Direction::Vertical => Self::TopBottom,
        }
    }
}

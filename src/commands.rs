//! CLI command handlers.
//!
//! Every handler returns the JSON it wants printed; `main` owns stdout.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use dagsmith_core::{
    Editor, EditorConfig, EditorEvent, EditorView, EventOutcome, GraphSnapshot, GraphStore,
    validator,
};

use crate::cli::{Commands, Direction};

/// Result of replaying a script: one outcome per event, then the final state.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub outcomes: Vec<StepOutcome>,
    pub view: EditorView,
}

#[derive(Debug, Serialize)]
pub struct StepOutcome {
    /// 1-based line number in the script.
    pub line: usize,
    #[serde(flatten)]
    pub outcome: EventOutcome,
}

/// Execute a CLI command.
///
/// This is the main command dispatcher that routes to the appropriate handler.
///
/// # Errors
///
/// Fails if an input file cannot be read or parsed, or the configuration or
/// snapshot is rejected by the engine.
pub fn execute_command(command: Commands) -> Result<String> {
    match command {
        Commands::Replay {
            script,
            snapshot,
            seeded,
            config,
        } => cmd_replay(&script, snapshot.as_deref(), seeded, config.as_deref()),

        Commands::Validate {
            snapshot,
            min_nodes,
        } => cmd_validate(&snapshot, min_nodes),

        Commands::Layout {
            snapshot,
            direction,
            config,
        } => cmd_layout(&snapshot, direction, config.as_deref()),
    }
}

/// Replay an event script against a fresh, seeded or restored session.
fn cmd_replay(
    script: &Path,
    snapshot: Option<&Path>,
    seeded: bool,
    config: Option<&Path>,
) -> Result<String> {
    let config = load_config(config)?;
    let mut editor = match snapshot {
        Some(path) => Editor::from_snapshot(config, &load_snapshot(path)?)
            .with_context(|| format!("Failed to restore session from {}", path.display()))?,
        None if seeded => Editor::seeded(config)?,
        None => Editor::new(config)?,
    };

    let events = parse_script(&read(script)?)
        .with_context(|| format!("Invalid event script {}", script.display()))?;

    let outcomes: Vec<StepOutcome> = events
        .into_iter()
        .map(|(line, event)| StepOutcome {
            line,
            outcome: editor.apply(event),
        })
        .collect();

    let rejected = outcomes.iter().filter(|s| s.outcome.is_rejected()).count();
    if rejected > 0 {
        warn!(rejected, "Some edges were rejected");
    }
    info!(
        events = outcomes.len(),
        valid = editor.verdict().is_valid(),
        "Replay complete"
    );

    to_json(&ReplayReport {
        outcomes,
        view: editor.view(),
    })
}

/// Validate a snapshot as-is, without admitting it through the store.
fn cmd_validate(snapshot: &Path, min_nodes: Option<usize>) -> Result<String> {
    let snapshot = load_snapshot(snapshot)?;
    let report = match min_nodes {
        Some(min) => validator::validate_with_minimum(&snapshot.nodes, &snapshot.edges, min),
        None => validator::validate(&snapshot.nodes, &snapshot.edges),
    };
    to_json(&report)
}

/// Lay out a snapshot and print the new snapshot.
fn cmd_layout(snapshot: &Path, direction: Option<Direction>, config: Option<&Path>) -> Result<String> {
    let config = load_config(config)?;
    let mut store = GraphStore::from_snapshot(&load_snapshot(snapshot)?)
        .with_context(|| format!("Failed to load {}", snapshot.display()))?;

    let layout = match direction {
        Some(direction) => config.layout.with_direction(direction.into()),
        None => config.layout,
    };
    store.auto_layout(&layout);

    store.snapshot().to_json_pretty().map_err(Into::into)
}

/// Parse a script of one JSON event per line. Blank lines and lines starting
/// with `#` are skipped.
///
/// # Errors
///
/// Fails on the first line that is not a valid event.
pub fn parse_script(text: &str) -> Result<Vec<(usize, EditorEvent)>> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index.saturating_add(1), line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str(line)
                .map(|event| (number, event))
                .with_context(|| format!("line {number}: not an editor event"))
        })
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::from_toml_str(&read(path)?)
            .with_context(|| format!("Invalid config {}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

fn load_snapshot(path: &Path) -> Result<GraphSnapshot> {
    GraphSnapshot::from_json(&read(path)?)
        .with_context(|| format!("Invalid snapshot {}", path.display()))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

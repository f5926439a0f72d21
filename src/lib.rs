#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # dagsmith
//!
//! Command-line driver for the dagsmith graph engine.
//!
//! This library re-exports the engine for convenience.

pub use dagsmith_core;

pub mod cli;
pub mod commands;

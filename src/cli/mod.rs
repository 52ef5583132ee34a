//! CLI module
//!
//! Command-line interface for running the job.
//!
//! The binary takes no subcommands: it resolves a [`JobConfig`] from an
//! optional YAML file plus flags, runs the selected stage and prints the
//! run report to stdout.
//!
//! [`JobConfig`]: crate::config::JobConfig

mod commands;
mod runner;

pub use commands::{Cli, CompressionArg, ModeArg, OutputFormat, StageArg};
pub use runner::Runner;

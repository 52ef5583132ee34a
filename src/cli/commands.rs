//! CLI arguments and parsing

use crate::config::{CompressionCodec, WriteMode};
use crate::engine::Stage;
use clap::Parser;
use std::path::PathBuf;

/// Sparkify data lake ETL
#[derive(Parser, Debug)]
#[command(name = "sparkify-lake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Job configuration file (YAML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Input base location (local path or s3://, s3a://, gs://, az:// URL)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output base location
    #[arg(short, long)]
    pub output: Option<String>,

    /// Stage to run
    #[arg(long, default_value = "all")]
    pub stage: StageArg,

    /// What to do when an output table already exists
    #[arg(short, long)]
    pub mode: Option<ModeArg>,

    /// Parquet compression codec
    #[arg(long)]
    pub compression: Option<CompressionArg>,

    /// Report format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Stage selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StageArg {
    /// Song catalog, then event log
    All,
    /// Song catalog only
    Songs,
    /// Event log only
    Events,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::All => Stage::All,
            StageArg::Songs => Stage::Songs,
            StageArg::Events => Stage::Events,
        }
    }
}

/// Write mode for existing tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Replace existing data
    Overwrite,
    /// Add files next to existing data
    Append,
    /// Fail if the table exists
    ErrorIfExists,
    /// Skip tables that exist
    Ignore,
}

impl From<ModeArg> for WriteMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Overwrite => WriteMode::Overwrite,
            ModeArg::Append => WriteMode::Append,
            ModeArg::ErrorIfExists => WriteMode::ErrorIfExists,
            ModeArg::Ignore => WriteMode::Ignore,
        }
    }
}

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CompressionArg {
    /// Snappy
    Snappy,
    /// Zstandard
    Zstd,
    /// Gzip
    Gzip,
    /// No compression
    Uncompressed,
}

impl From<CompressionArg> for CompressionCodec {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Snappy => CompressionCodec::Snappy,
            CompressionArg::Zstd => CompressionCodec::Zstd,
            CompressionArg::Gzip => CompressionCodec::Gzip,
            CompressionArg::Uncompressed => CompressionCodec::Uncompressed,
        }
    }
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Indented JSON
    Pretty,
}

//! Output module
//!
//! Writes tables as Hive-partitioned Parquet datasets.
//!
//! # Overview
//!
//! - `ParquetWriterConfig`: compression and row-group settings handed to
//!   the engine's Parquet sink
//! - `DatasetWriter`: applies the write mode, writes the frame through the
//!   query engine with one directory level per partition column, then drops
//!   a `_SUCCESS` marker

mod dataset;
mod writer;

pub use dataset::{DatasetWriter, TableReport, SUCCESS_MARKER};
pub use writer::ParquetWriterConfig;

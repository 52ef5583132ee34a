//! Dataset loader module
//!
//! Reads the raw JSON inputs and previously written Parquet tables and
//! registers them as tables of a query session.
//!
//! # Overview
//!
//! - `load_json_dataset` - every `.json` object under a prefix, one batch
//!   per file
//! - `load_table` - a Hive-partitioned Parquet table written by the output
//!   module, with the partition columns re-attached from the paths

mod json;
mod table;
mod types;

pub use json::{decode_json_records, load_json_dataset};
pub use table::{decode_parquet, load_table};
pub use types::LoadedDataset;

/// Objects fetched from storage at the same time
const READ_CONCURRENCY: usize = 16;

#[cfg(test)]
mod tests;

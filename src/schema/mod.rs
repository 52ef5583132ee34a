//! Schema module
//!
//! Fixed Arrow schemas for the raw input records and the star schema tables,
//! plus conversion of parsed JSON records into Arrow batches.
//!
//! # Overview
//!
//! - `song_record_schema` / `event_record_schema` - the known input field sets
//! - [`Table`] - the five output tables with their partition columns
//! - [`json_to_arrow`] - JSON objects to a `RecordBatch` under a fixed schema

mod convert;
mod tables;

pub use convert::{conform_batch, json_to_arrow, present_fields};
pub use tables::{event_record_schema, song_record_schema, start_time_type, Table};

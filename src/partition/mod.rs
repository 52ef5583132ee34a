//! Hive-style partition layout
//!
//! # Overview
//!
//! Partitioned tables are written as a tree of `column=value` directories,
//! one level per partition column, e.g. `songs/year=2020/artist_id=A1/`.
//! The partition columns are stored only in the directory names; readers
//! re-attach them from the path.
//!
//! - `null` and empty values are written as `__HIVE_DEFAULT_PARTITION__`
//! - object store paths `%XX`-escape characters unsafe in a path segment,
//!   so values are unescaped when parsed back

mod path;
mod types;

pub use path::{unescape_path_name, DEFAULT_PARTITION_NAME};
pub use types::{typed_column, PartitionSpec};

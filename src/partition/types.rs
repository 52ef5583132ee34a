//! Partition specs
//!
//! Turns a data file's directory path back into partition column values.

use super::path::{unescape_path_name, DEFAULT_PARTITION_NAME};
use crate::error::{Error, Result};
use arrow::array::{ArrayRef, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use std::sync::Arc;

/// Ordered list of partition columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionSpec {
    columns: Vec<String>,
}

impl PartitionSpec {
    /// Create a spec from column names, outermost first
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Whether there are no partition columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Partition column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Parse partition values from a file path relative to the table root
    ///
    /// The leading segments must be `column=value` for each partition column
    /// in order, followed by the file name.
    pub fn parse_path(&self, relative: &str) -> Result<Vec<Option<String>>> {
        let segments: Vec<&str> = relative.trim_matches('/').split('/').collect();
        if segments.len() != self.columns.len() + 1 {
            return Err(Error::partition(
                relative,
                format!("expected {} partition directories", self.columns.len()),
            ));
        }

        self.columns
            .iter()
            .zip(&segments)
            .map(|(column, segment)| -> Result<Option<String>> {
                let value = segment
                    .strip_prefix(column.as_str())
                    .and_then(|rest| rest.strip_prefix('='))
                    .ok_or_else(|| {
                        Error::partition(relative, format!("expected '{column}=' in '{segment}'"))
                    })?;
                Ok(match value {
                    DEFAULT_PARTITION_NAME | "" => None,
                    other => Some(unescape_path_name(other)),
                })
            })
            .collect()
    }
}

/// Build a constant column holding a parsed partition value
pub fn typed_column(
    value: Option<&str>,
    data_type: &DataType,
    num_rows: usize,
    path: &str,
) -> Result<ArrayRef> {
    let invalid = |v: &str| Error::partition(path, format!("'{v}' is not a valid {data_type}"));

    let array: ArrayRef = match data_type {
        DataType::Utf8 => Arc::new(StringArray::from(vec![value; num_rows])),
        DataType::Int64 => {
            let parsed = value
                .map(|v| v.parse::<i64>().map_err(|_| invalid(v)))
                .transpose()?;
            Arc::new(Int64Array::from(vec![parsed; num_rows]))
        }
        DataType::Int32 => {
            let parsed = value
                .map(|v| v.parse::<i32>().map_err(|_| invalid(v)))
                .transpose()?;
            Arc::new(Int32Array::from(vec![parsed; num_rows]))
        }
        other => {
            return Err(Error::partition(
                path,
                format!("unsupported partition column type {other:?}"),
            ))
        }
    };
    Ok(array)
}

//! Partitioned Parquet dataset writer

use super::writer::ParquetWriterConfig;
use crate::config::{WriteMode, WriteOptions};
use crate::error::{Error, Result};
use crate::partition::{PartitionSpec, DEFAULT_PARTITION_NAME};
use crate::schema::Table;
use crate::storage::StorageLocation;
use arrow::array::AsArray;
use arrow::datatypes::{DataType, UInt64Type};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use datafusion::dataframe::{DataFrame, DataFrameWriteOptions};
use datafusion::prelude::{cast, coalesce, ident, lit, nullif, Expr};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Marker object written once a table's data files are complete
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Name the output store is registered under in the query runtime
const OUTPUT_STORE: &str = "output";

/// Outcome of writing one table
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    /// Table written
    pub table: Table,
    /// Scheme-qualified destination
    pub destination: String,
    /// Rows written
    pub rows: usize,
    /// Data files written
    pub files: usize,
    /// Partition directories written (0 for unpartitioned tables)
    pub partitions: usize,
    /// Whether the write was skipped because the destination had data
    pub skipped: bool,
}

/// Writes tables as Parquet datasets under an output location
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    location: StorageLocation,
    options: WriteOptions,
    parquet: ParquetWriterConfig,
}

impl DatasetWriter {
    /// Create a writer for `location`
    pub fn new(location: StorageLocation, options: WriteOptions) -> Self {
        let parquet = ParquetWriterConfig::from_options(&options);
        Self {
            location,
            options,
            parquet,
        }
    }

    /// The output location
    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    /// The write options in effect
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Write `frame` as `<output>/<table>/`
    ///
    /// The frame must carry every column of the table schema; extra columns
    /// are dropped and the rest cast to the declared types.
    pub async fn write_table(&self, table: Table, frame: DataFrame) -> Result<TableReport> {
        let root = table.name();
        let destination = self.location.display(root);
        let mut report = TableReport {
            table,
            destination: destination.clone(),
            rows: 0,
            files: 0,
            partitions: 0,
            skipped: false,
        };

        let existing = self.location.list(root).await?;
        let mut kept = HashSet::new();
        if !existing.is_empty() {
            match self.options.mode {
                WriteMode::Overwrite => {
                    let removed = self.location.delete_prefix(root).await?;
                    debug!(table = %table, removed, "Cleared destination");
                }
                WriteMode::Append => {
                    kept.extend(existing.into_iter().map(|meta| meta.location));
                }
                WriteMode::ErrorIfExists => {
                    return Err(Error::DestinationExists { path: destination });
                }
                WriteMode::Ignore => {
                    info!(
                        table = %table,
                        destination = %destination,
                        "Destination exists, skipping"
                    );
                    report.skipped = true;
                    return Ok(report);
                }
            }
        }

        let frame = conform(frame, table)?;
        self.location
            .register_with(&frame.task_ctx().runtime_env(), OUTPUT_STORE)?;

        let url = self.location.session_url(OUTPUT_STORE, root);
        let partition_by = table
            .partition_columns()
            .iter()
            .map(|column| (*column).to_string())
            .collect();
        debug!(
            table = %table,
            url = %url,
            compression = self.parquet.compression().parquet_setting(),
            row_group_size = self.parquet.row_group_size(),
            "Writing table"
        );
        let written = frame
            .write_parquet(
                &url,
                DataFrameWriteOptions::new().with_partition_by(partition_by),
                Some(self.parquet.table_options()),
            )
            .await?;
        report.rows = rows_written(&written)?;

        let mut directories = HashSet::new();
        for meta in self.location.list(root).await? {
            if kept.contains(&meta.location) {
                continue;
            }
            let relative = self.location.relative(&meta.location);
            debug!(path = %self.location.display(relative), "Wrote file");
            if let Some((directory, _)) = relative.rsplit_once('/') {
                directories.insert(directory.to_string());
            }
            report.files += 1;
        }
        if !PartitionSpec::new(table.partition_columns()).is_empty() {
            report.partitions = directories.len();
        }

        self.location
            .write(&format!("{root}/{SUCCESS_MARKER}"), Bytes::new())
            .await?;

        info!(
            table = %table,
            rows = report.rows,
            files = report.files,
            destination = %destination,
            "Wrote table"
        );
        Ok(report)
    }
}

/// Project `frame` onto the table schema
///
/// Partition columns become strings, with null and empty values mapped to
/// the default partition name, since only the directory name records them.
fn conform(frame: DataFrame, table: Table) -> Result<DataFrame> {
    let partition_columns = table.partition_columns();
    let exprs = table
        .schema()
        .fields()
        .iter()
        .map(|field| -> Result<Expr> {
            let name = field.name();
            if !frame.schema().has_column_with_unqualified_name(name) {
                return Err(Error::missing_column(name));
            }
            let expr = if partition_columns.contains(&name.as_str()) {
                coalesce(vec![
                    nullif(cast(ident(name), DataType::Utf8), lit("")),
                    lit(DEFAULT_PARTITION_NAME),
                ])
            } else {
                cast(ident(name), field.data_type().clone())
            };
            Ok(expr.alias(name))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(frame.select(exprs)?)
}

/// Sum of the `count` column the engine returns from a write
fn rows_written(batches: &[RecordBatch]) -> Result<usize> {
    let mut rows = 0;
    for batch in batches {
        let counts = batch
            .column_by_name("count")
            .and_then(|column| column.as_primitive_opt::<UInt64Type>())
            .ok_or_else(|| Error::output("Write returned no row count"))?;
        rows += counts.iter().flatten().sum::<u64>() as usize;
    }
    Ok(rows)
}

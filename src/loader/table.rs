//! Partitioned Parquet table reader

use super::types::LoadedDataset;
use super::READ_CONCURRENCY;
use crate::error::{Error, Result, ResultExt};
use crate::output::SUCCESS_MARKER;
use crate::partition::{typed_column, PartitionSpec};
use crate::schema::{conform_batch, Table};
use crate::storage::StorageLocation;
use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use datafusion::prelude::SessionContext;
use futures::{StreamExt, TryStreamExt};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::sync::Arc;
use tracing::{debug, info};

/// Decode a whole Parquet file into one batch
pub fn decode_parquet(data: Bytes) -> Result<RecordBatch> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)?;
    let schema = Arc::clone(builder.schema());
    let batches = builder.build()?.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Whether any segment of a path marks a hidden or bookkeeping object,
/// e.g. `_SUCCESS`, `_temporary/0/f.parquet` or `.staging/f.parquet`
fn is_hidden(within: &str) -> bool {
    within
        .split('/')
        .any(|segment| segment.starts_with('_') || segment.starts_with('.'))
}

/// Read a table written under `<location>/<table>/` and register it in
/// `session` under the table's name
///
/// Partition columns come back after the data columns, in the table's
/// declared order, typed per the table schema. A table holding only its
/// `_SUCCESS` marker reads as empty.
pub async fn load_table(
    session: &SessionContext,
    location: &StorageLocation,
    table: Table,
) -> Result<LoadedDataset> {
    let root = table.name();
    let mut completed = false;
    let mut objects = Vec::new();
    for meta in location.list(root).await? {
        let relative = location.relative(&meta.location);
        let within = relative
            .strip_prefix(root)
            .unwrap_or(relative)
            .trim_start_matches('/')
            .to_string();
        if within == SUCCESS_MARKER {
            completed = true;
        }
        if !is_hidden(&within) {
            objects.push((meta, within));
        }
    }

    if objects.is_empty() && !completed {
        return Err(Error::NoInputFiles {
            path: location.display(root),
        });
    }

    let files = objects.len();
    let spec = PartitionSpec::new(table.partition_columns());
    let read_schema = table.read_schema();
    let data_schema = table.data_schema();

    let batches: Vec<RecordBatch> = futures::stream::iter(objects)
        .map(|(meta, within)| {
            let spec = &spec;
            let read_schema = &read_schema;
            let data_schema = &data_schema;
            async move {
                let shown = location.display(location.relative(&meta.location));
                let values = spec.parse_path(&within)?;

                let batch = decode_parquet(location.read(&meta.location).await?)
                    .with_context(|| format!("Failed to decode {shown}"))?;
                debug!(path = %shown, rows = batch.num_rows(), "Read table file");

                attach_partitions(&batch, data_schema, read_schema, spec, &values, &shown)
            }
        })
        .buffered(READ_CONCURRENCY)
        .try_collect()
        .await?;

    let dataset = LoadedDataset::register(session, root, read_schema, batches, files).await?;
    info!(
        table = %table,
        files,
        rows = dataset.records,
        "Loaded table"
    );
    Ok(dataset)
}

/// Align a decoded file with the data schema and append the partition columns
fn attach_partitions(
    batch: &RecordBatch,
    data_schema: &SchemaRef,
    read_schema: &SchemaRef,
    spec: &PartitionSpec,
    values: &[Option<String>],
    path: &str,
) -> Result<RecordBatch> {
    let mut columns = conform_batch(batch, data_schema)?.columns().to_vec();

    for (column, value) in spec.columns().iter().zip(values) {
        let field = read_schema
            .field_with_name(column)
            .map_err(|_| Error::missing_column(column))?;
        columns.push(typed_column(
            value.as_deref(),
            field.data_type(),
            batch.num_rows(),
            path,
        )?);
    }

    Ok(RecordBatch::try_new(Arc::clone(read_schema), columns)?)
}


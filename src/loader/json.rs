//! JSON dataset reader

use super::types::LoadedDataset;
use super::READ_CONCURRENCY;
use crate::error::{Error, Result};
use crate::schema::{json_to_arrow, present_fields};
use crate::storage::StorageLocation;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use futures::{StreamExt, TryStreamExt};
use serde_json::{Deserializer, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Split a file body into records
///
/// A body may hold one object, several objects separated by whitespace or
/// newlines, or arrays of objects which are flattened.
pub fn decode_json_records(body: &[u8], path: &str) -> Result<Vec<Value>> {
    let mut records = Vec::new();

    for value in Deserializer::from_slice(body).into_iter::<Value>() {
        let value = value.map_err(|e| Error::malformed(path, e.to_string()))?;
        match value {
            Value::Object(_) => records.push(value),
            Value::Array(items) => {
                for item in items {
                    if !item.is_object() {
                        return Err(Error::malformed(path, "array element is not an object"));
                    }
                    records.push(item);
                }
            }
            other => {
                return Err(Error::malformed(
                    path,
                    format!("expected an object, found {other}"),
                ))
            }
        }
    }

    Ok(records)
}

/// Load every `.json` object under `prefix` using a fixed schema
///
/// The rows are registered in `session` as the table `dataset`, which also
/// names the input in error messages.
pub async fn load_json_dataset(
    session: &SessionContext,
    location: &StorageLocation,
    prefix: &str,
    dataset: &str,
    schema: &SchemaRef,
) -> Result<LoadedDataset> {
    let objects: Vec<_> = location
        .list(prefix)
        .await?
        .into_iter()
        .filter(|meta| meta.location.as_ref().ends_with(".json"))
        .collect();

    if objects.is_empty() {
        return Err(Error::NoInputFiles {
            path: location.display(prefix),
        });
    }

    let files = objects.len();
    let parsed: Vec<(RecordBatch, HashSet<String>)> = futures::stream::iter(objects)
        .map(|meta| async move {
            let shown = location.display(location.relative(&meta.location));
            let body = location.read(&meta.location).await?;
            let records = decode_json_records(&body, &shown)?;
            debug!(path = %shown, records = records.len(), "Read input file");

            let present = present_fields(&records, schema);
            let batch = json_to_arrow(&records, schema)?;
            Ok::<_, Error>((batch, present))
        })
        .buffered(READ_CONCURRENCY)
        .try_collect()
        .await?;

    let mut present = HashSet::new();
    let mut batches = Vec::with_capacity(parsed.len());
    for (batch, fields) in parsed {
        present.extend(fields);
        batches.push(batch);
    }

    let records: usize = batches.iter().map(RecordBatch::num_rows).sum();
    if records > 0 {
        if let Some(field) = schema
            .fields()
            .iter()
            .find(|field| !present.contains(field.name()))
        {
            return Err(Error::MissingField {
                dataset: dataset.to_string(),
                field: field.name().clone(),
            });
        }
    }

    info!(
        dataset,
        files,
        records,
        source = %location.display(prefix),
        "Loaded JSON dataset"
    );
    LoadedDataset::register(session, dataset, Arc::clone(schema), batches, files).await
}

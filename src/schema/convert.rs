//! JSON to Arrow conversion under a fixed schema
//!
//! Field names are matched case-insensitively, numbers encoded as strings are
//! coerced to the target numeric type, and any other mismatch becomes null.

use crate::error::{Error, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Convert JSON records to an Arrow RecordBatch with the given schema
///
/// Keys not in the schema are ignored; schema fields missing from a record
/// are null for that row.
pub fn json_to_arrow(records: &[Value], schema: &SchemaRef) -> Result<RecordBatch> {
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::clone(schema)));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let values: Vec<Option<&Value>> = records
            .iter()
            .map(|record| match record {
                Value::Object(obj) => lookup(obj, field.name()),
                _ => None,
            })
            .collect();

        let array = build_array(&values, field.data_type()).map_err(|e| {
            Error::output(format!("Failed to build column '{}': {e}", field.name()))
        })?;
        columns.push(array);
    }

    RecordBatch::try_new(Arc::clone(schema), columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

/// Reorder a batch's columns by name to match `schema`, casting where the
/// types differ
pub fn conform_batch(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| -> Result<ArrayRef> {
            let column = batch
                .column_by_name(field.name())
                .ok_or_else(|| Error::missing_column(field.name()))?;
            if column.data_type() == field.data_type() {
                Ok(Arc::clone(column))
            } else {
                Ok(cast(column, field.data_type())?)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
}

/// Names of schema fields that appear as a key in at least one record
pub fn present_fields(records: &[Value], schema: &Schema) -> HashSet<String> {
    let mut present = HashSet::new();
    for field in schema.fields() {
        let found = records.iter().any(|record| match record {
            Value::Object(obj) => lookup(obj, field.name()).is_some(),
            _ => false,
        });
        if found {
            present.insert(field.name().clone());
        }
    }
    present
}

/// Find a key, falling back to a case-insensitive match
fn lookup<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).or_else(|| {
        obj.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int32 => {
            let arr: Int32Array = values
                .iter()
                .map(|v| v.and_then(as_i64).and_then(|i| i32::try_from(i).ok()))
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values.iter().map(|v| v.and_then(as_string)).collect();
            Ok(Arc::new(arr))
        }

        other => Err(Error::output(format!(
            "Unsupported input column type {other:?}"
        ))),
    }
}

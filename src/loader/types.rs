//! Loader result types

use crate::error::Result;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datafusion::dataframe::DataFrame;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use std::sync::Arc;

/// A dataset read from storage
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// The rows, as the session table the dataset was registered under
    pub frame: DataFrame,
    /// Number of files read
    pub files: usize,
    /// Number of records read
    pub records: usize,
}

impl LoadedDataset {
    /// Register `batches` as the session table `name`, replacing any table
    /// already registered under that name
    pub async fn register(
        session: &SessionContext,
        name: &str,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
        files: usize,
    ) -> Result<Self> {
        let records = batches.iter().map(RecordBatch::num_rows).sum();
        let table = MemTable::try_new(schema, vec![batches])?;
        session.deregister_table(name)?;
        session.register_table(name, Arc::new(table))?;
        let frame = session.table(name).await?;

        Ok(Self {
            frame,
            files,
            records,
        })
    }
}

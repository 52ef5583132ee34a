//! Parquet writer settings
//!
//! Maps the job's write options onto the options the query engine hands to
//! its Parquet sink.

use crate::config::{CompressionCodec, WriteOptions};
use datafusion::config::TableParquetOptions;

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: CompressionCodec,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::Snappy,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    /// Build from the job's write options
    #[must_use]
    pub fn from_options(options: &WriteOptions) -> Self {
        Self::default()
            .with_compression(options.compression)
            .with_row_group_size(options.row_group_size)
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionCodec) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Get the compression codec
    #[must_use]
    pub fn compression(&self) -> CompressionCodec {
        self.compression
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Options for the engine's Parquet sink
    ///
    /// Dictionary encoding and page statistics stay at the engine defaults.
    pub fn table_options(&self) -> TableParquetOptions {
        let mut options = TableParquetOptions::default();
        options.global.compression = Some(self.compression.parquet_setting().to_string());
        options.global.max_row_group_size = self.row_group_size;
        options
    }
}

//! Error types for the Sparkify lake job
//!
//! This module defines the error hierarchy for the whole job.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Every error is fatal to the run; there is no retry layer.

use thiserror::Error;

/// The main error type for the ETL job
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("Invalid storage location '{url}': {message}")]
    InvalidLocation { url: String, message: String },

    #[error("Destination '{path}' already exists")]
    DestinationExists { path: String },

    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("No input files found under '{path}'")]
    NoInputFiles { path: String },

    #[error("Malformed record in '{path}': {message}")]
    MalformedRecord { path: String, message: String },

    #[error("Field '{field}' is missing from every record of dataset '{dataset}'")]
    MissingField { dataset: String, field: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Column '{column}' not found")]
    MissingColumn { column: String },

    #[error("Invalid partition path '{path}': {message}")]
    InvalidPartition { path: String, message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Query Errors
    // ============================================================================
    #[error("Query error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid location error
    pub fn location(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidLocation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create an invalid partition error
    pub fn partition(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPartition {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Whether the failure came from the input side of the job
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::NoInputFiles { .. } | Error::MalformedRecord { .. } | Error::MissingField { .. }
        )
    }
}

/// Result type alias for the ETL job
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

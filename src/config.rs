//! Job configuration
//!
//! All settings the job needs are carried by an explicit [`JobConfig`] value.
//! Storage credentials live in [`StorageCredentials`] and are handed to the
//! object store builders directly, so the library never reads or mutates
//! process environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Input base location used when none is configured
pub const DEFAULT_INPUT: &str = "s3a://udacity-dend/";

/// Output base location used when none is configured
pub const DEFAULT_OUTPUT: &str = "s3a://sparkify-datalake-project-output/";

// ============================================================================
// Top-Level Job Config
// ============================================================================

/// Complete job configuration, usually loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Base location of the raw input datasets
    #[serde(default = "default_input")]
    pub input: String,

    /// Base location the star schema tables are written under
    #[serde(default = "default_output")]
    pub output: String,

    /// Song metadata directory, relative to `input`
    #[serde(default = "default_song_data")]
    pub song_data: String,

    /// Event log directory, relative to `input`
    #[serde(default = "default_log_data")]
    pub log_data: String,

    /// Credentials for remote object stores
    #[serde(default)]
    pub credentials: StorageCredentials,

    /// Output file settings
    #[serde(default)]
    pub write: WriteOptions,
}

fn default_input() -> String {
    DEFAULT_INPUT.to_string()
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_song_data() -> String {
    "song_data".to_string()
}

fn default_log_data() -> String {
    "log-data".to_string()
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            song_data: default_song_data(),
            log_data: default_log_data(),
            credentials: StorageCredentials::default(),
            write: WriteOptions::default(),
        }
    }
}

impl JobConfig {
    /// Create a config for the given input and output locations
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    /// Parse a config from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: JobConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Set credentials
    #[must_use]
    pub fn with_credentials(mut self, credentials: StorageCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the write mode
    #[must_use]
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.write.mode = mode;
        self
    }

    /// Check the config for values the job cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(Error::invalid_value("input", "must not be empty"));
        }
        if self.output.trim().is_empty() {
            return Err(Error::invalid_value("output", "must not be empty"));
        }
        if self.song_data.trim().is_empty() {
            return Err(Error::invalid_value("song_data", "must not be empty"));
        }
        if self.log_data.trim().is_empty() {
            return Err(Error::invalid_value("log_data", "must not be empty"));
        }
        if self.write.row_group_size == 0 {
            return Err(Error::invalid_value(
                "write.row_group_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Credentials for remote object stores
///
/// Missing values are left to each store's own defaults (instance metadata,
/// anonymous access, ...).
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageCredentials {
    /// AWS access key id
    #[serde(default)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,

    /// AWS session token for temporary credentials
    #[serde(default)]
    pub aws_session_token: Option<String>,

    /// AWS region
    #[serde(default)]
    pub aws_region: Option<String>,

    /// Custom S3 endpoint (MinIO, R2, localstack)
    #[serde(default)]
    pub aws_endpoint: Option<String>,

    /// Allow plain HTTP endpoints
    #[serde(default)]
    pub allow_http: bool,

    /// Path to a GCS service account JSON file
    #[serde(default)]
    pub gcs_service_account_path: Option<String>,

    /// Azure storage account name
    #[serde(default)]
    pub azure_account: Option<String>,

    /// Azure storage access key
    #[serde(default)]
    pub azure_access_key: Option<String>,
}

impl StorageCredentials {
    /// Create AWS credentials from a key pair
    pub fn aws(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            aws_access_key_id: Some(access_key_id.into()),
            aws_secret_access_key: Some(secret_access_key.into()),
            ..Self::default()
        }
    }

    /// Set the AWS region
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.aws_region = Some(region.into());
        self
    }

    /// Fill unset AWS values from a variable lookup
    ///
    /// The lookup receives the conventional variable names (`AWS_ACCESS_KEY_ID`,
    /// `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`, `AWS_DEFAULT_REGION`).
    /// Values already present are never replaced.
    #[must_use]
    pub fn with_fallback<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn fill<F: Fn(&str) -> Option<String>>(slot: &mut Option<String>, key: &str, lookup: &F) {
            if slot.is_none() {
                *slot = lookup(key).filter(|v| !v.is_empty());
            }
        }

        fill(&mut self.aws_access_key_id, "AWS_ACCESS_KEY_ID", &lookup);
        fill(
            &mut self.aws_secret_access_key,
            "AWS_SECRET_ACCESS_KEY",
            &lookup,
        );
        fill(&mut self.aws_session_token, "AWS_SESSION_TOKEN", &lookup);
        fill(&mut self.aws_region, "AWS_DEFAULT_REGION", &lookup);
        self
    }
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "****"
    } else {
        "<unset>"
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("aws_access_key_id", &redact(&self.aws_access_key_id))
            .field("aws_secret_access_key", &redact(&self.aws_secret_access_key))
            .field("aws_session_token", &redact(&self.aws_session_token))
            .field("aws_region", &self.aws_region)
            .field("aws_endpoint", &self.aws_endpoint)
            .field("allow_http", &self.allow_http)
            .field("gcs_service_account_path", &self.gcs_service_account_path)
            .field("azure_account", &self.azure_account)
            .field("azure_access_key", &redact(&self.azure_access_key))
            .finish()
    }
}

// ============================================================================
// Write Options
// ============================================================================

/// What to do when a destination table already has data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace everything under the destination
    #[default]
    Overwrite,
    /// Add new files next to the existing ones
    Append,
    /// Fail the run
    ErrorIfExists,
    /// Leave the destination untouched and skip the write
    Ignore,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteMode::Overwrite => "overwrite",
            WriteMode::Append => "append",
            WriteMode::ErrorIfExists => "error_if_exists",
            WriteMode::Ignore => "ignore",
        };
        f.write_str(name)
    }
}

/// Parquet compression codec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionCodec {
    /// Snappy (Spark's default)
    #[default]
    Snappy,
    /// Zstandard
    Zstd,
    /// Gzip
    Gzip,
    /// No compression
    Uncompressed,
}

impl CompressionCodec {
    /// The writer's compression setting, levels included where required
    pub fn parquet_setting(self) -> &'static str {
        match self {
            CompressionCodec::Snappy => "snappy",
            CompressionCodec::Zstd => "zstd(3)",
            CompressionCodec::Gzip => "gzip(6)",
            CompressionCodec::Uncompressed => "uncompressed",
        }
    }
}

/// Output file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Behavior when the destination already holds data
    #[serde(default)]
    pub mode: WriteMode,

    /// Compression codec for data files
    #[serde(default)]
    pub compression: CompressionCodec,

    /// Maximum rows per row group
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            mode: WriteMode::default(),
            compression: CompressionCodec::default(),
            row_group_size: default_row_group_size(),
        }
    }
}

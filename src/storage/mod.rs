//! Storage module
//!
//! Uniform access to the object stores the job reads from and writes to.
//!
//! # Overview
//!
//! A [`StorageLocation`] is an object store plus a base prefix. Supported URLs:
//! - `s3://`, `s3a://`, `s3n://` - AWS S3 (and S3-compatible endpoints)
//! - `gs://` - Google Cloud Storage
//! - `az://` - Azure Blob Storage
//! - `memory://` - process-local in-memory store
//! - `/local/path`, `./path` or `file:///path` - local filesystem

mod location;

pub use location::StorageLocation;

#[cfg(test)]
mod tests;

//! Execution engine module
//!
//! Runs the transform stages against the configured locations.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Job` - Opens the input and output locations and runs stages in order
//! - `Stage` - Which stages to run
//! - `StageReport` / `JobReport` - Serializable run summaries

mod types;

pub use types::{JobReport, Stage, StageReport};

use crate::config::JobConfig;
use crate::error::Result;
use crate::output::DatasetWriter;
use crate::storage::StorageLocation;
use crate::transform::{EventLogTransform, SongCatalogTransform, Transform, TransformContext};
use chrono::Utc;
use datafusion::prelude::SessionContext;
use std::time::Instant;
use tracing::info;

/// One run of the ETL job
#[derive(Debug, Clone)]
pub struct Job {
    /// Job configuration
    config: JobConfig,
    /// Raw input root
    input: StorageLocation,
    /// Output root
    output: StorageLocation,
    /// Identifies the run in logs and reports
    run_id: String,
}

impl Job {
    /// Validate the configuration and open both locations
    pub fn new(config: JobConfig) -> Result<Self> {
        config.validate()?;
        let input = StorageLocation::open(&config.input, &config.credentials)?;
        let output = StorageLocation::open_or_create(&config.output, &config.credentials)?;
        Ok(Self::with_locations(config, input, output))
    }

    /// Use already opened locations
    pub fn with_locations(
        config: JobConfig,
        input: StorageLocation,
        output: StorageLocation,
    ) -> Self {
        Self {
            config,
            input,
            output,
            run_id: new_run_id(),
        }
    }

    /// Override the run identifier
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// The run identifier
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The job configuration
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    fn context(&self) -> TransformContext {
        TransformContext {
            session: SessionContext::new(),
            input: self.input.clone(),
            writer: DatasetWriter::new(self.output.clone(), self.config.write.clone()),
            song_data: self.config.song_data.clone(),
            log_data: self.config.log_data.clone(),
        }
    }

    /// Run every stage
    pub async fn run(&self) -> Result<JobReport> {
        self.run_stage(Stage::All).await
    }

    /// Run the selected stage(s)
    ///
    /// The first failing stage aborts the run.
    pub async fn run_stage(&self, stage: Stage) -> Result<JobReport> {
        let started = Instant::now();
        let transforms: Vec<Box<dyn Transform>> = match stage {
            Stage::All => vec![Box::new(SongCatalogTransform), Box::new(EventLogTransform)],
            Stage::Songs => vec![Box::new(SongCatalogTransform)],
            Stage::Events => vec![Box::new(EventLogTransform)],
        };

        info!(
            run_id = %self.run_id,
            stage = %stage,
            input = %self.input.display(""),
            output = %self.output.display(""),
            mode = %self.config.write.mode,
            "Starting job"
        );

        // One session per run, so stage tables never leak between runs
        let ctx = self.context();
        let mut stages = Vec::with_capacity(transforms.len());
        for transform in &transforms {
            stages.push(transform.run(&ctx).await?);
        }

        let report = JobReport {
            run_id: self.run_id.clone(),
            stages,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            run_id = %report.run_id,
            rows = report.total_rows(),
            elapsed_ms = report.elapsed_ms,
            "Job complete"
        );
        Ok(report)
    }
}

/// Run identifier from the current UTC time, e.g. `20240101120000123`
fn new_run_id() -> String {
    Utc::now().format("%Y%m%d%H%M%S%3f").to_string()
}

//! CLI runner - builds the job and prints its report

use crate::cli::commands::{Cli, OutputFormat};
use crate::config::JobConfig;
use crate::engine::{Job, JobReport, Stage};
use crate::error::Result;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Resolve the configuration, run the job and print the report
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config(|key| std::env::var(key).ok())?;
        debug!(config = ?config, "Resolved configuration");

        let job = Job::new(config)?;
        let report = job.run_stage(Stage::from(self.cli.stage)).await?;
        println!("{}", self.render(&report)?);
        Ok(())
    }

    /// Config file (or defaults), then command-line overrides, then
    /// credentials missing from both filled in through `lookup`
    pub fn load_config<F>(&self, lookup: F) -> Result<JobConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.cli.config {
            Some(path) => JobConfig::from_file(path)?,
            None => JobConfig::default(),
        };

        if let Some(input) = &self.cli.input {
            config.input.clone_from(input);
        }
        if let Some(output) = &self.cli.output {
            config.output.clone_from(output);
        }
        if let Some(mode) = self.cli.mode {
            config.write.mode = mode.into();
        }
        if let Some(compression) = self.cli.compression {
            config.write.compression = compression.into();
        }

        config.credentials = config.credentials.with_fallback(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Format a report for stdout
    pub fn render(&self, report: &JobReport) -> Result<String> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(report)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(report)?,
        };
        Ok(text)
    }
}

//! Engine types
//!
//! Stage selection and the reports returned by a run.

use crate::error::Error;
use crate::output::TableReport;
use crate::schema::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Which part of the job to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Song catalog, then event log
    #[default]
    All,
    /// Song catalog only
    Songs,
    /// Event log only; needs a `songs` table from an earlier run
    Events,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::All => "all",
            Stage::Songs => "songs",
            Stage::Events => "events",
        };
        f.write_str(name)
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Stage::All),
            "songs" => Ok(Stage::Songs),
            "events" => Ok(Stage::Events),
            other => Err(Error::invalid_value(
                "stage",
                format!("unknown stage '{other}', expected all, songs or events"),
            )),
        }
    }
}

/// Outcome of one stage
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    /// Stage that ran
    pub stage: Stage,
    /// Input files read
    pub input_files: usize,
    /// Input records read
    pub input_records: usize,
    /// Tables written, in write order
    pub tables: Vec<TableReport>,
    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

impl StageReport {
    /// Start a report for a stage
    pub fn new(stage: Stage, input_files: usize, input_records: usize) -> Self {
        Self {
            stage,
            input_files,
            input_records,
            tables: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Record the elapsed time since `started`
    pub fn finish(&mut self, started: Instant) {
        self.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    }

    /// Report for one table, if this stage wrote it
    pub fn table(&self, table: Table) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == table)
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Identifier stamped into output file names
    pub run_id: String,
    /// Stage reports, in run order
    pub stages: Vec<StageReport>,
    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

impl JobReport {
    /// Report for one table across all stages
    pub fn table(&self, table: Table) -> Option<&TableReport> {
        self.stages.iter().find_map(|stage| stage.table(table))
    }

    /// Rows written across all tables
    pub fn total_rows(&self) -> usize {
        self.stages
            .iter()
            .flat_map(|stage| &stage.tables)
            .map(|t| t.rows)
            .sum()
    }
}

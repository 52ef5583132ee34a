//! Transform stages
//!
//! # Overview
//!
//! - `SongCatalogTransform` - song metadata into `songs` and `artists`
//! - `EventLogTransform` - the event log into `users`, `time` and
//!   `songplays`, joining against the `songs` table already written
//!
//! Each stage loads its input into the run's query session, plans its
//! tables as DataFusion frames and writes them before returning, so the
//! event stage always sees the song stage's output.

mod events;
mod songs;
mod time;

pub use events::{
    build_songplays_table, build_time_table, build_users_table, play_events, EventLogTransform,
    NEXT_SONG,
};
pub use songs::{build_artists_table, build_songs_table, SongCatalogTransform};
pub use time::{
    start_time_from_ts, time_part, time_parts, with_start_time, year_month, TIME_PARTS,
};

use crate::engine::{Stage, StageReport};
use crate::error::Result;
use crate::output::DatasetWriter;
use crate::storage::StorageLocation;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;

/// Query session, locations and writer shared by the stages of one run
#[derive(Clone)]
pub struct TransformContext {
    /// Session the stages register their inputs in and plan against
    pub session: SessionContext,
    /// Root of the raw input data
    pub input: StorageLocation,
    /// Writer for the output tables
    pub writer: DatasetWriter,
    /// Song metadata prefix under `input`
    pub song_data: String,
    /// Event log prefix under `input`
    pub log_data: String,
}

impl TransformContext {
    /// The output location
    pub fn output(&self) -> &StorageLocation {
        self.writer.location()
    }
}

/// A stage of the job
#[async_trait]
pub trait Transform: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// The stage this transform implements
    fn stage(&self) -> Stage;

    /// Load, transform and write
    async fn run(&self, ctx: &TransformContext) -> Result<StageReport>;
}

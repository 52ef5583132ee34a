//! Event log stage

use super::time::{time_parts, with_start_time, year_month};
use super::{Transform, TransformContext};
use crate::engine::{Stage, StageReport};
use crate::error::Result;
use crate::loader::{load_json_dataset, load_table};
use crate::schema::{event_record_schema, Table};
use arrow::datatypes::DataType;
use async_trait::async_trait;
use datafusion::dataframe::DataFrame;
use datafusion::functions_window::expr_fn::row_number;
use datafusion::prelude::{cast, col, ident, lit, JoinType};
use std::time::Instant;
use tracing::info;

/// Page value marking a song play
pub const NEXT_SONG: &str = "NextSong";

/// Keep only song plays
pub fn play_events(events: DataFrame) -> Result<DataFrame> {
    Ok(events.filter(col("page").eq(lit(NEXT_SONG)))?)
}

/// `users`: distinct user rows
///
/// Deduplication is row-wise, so a user whose level changed keeps one row
/// per level.
pub fn build_users_table(plays: DataFrame) -> Result<DataFrame> {
    // camelCase input names go through `ident`, which keeps their case
    Ok(plays
        .select(vec![
            ident("userId").alias("user_id"),
            ident("firstName").alias("first_name"),
            ident("lastName").alias("last_name"),
            col("gender"),
            col("level"),
        ])?
        .distinct()?)
}

/// `time`: calendar fields of each distinct `start_time`
pub fn build_time_table(plays: DataFrame) -> Result<DataFrame> {
    let mut columns = vec![col("start_time")];
    columns.extend(time_parts());

    Ok(plays
        .select_columns(&["start_time"])?
        .distinct()?
        .select(columns)?)
}

/// `songplays`: plays joined to songs by exact title
///
/// `plays` must already carry `start_time`; `songs` needs `song_id`,
/// `title` and `artist_id`. Plays without a matching title are dropped.
pub fn build_songplays_table(plays: DataFrame, songs: DataFrame) -> Result<DataFrame> {
    let songs = songs.select_columns(&["song_id", "title", "artist_id"])?;

    let mut columns = vec![
        cast(col("songplay_id"), DataType::Int64).alias("songplay_id"),
        col("start_time"),
        ident("userId").alias("user_id"),
        col("level"),
        col("song_id"),
        col("artist_id"),
        ident("sessionId").alias("session_id"),
        col("location"),
        ident("userAgent").alias("user_agent"),
    ];
    columns.extend(year_month());

    Ok(plays
        .join(songs, JoinType::Inner, &["song"], &["title"], None)?
        .with_column("songplay_id", row_number())?
        .select(columns)?)
}

/// Builds `users`, `time` and `songplays` from the event log
#[derive(Debug, Clone, Copy, Default)]
pub struct EventLogTransform;

#[async_trait]
impl Transform for EventLogTransform {
    fn name(&self) -> &'static str {
        "event_log"
    }

    fn stage(&self) -> Stage {
        Stage::Events
    }

    async fn run(&self, ctx: &TransformContext) -> Result<StageReport> {
        let started = Instant::now();
        info!(
            stage = self.name(),
            input = %ctx.input.display(&ctx.log_data),
            "Starting stage"
        );

        let dataset = load_json_dataset(
            &ctx.session,
            &ctx.input,
            &ctx.log_data,
            "log_data",
            &event_record_schema(),
        )
        .await?;
        let mut report = StageReport::new(self.stage(), dataset.files, dataset.records);

        let plays = with_start_time(play_events(dataset.frame)?)?;

        let users = build_users_table(plays.clone())?;
        report
            .tables
            .push(ctx.writer.write_table(Table::Users, users).await?);

        let time = build_time_table(plays.clone())?;
        report
            .tables
            .push(ctx.writer.write_table(Table::Time, time).await?);

        let songs = load_table(&ctx.session, ctx.output(), Table::Songs).await?;
        let songplays = build_songplays_table(plays, songs.frame)?;
        report
            .tables
            .push(ctx.writer.write_table(Table::Songplays, songplays).await?);

        report.finish(started);
        info!(stage = self.name(), elapsed_ms = report.elapsed_ms, "Stage complete");
        Ok(report)
    }
}

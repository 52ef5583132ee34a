//! Song catalog stage

use super::{Transform, TransformContext};
use crate::engine::{Stage, StageReport};
use crate::error::Result;
use crate::loader::load_json_dataset;
use crate::schema::{song_record_schema, Table};
use async_trait::async_trait;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::col;
use std::time::Instant;
use tracing::info;

/// `songs`: one row per distinct song record
pub fn build_songs_table(records: DataFrame) -> Result<DataFrame> {
    Ok(records
        .select_columns(&["song_id", "title", "artist_id", "year", "duration"])?
        .distinct()?)
}

/// `artists`: exactly one row per `artist_id`
///
/// When an artist appears with differing details, the row that sorts first
/// by name, location, latitude and longitude (nulls last) wins.
pub fn build_artists_table(records: DataFrame) -> Result<DataFrame> {
    let columns = vec![
        col("artist_id"),
        col("artist_name").alias("name"),
        col("artist_location").alias("location"),
        col("artist_latitude").alias("lattitude"),
        col("artist_longitude").alias("longitude"),
    ];
    let order = [
        "artist_id",
        "artist_name",
        "artist_location",
        "artist_latitude",
        "artist_longitude",
    ]
    .iter()
    .map(|name| col(*name).sort(true, false))
    .collect();

    Ok(records.distinct_on(vec![col("artist_id")], columns, Some(order))?)
}

/// Builds `songs` and `artists` from the song metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct SongCatalogTransform;

#[async_trait]
impl Transform for SongCatalogTransform {
    fn name(&self) -> &'static str {
        "song_catalog"
    }

    fn stage(&self) -> Stage {
        Stage::Songs
    }

    async fn run(&self, ctx: &TransformContext) -> Result<StageReport> {
        let started = Instant::now();
        info!(
            stage = self.name(),
            input = %ctx.input.display(&ctx.song_data),
            "Starting stage"
        );

        let dataset = load_json_dataset(
            &ctx.session,
            &ctx.input,
            &ctx.song_data,
            "song_data",
            &song_record_schema(),
        )
        .await?;

        let mut report = StageReport::new(self.stage(), dataset.files, dataset.records);

        let songs = build_songs_table(dataset.frame.clone())?;
        report
            .tables
            .push(ctx.writer.write_table(Table::Songs, songs).await?);

        let artists = build_artists_table(dataset.frame)?;
        report
            .tables
            .push(ctx.writer.write_table(Table::Artists, artists).await?);

        report.finish(started);
        info!(stage = self.name(), elapsed_ms = report.elapsed_ms, "Stage complete");
        Ok(report)
    }
}

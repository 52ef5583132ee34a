//! Input record schemas and output table definitions

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

fn utf8(name: &str) -> Field {
    Field::new(name, DataType::Utf8, true)
}

fn int64(name: &str) -> Field {
    Field::new(name, DataType::Int64, true)
}

fn int32(name: &str) -> Field {
    Field::new(name, DataType::Int32, true)
}

fn float64(name: &str) -> Field {
    Field::new(name, DataType::Float64, true)
}

/// Type of every `start_time` column: microseconds since epoch, UTC
pub fn start_time_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}

/// Fields read from each song metadata record
pub fn song_record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        utf8("song_id"),
        utf8("title"),
        utf8("artist_id"),
        int64("year"),
        float64("duration"),
        utf8("artist_name"),
        utf8("artist_location"),
        float64("artist_latitude"),
        float64("artist_longitude"),
    ]))
}

/// Fields read from each event log record
pub fn event_record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        utf8("userId"),
        utf8("firstName"),
        utf8("lastName"),
        utf8("gender"),
        utf8("level"),
        int64("ts"),
        utf8("page"),
        utf8("song"),
        int64("sessionId"),
        utf8("location"),
        utf8("userAgent"),
    ]))
}

/// The tables of the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Song dimension
    Songs,
    /// Artist dimension
    Artists,
    /// User dimension
    Users,
    /// Time dimension
    Time,
    /// Song play fact table
    Songplays,
}

impl Table {
    /// All tables in the order they are produced
    pub const ALL: [Table; 5] = [
        Table::Songs,
        Table::Artists,
        Table::Users,
        Table::Time,
        Table::Songplays,
    ];

    /// Directory name under the output root
    pub fn name(self) -> &'static str {
        match self {
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Users => "users",
            Table::Time => "time",
            Table::Songplays => "songplays",
        }
    }

    /// Columns the table is partitioned by, outermost first
    pub fn partition_columns(self) -> &'static [&'static str] {
        match self {
            Table::Songs => &["year", "artist_id"],
            Table::Time | Table::Songplays => &["year", "month"],
            Table::Artists | Table::Users => &[],
        }
    }

    /// Full logical schema, partition columns included
    pub fn schema(self) -> SchemaRef {
        let fields = match self {
            Table::Songs => vec![
                utf8("song_id"),
                utf8("title"),
                utf8("artist_id"),
                int64("year"),
                float64("duration"),
            ],
            Table::Artists => vec![
                utf8("artist_id"),
                utf8("name"),
                utf8("location"),
                float64("lattitude"),
                float64("longitude"),
            ],
            Table::Users => vec![
                utf8("user_id"),
                utf8("first_name"),
                utf8("last_name"),
                utf8("gender"),
                utf8("level"),
            ],
            Table::Time => vec![
                Field::new("start_time", start_time_type(), true),
                int32("hour"),
                int32("day"),
                int32("week"),
                int32("month"),
                int32("year"),
                utf8("weekday"),
            ],
            Table::Songplays => vec![
                Field::new("songplay_id", DataType::Int64, false),
                Field::new("start_time", start_time_type(), true),
                utf8("user_id"),
                utf8("level"),
                utf8("song_id"),
                utf8("artist_id"),
                int64("session_id"),
                utf8("location"),
                utf8("user_agent"),
                int32("year"),
                int32("month"),
            ],
        };
        Arc::new(Schema::new(fields))
    }

    /// Schema of the data files, i.e. without the partition columns
    pub fn data_schema(self) -> SchemaRef {
        let partition_columns = self.partition_columns();
        let schema = self.schema();
        let fields: Vec<_> = schema
            .fields()
            .iter()
            .filter(|field| !partition_columns.contains(&field.name().as_str()))
            .cloned()
            .collect();
        Arc::new(Schema::new(fields))
    }

    /// Schema of the table when scanned back: data columns, then partition columns
    pub fn read_schema(self) -> SchemaRef {
        let schema = self.schema();
        let mut fields: Vec<_> = self.data_schema().fields().iter().cloned().collect();
        for column in self.partition_columns() {
            if let Ok(field) = schema.field_with_name(column) {
                fields.push(Arc::new(field.clone()));
            }
        }
        Arc::new(Schema::new(fields))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Timestamp derivations for the event log
//!
//! All calendar fields are computed in UTC.

use crate::error::Result;
use crate::schema::start_time_type;
use arrow::datatypes::DataType;
use chrono::{DateTime, Utc};
use datafusion::dataframe::DataFrame;
use datafusion::prelude::{cast, col, date_part, ident, lit, to_char, when, Expr};

/// Calendar columns derived for the `time` table, in output order
pub const TIME_PARTS: [&str; 6] = ["hour", "day", "week", "month", "year", "weekday"];

/// `ts` milliseconds since epoch as a UTC microsecond timestamp
///
/// A null `ts`, or one outside the range a calendar date can express,
/// yields null.
pub fn start_time_from_ts() -> Result<Expr> {
    let ts = ident("ts");
    let earliest = DateTime::<Utc>::MIN_UTC.timestamp_millis();
    let latest = DateTime::<Utc>::MAX_UTC.timestamp_millis();

    let start_time = when(
        ts.clone().between(lit(earliest), lit(latest)),
        cast(ts * lit(1000_i64), start_time_type()),
    )
    .end()?;
    Ok(start_time)
}

/// Append `start_time` derived from the `ts` column
pub fn with_start_time(events: DataFrame) -> Result<DataFrame> {
    Ok(events.with_column("start_time", start_time_from_ts()?)?)
}

/// One calendar field of `start_time`; `weekday` is the abbreviated day
/// name, e.g. `Wed`, and `week` the ISO-8601 week number
pub fn time_part(name: &str) -> Expr {
    let start_time = col("start_time");
    let value = if name == "weekday" {
        to_char(start_time, lit("%a"))
    } else {
        cast(date_part(lit(name), start_time), DataType::Int32)
    };
    value.alias(name)
}

/// The [`TIME_PARTS`] columns, in order
pub fn time_parts() -> Vec<Expr> {
    TIME_PARTS.iter().map(|name| time_part(name)).collect()
}

/// `year` and `month` of `start_time`
pub fn year_month() -> Vec<Expr> {
    vec![time_part("year"), time_part("month")]
}

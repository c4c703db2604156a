//! Time windows and the readings fetched for a single archive stream.

use chrono::{DateTime, TimeZone, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// An inclusive `[start, end]` interval in UTC.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use hot_water_reset::TimeWindow;
///
/// let start = Utc.with_ymd_and_hms(2021, 9, 9, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2021, 9, 17, 0, 0, 0).unwrap();
/// let window = TimeWindow::new(start, end).unwrap();
/// assert_eq!(window.start_ms(), 1_631_145_600_000);
///
/// // Reversed bounds are rejected
/// assert!(TimeWindow::new(end, start).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Returns `None` unless `start` is strictly before `end`.
    pub fn new(start: impl Into<DateTime<Utc>>, end: impl Into<DateTime<Utc>>) -> Option<Self> {
        let start = start.into();
        let end = end.into();
        (start < end).then_some(Self { start, end })
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    pub fn contains_ms(&self, timestamp_ms: i64) -> bool {
        timestamp_ms >= self.start_ms() && timestamp_ms <= self.end_ms()
    }
}

/// A single archive reading: milliseconds since the epoch and a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp_ms: i64,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp_ms).single()
    }
}

/// Readings for one archive stream, in the order the archive returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub uuid: String,
    pub readings: Vec<Reading>,
}

impl TimeSeries {
    pub fn new(uuid: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            uuid: uuid.into(),
            readings,
        }
    }

    pub fn empty(uuid: impl Into<String>) -> Self {
        Self::new(uuid, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Builds a frame with a `timestamp` column (`Datetime(ms)`) and a `value` column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let timestamps: Vec<i64> = self.readings.iter().map(|r| r.timestamp_ms).collect();
        let values: Vec<f64> = self.readings.iter().map(|r| r.value).collect();

        df!(
            "timestamp" => timestamps,
            "value" => values,
        )?
        .lazy()
        .with_column(
            col("timestamp").cast(DataType::Datetime(TimeUnit::Milliseconds, None)),
        )
        .collect()
    }

    /// Same as [`TimeSeries::to_dataframe`], restricted to readings inside `window`.
    pub fn frame_within(&self, window: &TimeWindow) -> PolarsResult<DataFrame> {
        let start_naive = window.start.naive_utc();
        let end_naive = window.end.naive_utc();

        self.to_dataframe()?
            .lazy()
            .filter(
                col("timestamp")
                    .gt_eq(lit(start_naive))
                    .and(col("timestamp").lt_eq(lit(end_naive))),
            )
            .collect()
    }
}

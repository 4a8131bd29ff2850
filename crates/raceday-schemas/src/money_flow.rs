use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a money-flow bucket by how close to the absolute
/// `time_interval` value it is, per §4.2 ("Interval classification").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalType {
    FiveMin,
    OneMin,
    ThirtySec,
}

impl IntervalType {
    /// `5m` when `|time_interval| >= 5`, `1m` when `1 <= |time_interval| < 5`,
    /// `30s` when `|time_interval| < 1`.
    pub fn classify(time_interval: f64) -> Self {
        let magnitude = time_interval.abs();
        if magnitude >= 5.0 {
            IntervalType::FiveMin
        } else if magnitude >= 1.0 {
            IntervalType::OneMin
        } else {
            IntervalType::ThirtySec
        }
    }
}

/// Append-only money-flow time-series row. Partitioned per UTC calendar day
/// by `event_timestamp`. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyFlowRecord {
    pub entrant_id: String,
    pub race_id: String,
    /// Signed minutes: positive before start, negative after.
    pub time_to_start: f64,
    /// The bucket label this record represents (e.g. 60, 55, ..., 1, 0, -0.5, -1).
    pub time_interval: f64,
    pub interval_type: IntervalType,
    pub polling_timestamp: DateTime<Utc>,
    /// Equal to `polling_timestamp` per §3; kept as a distinct field because
    /// it is the partition key.
    pub event_timestamp: DateTime<Utc>,
    pub hold_percentage: Option<f64>,
    pub bet_percentage: Option<f64>,
    /// Integer cents.
    pub win_pool_amount: i64,
    /// Integer cents.
    pub place_pool_amount: i64,
    /// Integer cents; may be negative or zero. The baseline bucket (earliest
    /// observed for the race) carries the absolute total instead of a delta.
    pub incremental_win_amount: i64,
    /// Integer cents; same baseline rule as `incremental_win_amount`.
    pub incremental_place_amount: i64,
}

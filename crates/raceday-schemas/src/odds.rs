use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four odds kinds materialised per entrant per poll (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddsType {
    FixedWin,
    FixedPlace,
    PoolWin,
    PoolPlace,
}

impl OddsType {
    pub const ALL: [OddsType; 4] = [
        OddsType::FixedWin,
        OddsType::FixedPlace,
        OddsType::PoolWin,
        OddsType::PoolPlace,
    ];
}

/// Append-only odds time-series row. Partitioned per UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    pub entrant_id: String,
    pub odds_type: OddsType,
    pub value: f64,
    pub event_timestamp: DateTime<Utc>,
}

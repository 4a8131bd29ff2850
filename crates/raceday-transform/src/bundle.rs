use raceday_schemas::{Entrant, Meeting, MoneyFlowRecord, OddsRecord, Race, RacePool};
use serde_json::Value;

use crate::quality::QualityWarning;

/// Output of [`crate::transform_race`]: the normalized entities plus derived
/// records ready for C3/C4/C5, and the original opaque payload so the write
/// stage can archive it if a caller wants to.
#[derive(Debug, Clone)]
pub struct TransformBundle {
    /// `None` when the meeting's category was unsupported and dropped; the
    /// race/entrant rows are still produced (a race cannot exist without a
    /// meeting, so the pipeline must treat `None` here as "skip the whole
    /// write", not write an orphan race).
    pub meeting: Option<Meeting>,
    pub race: Race,
    pub entrants: Vec<Entrant>,
    pub race_pool: Option<RacePool>,
    pub money_flow_records: Vec<MoneyFlowRecord>,
    pub odds_records: Vec<OddsRecord>,
    pub original_payload: Value,
    pub quality_warnings: Vec<QualityWarning>,
}

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Success,
    Failed,
}

/// Per-stage and total wall-clock timings, in milliseconds (§4.6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timings {
    pub fetch_ms: u64,
    pub transform_ms: u64,
    pub write_ms: u64,
    pub total_ms: u64,
}

/// Rows written by a single `process_race` invocation (§4.6, scenario 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub meetings: usize,
    pub races: usize,
    pub entrants: usize,
    pub race_pools: usize,
    pub money_flow_history: usize,
    pub odds_history: usize,
}

#[derive(Debug)]
pub struct PipelineResult {
    pub race_id: String,
    pub status: PipelineStatus,
    pub timings: Timings,
    pub row_counts: RowCounts,
    pub error: Option<PipelineError>,
}

impl PipelineResult {
    pub fn success(race_id: String, timings: Timings, row_counts: RowCounts) -> Self {
        PipelineResult {
            race_id,
            status: PipelineStatus::Success,
            timings,
            row_counts,
            error: None,
        }
    }

    pub fn failure(race_id: String, timings: Timings, error: PipelineError) -> Self {
        PipelineResult {
            race_id,
            status: PipelineStatus::Failed,
            timings,
            row_counts: RowCounts::default(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }
}

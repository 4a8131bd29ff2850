use serde::{Deserialize, Serialize};

/// One row per race: current totals per bet type. Unique per race; each poll
/// overwrites the row in place (see `raceday-db::upsert::bulk_upsert_race_pools`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacePool {
    pub race_id: String,
    /// Integer cents.
    pub win_pool_total: i64,
    /// Integer cents.
    pub place_pool_total: i64,
    /// Integer cents.
    pub quinella_pool_total: i64,
    /// Integer cents.
    pub trifecta_pool_total: i64,
    /// Integer cents.
    pub exacta_pool_total: i64,
    /// Integer cents.
    pub first4_pool_total: i64,
    pub currency: String,
    pub quality_score: f64,
    pub extracted_pool_count: i32,
}

impl RacePool {
    /// Sum of all pool fields, as served on `/api/race-pools` (`total_race_pool`).
    pub fn total_race_pool(&self) -> i64 {
        self.win_pool_total
            + self.place_pool_total
            + self.quinella_pool_total
            + self.trifecta_pool_total
            + self.exacta_pool_total
            + self.first4_pool_total
    }
}

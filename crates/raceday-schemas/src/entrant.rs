use serde::{Deserialize, Serialize};

/// A single runner in a race. Overwritten wholesale on each poll — there is
/// no partial-update path for entrant rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: String,
    pub race_id: String,
    pub runner_number: i32,
    pub name: String,
    pub barrier: Option<i32>,
    pub is_scratched: bool,
    pub fixed_win_odds: Option<f64>,
    pub fixed_place_odds: Option<f64>,
    pub pool_win_odds: Option<f64>,
    pub pool_place_odds: Option<f64>,
    pub hold_percentage: Option<f64>,
    pub bet_percentage: Option<f64>,
    pub win_pool_percentage: Option<f64>,
    /// Integer cents.
    pub win_pool_amount: i64,
    /// Integer cents.
    pub place_pool_amount: i64,
    pub jockey: Option<String>,
    pub trainer: Option<String>,
    pub silks_url: Option<String>,
    pub is_favourite: bool,
    pub is_mover: bool,
}

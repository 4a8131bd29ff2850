use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upstream race category. Greyhounds are observed upstream but unsupported;
/// the transformer drops them with a warning rather than modelling them here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceCategory {
    Thoroughbred,
    Harness,
}

impl RaceCategory {
    /// Maps an upstream category code to a [`RaceCategory`].
    ///
    /// `R | thoroughbred -> Thoroughbred`, `H | harness -> Harness`. Anything
    /// else (including `G` for greyhounds) is not representable here; callers
    /// must treat `None` as "drop the meeting, log a warning" per §4.2.
    pub fn from_upstream_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "r" | "thoroughbred" => Some(RaceCategory::Thoroughbred),
            "h" | "harness" => Some(RaceCategory::Harness),
            _ => None,
        }
    }
}

/// A meeting: one venue's racing card for one calendar day.
///
/// Owns many [`crate::Race`] rows. Created by the daily initializer, mutated
/// by the status poller, never deleted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub name: String,
    pub country: String,
    pub category: RaceCategory,
    /// NZ local calendar date this meeting's races run on.
    pub date: NaiveDate,
    pub track_condition: Option<String>,
    pub tote_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thoroughbred_code_is_r() {
        assert_eq!(
            RaceCategory::from_upstream_code("R"),
            Some(RaceCategory::Thoroughbred)
        );
        assert_eq!(
            RaceCategory::from_upstream_code("r"),
            Some(RaceCategory::Thoroughbred)
        );
    }

    #[test]
    fn harness_code_is_h() {
        assert_eq!(
            RaceCategory::from_upstream_code("H"),
            Some(RaceCategory::Harness)
        );
    }

    #[test]
    fn greyhound_code_is_unsupported() {
        assert_eq!(RaceCategory::from_upstream_code("G"), None);
        assert_eq!(RaceCategory::from_upstream_code("greyhound"), None);
    }
}

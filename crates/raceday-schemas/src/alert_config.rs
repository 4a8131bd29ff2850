use serde::{Deserialize, Serialize};

/// One of up to six indicator rows for a user's money-flow alert
/// configuration, keyed by `display_order`.
///
/// Validation (`^#[0-9A-F]{6}$` hex colour, `display_order in 1..=6`, and the
/// `[min, max)` percentage range with `max = None` meaning open-ended) is
/// enforced by the read-only projection layer that owns the
/// `/api/user-alert-configs` endpoint (out of scope here per §1); this type
/// only carries the validated shape so the core's data model stays complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfigRow {
    pub user_id: String,
    pub indicator_id: String,
    pub display_order: i16,
    pub percentage_range_min: f64,
    pub percentage_range_max: Option<f64>,
    pub color: String,
    pub enabled: bool,
    pub audible_alerts_enabled: bool,
}

impl AlertConfigRow {
    /// `true` when `display_order` is in the valid `1..=6` range.
    pub fn has_valid_display_order(&self) -> bool {
        (1..=6).contains(&self.display_order)
    }

    /// `true` when `color` matches `^#[0-9A-F]{6}$`.
    pub fn has_valid_color(&self) -> bool {
        let bytes = self.color.as_bytes();
        bytes.len() == 7
            && bytes[0] == b'#'
            && bytes[1..].iter().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b))
    }

    /// `true` when the range is well-formed: `min < max` (when `max` is set).
    pub fn has_valid_range(&self) -> bool {
        match self.percentage_range_max {
            Some(max) => self.percentage_range_min < max,
            None => true,
        }
    }
}

/// A POST payload for `/api/user-alert-configs`: upserts by
/// `(user_id, display_order)` or, when present, by `indicator_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfigUpdate {
    pub user_id: String,
    pub indicator_id: Option<String>,
    pub display_order: i16,
    pub percentage_range_min: f64,
    pub percentage_range_max: Option<f64>,
    pub color: String,
    pub enabled: bool,
    pub audible_alerts_enabled: bool,
}

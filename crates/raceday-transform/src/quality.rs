use std::fmt;

/// A non-fatal data-quality warning surfaced alongside a successful
/// transform, per §3 ("violations are recorded as quality warnings, not
/// rejected").
#[derive(Debug, Clone, PartialEq)]
pub enum QualityWarning {
    /// A meeting's upstream category code did not map to a supported
    /// [`raceday_schemas::RaceCategory`]; the meeting was dropped.
    UnsupportedCategory { meeting_id: String, code: String },
    /// Sum of entrants' `win_pool_percentage` fell outside `[98, 102]`.
    WinPoolPercentageOutOfRange { race_id: String, sum: f64 },
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityWarning::UnsupportedCategory { meeting_id, code } => write!(
                f,
                "meeting {meeting_id} dropped: unsupported category code '{code}'"
            ),
            QualityWarning::WinPoolPercentageOutOfRange { race_id, sum } => write!(
                f,
                "race {race_id}: win_pool_percentage sums to {sum:.2}, outside [98, 102]"
            ),
        }
    }
}

/// Checks the §3 invariant that entrants' `win_pool_percentage` should sum
/// to roughly 100%, returning a warning (not an error) when it does not.
pub fn check_win_pool_percentage_sum(
    race_id: &str,
    percentages: &[Option<f64>],
) -> Option<QualityWarning> {
    let sum: f64 = percentages.iter().filter_map(|p| *p).sum();
    if (98.0..=102.0).contains(&sum) {
        None
    } else {
        Some(QualityWarning::WinPoolPercentageOutOfRange {
            race_id: race_id.to_string(),
            sum,
        })
    }
}

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Race status. Monotonic in practice but treated as overwritable — a poll
/// may resend an equal or earlier-looking status without the writer
/// rejecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    Open,
    Closed,
    Interim,
    Final,
    Abandoned,
}

impl RaceStatus {
    /// Normalises a free-form upstream status string.
    ///
    /// Lower-cased; `finalized` and `official`/`officially_finalized` are
    /// treated as equivalent to `final` per the open-question resolution in
    /// DESIGN.md. Anything unrecognised falls back to `open`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => RaceStatus::Open,
            "closed" => RaceStatus::Closed,
            "interim" => RaceStatus::Interim,
            "final" | "finalized" | "official" | "officially_finalized" => RaceStatus::Final,
            "abandoned" => RaceStatus::Abandoned,
            _ => RaceStatus::Open,
        }
    }

    /// `true` once a race has reached a status the scheduler will never poll
    /// again within the current day.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RaceStatus::Final | RaceStatus::Abandoned)
    }
}

/// A race within a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: String,
    pub meeting_id: String,
    pub name: String,
    pub race_number: i32,
    pub scheduled_start_date: NaiveDate,
    pub scheduled_start_time: NaiveTime,
    pub actual_start_time: Option<NaiveTime>,
    pub status: RaceStatus,
}

impl Race {
    /// Parses an upstream start-time string (`HH:MM` or `HH:MM:SS`),
    /// defaulting to midnight when unparseable, per §4.2.
    pub fn parse_start_time(raw: &str) -> NaiveTime {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_normalizes_case_and_synonyms() {
        assert_eq!(RaceStatus::normalize("OPEN"), RaceStatus::Open);
        assert_eq!(RaceStatus::normalize("Finalized"), RaceStatus::Final);
        assert_eq!(
            RaceStatus::normalize("officially_finalized"),
            RaceStatus::Final
        );
        assert_eq!(RaceStatus::normalize("Official"), RaceStatus::Final);
        assert_eq!(RaceStatus::normalize("bogus"), RaceStatus::Open);
    }

    #[test]
    fn terminal_statuses() {
        assert!(RaceStatus::Final.is_terminal());
        assert!(RaceStatus::Abandoned.is_terminal());
        assert!(!RaceStatus::Closed.is_terminal());
        assert!(!RaceStatus::Interim.is_terminal());
    }

    #[test]
    fn start_time_accepts_hh_mm_and_hh_mm_ss() {
        assert_eq!(
            Race::parse_start_time("14:05"),
            NaiveTime::from_hms_opt(14, 5, 0).unwrap()
        );
        assert_eq!(
            Race::parse_start_time("14:05:30"),
            NaiveTime::from_hms_opt(14, 5, 30).unwrap()
        );
    }

    #[test]
    fn start_time_defaults_to_midnight_when_unparseable() {
        assert_eq!(
            Race::parse_start_time("not-a-time"),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
    }
}

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use raceday_schemas::RaceStatus;

/// §4.8's interval table collapsed into a single function. `scheduled_start`
/// is `None` when the upstream start-time string failed to parse; the
/// `RaceStatus::Interim` variant is the "running" row of the table (the
/// state machine in §4.6 never spells a distinct `running` status).
pub fn next_interval(
    status: RaceStatus,
    scheduled_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    high_frequency: bool,
) -> Option<ChronoDuration> {
    if status.is_terminal() {
        return None;
    }

    let base = match status {
        RaceStatus::Closed | RaceStatus::Interim => ChronoDuration::seconds(30),
        RaceStatus::Open => match scheduled_start {
            None => ChronoDuration::minutes(30),
            Some(start) => {
                let until_start = start - now;
                if until_start <= ChronoDuration::minutes(5) {
                    // covers "<=5min to go" and "start already passed, still open"
                    ChronoDuration::seconds(30)
                } else if until_start <= ChronoDuration::minutes(65) {
                    ChronoDuration::seconds(150)
                } else {
                    ChronoDuration::minutes(30)
                }
            }
        },
        RaceStatus::Final | RaceStatus::Abandoned => unreachable!("handled by is_terminal above"),
    };

    Some(if high_frequency { base / 2 } else { base })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn terminal_statuses_never_poll_again() {
        let now = at(2024, 5, 1, 0, 0, 0);
        assert_eq!(next_interval(RaceStatus::Final, Some(now), now, false), None);
        assert_eq!(next_interval(RaceStatus::Abandoned, None, now, false), None);
    }

    #[test]
    fn closed_and_running_always_poll_every_30s() {
        let now = at(2024, 5, 1, 0, 0, 0);
        let far_future = now + ChronoDuration::hours(5);
        assert_eq!(
            next_interval(RaceStatus::Closed, Some(far_future), now, false),
            Some(ChronoDuration::seconds(30))
        );
        assert_eq!(
            next_interval(RaceStatus::Interim, Some(far_future), now, false),
            Some(ChronoDuration::seconds(30))
        );
    }

    #[test]
    fn scenario_4_open_30_minutes_to_start() {
        let now = at(2024, 5, 1, 0, 0, 0);
        let start = at(2024, 5, 1, 0, 30, 0);
        assert_eq!(
            next_interval(RaceStatus::Open, Some(start), now, false),
            Some(ChronoDuration::milliseconds(150_000))
        );
        assert_eq!(
            next_interval(RaceStatus::Open, Some(start), now, true),
            Some(ChronoDuration::milliseconds(75_000))
        );
    }

    #[test]
    fn open_within_5_minutes_of_start_polls_every_30s() {
        let now = at(2024, 5, 1, 0, 0, 0);
        let start = at(2024, 5, 1, 0, 5, 0);
        assert_eq!(
            next_interval(RaceStatus::Open, Some(start), now, false),
            Some(ChronoDuration::seconds(30))
        );
    }

    #[test]
    fn open_with_start_already_passed_polls_every_30s() {
        let now = at(2024, 5, 1, 0, 40, 0);
        let start = at(2024, 5, 1, 0, 30, 0);
        assert_eq!(
            next_interval(RaceStatus::Open, Some(start), now, false),
            Some(ChronoDuration::seconds(30))
        );
    }

    #[test]
    fn open_more_than_65_minutes_out_uses_baseline_30_minutes() {
        let now = at(2024, 5, 1, 0, 0, 0);
        let start = at(2024, 5, 1, 1, 10, 0);
        assert_eq!(
            next_interval(RaceStatus::Open, Some(start), now, false),
            Some(ChronoDuration::minutes(30))
        );
    }

    /// Resolves the §9 open question: unparseable start times fall back to
    /// the baseline 30-minute interval, matching the documented §4.8 table
    /// row rather than the disagreeing "active"/150s test variant.
    #[test]
    fn unparseable_start_time_falls_back_to_baseline_30_minutes() {
        let now = at(2024, 5, 1, 0, 0, 0);
        assert_eq!(
            next_interval(RaceStatus::Open, None, now, false),
            Some(ChronoDuration::minutes(30))
        );
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use raceday_schemas::RaceStatus;

use crate::interval::next_interval;

#[derive(Debug, Clone)]
struct RaceTimer {
    next_fire_at: Option<DateTime<Utc>>,
}

/// Owns one monotonic timer per known race, per §4.8 / §9 ("a min-heap of
/// `(next_fire_at, race_id)`"). A `HashMap` plus a linear scan for the
/// minimum is used instead of a real heap: the race count per scheduler
/// instance (one NZ racing day) is small enough that this never shows up,
/// and it keeps `due_races` trivial to reason about.
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<String, RaceTimer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a race or recomputes its timer immediately. Called both
    /// when a race becomes known mid-day and after any poll that learns a
    /// new status, per §4.8 ("a race completing terminally or becoming
    /// known mid-day re-computes its timer immediately").
    pub fn upsert_race(
        &mut self,
        race_id: impl Into<String>,
        status: RaceStatus,
        scheduled_start: Option<DateTime<Utc>>,
        high_frequency: bool,
        now: DateTime<Utc>,
    ) {
        let next_fire_at = next_interval(status, scheduled_start, now, high_frequency).map(|d| now + d);
        self.timers.insert(race_id.into(), RaceTimer { next_fire_at });
    }

    /// Drops a race from the timer set entirely (distinct from a terminal
    /// status, which keeps the race known but with `next_fire_at = None`).
    pub fn remove_race(&mut self, race_id: &str) {
        self.timers.remove(race_id);
    }

    pub fn is_known(&self, race_id: &str) -> bool {
        self.timers.contains_key(race_id)
    }

    pub fn race_count(&self) -> usize {
        self.timers.len()
    }

    /// All race ids currently tracked, terminal or not. Used by callers
    /// that re-seed the scheduler from a source of truth each tick and
    /// need to know which previously known races to drop.
    pub fn known_race_ids(&self) -> Vec<String> {
        self.timers.keys().cloned().collect()
    }

    /// Earliest pending fire time across all non-terminal races, or `None`
    /// when every known race is terminal (or no races are known yet).
    pub fn next_wake(&self) -> Option<DateTime<Utc>> {
        self.timers.values().filter_map(|t| t.next_fire_at).min()
    }

    /// Race ids whose timer has fired at or before `now`, in fire order —
    /// the "multiple races whose timers elapse in the same tick are
    /// coalesced into one batch" rule from §4.8.
    pub fn due_races(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut due: Vec<(DateTime<Utc>, &String)> = self
            .timers
            .iter()
            .filter_map(|(id, t)| t.next_fire_at.filter(|fire| *fire <= now).map(|fire| (fire, id)))
            .collect();
        due.sort_by_key(|(fire, _)| *fire);
        due.into_iter().map(|(_, id)| id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).unwrap()
    }

    #[test]
    fn unknown_race_has_no_next_wake() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.next_wake(), None);
        assert!(scheduler.due_races(at(12, 0)).is_empty());
    }

    #[test]
    fn coalesces_multiple_due_races_into_one_tick() {
        let mut scheduler = Scheduler::new();
        let now = at(0, 0);
        scheduler.upsert_race("race-a", RaceStatus::Closed, None, false, now);
        scheduler.upsert_race("race-b", RaceStatus::Interim, None, false, now);
        scheduler.upsert_race("race-c", RaceStatus::Open, Some(now + Duration::hours(3)), false, now);

        let due = scheduler.due_races(now + Duration::seconds(31));
        assert_eq!(due.len(), 2);
        assert!(due.contains(&"race-a".to_string()));
        assert!(due.contains(&"race-b".to_string()));
        assert!(!due.contains(&"race-c".to_string()));
    }

    #[test]
    fn terminal_race_is_known_but_never_due() {
        let mut scheduler = Scheduler::new();
        let now = at(0, 0);
        scheduler.upsert_race("race-a", RaceStatus::Final, None, false, now);
        assert!(scheduler.is_known("race-a"));
        assert_eq!(scheduler.next_wake(), None);
        assert!(scheduler.due_races(now + Duration::hours(1)).is_empty());
    }

    #[test]
    fn re_upserting_a_race_recomputes_its_timer_immediately() {
        let mut scheduler = Scheduler::new();
        let now = at(0, 0);
        scheduler.upsert_race("race-a", RaceStatus::Open, Some(now + Duration::hours(2)), false, now);
        assert_eq!(scheduler.next_wake(), Some(now + Duration::minutes(30)));

        scheduler.upsert_race("race-a", RaceStatus::Final, None, false, now);
        assert_eq!(scheduler.next_wake(), None);
    }
}

//! C5: odds change detector.
//!
//! Maintains a process-local snapshot of the last-seen value per
//! `(entrant_id, odds_type)` and drops writes that move less than the
//! configured epsilon, per §4.5. The snapshot is a `DashMap` rather than a
//! `Mutex<HashMap>` because multiple race pipelines touch disjoint entrant
//! ids concurrently and a single global lock would serialise unrelated
//! races (§5 "no process-wide locks besides... the in-memory odds
//! snapshot... guarded by the pool's serialisation").

use dashmap::DashMap;
use raceday_schemas::{OddsRecord, OddsType};
use tracing::debug;

/// Epsilon used to decide whether an odds movement is "significant" (§4.5):
/// a record survives when it differs from the last-seen value by more than
/// `max(relative * last_value, absolute)`.
#[derive(Debug, Clone, Copy)]
pub struct OddsEpsilon {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for OddsEpsilon {
    fn default() -> Self {
        OddsEpsilon {
            relative: 0.01,
            absolute: 0.05,
        }
    }
}

impl OddsEpsilon {
    fn threshold(&self, last_value: f64) -> f64 {
        (self.relative * last_value.abs()).max(self.absolute)
    }
}

/// Process-local snapshot of `(entrant_id, odds_type) -> last_value`.
#[derive(Debug, Default)]
pub struct OddsSnapshot {
    last_seen: DashMap<(String, OddsType), f64>,
    epsilon: OddsEpsilon,
}

impl OddsSnapshot {
    pub fn new(epsilon: OddsEpsilon) -> Self {
        OddsSnapshot {
            last_seen: DashMap::new(),
            epsilon,
        }
    }

    /// Drops any record whose value hasn't moved enough from the last-seen
    /// snapshot for its `(entrant_id, odds_type)` key, and updates the
    /// snapshot for every record that survives. The first observation of a
    /// key always survives (there is nothing to compare against).
    pub fn filter_significant(&self, records: Vec<OddsRecord>) -> Vec<OddsRecord> {
        let mut survivors = Vec::with_capacity(records.len());
        for record in records {
            let key = (record.entrant_id.clone(), record.odds_type);
            let significant = match self.last_seen.get(&key) {
                None => true,
                Some(last) => (record.value - *last).abs() > self.epsilon.threshold(*last),
            };
            if significant {
                self.last_seen.insert(key, record.value);
                survivors.push(record);
            } else {
                debug!(
                    entrant_id = %record.entrant_id,
                    odds_type = ?record.odds_type,
                    value = record.value,
                    "odds movement below epsilon, dropped"
                );
            }
        }
        survivors
    }

    /// Resets all snapshot state. Used between integration tests and at
    /// process start (§4.5).
    pub fn clear_snapshot(&self) {
        self.last_seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(entrant_id: &str, odds_type: OddsType, value: f64) -> OddsRecord {
        OddsRecord {
            entrant_id: entrant_id.to_string(),
            odds_type,
            value,
            event_timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn first_observation_always_survives() {
        let snapshot = OddsSnapshot::new(OddsEpsilon::default());
        let survivors = snapshot.filter_significant(vec![record("e1", OddsType::FixedWin, 2.5)]);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn small_relative_movement_is_suppressed() {
        let snapshot = OddsSnapshot::new(OddsEpsilon::default());
        snapshot.filter_significant(vec![record("e1", OddsType::FixedWin, 2.500)]);
        let survivors = snapshot.filter_significant(vec![record("e1", OddsType::FixedWin, 2.505)]);
        assert!(survivors.is_empty());
    }

    #[test]
    fn movement_exceeding_epsilon_survives() {
        let snapshot = OddsSnapshot::new(OddsEpsilon::default());
        snapshot.filter_significant(vec![record("e1", OddsType::FixedWin, 2.50)]);
        let survivors = snapshot.filter_significant(vec![record("e1", OddsType::FixedWin, 2.60)]);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn absolute_epsilon_dominates_for_small_values() {
        // relative 1% of 0.10 is 0.001, far below the 0.05 absolute floor.
        let snapshot = OddsSnapshot::new(OddsEpsilon::default());
        snapshot.filter_significant(vec![record("e1", OddsType::PoolPlace, 0.10)]);
        let survivors = snapshot.filter_significant(vec![record("e1", OddsType::PoolPlace, 0.12)]);
        assert!(survivors.is_empty());
        let survivors = snapshot.filter_significant(vec![record("e1", OddsType::PoolPlace, 0.20)]);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn distinct_entrants_and_types_do_not_interfere() {
        let snapshot = OddsSnapshot::new(OddsEpsilon::default());
        snapshot.filter_significant(vec![record("e1", OddsType::FixedWin, 2.50)]);
        let survivors = snapshot.filter_significant(vec![
            record("e1", OddsType::FixedPlace, 1.20),
            record("e2", OddsType::FixedWin, 2.50),
        ]);
        assert_eq!(survivors.len(), 2);
    }

    #[test]
    fn clear_snapshot_resets_state() {
        let snapshot = OddsSnapshot::new(OddsEpsilon::default());
        snapshot.filter_significant(vec![record("e1", OddsType::FixedWin, 2.50)]);
        snapshot.clear_snapshot();
        let survivors = snapshot.filter_significant(vec![record("e1", OddsType::FixedWin, 2.505)]);
        assert_eq!(survivors.len(), 1);
    }
}

use chrono::{DateTime, Utc};
use raceday_schemas::{IntervalType, MoneyFlowRecord};
use serde::Deserialize;
use serde_json::Value;

use crate::numeric::{coerce_number, dollars_to_cents};

/// One upstream money-tracker bucket entry as it appears in
/// `entrant.money_tracker[*]`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBucket {
    pub time_interval: f64,
    #[serde(default)]
    pub win_pool_amount: Option<Value>,
    #[serde(default)]
    pub place_pool_amount: Option<Value>,
    #[serde(default)]
    pub hold_percentage: Option<Value>,
    #[serde(default)]
    pub bet_percentage: Option<Value>,
}

/// Derives the money-flow history rows for one entrant from its
/// `money_tracker` bucket array.
///
/// Buckets are sorted chronologically (descending `time_interval`, since
/// the interval counts down to zero as the race approaches); the
/// chronologically-first (baseline) bucket carries the absolute pool total
/// in its incremental fields, and every later bucket carries the delta from
/// its chronological predecessor, per §3/§4.2.
pub fn derive_money_flow(
    race_id: &str,
    entrant_id: &str,
    buckets: &[RawBucket],
    polling_timestamp: DateTime<Utc>,
) -> Vec<MoneyFlowRecord> {
    let mut sorted: Vec<&RawBucket> = buckets.iter().collect();
    sorted.sort_by(|a, b| {
        b.time_interval
            .partial_cmp(&a.time_interval)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut records = Vec::with_capacity(sorted.len());
    let mut prev_win_cents: Option<i64> = None;
    let mut prev_place_cents: Option<i64> = None;

    for bucket in sorted {
        let win_cents = coerce_number(bucket.win_pool_amount.as_ref())
            .map(dollars_to_cents)
            .unwrap_or(0);
        let place_cents = coerce_number(bucket.place_pool_amount.as_ref())
            .map(dollars_to_cents)
            .unwrap_or(0);

        let incremental_win = match prev_win_cents {
            None => win_cents,
            Some(prev) => win_cents - prev,
        };
        let incremental_place = match prev_place_cents {
            None => place_cents,
            Some(prev) => place_cents - prev,
        };

        records.push(MoneyFlowRecord {
            entrant_id: entrant_id.to_string(),
            race_id: race_id.to_string(),
            time_to_start: bucket.time_interval,
            time_interval: bucket.time_interval,
            interval_type: IntervalType::classify(bucket.time_interval),
            polling_timestamp,
            event_timestamp: polling_timestamp,
            hold_percentage: coerce_number(bucket.hold_percentage.as_ref()),
            bet_percentage: coerce_number(bucket.bet_percentage.as_ref()),
            win_pool_amount: win_cents,
            place_pool_amount: place_cents,
            incremental_win_amount: incremental_win,
            incremental_place_amount: incremental_place,
        });

        prev_win_cents = Some(win_cents);
        prev_place_cents = Some(place_cents);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn bucket(time_interval: f64, win: f64) -> RawBucket {
        RawBucket {
            time_interval,
            win_pool_amount: Some(json!(win)),
            place_pool_amount: Some(json!(0.0)),
            hold_percentage: None,
            bet_percentage: None,
        }
    }

    #[test]
    fn baseline_bucket_carries_absolute_total() {
        let records = derive_money_flow("race-1", "entrant-1", &[bucket(60.0, 5.0)], ts());
        assert_eq!(records[0].incremental_win_amount, 500);
        assert_eq!(records[0].win_pool_amount, 500);
    }

    #[test]
    fn later_bucket_carries_delta_from_previous() {
        let buckets = vec![bucket(60.0, 5.0), bucket(55.0, 8.0)];
        let records = derive_money_flow("race-1", "entrant-1", &buckets, ts());
        // sorted descending by time_interval: 60 then 55
        assert_eq!(records[0].time_interval, 60.0);
        assert_eq!(records[0].incremental_win_amount, 500);
        assert_eq!(records[1].time_interval, 55.0);
        assert_eq!(records[1].incremental_win_amount, 300);
    }

    #[test]
    fn out_of_order_input_is_sorted_chronologically() {
        let buckets = vec![bucket(55.0, 8.0), bucket(60.0, 5.0)];
        let records = derive_money_flow("race-1", "entrant-1", &buckets, ts());
        assert_eq!(records[0].time_interval, 60.0);
        assert_eq!(records[1].time_interval, 55.0);
        assert_eq!(records[1].incremental_win_amount, 300);
    }

    #[test]
    fn negative_delta_is_preserved() {
        let buckets = vec![bucket(60.0, 8.0), bucket(55.0, 5.0)];
        let records = derive_money_flow("race-1", "entrant-1", &buckets, ts());
        assert_eq!(records[1].incremental_win_amount, -300);
    }
}

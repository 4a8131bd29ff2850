use std::time::Instant;

use raceday_schemas::{MoneyFlowRecord, OddsRecord};
use serde_json::Value as JsonValue;
use sqlx::{Postgres, Transaction};

use crate::error::WriteError;
use crate::upsert::UpsertCounts;

/// Appends money-flow rows. Never an upsert: the table is append-only
/// (§3) and readers dedup by most-recent `created_at` per
/// `(race_id, entrant_id, time_interval, interval_type)`. A row with no
/// matching daily partition fails the whole insert with
/// `write_partition_not_found`; callers must have called
/// `partitions::ensure_partition` for every distinct day first.
pub async fn insert_money_flow_records(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[MoneyFlowRecord],
) -> Result<UpsertCounts, WriteError> {
    let started = Instant::now();
    for r in rows {
        let interval_type = to_enum_str(r.interval_type);
        sqlx::query(
            r#"
            insert into money_flow_history (
                entrant_id, race_id, time_to_start, time_interval, interval_type,
                polling_timestamp, event_timestamp, hold_percentage, bet_percentage,
                win_pool_amount, place_pool_amount, incremental_win_amount, incremental_place_amount
            )
            values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            "#,
        )
        .bind(&r.entrant_id)
        .bind(&r.race_id)
        .bind(r.time_to_start)
        .bind(r.time_interval)
        .bind(&interval_type)
        .bind(r.polling_timestamp)
        .bind(r.event_timestamp)
        .bind(r.hold_percentage)
        .bind(r.bet_percentage)
        .bind(r.win_pool_amount)
        .bind(r.place_pool_amount)
        .bind(r.incremental_win_amount)
        .bind(r.incremental_place_amount)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            let partition = crate::partitions::get_partition_name(
                crate::partitions::PartitionedTable::MoneyFlowHistory,
                r.event_timestamp,
            );
            WriteError::from_sqlx(e, "money_flow_history", &partition)
        })?;
    }
    Ok(UpsertCounts {
        row_count: rows.len(),
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// Appends odds rows (post `raceday_odds::filter_significant`).
pub async fn insert_odds_records(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[OddsRecord],
) -> Result<UpsertCounts, WriteError> {
    let started = Instant::now();
    for r in rows {
        let odds_type = to_enum_str(r.odds_type);
        sqlx::query(
            r#"
            insert into odds_history (entrant_id, odds_type, value, event_timestamp)
            values ($1, $2, $3, $4)
            "#,
        )
        .bind(&r.entrant_id)
        .bind(&odds_type)
        .bind(r.value)
        .bind(r.event_timestamp)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            let partition = crate::partitions::get_partition_name(
                crate::partitions::PartitionedTable::OddsHistory,
                r.event_timestamp,
            );
            WriteError::from_sqlx(e, "odds_history", &partition)
        })?;
    }
    Ok(UpsertCounts {
        row_count: rows.len(),
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

fn to_enum_str<T: serde::Serialize>(value: T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v: JsonValue| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use raceday_schemas::{IntervalType, OddsType};

    #[test]
    fn interval_type_serializes_to_snake_case() {
        assert_eq!(to_enum_str(IntervalType::FiveMin), "five_min");
        assert_eq!(to_enum_str(OddsType::FixedWin), "fixed_win");
    }
}

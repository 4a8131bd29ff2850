use std::time::Instant;

use chrono::{NaiveDate, NaiveTime};
use raceday_schemas::{Entrant, Meeting, Race, RacePool};
use sqlx::{Postgres, Transaction};

use crate::error::WriteError;

/// Result of a bulk upsert call (§4.4): `{row_count, duration_ms}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertCounts {
    pub row_count: usize,
    pub duration_ms: u64,
}

fn enum_str<T: serde::Serialize>(value: T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Upserts meetings by primary key, copying every non-key column on
/// conflict. Must run before `bulk_upsert_races` in the same transaction —
/// this function does not reorder or validate that (§4.4 "the upsert layer
/// does not reorder; C6 supplies the correct sequence").
///
/// One statement for the whole batch: the row tuples are unnested from
/// bound arrays rather than issued as one `INSERT` per row, per §4.4
/// ("a single statement with a VALUES array plus an `ON CONFLICT ... DO
/// UPDATE` clause").
pub async fn bulk_upsert_meetings(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[Meeting],
) -> Result<UpsertCounts, WriteError> {
    let started = Instant::now();
    if rows.is_empty() {
        return Ok(UpsertCounts { row_count: 0, duration_ms: started.elapsed().as_millis() as u64 });
    }

    let ids: Vec<&str> = rows.iter().map(|m| m.id.as_str()).collect();
    let names: Vec<&str> = rows.iter().map(|m| m.name.as_str()).collect();
    let countries: Vec<&str> = rows.iter().map(|m| m.country.as_str()).collect();
    let categories: Vec<String> = rows.iter().map(|m| enum_str(m.category)).collect();
    let dates: Vec<NaiveDate> = rows.iter().map(|m| m.date).collect();
    let track_conditions: Vec<Option<&str>> = rows.iter().map(|m| m.track_condition.as_deref()).collect();
    let tote_statuses: Vec<Option<&str>> = rows.iter().map(|m| m.tote_status.as_deref()).collect();

    let result = sqlx::query(
        r#"
        insert into meetings (id, name, country, category, date, track_condition, tote_status)
        select * from unnest($1::text[], $2::text[], $3::text[], $4::text[], $5::date[], $6::text[], $7::text[])
        on conflict (id) do update set
            name = excluded.name,
            country = excluded.country,
            category = excluded.category,
            date = excluded.date,
            track_condition = excluded.track_condition,
            tote_status = excluded.tote_status
        "#,
    )
    .bind(&ids)
    .bind(&names)
    .bind(&countries)
    .bind(&categories)
    .bind(&dates)
    .bind(&track_conditions)
    .bind(&tote_statuses)
    .execute(&mut **tx)
    .await
    .map_err(|e| WriteError::from_sqlx(e, "meetings", "meetings"))?;

    Ok(UpsertCounts {
        row_count: result.rows_affected() as usize,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

pub async fn bulk_upsert_races(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[Race],
) -> Result<UpsertCounts, WriteError> {
    let started = Instant::now();
    if rows.is_empty() {
        return Ok(UpsertCounts { row_count: 0, duration_ms: started.elapsed().as_millis() as u64 });
    }

    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    let meeting_ids: Vec<&str> = rows.iter().map(|r| r.meeting_id.as_str()).collect();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    let race_numbers: Vec<i32> = rows.iter().map(|r| r.race_number).collect();
    let scheduled_start_dates: Vec<NaiveDate> = rows.iter().map(|r| r.scheduled_start_date).collect();
    let scheduled_start_times: Vec<NaiveTime> = rows.iter().map(|r| r.scheduled_start_time).collect();
    let actual_start_times: Vec<Option<NaiveTime>> = rows.iter().map(|r| r.actual_start_time).collect();
    let statuses: Vec<String> = rows.iter().map(|r| enum_str(r.status)).collect();

    let result = sqlx::query(
        r#"
        insert into races (
            id, meeting_id, name, race_number,
            scheduled_start_date, scheduled_start_time, actual_start_time, status
        )
        select * from unnest(
            $1::text[], $2::text[], $3::text[], $4::int4[],
            $5::date[], $6::time[], $7::time[], $8::text[]
        )
        on conflict (id) do update set
            meeting_id = excluded.meeting_id,
            name = excluded.name,
            race_number = excluded.race_number,
            scheduled_start_date = excluded.scheduled_start_date,
            scheduled_start_time = excluded.scheduled_start_time,
            actual_start_time = excluded.actual_start_time,
            status = excluded.status
        "#,
    )
    .bind(&ids)
    .bind(&meeting_ids)
    .bind(&names)
    .bind(&race_numbers)
    .bind(&scheduled_start_dates)
    .bind(&scheduled_start_times)
    .bind(&actual_start_times)
    .bind(&statuses)
    .execute(&mut **tx)
    .await
    .map_err(|e| WriteError::from_sqlx(e, "races", "races"))?;

    Ok(UpsertCounts {
        row_count: result.rows_affected() as usize,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

pub async fn bulk_upsert_entrants(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[Entrant],
) -> Result<UpsertCounts, WriteError> {
    let started = Instant::now();
    if rows.is_empty() {
        return Ok(UpsertCounts { row_count: 0, duration_ms: started.elapsed().as_millis() as u64 });
    }

    let ids: Vec<&str> = rows.iter().map(|e| e.id.as_str()).collect();
    let race_ids: Vec<&str> = rows.iter().map(|e| e.race_id.as_str()).collect();
    let runner_numbers: Vec<i32> = rows.iter().map(|e| e.runner_number).collect();
    let names: Vec<&str> = rows.iter().map(|e| e.name.as_str()).collect();
    let barriers: Vec<Option<i32>> = rows.iter().map(|e| e.barrier).collect();
    let is_scratched: Vec<bool> = rows.iter().map(|e| e.is_scratched).collect();
    let fixed_win_odds: Vec<Option<f64>> = rows.iter().map(|e| e.fixed_win_odds).collect();
    let fixed_place_odds: Vec<Option<f64>> = rows.iter().map(|e| e.fixed_place_odds).collect();
    let pool_win_odds: Vec<Option<f64>> = rows.iter().map(|e| e.pool_win_odds).collect();
    let pool_place_odds: Vec<Option<f64>> = rows.iter().map(|e| e.pool_place_odds).collect();
    let hold_percentages: Vec<Option<f64>> = rows.iter().map(|e| e.hold_percentage).collect();
    let bet_percentages: Vec<Option<f64>> = rows.iter().map(|e| e.bet_percentage).collect();
    let win_pool_percentages: Vec<Option<f64>> = rows.iter().map(|e| e.win_pool_percentage).collect();
    let win_pool_amounts: Vec<i64> = rows.iter().map(|e| e.win_pool_amount).collect();
    let place_pool_amounts: Vec<i64> = rows.iter().map(|e| e.place_pool_amount).collect();
    let jockeys: Vec<Option<&str>> = rows.iter().map(|e| e.jockey.as_deref()).collect();
    let trainers: Vec<Option<&str>> = rows.iter().map(|e| e.trainer.as_deref()).collect();
    let silks_urls: Vec<Option<&str>> = rows.iter().map(|e| e.silks_url.as_deref()).collect();
    let is_favourite: Vec<bool> = rows.iter().map(|e| e.is_favourite).collect();
    let is_mover: Vec<bool> = rows.iter().map(|e| e.is_mover).collect();

    let result = sqlx::query(
        r#"
        insert into entrants (
            id, race_id, runner_number, name, barrier, is_scratched,
            fixed_win_odds, fixed_place_odds, pool_win_odds, pool_place_odds,
            hold_percentage, bet_percentage, win_pool_percentage,
            win_pool_amount, place_pool_amount,
            jockey, trainer, silks_url, is_favourite, is_mover
        )
        select * from unnest(
            $1::text[], $2::text[], $3::int4[], $4::text[], $5::int4[], $6::bool[],
            $7::float8[], $8::float8[], $9::float8[], $10::float8[],
            $11::float8[], $12::float8[], $13::float8[],
            $14::int8[], $15::int8[],
            $16::text[], $17::text[], $18::text[], $19::bool[], $20::bool[]
        )
        on conflict (id) do update set
            race_id = excluded.race_id,
            runner_number = excluded.runner_number,
            name = excluded.name,
            barrier = excluded.barrier,
            is_scratched = excluded.is_scratched,
            fixed_win_odds = excluded.fixed_win_odds,
            fixed_place_odds = excluded.fixed_place_odds,
            pool_win_odds = excluded.pool_win_odds,
            pool_place_odds = excluded.pool_place_odds,
            hold_percentage = excluded.hold_percentage,
            bet_percentage = excluded.bet_percentage,
            win_pool_percentage = excluded.win_pool_percentage,
            win_pool_amount = excluded.win_pool_amount,
            place_pool_amount = excluded.place_pool_amount,
            jockey = excluded.jockey,
            trainer = excluded.trainer,
            silks_url = excluded.silks_url,
            is_favourite = excluded.is_favourite,
            is_mover = excluded.is_mover
        "#,
    )
    .bind(&ids)
    .bind(&race_ids)
    .bind(&runner_numbers)
    .bind(&names)
    .bind(&barriers)
    .bind(&is_scratched)
    .bind(&fixed_win_odds)
    .bind(&fixed_place_odds)
    .bind(&pool_win_odds)
    .bind(&pool_place_odds)
    .bind(&hold_percentages)
    .bind(&bet_percentages)
    .bind(&win_pool_percentages)
    .bind(&win_pool_amounts)
    .bind(&place_pool_amounts)
    .bind(&jockeys)
    .bind(&trainers)
    .bind(&silks_urls)
    .bind(&is_favourite)
    .bind(&is_mover)
    .execute(&mut **tx)
    .await
    .map_err(|e| WriteError::from_sqlx(e, "entrants", "entrants"))?;

    Ok(UpsertCounts {
        row_count: result.rows_affected() as usize,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

pub async fn bulk_upsert_race_pools(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[RacePool],
) -> Result<UpsertCounts, WriteError> {
    let started = Instant::now();
    if rows.is_empty() {
        return Ok(UpsertCounts { row_count: 0, duration_ms: started.elapsed().as_millis() as u64 });
    }

    let race_ids: Vec<&str> = rows.iter().map(|p| p.race_id.as_str()).collect();
    let win_pool_totals: Vec<i64> = rows.iter().map(|p| p.win_pool_total).collect();
    let place_pool_totals: Vec<i64> = rows.iter().map(|p| p.place_pool_total).collect();
    let quinella_pool_totals: Vec<i64> = rows.iter().map(|p| p.quinella_pool_total).collect();
    let trifecta_pool_totals: Vec<i64> = rows.iter().map(|p| p.trifecta_pool_total).collect();
    let exacta_pool_totals: Vec<i64> = rows.iter().map(|p| p.exacta_pool_total).collect();
    let first4_pool_totals: Vec<i64> = rows.iter().map(|p| p.first4_pool_total).collect();
    let currencies: Vec<&str> = rows.iter().map(|p| p.currency.as_str()).collect();
    let quality_scores: Vec<f64> = rows.iter().map(|p| p.quality_score).collect();
    let extracted_pool_counts: Vec<i32> = rows.iter().map(|p| p.extracted_pool_count).collect();

    let result = sqlx::query(
        r#"
        insert into race_pools (
            race_id, win_pool_total, place_pool_total, quinella_pool_total,
            trifecta_pool_total, exacta_pool_total, first4_pool_total,
            currency, quality_score, extracted_pool_count
        )
        select * from unnest(
            $1::text[], $2::int8[], $3::int8[], $4::int8[],
            $5::int8[], $6::int8[], $7::int8[],
            $8::text[], $9::float8[], $10::int4[]
        )
        on conflict (race_id) do update set
            win_pool_total = excluded.win_pool_total,
            place_pool_total = excluded.place_pool_total,
            quinella_pool_total = excluded.quinella_pool_total,
            trifecta_pool_total = excluded.trifecta_pool_total,
            exacta_pool_total = excluded.exacta_pool_total,
            first4_pool_total = excluded.first4_pool_total,
            currency = excluded.currency,
            quality_score = excluded.quality_score,
            extracted_pool_count = excluded.extracted_pool_count
        "#,
    )
    .bind(&race_ids)
    .bind(&win_pool_totals)
    .bind(&place_pool_totals)
    .bind(&quinella_pool_totals)
    .bind(&trifecta_pool_totals)
    .bind(&exacta_pool_totals)
    .bind(&first4_pool_totals)
    .bind(&currencies)
    .bind(&quality_scores)
    .bind(&extracted_pool_counts)
    .execute(&mut **tx)
    .await
    .map_err(|e| WriteError::from_sqlx(e, "race_pools", "race_pools"))?;

    Ok(UpsertCounts {
        row_count: result.rows_affected() as usize,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

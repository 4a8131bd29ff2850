//! C6: the per-race pipeline. Orchestrates fetch (C1) -> transform (C2) ->
//! write (C3/C4/C5) for one race, inside a single transaction, producing
//! typed stage errors and a timing/row-count summary (§4.6).

mod error;
mod result;

pub use error::PipelineError;
pub use result::{PipelineResult, PipelineStatus, RowCounts, Timings};

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use raceday_db::{PartitionedTable, WriteError};
use raceday_odds::OddsSnapshot;
use raceday_schemas::OddsRecord;
use raceday_transform::transform_race;
use raceday_upstream::UpstreamClient;
use sqlx::PgPool;
use tracing::{error, info, warn};

/// Hard wall-clock cap on one race pipeline run (§5).
const RACE_PIPELINE_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the full fetch -> transform -> write cycle for one race, bounded by
/// `RACE_PIPELINE_TIMEOUT` (§5). On timeout any open transaction is rolled
/// back by `Transaction`'s drop glue, the connection returns to the pool,
/// and a typed `PipelineError::Cancelled` surfaces.
///
/// `context_id` is an optional caller-supplied correlation id (e.g. the
/// batch run that triggered this race) carried onto every log line; it has
/// no effect on behaviour.
pub async fn process_race(
    upstream: &(dyn UpstreamClient + Send + Sync),
    pool: &PgPool,
    odds_snapshot: &OddsSnapshot,
    race_id: &str,
    context_id: Option<&str>,
) -> PipelineResult {
    let total_start = Instant::now();

    match tokio::time::timeout(
        RACE_PIPELINE_TIMEOUT,
        process_race_inner(upstream, pool, odds_snapshot, race_id, context_id),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            let mut timings = Timings::default();
            timings.total_ms = total_start.elapsed().as_millis() as u64;
            error!(race_id, context_id, stage = "cancelled", "race pipeline exceeded 30s wall-clock cap");
            PipelineResult::failure(
                race_id.to_string(),
                timings,
                PipelineError::Cancelled("race pipeline exceeded 30s wall-clock cap".to_string()),
            )
        }
    }
}

async fn process_race_inner(
    upstream: &(dyn UpstreamClient + Send + Sync),
    pool: &PgPool,
    odds_snapshot: &OddsSnapshot,
    race_id: &str,
    context_id: Option<&str>,
) -> PipelineResult {
    let total_start = Instant::now();
    let mut timings = Timings::default();

    let fetch_start = Instant::now();
    let payload = match upstream.fetch_race(race_id, None).await {
        Ok(p) => p,
        Err(e) => {
            timings.fetch_ms = fetch_start.elapsed().as_millis() as u64;
            timings.total_ms = total_start.elapsed().as_millis() as u64;
            let err = PipelineError::from(e);
            error!(race_id, context_id, stage = err.stage(), kind = err.kind(), "pipeline fetch failed");
            return PipelineResult::failure(race_id.to_string(), timings, err);
        }
    };
    timings.fetch_ms = fetch_start.elapsed().as_millis() as u64;

    let transform_start = Instant::now();
    let polling_timestamp = Utc::now();
    let transform_handle =
        tokio::task::spawn_blocking(move || transform_race(&payload, polling_timestamp));
    let bundle = match transform_handle.await {
        Ok(Ok(bundle)) => bundle,
        Ok(Err(e)) => {
            timings.transform_ms = transform_start.elapsed().as_millis() as u64;
            timings.total_ms = total_start.elapsed().as_millis() as u64;
            let err = PipelineError::from(e);
            error!(race_id, context_id, stage = err.stage(), kind = err.kind(), "pipeline transform failed");
            return PipelineResult::failure(race_id.to_string(), timings, err);
        }
        Err(join_err) => {
            timings.transform_ms = transform_start.elapsed().as_millis() as u64;
            timings.total_ms = total_start.elapsed().as_millis() as u64;
            let err = PipelineError::TransformTaskFailed(join_err.to_string());
            error!(race_id, context_id, stage = err.stage(), "pipeline transform task failed");
            return PipelineResult::failure(race_id.to_string(), timings, err);
        }
    };
    timings.transform_ms = transform_start.elapsed().as_millis() as u64;

    for warning in &bundle.quality_warnings {
        warn!(race_id, context_id, %warning, "quality warning");
    }

    let write_start = Instant::now();
    let write_result = write_bundle(pool, odds_snapshot, bundle).await;
    timings.write_ms = write_start.elapsed().as_millis() as u64;
    timings.total_ms = total_start.elapsed().as_millis() as u64;

    match write_result {
        Ok(row_counts) => {
            info!(
                race_id,
                context_id,
                fetch_ms = timings.fetch_ms,
                transform_ms = timings.transform_ms,
                write_ms = timings.write_ms,
                total_ms = timings.total_ms,
                "race pipeline succeeded"
            );
            PipelineResult::success(race_id.to_string(), timings, row_counts)
        }
        Err(e) => {
            let err = PipelineError::from(e);
            error!(race_id, context_id, stage = err.stage(), kind = err.kind(), "pipeline write failed");
            PipelineResult::failure(race_id.to_string(), timings, err)
        }
    }
}

async fn write_bundle(
    pool: &PgPool,
    odds_snapshot: &OddsSnapshot,
    bundle: raceday_transform::TransformBundle,
) -> Result<RowCounts, WriteError> {
    let mut tx = pool.begin().await.map_err(|e| WriteError::from_sqlx(e, "tx", "begin"))?;

    let meetings_count = if let Some(meeting) = &bundle.meeting {
        raceday_db::bulk_upsert_meetings(&mut tx, std::slice::from_ref(meeting))
            .await?
            .row_count
    } else {
        0
    };

    let races_count = raceday_db::bulk_upsert_races(&mut tx, std::slice::from_ref(&bundle.race))
        .await?
        .row_count;

    let entrants_count = raceday_db::bulk_upsert_entrants(&mut tx, &bundle.entrants)
        .await?
        .row_count;

    let race_pools_count = if let Some(pool_row) = &bundle.race_pool {
        raceday_db::bulk_upsert_race_pools(&mut tx, std::slice::from_ref(pool_row))
            .await?
            .row_count
    } else {
        0
    };

    for day in distinct_days(bundle.money_flow_records.iter().map(|r| r.event_timestamp)) {
        raceday_db::ensure_partition_tx(&mut tx, PartitionedTable::MoneyFlowHistory, day).await?;
    }
    let money_flow_count =
        raceday_db::insert_money_flow_records(&mut tx, &bundle.money_flow_records)
            .await?
            .row_count;

    let significant_odds: Vec<OddsRecord> = odds_snapshot.filter_significant(bundle.odds_records);
    for day in distinct_days(significant_odds.iter().map(|r| r.event_timestamp)) {
        raceday_db::ensure_partition_tx(&mut tx, PartitionedTable::OddsHistory, day).await?;
    }
    let odds_count = raceday_db::insert_odds_records(&mut tx, &significant_odds)
        .await?
        .row_count;

    tx.commit().await.map_err(|e| WriteError::from_sqlx(e, "tx", "commit"))?;

    Ok(RowCounts {
        meetings: meetings_count,
        races: races_count,
        entrants: entrants_count,
        race_pools: race_pools_count,
        money_flow_history: money_flow_count,
        odds_history: odds_count,
    })
}

/// Distinct UTC calendar days among a set of event timestamps, in order.
fn distinct_days(timestamps: impl Iterator<Item = DateTime<Utc>>) -> Vec<DateTime<Utc>> {
    let mut seen = BTreeSet::new();
    let mut days = Vec::new();
    for ts in timestamps {
        let day = ts.date_naive();
        if seen.insert(day) {
            days.push(ts);
        }
    }
    days
}

use chrono::NaiveDate;
use raceday_batch::{process_races, BatchOutcome};
use raceday_odds::OddsSnapshot;
use raceday_upstream::UpstreamClient;
use sqlx::PgPool;
use tracing::info;

use crate::error::InitError;

const BACKFILL_CONCURRENCY: usize = 5;

/// §4.9 evening backfill: re-fetches every race for `date` that finished
/// (`final` or `abandoned`) and upserts the authoritative, fully detailed
/// payload. Guarantees completeness after racing hours even if a poll was
/// missed or dropped mid-day.
pub async fn run_evening_backfill(
    upstream: &(dyn UpstreamClient + Send + Sync),
    pool: &PgPool,
    odds_snapshot: &OddsSnapshot,
    date: NaiveDate,
) -> Result<BatchOutcome, InitError> {
    let race_ids: Vec<String> = sqlx::query_scalar(
        "select id from races where scheduled_start_date = $1 and status in ('final', 'abandoned')",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    info!(%date, race_count = race_ids.len(), "evening backfill selected finished races");

    let outcome = process_races(
        upstream,
        pool,
        odds_snapshot,
        &race_ids,
        BACKFILL_CONCURRENCY,
        Some("evening-backfill"),
    )
    .await;

    Ok(outcome)
}

//! C8 adaptive scheduler: computes each race's next poll interval and
//! drains due races into the C7 batch runner.

mod interval;
mod scheduler;

pub use interval::next_interval;
pub use scheduler::Scheduler;

use std::time::Duration as StdDuration;

use chrono::Utc;
use raceday_batch::{process_races, BatchOutcome};
use raceday_odds::OddsSnapshot;
use raceday_upstream::UpstreamClient;
use sqlx::PgPool;
use tracing::{info, warn};

/// One scheduler tick: sleeps until the next known timer (or `idle_poll`
/// when nothing is scheduled yet, e.g. before the daily initializer has run
/// today), then drains whatever is due into a single C7 batch.
///
/// Returns `None` when the tick woke up to an empty due set (a spurious
/// wake, or a deliberately short idle poll); the caller re-enters `tick` in
/// a loop. Reconciling each race's *next* timer from the batch outcome is
/// the caller's job — it needs the freshly observed status, which only it
/// knows how to re-fetch.
pub async fn tick(
    scheduler: &Scheduler,
    upstream: &(dyn UpstreamClient + Send + Sync),
    pool: &PgPool,
    odds_snapshot: &OddsSnapshot,
    requested_concurrency: usize,
    idle_poll: StdDuration,
) -> Option<BatchOutcome> {
    let now = Utc::now();
    let wait = match scheduler.next_wake() {
        Some(fire_at) if fire_at > now => (fire_at - now).to_std().unwrap_or(StdDuration::ZERO),
        Some(_) => StdDuration::ZERO,
        None => idle_poll,
    };
    tokio::time::sleep(wait).await;

    let now = Utc::now();
    let due = scheduler.due_races(now);
    if due.is_empty() {
        return None;
    }

    info!(due_count = due.len(), "scheduler tick firing batch");
    let outcome = process_races(upstream, pool, odds_snapshot, &due, requested_concurrency, None).await;

    for result in &outcome.results {
        if !result.is_success() {
            if let Some(err) = &result.error {
                warn!(
                    race_id = %result.race_id,
                    stage = err.stage(),
                    kind = err.kind(),
                    retryable = err.retryable(),
                    "scheduled race failed; next tick will retry on its normal interval"
                );
            }
        }
    }

    Some(outcome)
}

//! C7 batch runner: fans a batch of race ids out across `process_race`
//! calls bounded by a semaphore, per §4.7/§5 ("the batch runner acts as a
//! semaphore limited to `min(requested, db_pool_max)`").

mod metrics;

use std::sync::Arc;
use std::time::{Duration, Instant};

use raceday_odds::OddsSnapshot;
use raceday_pipeline::{process_race, PipelineError, PipelineResult, Timings};
use raceday_upstream::UpstreamClient;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Hard wall-clock cap on one `process_races` call (§5).
const BATCH_TIMEOUT: Duration = Duration::from_secs(60);

pub use metrics::BatchMetrics;

/// Result of one `process_races` call: every race's individual outcome plus
/// the aggregate counters from §4.7.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<PipelineResult>,
    pub metrics: BatchMetrics,
}

/// Runs `process_race` for every id in `race_ids`, bounded to
/// `min(requested_concurrency, db_pool_max)` concurrent races. A failing
/// race does not cancel its siblings; each outcome is collected
/// independently.
pub async fn process_races(
    upstream: &(dyn UpstreamClient + Send + Sync),
    pool: &PgPool,
    odds_snapshot: &OddsSnapshot,
    race_ids: &[String],
    requested_concurrency: usize,
    context_id: Option<&str>,
) -> BatchOutcome {
    let db_pool_max = pool.options().get_max_connections() as usize;
    let effective_concurrency = requested_concurrency.min(db_pool_max).max(1);
    let semaphore = Arc::new(Semaphore::new(effective_concurrency));

    info!(
        total_races = race_ids.len(),
        requested_concurrency,
        effective_concurrency,
        context_id,
        "batch starting"
    );

    let start = Instant::now();

    let futures = race_ids.iter().map(|race_id| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("batch semaphore is never closed");
            process_race(upstream, pool, odds_snapshot, race_id, context_id).await
        }
    });

    let results: Vec<PipelineResult> =
        match tokio::time::timeout(BATCH_TIMEOUT, futures_util::future::join_all(futures)).await {
            Ok(results) => results,
            Err(_) => {
                error!(
                    total_races = race_ids.len(),
                    context_id, "batch exceeded 60s wall-clock cap; cancelling in-flight races"
                );
                race_ids
                    .iter()
                    .map(|race_id| {
                        PipelineResult::failure(
                            race_id.clone(),
                            Timings::default(),
                            PipelineError::Cancelled("batch exceeded 60s wall-clock cap".to_string()),
                        )
                    })
                    .collect()
            }
        };

    let mut metrics = BatchMetrics {
        total_races: race_ids.len(),
        requested_concurrency,
        effective_concurrency,
        ..BatchMetrics::default()
    };

    for result in &results {
        metrics.max_duration_ms = metrics.max_duration_ms.max(result.timings.total_ms);
        if result.is_success() {
            metrics.successes += 1;
        } else {
            metrics.failures += 1;
            if let Some(err) = &result.error {
                if err.retryable() {
                    metrics.retryable_failures += 1;
                }
                warn!(
                    race_id = %result.race_id,
                    stage = err.stage(),
                    kind = err.kind(),
                    retryable = err.retryable(),
                    context_id,
                    "race failed in batch"
                );
            }
        }
    }

    info!(
        total_races = metrics.total_races,
        successes = metrics.successes,
        failures = metrics.failures,
        retryable_failures = metrics.retryable_failures,
        elapsed_ms = start.elapsed().as_millis() as u64,
        context_id,
        "batch finished"
    );

    BatchOutcome { results, metrics }
}

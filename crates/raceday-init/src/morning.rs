use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use raceday_batch::process_races;
use raceday_odds::OddsSnapshot;
use raceday_upstream::UpstreamClient;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::InitError;
use crate::meetings::extract_race_ids;

const TIMEOUT_CEILING: Duration = Duration::from_secs(15 * 60);
const BACKFILL_CONCURRENCY: usize = 5;
const PAUSE_BETWEEN_BATCHES: Duration = Duration::from_millis(500);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MorningInitSummary {
    pub total_races: usize,
    pub successes: usize,
    pub failures: usize,
}

/// Runs the 06:00 NZ morning init described in §4.9: discovers today's
/// races from the meetings feed, then backfills each one's full detail in
/// batches of at most 5, pausing 500ms between batches. A 15-minute
/// timeout ceiling bounds the whole run; [`DailyInitializer::run`] refuses
/// to start a second run while one is already in flight.
#[derive(Default)]
pub struct DailyInitializer {
    running: AtomicBool,
}

impl DailyInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run(
        &self,
        upstream: &(dyn UpstreamClient + Send + Sync),
        pool: &PgPool,
        odds_snapshot: &OddsSnapshot,
        date: &str,
    ) -> Result<MorningInitSummary, InitError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(InitError::AlreadyRunning);
        }

        let outcome = tokio::time::timeout(
            TIMEOUT_CEILING,
            run_once(upstream, pool, odds_snapshot, date),
        )
        .await;

        self.running.store(false, Ordering::SeqCst);

        match outcome {
            Ok(result) => result,
            Err(_) => Err(InitError::Timeout),
        }
    }
}

async fn run_once(
    upstream: &(dyn UpstreamClient + Send + Sync),
    pool: &PgPool,
    odds_snapshot: &OddsSnapshot,
    date: &str,
) -> Result<MorningInitSummary, InitError> {
    let raw = upstream.fetch_meetings(date).await.map_err(InitError::Fetch)?;
    let race_ids = extract_race_ids(&raw)?;

    info!(date, total_races = race_ids.len(), "morning init discovered today's races");

    let mut summary = MorningInitSummary {
        total_races: race_ids.len(),
        ..MorningInitSummary::default()
    };

    let mut chunks = race_ids.chunks(BACKFILL_CONCURRENCY).peekable();
    while let Some(chunk) = chunks.next() {
        let ids = chunk.to_vec();
        let outcome = process_races(
            upstream,
            pool,
            odds_snapshot,
            &ids,
            BACKFILL_CONCURRENCY,
            Some("daily-init"),
        )
        .await;

        summary.successes += outcome.metrics.successes;
        summary.failures += outcome.metrics.failures;

        if outcome.metrics.failures > 0 {
            warn!(
                date,
                batch_failures = outcome.metrics.failures,
                "morning init batch had failing races; continuing with remaining batches"
            );
        }

        if chunks.peek().is_some() {
            tokio::time::sleep(PAUSE_BETWEEN_BATCHES).await;
        }
    }

    info!(
        date,
        successes = summary.successes,
        failures = summary.failures,
        "morning init finished"
    );

    Ok(summary)
}

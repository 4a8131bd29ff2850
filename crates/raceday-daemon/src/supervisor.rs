//! Background scheduler loop, spawned alongside the HTTP listener.
//!
//! Mirrors `raceday-cli scheduler run`'s loop (acquire lock → daily init →
//! adaptive polling → release on boundary), but as a task this process
//! owns for its whole lifetime rather than a one-shot CLI invocation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Pacific::Auckland;
use raceday_init::DailyInitializer;
use raceday_lock::LockError;
use raceday_odds::OddsSnapshot;
use raceday_schemas::RaceStatus;
use raceday_scheduler::{tick, Scheduler};
use raceday_upstream::UpstreamClient;
use sqlx::PgPool;
use tracing::{info, warn};

const LOCK_NAME: &str = "scheduler";
const DAILY_INIT_LOCK_NAME: &str = "daily-init";
const BOUNDARY_POLL: StdDuration = StdDuration::from_secs(5 * 60);
const HEARTBEAT_INTERVAL: StdDuration = StdDuration::from_secs(60);
const IDLE_POLL: StdDuration = StdDuration::from_secs(30);

/// Spawns the supervisor loop as a background task. The returned handle is
/// never awaited by `main` — the process lives as long as the HTTP
/// listener does, and the loop runs for its entire lifetime.
pub fn spawn(
    pool: PgPool,
    upstream: Arc<dyn UpstreamClient + Send + Sync>,
    odds_snapshot: Arc<OddsSnapshot>,
    high_frequency: bool,
    concurrency: usize,
) {
    tokio::spawn(async move {
        run_forever(&pool, upstream.as_ref(), &odds_snapshot, high_frequency, concurrency).await;
    });
}

async fn run_forever(
    pool: &PgPool,
    upstream: &(dyn UpstreamClient + Send + Sync),
    odds_snapshot: &OddsSnapshot,
    high_frequency: bool,
    concurrency: usize,
) {
    let mut last_init_date: Option<NaiveDate> = None;

    loop {
        let now = Utc::now();
        let today_nz = now.with_timezone(&Auckland).date_naive();

        if raceday_lock::is_past_daily_init_time(now) && last_init_date != Some(today_nz) {
            run_daily_init_once(pool, upstream, odds_snapshot, today_nz, now).await;
            last_init_date = Some(today_nz);
        }

        if !raceday_lock::is_within_racing_hours(now) {
            tokio::time::sleep(BOUNDARY_POLL).await;
            continue;
        }

        let lock = match raceday_lock::try_acquire(pool, LOCK_NAME, now).await {
            Ok(handle) => handle,
            Err(LockError::BoundaryBlocked) => {
                tokio::time::sleep(BOUNDARY_POLL).await;
                continue;
            }
            Err(LockError::Unavailable { .. }) => {
                tokio::time::sleep(HEARTBEAT_INTERVAL).await;
                continue;
            }
            Err(e) => {
                warn!("scheduler lock acquisition failed: {e}");
                tokio::time::sleep(BOUNDARY_POLL).await;
                continue;
            }
        };

        info!(owner_id = lock.owner_id(), "supervisor acquired scheduler lock");

        let mut race_scheduler = Scheduler::new();
        let mut last_heartbeat = Utc::now();
        if let Err(e) = refresh(pool, &mut race_scheduler, today_nz, high_frequency, Utc::now()).await {
            warn!("failed seeding scheduler from db: {e}");
        }

        loop {
            let now = Utc::now();
            if !raceday_lock::is_within_racing_hours(now) {
                break;
            }

            if now - last_heartbeat >= chrono::Duration::from_std(HEARTBEAT_INTERVAL).unwrap() {
                if let Err(e) = lock.heartbeat(pool, now).await {
                    warn!("lost scheduler lock heartbeat: {e}");
                    return;
                }
                last_heartbeat = now;
            }

            if let Err(e) = refresh(pool, &mut race_scheduler, today_nz, high_frequency, now).await {
                warn!("failed refreshing scheduler from db: {e}");
            }

            if let Some(outcome) =
                tick(&race_scheduler, upstream, pool, odds_snapshot, concurrency, IDLE_POLL).await
            {
                info!(
                    total = outcome.metrics.total_races,
                    successes = outcome.metrics.successes,
                    failures = outcome.metrics.failures,
                    "scheduler batch completed"
                );
            }
        }

        if let Err(e) = lock.release(pool).await {
            warn!("failed releasing scheduler lock: {e}");
        }
    }
}

/// Runs the §4.9 morning initializer for `today_nz`, independent of the
/// racing-hours acquisition window so it is reachable at its 06:00 NZ
/// boundary rather than only once racing hours open at 09:00. Acquires its
/// own cross-instance lock so only one supervisor/CLI process runs it for a
/// given day.
async fn run_daily_init_once(
    pool: &PgPool,
    upstream: &(dyn UpstreamClient + Send + Sync),
    odds_snapshot: &OddsSnapshot,
    today_nz: NaiveDate,
    now: DateTime<Utc>,
) {
    let lock = match raceday_lock::try_acquire_unconditional(pool, DAILY_INIT_LOCK_NAME, now).await {
        Ok(handle) => handle,
        Err(LockError::Unavailable { .. }) => return,
        Err(e) => {
            warn!("daily-init lock acquisition failed: {e}");
            return;
        }
    };

    let date_str = today_nz.format("%Y-%m-%d").to_string();
    let initializer = DailyInitializer::new();
    if let Err(e) = initializer.run(upstream, pool, odds_snapshot, &date_str).await {
        warn!("daily initializer did not complete cleanly: {e}");
    }

    if let Err(e) = lock.release(pool).await {
        warn!("failed releasing daily-init lock: {e}");
    }
}

async fn refresh(
    pool: &PgPool,
    race_scheduler: &mut Scheduler,
    date: NaiveDate,
    high_frequency: bool,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let rows: Vec<(String, String, NaiveDate, chrono::NaiveTime)> = sqlx::query_as(
        "select id, status, scheduled_start_date, scheduled_start_time from races \
         where scheduled_start_date = $1 and status not in ('final', 'abandoned')",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    for (id, status, scheduled_start_date, scheduled_start_time) in rows {
        let start = Auckland
            .from_local_datetime(&scheduled_start_date.and_time(scheduled_start_time))
            .single()
            .map(|dt| dt.with_timezone(&Utc));
        race_scheduler.upsert_race(id.clone(), RaceStatus::normalize(&status), start, high_frequency, now);
        seen.insert(id);
    }

    for known in race_scheduler.known_race_ids() {
        if !seen.contains(&known) {
            race_scheduler.remove_race(&known);
        }
    }

    Ok(())
}

use std::collections::HashSet;
use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Pacific::Auckland;
use raceday_config::RuntimeConfig;
use raceday_init::DailyInitializer;
use raceday_lock::LockError;
use raceday_odds::{OddsEpsilon, OddsSnapshot};
use raceday_schemas::RaceStatus;
use raceday_scheduler::{tick, Scheduler};
use raceday_upstream::TabApiClient;
use sqlx::PgPool;
use tracing::{info, warn};

const LOCK_NAME: &str = "scheduler";
const DAILY_INIT_LOCK_NAME: &str = "daily-init";
/// How often an operator-less retry polls while the lock is held elsewhere
/// or the process has woken up outside racing hours.
const BOUNDARY_POLL: StdDuration = StdDuration::from_secs(5 * 60);
/// §4.10's lease is 270s; heartbeat comfortably inside that.
const HEARTBEAT_INTERVAL: StdDuration = StdDuration::from_secs(60);
/// Sleep applied by [`tick`] when nothing is scheduled yet.
const IDLE_POLL: StdDuration = StdDuration::from_secs(30);

/// `raceday scheduler run`: the long-lived process loop. Acquires the
/// single-instance lock, runs the daily initializer once per NZ calendar
/// day, then polls races on their adaptive §4.8 intervals until racing
/// hours end or the lock is lost, at which point it releases and retries.
pub async fn run() -> Result<()> {
    let config = RuntimeConfig::from_env()?;
    let pool = raceday_db::connect(&config.database_url, config.db_pool_max).await?;
    let upstream = TabApiClient::new(&config.upstream_base_url);
    let odds_snapshot = OddsSnapshot::new(OddsEpsilon {
        relative: config.odds_epsilon_relative,
        absolute: config.odds_epsilon_absolute,
    });
    let concurrency = config.db_pool_max as usize;
    let mut last_init_date: Option<NaiveDate> = None;

    loop {
        let now = Utc::now();
        let today_nz = now.with_timezone(&Auckland).date_naive();

        if raceday_lock::is_past_daily_init_time(now) && last_init_date != Some(today_nz) {
            run_daily_init_once(&pool, &upstream, &odds_snapshot, today_nz, now).await;
            last_init_date = Some(today_nz);
        }

        if !raceday_lock::is_within_racing_hours(now) {
            info!("outside racing hours; sleeping");
            tokio::time::sleep(BOUNDARY_POLL).await;
            continue;
        }

        let lock = match raceday_lock::try_acquire(&pool, LOCK_NAME, now).await {
            Ok(handle) => handle,
            Err(LockError::BoundaryBlocked) => {
                tokio::time::sleep(BOUNDARY_POLL).await;
                continue;
            }
            Err(LockError::Unavailable { .. }) => {
                info!("scheduler lock held by another instance; retrying later");
                tokio::time::sleep(HEARTBEAT_INTERVAL).await;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        info!(owner_id = lock.owner_id(), "acquired scheduler lock");

        let mut race_scheduler = Scheduler::new();
        let mut last_heartbeat = Utc::now();
        refresh(&pool, &mut race_scheduler, today_nz, config.high_frequency_polling, Utc::now()).await?;

        loop {
            let now = Utc::now();
            if !raceday_lock::is_within_racing_hours(now) {
                info!("racing hours ended; releasing scheduler lock");
                break;
            }

            if (now - last_heartbeat) >= chrono::Duration::from_std(HEARTBEAT_INTERVAL).unwrap() {
                if let Err(e) = lock.heartbeat(&pool, now).await {
                    warn!("lost scheduler lock heartbeat: {e}");
                    return Ok(());
                }
                last_heartbeat = now;
            }

            refresh(&pool, &mut race_scheduler, today_nz, config.high_frequency_polling, now).await?;

            if let Some(outcome) =
                tick(&race_scheduler, &upstream, &pool, &odds_snapshot, concurrency, IDLE_POLL).await
            {
                info!(
                    total = outcome.metrics.total_races,
                    successes = outcome.metrics.successes,
                    failures = outcome.metrics.failures,
                    "scheduler batch completed"
                );
            }
        }

        if let Err(e) = lock.release(&pool).await {
            warn!("failed releasing scheduler lock: {e}");
        }
    }
}

/// Runs the §4.9 morning initializer for `today_nz`, independent of the
/// racing-hours acquisition window so it is reachable at its 06:00 NZ
/// boundary rather than only once racing hours open at 09:00. Acquires its
/// own cross-instance lock so only one scheduler process runs it for a
/// given day.
async fn run_daily_init_once(
    pool: &PgPool,
    upstream: &TabApiClient,
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
    match initializer.run(upstream, pool, odds_snapshot, &date_str).await {
        Ok(summary) => info!(
            total_races = summary.total_races,
            successes = summary.successes,
            failures = summary.failures,
            "daily initializer finished"
        ),
        Err(e) => warn!("daily initializer did not complete cleanly: {e}"),
    }

    if let Err(e) = lock.release(pool).await {
        warn!("failed releasing daily-init lock: {e}");
    }
}

struct RaceRow {
    id: String,
    status: String,
    scheduled_start_date: NaiveDate,
    scheduled_start_time: chrono::NaiveTime,
}

/// Re-seeds `race_scheduler` from the current DB state of today's
/// not-yet-terminal races, and drops any race the scheduler still knows
/// about that has since disappeared from that set (gone terminal or been
/// superseded). Cheap enough to run every tick: a single NZ racing day's
/// race count is small (§9).
async fn refresh(
    pool: &PgPool,
    race_scheduler: &mut Scheduler,
    date: NaiveDate,
    high_frequency: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let rows: Vec<RaceRow> = sqlx::query_as::<_, (String, String, NaiveDate, chrono::NaiveTime)>(
        "select id, status, scheduled_start_date, scheduled_start_time from races \
         where scheduled_start_date = $1 and status not in ('final', 'abandoned')",
    )
    .bind(date)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id, status, scheduled_start_date, scheduled_start_time)| RaceRow {
        id,
        status,
        scheduled_start_date,
        scheduled_start_time,
    })
    .collect();

    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    for row in rows {
        let start = Auckland
            .from_local_datetime(&row.scheduled_start_date.and_time(row.scheduled_start_time))
            .single()
            .map(|dt| dt.with_timezone(&Utc));
        race_scheduler.upsert_race(row.id.clone(), RaceStatus::normalize(&row.status), start, high_frequency, now);
        seen.insert(row.id);
    }

    for known in race_scheduler.known_race_ids() {
        if !seen.contains(&known) {
            race_scheduler.remove_race(&known);
        }
    }

    Ok(())
}

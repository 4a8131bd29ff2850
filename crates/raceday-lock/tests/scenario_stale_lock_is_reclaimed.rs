//! §4.10: a second caller cannot acquire a live lock, but can reclaim one
//! whose heartbeat has gone stale. DB-backed, skipped if DATABASE_URL is
//! not set or unreachable.

use chrono::{Duration, Utc};
use raceday_lock::{try_acquire, try_acquire_unconditional};

const LOCK_NAME: &str = "scenario-stale-lock-reclaim";

async fn cleanup(pool: &sqlx::PgPool) {
    let _ = sqlx::query("delete from single_instance_locks where lock_name = $1")
        .bind(LOCK_NAME)
        .execute(pool)
        .await;
}

#[tokio::test]
async fn second_caller_is_refused_while_lease_is_live() -> anyhow::Result<()> {
    let pool = match raceday_db::testkit_db_pool().await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("SKIP: cannot connect to DB: {e}");
            return Ok(());
        }
    };
    cleanup(&pool).await;

    // 2024-05-01 12:00 NZST = 2024-05-01T00:00:00Z, well inside racing hours.
    let noon_nz_utc = chrono::DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let first = try_acquire(&pool, LOCK_NAME, noon_nz_utc).await?;
    assert_eq!(first.lock_name(), LOCK_NAME);

    let second = try_acquire(&pool, LOCK_NAME, noon_nz_utc + Duration::seconds(5)).await;
    assert!(second.is_err(), "a live lease must refuse a second owner");

    first.release(&pool).await?;
    cleanup(&pool).await;
    Ok(())
}

#[tokio::test]
async fn stale_heartbeat_allows_reclaim() -> anyhow::Result<()> {
    let pool = match raceday_db::testkit_db_pool().await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("SKIP: cannot connect to DB: {e}");
            return Ok(());
        }
    };
    cleanup(&pool).await;

    let t0 = chrono::DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let first = try_acquire(&pool, LOCK_NAME, t0).await?;

    // No heartbeat sent; 61 seconds later the row is stale and reclaimable
    // even though its 270s deadline has not yet elapsed.
    let t1 = t0 + Duration::seconds(61);
    let reclaimed = try_acquire(&pool, LOCK_NAME, t1).await?;
    assert_ne!(reclaimed.owner_id(), first.owner_id());

    reclaimed.release(&pool).await?;
    cleanup(&pool).await;
    Ok(())
}

#[tokio::test]
async fn outside_racing_hours_refuses_to_acquire() -> anyhow::Result<()> {
    let pool = match raceday_db::testkit_db_pool().await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("SKIP: cannot connect to DB: {e}");
            return Ok(());
        }
    };
    cleanup(&pool).await;

    // 2024-05-01 04:00 NZST = 2024-04-30T16:00:00Z, before the 09:00 NZ open.
    let before_hours = chrono::DateTime::parse_from_rfc3339("2024-04-30T16:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let result = try_acquire(&pool, LOCK_NAME, before_hours).await;
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), "lock_boundary_blocked");

    cleanup(&pool).await;
    Ok(())
}

/// §4.9's daily initializer must be acquirable at its own 06:00 NZ boundary,
/// three hours before racing hours open — `try_acquire_unconditional` skips
/// the racing-hours check entirely rather than deferring to it.
#[tokio::test]
async fn unconditional_acquire_ignores_racing_hours_boundary() -> anyhow::Result<()> {
    let pool = match raceday_db::testkit_db_pool().await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("SKIP: cannot connect to DB: {e}");
            return Ok(());
        }
    };
    const DAILY_INIT_LOCK_NAME: &str = "scenario-unconditional-daily-init";
    let _ = sqlx::query("delete from single_instance_locks where lock_name = $1")
        .bind(DAILY_INIT_LOCK_NAME)
        .execute(&pool)
        .await;

    // 2024-05-01 06:00 NZST = 2024-04-30T18:00:00Z, before the 09:00 NZ open.
    let six_am_nz = chrono::DateTime::parse_from_rfc3339("2024-04-30T18:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let handle = try_acquire_unconditional(&pool, DAILY_INIT_LOCK_NAME, six_am_nz).await?;
    assert_eq!(handle.lock_name(), DAILY_INIT_LOCK_NAME);

    handle.release(&pool).await?;
    let _ = sqlx::query("delete from single_instance_locks where lock_name = $1")
        .bind(DAILY_INIT_LOCK_NAME)
        .execute(&pool)
        .await;
    Ok(())
}

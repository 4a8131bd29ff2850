use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::LockError;
use crate::racing_hours::is_within_racing_hours;

/// `now + 270s`, per §4.10's example deadline.
pub const LEASE_SECONDS: i64 = 270;
/// A heartbeat older than this is considered stale and reclaimable.
pub const STALE_HEARTBEAT_SECONDS: i64 = 60;

/// A held lease. Dropping it without calling [`release`](LockHandle::release)
/// leaves the row in place until its deadline or heartbeat goes stale and
/// another caller reclaims it — there is no `Drop` impl doing a fire-and-
/// forget async release, since that would need its own runtime handle.
#[derive(Debug)]
pub struct LockHandle {
    lock_name: String,
    owner_id: String,
}

impl LockHandle {
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn lock_name(&self) -> &str {
        &self.lock_name
    }

    /// Extends the deadline and refreshes the heartbeat. Fails with
    /// `lock_unavailable` if the row was reclaimed by someone else in the
    /// meantime (caller should stop its run immediately).
    pub async fn heartbeat(&self, pool: &PgPool, now: DateTime<Utc>) -> Result<(), LockError> {
        let deadline = now + Duration::seconds(LEASE_SECONDS);
        let rows = sqlx::query(
            "update single_instance_locks set last_heartbeat = $1, deadline = $2 \
             where lock_name = $3 and owner_id = $4",
        )
        .bind(now)
        .bind(deadline)
        .bind(&self.lock_name)
        .bind(&self.owner_id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(LockError::Unavailable {
                lock_name: self.lock_name.clone(),
            });
        }
        Ok(())
    }

    pub async fn release(self, pool: &PgPool) -> Result<(), LockError> {
        sqlx::query("delete from single_instance_locks where lock_name = $1 and owner_id = $2")
            .bind(&self.lock_name)
            .bind(&self.owner_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

/// Attempts the cooperative CAS described in §4.10: claims a fresh lease
/// when no row exists for `lock_name`, the existing lease has expired, or
/// its heartbeat has gone stale. Refuses outright outside the racing-hours
/// window so a process that boots overnight terminates gracefully instead
/// of acquiring and immediately racing the clock.
pub async fn try_acquire(pool: &PgPool, lock_name: &str, now: DateTime<Utc>) -> Result<LockHandle, LockError> {
    if !is_within_racing_hours(now) {
        return Err(LockError::BoundaryBlocked);
    }
    try_acquire_unconditional(pool, lock_name, now).await
}

/// Same CAS as [`try_acquire`] but without the racing-hours boundary
/// check, for locks whose own schedule falls outside that window — the
/// §4.9 morning initializer's lock, which must be acquirable at 06:00 NZ.
pub async fn try_acquire_unconditional(
    pool: &PgPool,
    lock_name: &str,
    now: DateTime<Utc>,
) -> Result<LockHandle, LockError> {
    let owner_id = Uuid::new_v4().to_string();
    let deadline = now + Duration::seconds(LEASE_SECONDS);
    let stale_before = now - Duration::seconds(STALE_HEARTBEAT_SECONDS);

    let claimed: Option<(String,)> = sqlx::query_as(
        r#"
        insert into single_instance_locks (lock_name, owner_id, acquired_at, deadline, last_heartbeat)
        values ($1, $2, $3, $4, $3)
        on conflict (lock_name) do update
        set owner_id = excluded.owner_id,
            acquired_at = excluded.acquired_at,
            deadline = excluded.deadline,
            last_heartbeat = excluded.last_heartbeat
        where single_instance_locks.deadline < $3
           or single_instance_locks.last_heartbeat < $5
        returning owner_id
        "#,
    )
    .bind(lock_name)
    .bind(&owner_id)
    .bind(now)
    .bind(deadline)
    .bind(stale_before)
    .fetch_optional(pool)
    .await?;

    match claimed {
        Some((returned_owner,)) if returned_owner == owner_id => Ok(LockHandle {
            lock_name: lock_name.to_string(),
            owner_id,
        }),
        _ => Err(LockError::Unavailable {
            lock_name: lock_name.to_string(),
        }),
    }
}

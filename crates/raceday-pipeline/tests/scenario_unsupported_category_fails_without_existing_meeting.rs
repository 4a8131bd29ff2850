//! §4.2 unsupported-category path: when the meeting's category is not
//! representable, the transform drops the meeting and the pipeline skips
//! `bulk_upsert_meetings`. If the meeting row was never seeded by the daily
//! initializer, the race insert then hits the `races.meeting_id` foreign
//! key and the whole write transaction rolls back — no special-casing is
//! needed in the pipeline beyond "skip the meeting upsert when absent".
//! DB-backed, skipped if DATABASE_URL is not set or unreachable.

use raceday_odds::{OddsEpsilon, OddsSnapshot};
use raceday_pipeline::process_race;
use raceday_testkit::{sample_race_payload_json, FakeUpstreamClient};

const RACE_ID: &str = "scenario-unsupported-category-race-1";

async fn cleanup(pool: &sqlx::PgPool) {
    let _ = sqlx::query("delete from races where id = $1")
        .bind(RACE_ID)
        .execute(pool)
        .await;
}

#[tokio::test]
async fn unsupported_category_write_rolls_back_on_missing_meeting() -> anyhow::Result<()> {
    let pool = match raceday_db::testkit_db_pool().await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("SKIP: cannot connect to DB: {e}");
            return Ok(());
        }
    };

    cleanup(&pool).await;

    let mut raw = sample_race_payload_json(RACE_ID);
    raw["meeting"]["category"] = serde_json::json!("G");

    let upstream = FakeUpstreamClient::new();
    upstream.push_race_ok(RACE_ID, raw);
    let odds_snapshot = OddsSnapshot::new(OddsEpsilon::default());

    let result = process_race(&upstream, &pool, &odds_snapshot, RACE_ID, None).await;

    assert!(!result.is_success());
    let err = result.error.expect("failure carries an error");
    assert_eq!(err.stage(), "write");
    assert_eq!(err.kind(), "write_foreign_key");

    let (race_count,): (i64,) = sqlx::query_as("select count(*)::bigint from races where id = $1")
        .bind(RACE_ID)
        .fetch_one(&pool)
        .await?;
    assert_eq!(race_count, 0, "failed write must not leave a partial race row");

    cleanup(&pool).await;
    Ok(())
}

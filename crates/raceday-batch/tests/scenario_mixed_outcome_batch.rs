//! §8 scenario 3: a two-race batch where one race succeeds and the other
//! fails; failures must not cancel siblings. DB-backed, skipped if
//! DATABASE_URL is not set or unreachable.

use raceday_batch::process_races;
use raceday_odds::{OddsEpsilon, OddsSnapshot};
use raceday_testkit::{sample_race_payload_json, FakeUpstreamClient};
use raceday_upstream::UpstreamError;

const SUCCESS_RACE_ID: &str = "story-2-10d-success";
const FAILURE_RACE_ID: &str = "story-2-10d-failure";
const MEETING_ID: &str = "meeting-1";

async fn cleanup(pool: &sqlx::PgPool) {
    let _ = sqlx::query("delete from odds_history where entrant_id like 'entrant-%'")
        .execute(pool)
        .await;
    let _ = sqlx::query("delete from money_flow_history where race_id = $1")
        .bind(SUCCESS_RACE_ID)
        .execute(pool)
        .await;
    let _ = sqlx::query("delete from races where id = $1")
        .bind(FAILURE_RACE_ID)
        .execute(pool)
        .await;
    let _ = sqlx::query("delete from meetings where id = $1")
        .bind(MEETING_ID)
        .execute(pool)
        .await;
}

#[tokio::test]
async fn mixed_outcome_batch_reports_both_results_independently() -> anyhow::Result<()> {
    let pool = match raceday_db::testkit_db_pool().await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("SKIP: cannot connect to DB: {e}");
            return Ok(());
        }
    };

    cleanup(&pool).await;

    let upstream = FakeUpstreamClient::new();
    upstream.push_race_ok(SUCCESS_RACE_ID, sample_race_payload_json(SUCCESS_RACE_ID));
    upstream.push_race_err(
        FAILURE_RACE_ID,
        UpstreamError::Network {
            message: "simulated upstream outage".to_string(),
            retryable: true,
        },
    );
    let odds_snapshot = OddsSnapshot::new(OddsEpsilon::default());

    let race_ids = vec![SUCCESS_RACE_ID.to_string(), FAILURE_RACE_ID.to_string()];
    let outcome = process_races(&upstream, &pool, &odds_snapshot, &race_ids, 2, Some("scenario-batch")).await;

    assert_eq!(outcome.metrics.total_races, 2);
    assert_eq!(outcome.metrics.requested_concurrency, 2);
    assert_eq!(outcome.metrics.effective_concurrency, 2);
    assert_eq!(outcome.metrics.successes, 1);
    assert_eq!(outcome.metrics.failures, 1);

    let success_result = outcome
        .results
        .iter()
        .find(|r| r.race_id == SUCCESS_RACE_ID)
        .expect("success race present");
    assert!(success_result.is_success());
    assert_eq!(success_result.row_counts.odds_history, 8);

    let failure_result = outcome
        .results
        .iter()
        .find(|r| r.race_id == FAILURE_RACE_ID)
        .expect("failure race present");
    assert!(!failure_result.is_success());
    assert_eq!(failure_result.row_counts.odds_history, 0);

    cleanup(&pool).await;
    Ok(())
}

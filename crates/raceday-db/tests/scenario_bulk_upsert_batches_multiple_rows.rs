use chrono::NaiveDate;
use raceday_schemas::{Meeting, RaceCategory};

/// §4.4: each `bulk_upsert_*` call is one statement carrying every row's
/// values, not one statement per row — a multi-row call must still insert
/// (and later update) every row it was given.
#[tokio::test]
async fn bulk_upsert_meetings_writes_every_row_in_one_call() -> anyhow::Result<()> {
    let pool = match raceday_db::testkit_db_pool().await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("SKIP: cannot connect to DB: {e}");
            return Ok(());
        }
    };

    let meetings = vec![
        Meeting {
            id: "scenario-multi-meeting-1".to_string(),
            name: "Ellerslie".to_string(),
            country: "NZ".to_string(),
            category: RaceCategory::Thoroughbred,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            track_condition: Some("Good".to_string()),
            tote_status: Some("open".to_string()),
        },
        Meeting {
            id: "scenario-multi-meeting-2".to_string(),
            name: "Addington".to_string(),
            country: "NZ".to_string(),
            category: RaceCategory::Harness,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            track_condition: None,
            tote_status: None,
        },
    ];

    let mut tx = pool.begin().await?;
    let counts = raceday_db::bulk_upsert_meetings(&mut tx, &meetings).await?;
    tx.commit().await?;
    assert_eq!(counts.row_count, 2);

    let (count,): (i64,) = sqlx::query_as(
        "select count(*)::bigint from meetings where id = any($1)",
    )
    .bind(meetings.iter().map(|m| m.id.clone()).collect::<Vec<_>>())
    .fetch_one(&pool)
    .await?;
    assert_eq!(count, 2);

    let mut updated = meetings.clone();
    updated[0].track_condition = Some("Heavy10".to_string());
    updated[1].track_condition = Some("Slow7".to_string());

    let mut tx = pool.begin().await?;
    let counts = raceday_db::bulk_upsert_meetings(&mut tx, &updated).await?;
    tx.commit().await?;
    assert_eq!(counts.row_count, 2);

    let (track_condition,): (Option<String>,) = sqlx::query_as(
        "select track_condition from meetings where id = $1",
    )
    .bind(&updated[0].id)
    .fetch_one(&pool)
    .await?;
    assert_eq!(track_condition.as_deref(), Some("Heavy10"));

    sqlx::query("delete from meetings where id = any($1)")
        .bind(meetings.iter().map(|m| m.id.clone()).collect::<Vec<_>>())
        .execute(&pool)
        .await?;

    Ok(())
}

#[tokio::test]
async fn bulk_upsert_meetings_handles_empty_input() -> anyhow::Result<()> {
    let pool = match raceday_db::testkit_db_pool().await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("SKIP: cannot connect to DB: {e}");
            return Ok(());
        }
    };

    let mut tx = pool.begin().await?;
    let counts = raceday_db::bulk_upsert_meetings(&mut tx, &[]).await?;
    tx.commit().await?;
    assert_eq!(counts.row_count, 0);

    Ok(())
}

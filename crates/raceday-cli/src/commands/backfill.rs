use anyhow::{Context, Result};
use chrono::NaiveDate;
use raceday_config::RuntimeConfig;
use raceday_odds::{OddsEpsilon, OddsSnapshot};
use raceday_upstream::TabApiClient;

/// `raceday backfill --date YYYY-MM-DD`: re-fetches every finished race for
/// `date` via the §4.9 evening backfill path.
pub async fn run(date: &str) -> Result<()> {
    let config = RuntimeConfig::from_env()?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").context("--date must be YYYY-MM-DD")?;

    let pool = raceday_db::connect(&config.database_url, config.db_pool_max).await?;
    let upstream = TabApiClient::new(&config.upstream_base_url);
    let odds_snapshot = OddsSnapshot::new(OddsEpsilon {
        relative: config.odds_epsilon_relative,
        absolute: config.odds_epsilon_absolute,
    });

    let outcome = raceday_init::run_evening_backfill(&upstream, &pool, &odds_snapshot, date).await?;

    println!(
        "total_races={} successes={} failures={}",
        outcome.metrics.total_races, outcome.metrics.successes, outcome.metrics.failures
    );
    Ok(())
}

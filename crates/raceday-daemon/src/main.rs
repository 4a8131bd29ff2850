//! raceday-daemon entry point.
//!
//! Thin by design: sets up tracing, connects to Postgres, spawns the
//! scheduler supervisor loop, and serves `/health`. All route handlers
//! live in `routes.rs`; the supervisor loop lives in `supervisor.rs`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use raceday_config::RuntimeConfig;
use raceday_daemon::{routes, state, supervisor};
use raceday_odds::{OddsEpsilon, OddsSnapshot};
use raceday_upstream::TabApiClient;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let config = RuntimeConfig::from_env()?;
    let pool = raceday_db::connect(&config.database_url, config.db_pool_max).await?;

    let upstream = Arc::new(TabApiClient::new(&config.upstream_base_url));
    let odds_snapshot = Arc::new(OddsSnapshot::new(OddsEpsilon {
        relative: config.odds_epsilon_relative,
        absolute: config.odds_epsilon_absolute,
    }));

    supervisor::spawn(
        pool.clone(),
        upstream,
        odds_snapshot,
        config.high_frequency_polling,
        config.db_pool_max as usize,
    );

    let shared = state::AppState::new(pool);
    let app = routes::build_router(shared).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("raceday-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

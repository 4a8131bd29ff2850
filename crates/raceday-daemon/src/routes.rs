//! Axum router and handlers for raceday-daemon.
//!
//! `build_router` is the single entry point; `main.rs` attaches tracing
//! middleware after this call so tests can exercise the bare router.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use crate::{api_types::HealthResponse, state::{uptime_secs, AppState}};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Liveness only, per §6 ("`/health` returns liveness"). Reports `ok: true`
/// even when the DB connectivity probe fails — a transient DB hiccup
/// shouldn't make an orchestrator kill and restart the process, which would
/// interrupt whatever race is mid-flight.
pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let db_ok = raceday_db::status(&st.pool).await.map(|s| s.ok).unwrap_or(false);

    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.service,
            version: st.version,
            uptime_secs: uptime_secs(),
            db_ok,
        }),
    )
}

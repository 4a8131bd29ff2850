//! Response types for raceday-daemon's one HTTP endpoint.
//!
//! The read-only REST projection that serves persisted state back to
//! clients is explicitly out of scope (§1) — it lives in a separate
//! "projection layer" collaborator. This daemon exposes liveness only.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub db_ok: bool,
}

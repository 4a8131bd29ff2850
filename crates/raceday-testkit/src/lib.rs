//! Shared test fixtures and doubles for the raceday ingestion crates.
//!
//! Mirrors `mqk-testkit`'s role: no production code depends on this crate,
//! every other crate's integration tests do.

mod fake_upstream;
mod fixtures;

pub use fake_upstream::FakeUpstreamClient;
pub use fixtures::sample_race_payload_json;
pub use raceday_db::testkit_db_pool;

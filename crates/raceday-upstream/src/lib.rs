//! C1: the upstream TAB API client.
//!
//! Fetches meetings/race payloads with retry, a process-wide circuit
//! breaker, and payload validation that tolerates unknown fields. Mirrors
//! `mqk_md::provider`'s boundary shape (a trait + a plain error enum) but
//! speaks HTTP via `reqwest` instead of a generic provider trait, since the
//! upstream here is a single fixed API rather than a pluggable set of
//! vendors.

mod circuit_breaker;
mod client;
mod error;
mod payload;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use client::{TabApiClient, UpstreamClient};
pub use error::UpstreamError;
pub use payload::{validate_race_payload, EntrantPayload, RacePayload};
pub use retry::{retry_with_backoff, RetryConfig};

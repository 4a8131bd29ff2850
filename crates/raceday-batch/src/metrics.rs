/// Aggregate counters for one `process_races` invocation (§4.7, exact shape).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchMetrics {
    pub total_races: usize,
    pub requested_concurrency: usize,
    pub effective_concurrency: usize,
    pub successes: usize,
    pub failures: usize,
    pub retryable_failures: usize,
    pub max_duration_ms: u64,
}

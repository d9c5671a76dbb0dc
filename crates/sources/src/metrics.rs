use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

pub static FETCH_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "source_fetch_requests_total",
        "Upstream source API calls grouped by provider, operation, and outcome",
        &["provider", "op", "outcome"]
    )
    .expect("source fetch requests total")
});

pub static FETCH_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "source_fetch_latency_seconds",
        "Latency of upstream source API calls grouped by provider and operation",
        &["provider", "op"],
        vec![0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0]
    )
    .expect("source fetch latency seconds")
});

pub static COMMITS_FETCHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "source_commits_fetched_total",
        "Commits returned by source connectors after cross-branch dedup, per provider",
        &["provider"]
    )
    .expect("source commits fetched total")
});

pub static BRANCH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "source_branch_failures_total",
        "Per-branch commit fetches that failed and were skipped, per provider",
        &["provider"]
    )
    .expect("source branch failures total")
});

/// Records one upstream call in the request counter and latency
/// histogram. Call sites time the request themselves.
pub fn observe_fetch(provider: &str, op: &str, elapsed_secs: f64, ok: bool) {
    let outcome = if ok { "success" } else { "error" };
    FETCH_REQUESTS_TOTAL
        .with_label_values(&[provider, op, outcome])
        .inc();
    FETCH_LATENCY_SECONDS
        .with_label_values(&[provider, op])
        .observe(elapsed_secs);
}

use once_cell::sync::Lazy;
use prometheus::{
    register_gauge, register_histogram, register_int_counter, Gauge, Histogram, IntCounter,
};

pub static RUNS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "pipeline_runs_total",
        "Completed dashboard pipeline runs"
    )
    .expect("pipeline runs total")
});

pub static RUN_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "pipeline_run_duration_seconds",
        "Wall-clock duration of one full pipeline run",
        vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("pipeline run duration seconds")
});

pub static LAST_RUN_TIMESTAMP_SECONDS: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "pipeline_last_run_timestamp_seconds",
        "Unix timestamp of the most recent completed pipeline run"
    )
    .expect("pipeline last run timestamp")
});

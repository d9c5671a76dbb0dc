use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec};

pub static COMMENTS_FETCHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feedback_comments_fetched_total",
        "Feedback comments fetched before the merge cap, per platform",
        &["platform"]
    )
    .expect("feedback comments fetched total")
});

pub static RESOURCE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feedback_resource_failures_total",
        "Linked resources whose comment fetch failed and was skipped, per platform",
        &["platform"]
    )
    .expect("feedback resource failures total")
});

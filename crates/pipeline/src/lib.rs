pub mod metrics;
pub mod orchestrator;
pub mod report;

pub use crate::orchestrator::{FeedbackSource, Pipeline};
pub use crate::report::DashboardReport;

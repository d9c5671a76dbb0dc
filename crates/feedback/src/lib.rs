pub mod aggregator;
pub mod comment;
pub mod linear;
pub mod metrics;
pub mod notion;

pub use crate::aggregator::{FeedbackAggregator, FeedbackReport};
pub use crate::comment::{FeedbackComment, QuickLink, RawComment};

pub mod error;
pub mod routes;

pub use crate::error::{ApiError, ApiResult};
pub use crate::routes::{build_router, ApiState, ReportSource};

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::records::{Provider, RepoActivity, RepoTarget};

/// A provider-specific activity fetcher. Implementations absorb partial
/// upstream failures into `RepoActivity::degraded` instead of erroring;
/// an `Err` from `fetch_activity` is reserved for wiring bugs, not for
/// flaky networks.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    fn provider(&self) -> Provider;

    async fn fetch_activity(&self, target: &RepoTarget, lookback_days: u32)
        -> Result<RepoActivity>;
}

pub type SharedConnector = Arc<dyn SourceConnector>;

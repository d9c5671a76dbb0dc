use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use pipeline::{DashboardReport, Pipeline};

use crate::error::{ApiError, ApiResult};

const MAX_LOOKBACK_DAYS: u32 = 90;

/// Whatever can produce a dashboard report; the pipeline in production,
/// a stub in router tests.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn dashboard(&self, lookback_days: u32) -> common::Result<DashboardReport>;
}

#[async_trait]
impl ReportSource for Pipeline {
    async fn dashboard(&self, lookback_days: u32) -> common::Result<DashboardReport> {
        self.run(lookback_days).await
    }
}

struct Snapshot {
    lookback_days: u32,
    built_at: Instant,
    report: DashboardReport,
}

/// Shared router state. The snapshot is the only mutable piece and only
/// exists so the freshness flag means something; it is never written to
/// disk and dies with the process.
pub struct ApiState {
    pub source: Arc<dyn ReportSource>,
    pub metrics_path: &'static str,
    pub default_lookback_days: u32,
    pub snapshot_ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl ApiState {
    pub fn new(
        source: Arc<dyn ReportSource>,
        metrics_path: &'static str,
        default_lookback_days: u32,
        snapshot_ttl: Duration,
    ) -> Self {
        Self {
            source,
            metrics_path,
            default_lookback_days,
            snapshot_ttl,
            snapshot: RwLock::new(None),
        }
    }
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let metrics_path: &'static str = state.metrics_path;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/dashboard", get(dashboard))
        .route(metrics_path, get(metrics))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    lookback_days: Option<u32>,
    #[serde(default)]
    refresh: bool,
}

#[instrument(skip(state))]
async fn dashboard(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardReport>> {
    let lookback_days = query.lookback_days.unwrap_or(state.default_lookback_days);
    if lookback_days == 0 || lookback_days > MAX_LOOKBACK_DAYS {
        return Err(ApiError::bad_request(format!(
            "lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}"
        )));
    }

    if !query.refresh {
        let snapshot = state.snapshot.read().await;
        if let Some(snapshot) = snapshot.as_ref() {
            if snapshot.lookback_days == lookback_days
                && snapshot.built_at.elapsed() < state.snapshot_ttl
            {
                debug!(lookback_days, "serving cached dashboard snapshot");
                return Ok(Json(snapshot.report.clone()));
            }
        }
    }

    let report = state.source.dashboard(lookback_days).await?;
    let mut snapshot = state.snapshot.write().await;
    *snapshot = Some(Snapshot {
        lookback_days,
        built_at: Instant::now(),
        report: report.clone(),
    });
    Ok(Json(report))
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn metrics() -> ApiResult<impl IntoResponse> {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok((
        [("content-type", encoder.format_type().to_string())],
        buffer,
    ))
}

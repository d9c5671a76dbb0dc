use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use api::{build_router, ApiState, ReportSource};
use axum::Router;
use common::{logging, AppConfig};
use pipeline::Pipeline;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging("info");
    let config = AppConfig::load()?;

    let source: Arc<dyn ReportSource> = Arc::new(Pipeline::from_config(&config)?);
    let metrics_path: &'static str =
        Box::leak(config.observability.metrics_path.clone().into_boxed_str());
    let state = Arc::new(ApiState::new(
        source,
        metrics_path,
        config.pipeline.lookback_days,
        Duration::from_secs(config.pipeline.snapshot_ttl_secs),
    ));
    let app: Router = build_router(state);

    let addr: std::net::SocketAddr = config.api.bind.parse()?;
    info!("api listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

use anyhow::Result;
use common::{logging, AppConfig};
use pipeline::Pipeline;

/// Run the pipeline once and print the dashboard report as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging("info");
    let config = AppConfig::load()?;

    let pipeline = Pipeline::from_config(&config)?;
    let report = pipeline.run(config.pipeline.lookback_days).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

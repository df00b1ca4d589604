use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use histwatch_exporter::{init_logging, run_export, ExportConfig};

#[derive(Parser, Debug)]
#[command(name = "histwatch-export")]
#[command(about = "Export telemetry histogram evolutions of recent nightly builds to JSON files")]
struct Args {
    /// TOML config file; HISTWATCH_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ExportConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    init_logging(&config.log_level);
    info!(
        endpoint = %config.endpoint,
        output_dir = %config.output_dir.display(),
        lanes = config.lanes,
        "histwatch-export starting"
    );

    let summary = run_export(&config).await?;
    info!(total = summary.total(), "done");
    Ok(())
}

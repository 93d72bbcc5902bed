use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tag_reaper::{Reaper, ReaperConfig, RunReport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tag_reaper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run().await {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Config, auth and listing failures come back as errors; delete failures
/// are carried in the report.
async fn run() -> Result<RunReport> {
    let config = ReaperConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        "Cleaning {} (retention {} days)",
        config.repository,
        config.retention_days
    );

    let reaper = Reaper::new(&config).context("Failed to build registry client")?;
    reaper.run().await.context("Cleanup aborted")
}

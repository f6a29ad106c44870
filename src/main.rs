// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, build the client and run the pipeline.
// - Exit status is 0 only when every attempted step succeeded.

use anyhow::Context;
use clap::Parser;
use mobsf_scan::{api::MobsfClient, cli::Cli, config::ScanConfig, pipeline, ui::Console};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "mobsf_scan=debug"
    } else {
        "mobsf_scan=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut console = Console::stdout();
    let config = match ScanConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            console.failure(&format!("Invalid configuration: {}", e));
            return Ok(ExitCode::FAILURE);
        }
    };
    let client = MobsfClient::new(&config).context("Failed to build HTTP client")?;
    tracing::debug!(api_url = client.base_url(), output_dir = %config.output_dir.display(), "starting scan");

    let summary = pipeline::run(&client, &config, &mut console);
    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

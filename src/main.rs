//! CLI entry point: loads configuration, runs one pipeline invocation, and
//! maps the result onto an exit code. Bootstrap matches `m3u-proxy`'s
//! `clap` + `tracing-subscriber` + `#[tokio::main]` pattern, collapsed to
//! the single-invocation shape this batch engine needs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use channel_curator::config::{Config, ConfigView};
use channel_curator::pipeline::{PipelineCoordinator, PipelineStatus};

#[derive(Parser)]
#[command(name = "channel-curator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Channel-catalog ingestion and curation engine for IPTV playlists")]
struct Cli {
    /// Configuration file path (TOML); overlaid with `CHANNEL_CURATOR_*` env vars.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured `channelsSource`.
    #[arg(long)]
    source: Option<String>,

    /// Override the directory every output artifact is written under.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Tracing filter directive (e.g. "debug", "channel_curator=trace").
    /// Ignored when `RUST_LOG` is set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Validate configuration and run every phase up to emission, without
    /// writing artifacts.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(source) = cli.source {
        config.channels_source = source;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.validated_catalog_path = output_dir.join("tv.csv").display().to_string();
        config.playlist_output_path = output_dir.join("channels.m3u").display().to_string();
        config.per_channel_playlist_dir = output_dir.join("m3u8").display().to_string();
    }

    if cli.dry_run {
        ConfigView::from_config(&config)?;
        tracing::info!("dry run: configuration validated, pipeline not executed");
        return Ok(ExitCode::SUCCESS);
    }

    let coordinator = PipelineCoordinator::new(config);
    let cancellation = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, requesting cancellation");
            cancellation.cancel();
        }
    });

    match coordinator.run().await {
        Ok(execution) => {
            tracing::info!(
                total_duration = ?execution.total_duration,
                warnings = execution.warnings.len(),
                "pipeline finished"
            );
            Ok(exit_code_for(execution.status))
        }
        Err(err) => {
            tracing::error!(error = %err, "pipeline aborted");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn exit_code_for(status: PipelineStatus) -> ExitCode {
    match status {
        PipelineStatus::Completed => ExitCode::SUCCESS,
        PipelineStatus::Running | PipelineStatus::Failed => ExitCode::FAILURE,
    }
}

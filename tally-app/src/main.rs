//! tally: mention histogram service.
//!
//! Loads configuration, initialises logging, wires the Twitter search client
//! and the text-analytics client into the pipeline, then serves HTTP until
//! Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tally_analytics::{Category, TextAnalyticsClient};
use tally_common::observability::init_logging;
use tally_config::{discover_config_file, TallyConfig, TallyConfigLoader};
use tally_social::TwitterApi;
use tracing::{info, warn};

use tally_app::pipeline::MentionPipeline;
use tally_app::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Count company and people mentions in recent posts")]
struct Cli {
    /// Path to tally.yaml (defaults to ./tally.yaml, then the user config dir)
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`
    #[arg(long)]
    bind: Option<String>,
}

fn load_config(cli: &Cli) -> Result<TallyConfig> {
    let loader = TallyConfigLoader::new();
    let loader = match (&cli.config, discover_config_file()) {
        (Some(path), _) => loader.with_file(path),
        (None, Some(found)) => loader.with_optional_file(found),
        (None, None) => loader,
    };
    loader.load().context("failed to load tally configuration")
}

fn build_pipeline(cfg: &TallyConfig) -> Result<MentionPipeline> {
    let search = TwitterApi::with_base_url(&cfg.twitter.base_url, cfg.twitter.bearer_token.clone())
        .context("invalid twitter.base_url")?
        .with_timeout(cfg.twitter.timeout());

    let analytics = &cfg.analytics;
    let extractor = TextAnalyticsClient::new(
        analytics.endpoints(),
        analytics.annotation_types(),
        analytics.timeout(),
    )
    .context("failed to build analytics client")?;

    for category in [Category::Company, Category::Person] {
        if extractor.endpoints().endpoint_for(category).is_none() {
            warn!(
                %category,
                option = category.option(),
                "no analytics endpoint configured; requests for this option will fail"
            );
        }
    }

    Ok(MentionPipeline::new(Arc::new(search), Arc::new(extractor))
        .with_search_limit(cfg.twitter.max_results)
        .with_recency(cfg.twitter.recency))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    let log_path = init_logging(cfg.logging.to_log_config())?;
    info!(
        "Starting tally v{} (log file: {})",
        env!("CARGO_PKG_VERSION"),
        log_path.display()
    );

    let bind = cli.bind.clone().unwrap_or_else(|| cfg.server.bind.clone());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address `{bind}`"))?;

    let state = AppState::new(build_pipeline(&cfg)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("tally listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

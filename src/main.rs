use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use pricewatch::config::{load_tasks, MetricsConfig};
use pricewatch::fetcher::HttpFetcher;
use pricewatch::notification::NotifierGateway;
use pricewatch::plugins::notifiers::EmailNotifier;
use pricewatch::store::FileStore;
use pricewatch::{AppConfig, AppError, RunnerContext, Supervisor};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory holding conf.json and task.json
    #[arg(long, default_value = "conf")]
    conf_dir: PathBuf,

    /// Write logs to a daily rolling file in this directory instead of stdout
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _guard = init_tracing(args.log_dir.as_deref())?;

    info!("Starting pricewatch...");

    let config = AppConfig::load(&args.conf_dir)?;
    let tasks = load_tasks(&args.conf_dir.join("task.json"))?;
    if tasks.is_empty() {
        warn!("No task!");
        return Ok(());
    }

    if config.metrics.enabled {
        init_metrics(&config.metrics)?;
    }

    let ctx = RunnerContext {
        fetcher: Arc::new(HttpFetcher::new(&config.fetch)?),
        store: Arc::new(FileStore::new(&config.storage.price_dir)),
        gateway: NotifierGateway::new(Arc::new(EmailNotifier::new(&config.smtp)?)),
    };
    let supervisor = Supervisor::new(ctx);

    tokio::select! {
        summary = supervisor.run(tasks) => {
            warn!(
                failed = summary.failed.len(),
                rejected = summary.rejected.len(),
                panicked = summary.panicked,
                "all tasks have terminated"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}

fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("pricewatch=info".parse()?);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "pricewatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}

fn init_metrics(config: &MetricsConfig) -> Result<(), AppError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.port))
        .install()
        .map_err(|e| AppError::Metrics(e.to_string()))?;
    info!(port = config.port, "metrics exporter listening");
    Ok(())
}

#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use probes::{Registry, Runner, RunnerConfig};

mod config;
mod error;
mod page;
mod render;
mod server;

use config::Config;
use error::AppError;
use page::StatusPage;

#[derive(Debug, Parser)]
#[command(name = "uptiny", version, about = "Tiny status page generator with an embedded web server")]
struct Cli {
    /// File containing all checks, formatted in CSV
    #[arg(value_name = "CHECKS", default_value = "checks.csv")]
    checks: PathBuf,

    /// File containing all incidents to be displayed
    #[arg(value_name = "INCIDENTS", default_value = "incidents.txt")]
    incidents: PathBuf,

    /// Alternative configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Title of the status page
    #[arg(long)]
    title: Option<String>,

    /// Maximum time in seconds to wait for a probe before aborting
    #[arg(long)]
    timeout: Option<u64>,

    /// Start as a daemon with an embedded web server
    #[arg(long)]
    daemon: bool,

    /// Address on which the daemon will be listening
    #[arg(long)]
    addr: Option<String>,

    /// Interval in seconds between two page renderings
    #[arg(long)]
    interval: Option<u64>,

    /// Log verbosity
    #[arg(long, default_value = "info")]
    level: String,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    logger::init_tracing(&cli.level);

    let config = Config::from_config(cli.config.as_ref())?;

    let title = cli.title.unwrap_or(config.page.title);
    let scan_timeout = Duration::from_secs(cli.timeout.unwrap_or(config.probes.timeout_seconds));
    let interval = Duration::from_secs(cli.interval.unwrap_or(config.daemon.interval_seconds));
    let addr: SocketAddr = cli.addr.unwrap_or(config.daemon.addr).parse()?;

    let registry = Arc::new(Registry::new()?);
    let runner = Runner::new(
        Arc::clone(&registry),
        RunnerConfig { concurrency: config.probes.concurrency, scan_timeout },
    );
    let mut page = StatusPage::new(cli.checks, cli.incidents, title, registry, runner);

    let html = page.render().await?;
    if !cli.daemon {
        print!("{html}");
        return Ok(());
    }

    tracing::info!("starting uptiny listening on '{addr}'");
    server::run(page, html, addr, interval).await
}

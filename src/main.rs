use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::Parser;
use tradewatch::config::Config;
use tradewatch::{feed_mode, run_export, run_headless, FeedSettings};
use tradewatch_core::fixtures::generate_history;
use tradewatch_core::{HistoryStore, TypeFilter};
use tradewatch_feeds::LiveFeed;

#[derive(Parser)]
#[command(name = "tradewatch", about = "tradewatch: trading bot live feed and history dashboard")]
struct Cli {
    /// Write debug logs to /tmp/tradewatch-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// Subscribe to this SSE endpoint instead of the synthetic feed.
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Config file to use instead of ~/.config/tradewatch/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fixed seed for the synthetic feed.
    #[arg(long)]
    seed: Option<u64>,

    /// Print live events as plain lines instead of starting the TUI.
    #[arg(long)]
    headless: bool,

    /// Number of events to print in headless mode.
    #[arg(long, default_value_t = 10, requires = "headless")]
    count: usize,

    /// Export the filtered history as CSV into DIR and exit.
    #[arg(long, value_name = "DIR", conflicts_with = "headless")]
    export: Option<PathBuf>,

    /// Case-insensitive account/message search applied to --export.
    #[arg(long, default_value = "", requires = "export")]
    search: String,

    /// Type filter applied to --export (all, info, success, warning, error, trade).
    #[arg(long, default_value = "all", requires = "export")]
    level: TypeFilter,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/tradewatch-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("tradewatch debug log started, tail -f /tmp/tradewatch-debug.log");
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Config::defaults()
        }),
    };
    if cli.seed.is_some() {
        config.feed.seed = cli.seed;
    }

    if let Some(dir) = &cli.export {
        let history = HistoryStore::new(generate_history(config.history.seed_count, Utc::now()));
        let (path, rows) =
            run_export(&history, dir, &cli.search, cli.level, Local::now().date_naive())?;
        println!("wrote {rows} rows to {}", path.display());
        return Ok(());
    }

    let mode = feed_mode(&config, cli.endpoint.as_deref());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    if cli.headless {
        let settings = FeedSettings::from(&config.feed);
        return runtime.block_on(async {
            let mut feed = LiveFeed::new(mode, settings);
            feed.start();
            let result = run_headless(&mut feed, cli.count, std::io::stdout().lock()).await;
            feed.dispose();
            result.map(|_| ())
        });
    }

    let _guard = runtime.enter();
    tradewatch_tui::run(config, mode)
}

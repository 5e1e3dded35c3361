use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use docsite_core::config::Config;
use docsite_service::{DocsSite, StalenessWatcher, WatchOutcome};

#[derive(Parser)]
#[command(name = "docsite")]
#[command(about = "Browse and search a markdown documentation tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ordered documentation tree
    Tree,
    /// Run a ranked search and print the hits
    Search {
        /// Query text, tantivy query syntax
        q: String,
        /// Maximum number of hits (capped by search.max_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print one rendered document by tree path, e.g. `guide/install` or `guide`
    Doc {
        #[arg(default_value = "")]
        path: String,
    },
    /// Keep the index fresh by polling the sources for changes
    Watch,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let config = Config::load().map_err(|e| {
        error!(error = %e, "failed to load configuration");
        e
    })?;
    let docs = config.docs()?;
    let base = std::env::current_dir()?;

    match cli.command {
        Commands::Tree => print_json(&DocsSite::unindexed(&docs, &base)?.tree()?),
        Commands::Search { q, limit } => {
            let site = DocsSite::open(&docs, &base)?;
            print_json(&site.search(Some(&q), limit)?)
        }
        Commands::Doc { path } => {
            print_json(&DocsSite::unindexed(&docs, &base)?.document(&path)?)
        }
        Commands::Watch => {
            let site = DocsSite::open(&docs, &base)?;
            let debounce = Duration::from_millis(docs.watch.debounce_ms);
            let watcher = StalenessWatcher::new(site.sources().clone(), debounce)?;
            let interval = Duration::from_millis(docs.watch.poll_interval_ms);
            tokio::runtime::Runtime::new()?.block_on(watch(&site, &watcher, interval))
        }
    }
}

async fn watch(site: &DocsSite, watcher: &StalenessWatcher, every: Duration) -> Result<()> {
    info!(
        root = %site.sources().root().display(),
        every_ms = every.as_millis() as u64,
        "watching for changes"
    );
    let mut ticker = tokio::time::interval(every);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match tokio::task::block_in_place(|| watcher.poll(site.engine().as_ref())) {
                    Ok(WatchOutcome::Rebuilt(outcome)) => info!(?outcome, "index refreshed"),
                    Ok(_) => {}
                    Err(err) => error!(error = %err, "staleness check failed"),
                }
            }
            _ = &mut shutdown => {
                info!("stopping watcher");
                return Ok(());
            }
        }
    }
}

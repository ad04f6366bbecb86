//! NEO tracker: `serve` runs the feed proxy, `view` opens the 3D field.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use asteroid_field::config;
use asteroid_field::prelude::*;
use bevy::app::AppExit;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "neo_tracker", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve `GET /api/neo` backed by the NeoWs feed.
    Serve {
        /// Listen address; defaults to NEO_PROXY_ADDR or 127.0.0.1:3000.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Open the asteroid field viewer.
    View {
        /// First day, YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        start: Option<String>,
        /// Last day, YYYY-MM-DD. Defaults to a week after start.
        #[arg(long)]
        end: Option<String>,
        /// Fetch through a running proxy instead of the upstream feed.
        #[arg(long, conflicts_with = "fixture")]
        proxy: Option<Url>,
        /// Load a saved upstream feed response instead of fetching.
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Seed for a repeatable field layout.
        #[arg(long)]
        seed: Option<u64>,
        /// Save a screenshot once the field is shown, then exit.
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => serve_proxy(bind),
        Command::View {
            start,
            end,
            proxy,
            fixture,
            seed,
            screenshot,
        } => {
            let range = view_range(start.as_deref(), end.as_deref())?;
            let source = match (fixture, proxy.or_else(config::proxy_url)) {
                (Some(path), _) => FeedSource::Fixture(path),
                (None, Some(url)) => FeedSource::Proxy(url),
                (None, None) => FeedSource::Upstream(config::feed_config()),
            };

            let mut builder = TrackerBuilder::new().source(source).range(range);
            if let Some(seed) = seed {
                builder = builder.seed(seed);
            }
            if let Some(path) = screenshot {
                builder = builder.screenshot(path);
            }
            match builder.build().run() {
                AppExit::Success => Ok(()),
                AppExit::Error(code) => anyhow::bail!("viewer exited with code {code}"),
            }
        }
    }
}

/// A missing end means a week of data, matching the default view.
fn view_range(start: Option<&str>, end: Option<&str>) -> anyhow::Result<DateRange> {
    let today = Utc::now().date_naive();
    match (start, end) {
        (None, None) => Ok(DateRange::week_from(today)),
        (Some(start), None) => {
            let start = asteroid_field::data::parse_date(start)?;
            Ok(DateRange::week_from(start))
        }
        _ => Ok(DateRange::resolve(start, end, today)?),
    }
}

fn serve_proxy(bind: Option<SocketAddr>) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = bind.unwrap_or_else(config::bind_addr);
    let feed = config::feed_config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime
        .block_on(serve(addr, feed))
        .with_context(|| format!("serving on {addr}"))
}

//! Pacer CLI - pacer command

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pacer_core::PacerConfig;
use std::path::PathBuf;

mod cmd;
mod util;

/// Pacer - Replay call streams through debounce, throttle and search
#[derive(Parser)]
#[command(name = "pacer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config with [debounce], [throttle] and [search] sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run on the wall clock instead of a paused virtual clock
    #[arg(long, global = true)]
    realtime: bool,

    /// Print the trace as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a debounced function at a steady rate and show when it ran
    Debounce {
        /// Quiet period in ms (default: from config, 300)
        #[arg(long)]
        wait: Option<u64>,
        /// Longest a pending call may be delayed, in ms
        #[arg(long)]
        max_wait: Option<u64>,
        /// Invoke on the leading edge
        #[arg(long)]
        immediate: bool,
        /// Skip the trailing-edge invocation
        #[arg(long)]
        no_trailing: bool,
        /// Milliseconds between calls
        #[arg(long, default_value = "50", value_parser = clap::value_parser!(u64).range(1..))]
        every: u64,
        /// Stop calling after this many ms
        #[arg(long, default_value = "1200")]
        until: u64,
    },
    /// Call a throttled function at a steady rate and show when it ran
    Throttle {
        /// Minimum spacing in ms (default: from config, 16)
        #[arg(long)]
        interval: Option<u64>,
        /// Skip the leading-edge invocation
        #[arg(long)]
        no_leading: bool,
        /// Skip the trailing-edge invocation
        #[arg(long)]
        no_trailing: bool,
        /// Milliseconds between calls
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
        every: u64,
        /// Stop calling after this many ms
        #[arg(long, default_value = "1000")]
        until: u64,
    },
    /// Type queries into a search handler backed by a built-in catalog
    Search {
        /// Queries in the order they are typed
        #[arg(required = true)]
        queries: Vec<String>,
        /// Milliseconds between queries
        #[arg(long, default_value = "400")]
        gap: u64,
        /// Simulated lookup latency in ms
        #[arg(long, default_value = "80")]
        latency: u64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PacerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PacerConfig::default(),
    };
    config.validate().context("Invalid config")?;

    if !cli.realtime {
        tokio::time::pause();
    }

    match cli.command {
        Commands::Debounce {
            wait,
            max_wait,
            immediate,
            no_trailing,
            every,
            until,
        } => {
            let mut settings = config.debounce;
            if let Some(wait) = wait {
                settings.wait_ms = wait;
            }
            if max_wait.is_some() {
                settings.max_wait_ms = max_wait;
            }
            settings.immediate |= immediate;
            settings.trailing &= !no_trailing;
            cmd::debounce::run(&settings, every, until, cli.json).await?;
        }
        Commands::Throttle {
            interval,
            no_leading,
            no_trailing,
            every,
            until,
        } => {
            let mut settings = config.throttle;
            if let Some(interval) = interval {
                settings.interval_ms = interval;
            }
            settings.leading &= !no_leading;
            settings.trailing &= !no_trailing;
            cmd::throttle::run(&settings, every, until, cli.json).await?;
        }
        Commands::Search {
            queries,
            gap,
            latency,
        } => {
            cmd::search::run(&config.search, &queries, gap, latency, cli.json).await?;
        }
    }

    Ok(())
}

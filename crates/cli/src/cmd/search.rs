//! Type queries into a search handler backed by an in-memory catalog

use crate::util::millis;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pacer_core::{timed, SearchConfig};
use pacer_search::{lookup_fn, AbortSignal, SearchHandler, SearchOutcome};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

const CATALOG: &[&str] = &[
    "arena floor",
    "arena upper tier",
    "balcony",
    "balcony box",
    "box seat",
    "dress circle",
    "front row",
    "general admission",
    "grand tier",
    "lawn",
    "mezzanine",
    "orchestra",
    "orchestra pit",
    "parterre",
    "press box",
    "stalls",
    "standing room",
    "upper circle",
    "vip lounge",
];

/// One delivered outcome, as printed
#[derive(Debug, Serialize)]
struct Delivery {
    at_ms: u64,
    query: String,
    results: Vec<String>,
    from_cache: bool,
    error: Option<String>,
}

impl Delivery {
    fn new(elapsed: Duration, outcome: SearchOutcome<String>) -> Self {
        Self {
            at_ms: millis(elapsed),
            query: outcome.query,
            results: outcome.results.to_vec(),
            from_cache: outcome.from_cache,
            error: outcome.error.map(|e| e.to_string()),
        }
    }
}

pub async fn run(config: &SearchConfig, queries: &[String], gap: u64, latency: u64, json: bool) -> Result<()> {
    let latency = Duration::from_millis(latency);
    let lookup = lookup_fn(move |query: String, signal: AbortSignal| async move {
        signal
            .guard(async move {
                time::sleep(latency).await;
                let needle = query.to_lowercase();
                Ok(CATALOG
                    .iter()
                    .filter(|entry| entry.contains(&needle))
                    .map(|entry| entry.to_string())
                    .collect::<Vec<String>>())
            })
            .await
    });
    let handler = SearchHandler::with_config(lookup, config).context("Invalid [search] config")?;

    let (deliveries, cache_size) = timed("search replay", replay(&handler, queries, Duration::from_millis(gap)))
        .await
        .map(|(replayed, _)| replayed)?;
    handler.destroy();

    if json {
        println!("{}", serde_json::to_string_pretty(&deliveries)?);
        return Ok(());
    }

    println!("{}", "search".bold());
    println!();
    for delivery in &deliveries {
        let source = if delivery.from_cache { "cache" } else { "lookup" };
        print!("  {:>6}ms  {:<20} {}", delivery.at_ms, format!("{:?}", delivery.query), source.dimmed());
        match &delivery.error {
            Some(error) => println!("  {}", error.red()),
            None if delivery.results.is_empty() => println!("  {}", "no results".yellow()),
            None => {
                let shown: Vec<&str> = delivery
                    .results
                    .iter()
                    .take(config.max_results)
                    .map(String::as_str)
                    .collect();
                println!("  {}", shown.join(", ").green());
            }
        }
    }
    println!();
    println!("  {:<12} {}", "Typed:".dimmed(), queries.len());
    println!("  {:<12} {}", "Delivered:".dimmed(), deliveries.len().to_string().cyan());
    println!("  {:<12} {}", "Cached:".dimmed(), cache_size);

    Ok(())
}

async fn replay<L>(handler: &SearchHandler<L>, queries: &[String], gap: Duration) -> Result<(Vec<Delivery>, usize)>
where
    L: pacer_search::Lookup<Item = String>,
{
    let start = Instant::now();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for query in queries {
        let tx = tx.clone();
        handler.search(query.clone(), move |outcome| {
            let _ = tx.send(Delivery::new(start.elapsed(), outcome));
        });
        time::sleep(gap).await;
    }
    // Closes once every callback has run or been dropped unused
    drop(tx);

    let mut deliveries = Vec::new();
    while let Some(delivery) = rx.recv().await {
        deliveries.push(delivery);
    }
    Ok((deliveries, handler.cache_size()))
}

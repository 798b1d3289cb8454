//! Kora Studio - Live Run Viewer CLI
//!
//! Terminal entry point: submits runs to the backend engine, subscribes to
//! their event streams, and prints the projected view when they finish.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kora_studio::{
    EngineClient, EngineClientConfig, RunMode, RunRequest, RunView, Station, ViewerState,
};

#[derive(Parser)]
#[command(name = "kora-studio", version, about = "Live viewer for kora pipeline runs")]
struct Cli {
    /// Base URL of the backend engine
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    base_url: String,

    /// Timeout for submission/listing requests, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a single run and watch it live
    Run {
        /// Prompt to execute
        #[arg(long)]
        prompt: String,
        /// Execution mode
        #[arg(long, value_enum, default_value_t = ModeArg::Kora)]
        mode: ModeArg,
        /// Adapter name
        #[arg(long, default_value = "mock")]
        adapter: String,
    },
    /// Submit a paired baseline/warmed demo and watch both runs
    Paired,
    /// Show the run history and the latest direct-vs-kora comparison
    History,
    /// Probe the engine's health endpoint
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Direct,
    Kora,
}

impl std::fmt::Display for ModeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModeArg::Direct => f.write_str("direct"),
            ModeArg::Kora => f.write_str("kora"),
        }
    }
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => RunMode::Direct,
            ModeArg::Kora => RunMode::Kora,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let client = EngineClient::with_config(EngineClientConfig {
        base_url: cli.base_url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
    })
    .context("failed to create engine client")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Run {
                prompt,
                mode,
                adapter,
            } => run_single(client, prompt, mode.into(), adapter).await,
            Commands::Paired => run_paired(client).await,
            Commands::History => show_history(client).await,
            Commands::Health => check_health(client).await,
        }
    })
}

async fn run_single(
    client: EngineClient,
    prompt: String,
    mode: RunMode,
    adapter: String,
) -> Result<()> {
    let request = RunRequest::new(prompt, mode).with_adapter(adapter);
    let run_id = client
        .submit_run(&request)
        .await
        .context("run submission failed")?;
    println!("run {} submitted ({})", run_id, mode);

    let state = ViewerState::new(Arc::new(client));
    let handle = state.start_run(run_id, None).await;
    let outcome = handle.wait().await;

    print_view(&handle.snapshot());
    match outcome {
        Some(kora_studio::RunOutcome::Completed) => Ok(()),
        _ => anyhow::bail!("stream ended without a done frame"),
    }
}

async fn run_paired(client: EngineClient) -> Result<()> {
    let ids = client
        .submit_paired_demo()
        .await
        .context("paired demo submission failed")?;
    println!(
        "paired demo submitted: baseline={} warmed={}",
        ids.baseline_run_id, ids.warmed_run_id
    );

    let state = ViewerState::new(Arc::new(client));
    let (baseline, warmed) = state.start_comparison(ids).await;
    state.wait_for_comparison().await;

    println!("\n=== baseline ===");
    print_view(&baseline.snapshot());
    println!("\n=== warmed ===");
    print_view(&warmed.snapshot());
    Ok(())
}

async fn show_history(client: EngineClient) -> Result<()> {
    let items = client
        .run_history()
        .await
        .context("failed to fetch run history")?;
    let cache = kora_studio::RunHistoryCache::from_items(items);

    for item in cache.items() {
        println!(
            "{}  mode={}  cost=${:.6}  tokens_out={}",
            item.run_id,
            item.mode,
            item.summary.estimated_cost_usd.unwrap_or(0.0),
            item.summary.tokens_out.unwrap_or(0),
        );
    }

    match cache.latest_pair() {
        Some(pair) => println!(
            "\nlatest pair: direct=${:.6} kora=${:.6} savings={:.1}% tokens_out_diff={} latency_diff={}ms",
            pair.direct_cost_usd,
            pair.kora_cost_usd,
            pair.savings_percent,
            pair.tokens_out_diff,
            pair.latency_diff_ms,
        ),
        None => println!("\nno comparable pair in the two most recent runs"),
    }
    Ok(())
}

async fn check_health(client: EngineClient) -> Result<()> {
    let ok = client.health().await.context("health probe failed")?;
    println!("engine health: {}", if ok { "ok" } else { "not ok" });
    if !ok {
        anyhow::bail!("engine reported unhealthy");
    }
    Ok(())
}

fn print_view(view: &RunView) {
    println!("run {}  events={}", view.run_id(), view.total_events());
    if view.skipped_llm() {
        println!("LLM call skipped (warmed path)");
    }

    for station in Station::ALL {
        match view.station_metric(station) {
            Some(metric) => println!(
                "  {:<13} {:<6} {:>6}ms  in={:<6} out={}",
                station.label(),
                metric.status,
                metric.time_ms,
                metric.tokens_in.map_or("-".to_string(), |t| t.to_string()),
                metric.tokens_out.map_or("-".to_string(), |t| t.to_string()),
            ),
            None => println!("  {:<13} -", station.label()),
        }
    }

    let report = view.report();
    if !report.is_empty() {
        println!(
            "summary: ok={} time={}ms llm_calls={} cost=${:.6}",
            report.ok.unwrap_or(false),
            report.total_time_ms.unwrap_or(0),
            report.total_llm_calls.unwrap_or(0),
            report.estimated_cost_usd.unwrap_or(0.0),
        );
    }

    let retrieval = view.retrieval_summary();
    if retrieval.retrieval_attempts > 0 {
        println!(
            "retrieval: {}/{} hits ({:.0}%)  terminal_full={}",
            retrieval.retrieval_hits,
            retrieval.retrieval_attempts,
            retrieval.retrieval_hit_rate * 100.0,
            retrieval.terminal_full,
        );
    }
}

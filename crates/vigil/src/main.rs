//! Vigil CLI: a visit simulator over vigil-core.
//!
//! Replays a scripted visitor timeline against the session kernel: one
//! startup decision, then a stream of activity signals separated by a fixed
//! gap. Gaps longer than the session expiration horizon produce renewals.
//! Useful for eyeballing sampling behavior and renewal cadence without a
//! browser host.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use vigil_core::logging::init_logging;
use vigil_core::monitor::start_session;
use vigil_core::sampling::{RandomSource, SeededRandom, UniformRandom};
use vigil_core::{Config, EventBus, MemoryCookieStore, SamplingConfig};

/// Vigil - visit simulator for the session sampling kernel
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Fraction of sessions tracked at all (overrides config file)
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Fraction of tracked sessions with resource telemetry (overrides config file)
    #[arg(long)]
    resource_sample_rate: Option<f64>,

    /// Number of activity signals to replay
    #[arg(long, default_value_t = 20)]
    events: u32,

    /// Milliseconds between consecutive activity signals
    #[arg(long, default_value_t = 60_000)]
    gap_ms: u64,

    /// Seed for deterministic draws (omit for OS randomness)
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the final summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => Config::default(),
    };
    if let Some(rate) = args.sample_rate {
        config.sampling.sample_rate = rate;
    }
    if let Some(rate) = args.resource_sample_rate {
        config.sampling.resource_sample_rate = rate;
    }
    config
        .sampling
        .validate()
        .context("invalid sampling rates")?;

    init_logging(&config.log).context("initializing logging")?;

    let summary = simulate(&config.sampling, &args);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "session_type={} id={} renewals={} signals={}",
            summary["session_type"].as_str().unwrap_or("?"),
            summary["id"].as_str().unwrap_or("-"),
            summary["renewals"],
            summary["signals"],
        );
    }
    Ok(())
}

fn simulate(sampling: &SamplingConfig, args: &Args) -> serde_json::Value {
    let store = Arc::new(MemoryCookieStore::new());
    let bus = Arc::new(EventBus::new());

    let renewals = Arc::new(AtomicUsize::new(0));
    {
        let renewals = Arc::clone(&renewals);
        bus.subscribe(move |_| {
            renewals.fetch_add(1, Ordering::SeqCst);
        });
    }

    let random: Box<dyn RandomSource + Send> = match args.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(UniformRandom),
    };

    let handle = start_session(sampling, store, Arc::clone(&bus), random, 0);
    info!(session_type = %handle.current().session_type, "visit started");

    let mut now_ms: u64 = 0;
    for _ in 0..args.events {
        now_ms += args.gap_ms;
        handle.record_activity(now_ms);
    }

    let record = handle.current();
    handle.shutdown();

    serde_json::json!({
        "session_type": record.session_type.as_str(),
        "id": record.id.as_ref().map(|id| id.as_str().to_string()),
        "renewals": renewals.load(Ordering::SeqCst),
        "signals": args.events,
        "elapsed_ms": now_ms,
    })
}

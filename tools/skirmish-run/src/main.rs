//! skirmish-run: headless driver for the demo engagement.
//!
//! Usage:
//!   skirmish-run [--config tuning.json] [--ticks N] [--seed N]
//!
//! Combat events are written to stdout as one JSON object per line; log
//! output goes to stderr and is filtered by `RUST_LOG` (default
//! `skirmish=info`).

use std::path::PathBuf;
use std::process;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use skirmish_core::config::CombatTuning;
use skirmish_sim::{CombatEngine, SimConfig};

const DEFAULT_TICKS: u64 = 1_800;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skirmish=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let mut config = SimConfig::default();
    if let Some(seed) = parse_number(&args, "--seed") {
        config.seed = seed;
    }
    if let Some(path) = parse_path(&args, "--config") {
        config.tuning = load_tuning(&path);
    }
    let ticks = parse_number(&args, "--ticks").unwrap_or(DEFAULT_TICKS);

    let mut engine = CombatEngine::new(config);
    engine.setup_demo();
    info!(ticks, "running demo engagement");

    let mut count = 0usize;
    for _ in 0..ticks {
        for event in engine.tick() {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!(error = %err, "event not serializable"),
            }
            count += 1;
        }
    }

    info!(
        events = count,
        elapsed_secs = engine.time().elapsed_secs,
        "engagement finished"
    );
}

fn print_usage() {
    eprintln!(
        "skirmish-run: run the demo engagement headless\n\
         \n\
           --config <path>  Combat tuning JSON (missing fields use defaults)\n\
           --ticks <N>      Ticks to run at 30 Hz (default: {DEFAULT_TICKS})\n\
           --seed <N>       RNG seed (default: 42)\n"
    );
}

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
}

fn parse_path(args: &[String], flag: &str) -> Option<PathBuf> {
    parse_value(args, flag).map(PathBuf::from)
}

fn parse_number(args: &[String], flag: &str) -> Option<u64> {
    let raw = parse_value(args, flag)?;
    match raw.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            eprintln!("Error: {flag} expects a whole number, got '{raw}'");
            process::exit(1);
        }
    }
}

fn load_tuning(path: &PathBuf) -> CombatTuning {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("Error: cannot read {}: {err}", path.display());
            process::exit(1);
        }
    };
    match CombatTuning::from_json_str(&text) {
        Ok(tuning) => tuning,
        Err(err) => {
            eprintln!("Error: {}: {err}", path.display());
            process::exit(1);
        }
    }
}

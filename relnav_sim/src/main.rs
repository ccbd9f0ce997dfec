//! RelNav simulator CLI
//!
//! Replays deterministic sensor scenarios through the estimation pipeline.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use relnav_sim::scenarios::ScenarioId;
use relnav_sim::{run_scenario, RunConfig, RunSummary};

/// RelNav deterministic scenario runner
#[derive(Parser, Debug)]
#[command(name = "relnav-sim")]
#[command(about = "Replay sensor scenarios through the RelNav estimator", long_about = None)]
struct Args {
    /// Scenario to run (stationary, constant_accel, cruise, fix_dropout, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Simulation duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Pace producers against the wall clock instead of full-speed replay
    #[arg(long)]
    realtime: bool,

    /// Write the session export of the (single) scenario to this JSON file
    #[arg(long)]
    export: Option<String>,

    /// List available scenarios and exit
    #[arg(long)]
    list: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn print_summary(summary: &RunSummary) {
    match &summary.final_snapshot {
        Some(snap) => {
            info!(
                "✓ {} (seed={}): {} snapshots, speed {:.2} m/s, peak {:.2} g, \
                 distance {:.1} m, τ {:.3} s, coherent={}",
                summary.scenario.name(),
                summary.seed,
                summary.snapshots,
                snap.metrics.speed_m_s,
                snap.metrics.peak_g_force,
                snap.metrics.distance_m,
                snap.metrics.proper_time_s,
                snap.verdict.coherent,
            );
        }
        None => error!(
            "✗ {} (seed={}): no snapshots published",
            summary.scenario.name(),
            summary.seed
        ),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if args.list {
        for id in ScenarioId::all() {
            println!("{:<16} {}", id.name(), id.description());
        }
        return;
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: stationary, constant_accel, cruise, fix_dropout, all");
            std::process::exit(1);
        })]
    };

    if args.export.is_some() && scenarios.len() > 1 {
        eprintln!("Error: --export only supports a single scenario, not 'all'");
        std::process::exit(1);
    }

    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let mut failed = 0usize;
    for scenario in scenarios {
        let summary = run_scenario(&RunConfig {
            scenario,
            seed,
            duration_s: args.duration,
            realtime: args.realtime,
        })
        .await;

        print_summary(&summary);
        if summary.final_snapshot.is_none() {
            failed += 1;
        }

        if let Some(path) = &args.export {
            match summary.export.write_to_file(path) {
                Ok(()) => info!("session export written to {}", path),
                Err(e) => {
                    error!("failed to write export: {}", e);
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

//! `u-procsim` command-line front end.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use u_procsim::simulation::{Simulation, SimulationConfig, SimulationOutcome};
use u_procsim::workload::WorkloadGenerator;

#[derive(Debug, Parser)]
#[command(name = "u-procsim", version, about = "Concurrent CPU scheduling simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate a workload feed under one policy.
    Run(RunArgs),
    /// Print a random workload feed.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Dispatching policy: FCFS, SJF, PR or RR.
    #[arg(long = "alg", value_name = "ALG")]
    alg: String,

    /// Round-robin quantum in burst units (required for RR).
    #[arg(long)]
    quantum: Option<u64>,

    /// Workload feed file.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Wall-clock length of one burst unit, in microseconds.
    #[arg(long, default_value_t = 1000)]
    tick_us: u64,

    /// Print every dispatch, I/O and retirement event.
    #[arg(long)]
    trace: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Number of processes.
    #[arg(long)]
    processes: usize,

    /// RNG seed; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 5)]
    max_bursts: usize,

    #[arg(long, default_value_t = 1)]
    min_burst: u64,

    #[arg(long, default_value_t = 20)]
    max_burst: u64,

    #[arg(long, default_value_t = 10)]
    max_priority: i32,

    /// Insert a sleep after every N processes.
    #[arg(long, value_name = "N")]
    sleep_every: Option<usize>,

    #[arg(long, default_value_t = 10)]
    sleep_ms: u64,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Generate(args) => generate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = SimulationConfig::from_args(&args.alg, args.quantum)
        .context("invalid scheduling options")?
        .with_tick(Duration::from_micros(args.tick_us))
        .with_trace(args.trace);

    let outcome = Simulation::new(config)
        .context("invalid simulation config")?
        .run_file(&args.input)
        .with_context(|| format!("simulation of {} failed", args.input.display()))?;

    if args.trace {
        print_trace(&outcome)?;
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&outcome.report).context("failed to encode report")?;
        println!("{json}");
    } else {
        println!("Input File Name                  :{}", args.input.display());
        println!("{}", outcome.report);
    }
    Ok(())
}

fn print_trace(outcome: &SimulationOutcome) -> Result<()> {
    for event in &outcome.trace {
        println!(
            "{}",
            serde_json::to_string(event).context("failed to encode trace event")?
        );
    }
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut generator = WorkloadGenerator::new(args.processes)
        .with_max_bursts(args.max_bursts)
        .with_burst_range(args.min_burst, args.max_burst)
        .with_max_priority(args.max_priority);
    if let Some(every) = args.sleep_every {
        generator = generator.with_sleep_every(every, Duration::from_millis(args.sleep_ms));
    }

    print!("{}", generator.render(&mut rng));
    Ok(())
}

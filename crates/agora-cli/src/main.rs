//! Agora CLI - run governance simulations from scenario files
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario once with its own method
//! agora simulate --scenario council.json
//!
//! # Repeat a seeded scenario under Borda and report stability
//! agora simulate --scenario council.json --method borda --runs 20 --seed 7
//!
//! # Measure how easily the outcome can be manipulated
//! agora robustness --scenario council.json --target "option-b"
//!
//! # Show methods and effective configuration
//! agora info
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::{info, robustness, simulate};

/// Agora - multi-agent governance and consensus simulation
#[derive(Parser)]
#[command(
    name = "agora",
    version,
    about = "Agora CLI - Multi-Agent Governance Simulation",
    long_about = "Agora runs populations of agents through collective-decision methods.\n\n\
                  Scenarios are JSON files listing options, context and agents;\n\
                  results report winners, coalitions, payoffs and outcome metrics."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario through the orchestrator
    #[command(name = "simulate")]
    Simulate(simulate::SimulateArgs),

    /// Re-run a scenario under every manipulation plan
    #[command(name = "robustness")]
    Robustness(robustness::RobustnessArgs),

    /// Show methods and configuration
    #[command(name = "info")]
    Info(info::InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Simulate(args) => simulate::run(args),
        Commands::Robustness(args) => robustness::run(args),
        Commands::Info(args) => info::run(args),
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

//! Info command - Show methods and effective configuration
//!
//! Usage:
//! ```bash
//! agora info
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use agora_adversarial::{GovernanceMethod, MediationStrategy};
use agora_core::{EngineConfig, Personality};

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs;

/// Run the info command
pub fn run(_args: InfoArgs) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    println!("{}", "Agora - Multi-Agent Governance Simulation".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!();

    println!("{}", "Version Information:".bold());
    println!("  {} {}", "CLI Version:".dimmed(), version.green());
    println!();

    println!("{}", "Governance Methods:".bold());
    for method in GovernanceMethod::ALL {
        println!("  {} {}", "•".cyan(), method.name().green());
    }
    println!();

    println!("{}", "Personalities:".bold());
    for personality in Personality::ALL {
        println!("  {} {}", "•".cyan(), personality.as_str().green());
    }
    println!();

    println!("{}", "Mediation Strategies:".bold());
    for strategy in [
        MediationStrategy::Collaborative,
        MediationStrategy::Compromise,
        MediationStrategy::Competitive,
    ] {
        println!(
            "  {} {} {}",
            "•".cyan(),
            strategy.as_str().green(),
            format!("(success {:.1})", strategy.success_probability()).dimmed()
        );
    }
    println!();

    println!("{}", "Configuration:".bold());
    let config = EngineConfig::from_env();
    println!("  {} {}", "Gossip rounds:".dimmed(), config.gossip_rounds);
    println!("  {} {}", "Efficiency cap:".dimmed(), config.max_rounds);
    println!(
        "  {} α={} γ={} ε={}",
        "Learning:".dimmed(),
        config.learning_rate,
        config.discount,
        config.exploration
    );
    println!(
        "  {} initial {} / +{} / coalition > {}",
        "Trust:".dimmed(),
        config.initial_trust,
        config.trust_increment,
        config.coalition_trust_threshold
    );
    println!(
        "  {} exact up to {} players, else {} samples",
        "Shapley:".dimmed(),
        config.shapley_exact_limit,
        config.shapley_samples
    );
    match config.seed {
        Some(seed) => println!("  {} {}", "Seed:".dimmed(), seed),
        None => println!("  {} {}", "Seed:".dimmed(), "entropy".yellow()),
    }
    println!();

    crate::print_info("Override any value with AGORA_* environment variables");
    println!();

    Ok(())
}

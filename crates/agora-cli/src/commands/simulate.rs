//! Simulate command - run a scenario file
//!
//! Usage:
//! ```bash
//! agora simulate --scenario council.json
//! agora simulate --scenario council.json --method borda --runs 10 --seed 3
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use std::path::PathBuf;

use agora_runtime::{
    consensus_rate, efficiency, fairness_index, satisfaction, summarize_results, Orchestrator, SimulationResult,
};

use super::{engine_config, load_scenario, resolve_method};

/// Arguments for the simulate command
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to the scenario JSON file
    #[arg(long, short = 's', value_name = "FILE")]
    scenario: PathBuf,

    /// Governance method (overrides the scenario's)
    #[arg(long, short = 'm')]
    method: Option<String>,

    /// Random seed for a reproducible run
    #[arg(long, env = "AGORA_SEED")]
    seed: Option<u64>,

    /// Consecutive runs over the same agents
    #[arg(long, short = 'n', default_value_t = 1)]
    runs: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

/// Run the simulate command
pub fn run(args: SimulateArgs) -> Result<()> {
    let scenario = load_scenario(&args.scenario)?;
    let config = engine_config(args.seed)?;
    let method = resolve_method(args.method.as_deref(), &scenario)?;
    let mut agents = scenario.build_agents(&config).context("Failed to build agents")?;
    let max_rounds = config.max_rounds;

    let mut orchestrator = Orchestrator::new(config);
    let mut results = Vec::with_capacity(args.runs);
    for _ in 0..args.runs.max(1) {
        results.push(
            orchestrator
                .simulate(&mut agents, &scenario, method)
                .context("Simulation failed")?,
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{}", "Agora Simulation".bold().cyan());
    println!("{}", "═".repeat(40).cyan());
    println!();

    let names: Vec<String> = agents.iter().map(|a| a.name.clone()).collect();
    for result in &results {
        print_result(result, &names, max_rounds);
    }

    if results.len() > 1 {
        let summary = summarize_results(&results, max_rounds);
        println!("{}", "Batch Summary:".bold());
        println!("  {} {}", "Runs:".dimmed(), summary.runs);
        println!("  {} {:.3}", "Stability:".dimmed(), summary.stability);
        println!("  {} {:.3}", "Mean consensus:".dimmed(), summary.consensus_rate);
        println!("  {} {:.3}", "Mean fairness:".dimmed(), summary.fairness_index);
        println!("  {} {:.3}", "Mean satisfaction:".dimmed(), summary.satisfaction);
        println!();
    }

    Ok(())
}

fn print_result(result: &SimulationResult, names: &[String], max_rounds: usize) {
    let path = if result.networked { "gossip" } else { "coalition" };
    println!(
        "{} {} {} {}",
        "Winner:".bold(),
        result.winner.green().bold(),
        format!("({path} path, {} round(s))", result.rounds).dimmed(),
        format!("run {}", result.run_id).dimmed()
    );
    println!(
        "  {} {} → {}",
        "Method:".dimmed(),
        result.method,
        result.method_winner.yellow()
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Agent").fg(Color::Cyan),
            Cell::new("Vote").fg(Color::Cyan),
            Cell::new("Satisfaction").fg(Color::Cyan),
            Cell::new("Coalition").fg(Color::Cyan),
            Cell::new("Payoff").fg(Color::Cyan),
        ]);

    for ((name, vote), sat) in names.iter().zip(&result.votes).zip(&result.satisfaction) {
        let coalition = result.coalition_of(name).map(|m| m.join(", ")).unwrap_or_default();
        let payoff = result
            .coalition_payoffs
            .as_ref()
            .and_then(|p| p.get(name))
            .map(|p| format!("{p:.3}"))
            .unwrap_or_default();
        let vote_cell = if *vote == result.winner {
            Cell::new(vote).fg(Color::Green)
        } else {
            Cell::new(vote).fg(Color::Red)
        };
        table.add_row(vec![Cell::new(name), vote_cell, Cell::new(format!("{sat:.2}")), Cell::new(coalition), Cell::new(payoff)]);
    }
    println!("{table}");

    println!(
        "  {} consensus {:.3}  fairness {:.3}  efficiency {:.3}  satisfaction {:.3}",
        "Metrics:".dimmed(),
        consensus_rate(result),
        fairness_index(result),
        efficiency(result, max_rounds),
        satisfaction(result)
    );
    if let Some(conflicts) = &result.conflicts {
        if !conflicts.is_empty() {
            crate::print_warning(&format!("{} pairwise conflict(s) mediated", conflicts.len()));
        }
    }
    println!();
}

//! Robustness command - measure how easily a scenario's outcome shifts
//!
//! Usage:
//! ```bash
//! agora robustness --scenario council.json
//! agora robustness --scenario council.json --target "option-b" --seed 9
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use std::path::PathBuf;

use agora_runtime::{Orchestrator, RobustnessSuite};

use super::{engine_config, load_scenario, resolve_method};

/// Arguments for the robustness command
#[derive(Args)]
pub struct RobustnessArgs {
    /// Path to the scenario JSON file
    #[arg(long, short = 's', value_name = "FILE")]
    scenario: PathBuf,

    /// Governance method (overrides the scenario's)
    #[arg(long, short = 'm')]
    method: Option<String>,

    /// Option pushed by false-coalition and bribery plans
    #[arg(long, short = 't')]
    target: Option<String>,

    /// Random seed for a reproducible run
    #[arg(long, env = "AGORA_SEED")]
    seed: Option<u64>,

    /// Print results and report as JSON
    #[arg(long)]
    json: bool,
}

/// Run the robustness command
pub fn run(args: RobustnessArgs) -> Result<()> {
    let scenario = load_scenario(&args.scenario)?;
    let config = engine_config(args.seed)?;
    let method = resolve_method(args.method.as_deref(), &scenario)?;
    let agents = scenario.build_agents(&config).context("Failed to build agents")?;

    if scenario.is_networked() {
        crate::print_info("Manipulation variants run on the coalition path; adjacency is ignored");
    }

    let mut suite = RobustnessSuite::new();
    if let Some(target) = args.target {
        suite = suite.with_target(target);
    }
    let mut orchestrator = Orchestrator::new(config);
    let results = suite
        .run(&mut orchestrator, &agents, &scenario, method)
        .context("Robustness suite failed")?;
    let report = RobustnessSuite::report(&results);

    if args.json {
        let payload = serde_json::json!({ "results": results, "report": report });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", "Agora Robustness Analysis".bold().cyan());
    println!("{}", "═".repeat(40).cyan());
    println!();
    println!(
        "{} {} {}",
        "Baseline winner:".bold(),
        report.baseline_winner.as_deref().unwrap_or("-").green().bold(),
        format!("({method})").dimmed()
    );
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Variant").fg(Color::Cyan),
            Cell::new("Winner").fg(Color::Cyan),
            Cell::new("Changed").fg(Color::Cyan),
            Cell::new("Δ Consensus").fg(Color::Cyan),
            Cell::new("Δ Satisfaction").fg(Color::Cyan),
        ]);

    for variant in &report.variants {
        let changed = if variant.winner_changed {
            Cell::new("yes").fg(Color::Red)
        } else {
            Cell::new("no").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(&variant.label).fg(Color::Yellow),
            Cell::new(&variant.winner),
            changed,
            Cell::new(format!("{:+.3}", variant.consensus_delta)),
            Cell::new(format!("{:+.3}", variant.satisfaction_delta)),
        ]);
    }

    println!("{table}");
    println!();
    println!("{} {:.3}", "Manipulability:".bold(), report.manipulability);
    println!();
    Ok(())
}

//! Robustness analysis: re-run a scenario under manipulation plans

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use agora_adversarial::{GovernanceMethod, ManipulationPlan};
use agora_core::{Agent, AgoraError, Choice, Result};

use crate::metrics::{consensus_rate, satisfaction};
use crate::orchestrator::Orchestrator;
use crate::scenario::{Scenario, SimulationResult};

/// Runs the baseline and every manipulation variant of a scenario
#[derive(Debug, Clone, Default)]
pub struct RobustnessSuite {
    /// Option the coercive plans push; by default the first option that
    /// did not win the baseline
    pub target: Option<Choice>,
}

impl RobustnessSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<Choice>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Seven coalition-path results: the baseline, then strategic
    /// misreporting, a false coalition, bribery with budgets 1 and 2, and
    /// noise at 0.1 and 0.3.
    ///
    /// Every run gets its own deep copy of `agents`, so neither the caller's
    /// agents nor other variants observe a variant's overlays or learning.
    pub fn run(
        &self,
        orchestrator: &mut Orchestrator,
        agents: &[Agent],
        scenario: &Scenario,
        method: GovernanceMethod,
    ) -> Result<Vec<SimulationResult>> {
        let baseline_plan = ManipulationPlan::baseline();
        let mut baseline_agents = agents.to_vec();
        let mut baseline_runner = orchestrator.fork();
        let baseline = baseline_runner
            .simulate_coalitions(&mut baseline_agents, scenario, method)?
            .tagged(&baseline_plan);

        let target = self.target_for(scenario, &baseline.winner)?;
        let plans: Vec<ManipulationPlan> = ManipulationPlan::standard_suite(&target)
            .into_iter()
            .filter(|p| p.kind != baseline_plan.kind)
            .collect();
        let runners: Vec<Orchestrator> = plans.iter().map(|_| orchestrator.fork()).collect();

        let variants = plans
            .par_iter()
            .zip(runners)
            .map(|(plan, mut runner)| {
                let mut copies = agents.to_vec();
                plan.apply(&mut copies, runner.rng_mut());
                let result = runner.simulate_coalitions(&mut copies, scenario, method)?;
                ::metrics::counter!("agora_manipulation_variants_total").increment(1);
                Ok(result.tagged(plan))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(%target, variants = variants.len(), "Robustness suite complete");
        let mut results = Vec::with_capacity(variants.len() + 1);
        results.push(baseline);
        results.extend(variants);
        Ok(results)
    }

    fn target_for(&self, scenario: &Scenario, baseline_winner: &str) -> Result<Choice> {
        if let Some(target) = &self.target {
            if !scenario.options.contains(target) {
                return Err(AgoraError::InvalidScenario(format!(
                    "manipulation target '{target}' is not a declared option"
                )));
            }
            return Ok(target.clone());
        }
        scenario
            .options
            .iter()
            .find(|o| *o != baseline_winner)
            .or_else(|| scenario.options.first())
            .cloned()
            .ok_or(AgoraError::NoOptions)
    }

    /// Compare every variant to the first (baseline) result
    pub fn report(results: &[SimulationResult]) -> RobustnessReport {
        let Some((baseline, variants)) = results.split_first() else {
            return RobustnessReport::default();
        };
        let base_consensus = consensus_rate(baseline);
        let base_satisfaction = satisfaction(baseline);

        let comparisons: Vec<VariantComparison> = variants
            .iter()
            .map(|r| VariantComparison {
                label: label_of(r),
                winner: r.winner.clone(),
                winner_changed: r.winner != baseline.winner,
                consensus_delta: consensus_rate(r) - base_consensus,
                satisfaction_delta: satisfaction(r) - base_satisfaction,
            })
            .collect();

        let manipulability = if comparisons.is_empty() {
            0.0
        } else {
            comparisons.iter().filter(|c| c.winner_changed).count() as f64 / comparisons.len() as f64
        };

        RobustnessReport {
            baseline_winner: Some(baseline.winner.clone()),
            variants: comparisons,
            manipulability,
        }
    }
}

fn label_of(result: &SimulationResult) -> String {
    match result.manipulation_type {
        Some(kind) => ManipulationPlan {
            kind,
            target: None,
            noise_level: result.noise_level,
            bribery_budget: result.bribery_budget,
        }
        .label(),
        None => "untagged".to_string(),
    }
}

/// One variant measured against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantComparison {
    pub label: String,
    pub winner: Choice,
    pub winner_changed: bool,
    pub consensus_delta: f64,
    pub satisfaction_delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobustnessReport {
    pub baseline_winner: Option<Choice>,
    pub variants: Vec<VariantComparison>,
    /// Fraction of variants whose winner differs from the baseline
    pub manipulability: f64,
}

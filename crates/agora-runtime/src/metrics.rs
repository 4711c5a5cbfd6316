//! Outcome measures over one run or a batch of runs

use serde::{Deserialize, Serialize};

use agora_adversarial::mode;
use agora_core::{Agent, Choice};

use crate::scenario::SimulationResult;

/// Fraction of votes equal to the winner; 0.0 with no votes
pub fn consensus_rate(result: &SimulationResult) -> f64 {
    if result.votes.is_empty() {
        return 0.0;
    }
    let agreeing = result.votes.iter().filter(|v| **v == result.winner).count();
    agreeing as f64 / result.votes.len() as f64
}

/// Gini coefficient: mean absolute pairwise difference over twice the mean.
/// 0.0 for an empty or all-zero vector.
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.is_empty() || mean <= 0.0 {
        return 0.0;
    }
    let spread: f64 = values
        .iter()
        .flat_map(|x| values.iter().map(move |y| (x - y).abs()))
        .sum();
    spread / (2.0 * n * n * mean)
}

/// `1 − Gini(satisfaction)`; 0.0 with no agents
pub fn fairness_index(result: &SimulationResult) -> f64 {
    if result.satisfaction.is_empty() {
        return 0.0;
    }
    1.0 - gini(&result.satisfaction)
}

/// `1 − rounds / max_rounds`, clamped to [0, 1]; 0.0 when `max_rounds` is 0
pub fn efficiency(result: &SimulationResult, max_rounds: usize) -> f64 {
    if max_rounds == 0 {
        return 0.0;
    }
    (1.0 - result.rounds as f64 / max_rounds as f64).clamp(0.0, 1.0)
}

/// Mean satisfaction; 0.0 with no agents
pub fn satisfaction(result: &SimulationResult) -> f64 {
    if result.satisfaction.is_empty() {
        return 0.0;
    }
    result.satisfaction.iter().sum::<f64>() / result.satisfaction.len() as f64
}

/// Share of runs won by the most common winner; 0.0 for an empty batch
pub fn stability(results: &[SimulationResult]) -> f64 {
    let winners: Vec<&Choice> = results.iter().map(|r| &r.winner).collect();
    let Some(common) = mode(winners.iter().copied()) else {
        return 0.0;
    };
    let count = winners.iter().filter(|w| ***w == common).count();
    count as f64 / results.len() as f64
}

/// Batch summary: per-run measures averaged over the batch, plus stability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub runs: usize,
    pub consensus_rate: f64,
    pub fairness_index: f64,
    pub efficiency: f64,
    pub satisfaction: f64,
    pub stability: f64,
}

pub fn summarize_results(results: &[SimulationResult], max_rounds: usize) -> MetricsSummary {
    if results.is_empty() {
        return MetricsSummary::default();
    }
    let n = results.len() as f64;
    let mean = |f: &dyn Fn(&SimulationResult) -> f64| results.iter().map(f).sum::<f64>() / n;

    let summary = MetricsSummary {
        runs: results.len(),
        consensus_rate: mean(&consensus_rate),
        fairness_index: mean(&fairness_index),
        efficiency: mean(&|r: &SimulationResult| efficiency(r, max_rounds)),
        satisfaction: mean(&satisfaction),
        stability: stability(results),
    };
    ::metrics::gauge!("agora_last_consensus_rate").set(summary.consensus_rate);
    summary
}

/// Check that there is something to decide and that every agent ranks only
/// declared options. Returns whether the scenario is valid and why not.
pub fn validate_scenario(agents: &[Agent], options: &[Choice]) -> (bool, String) {
    if options.is_empty() {
        return (false, "scenario declares no options".to_string());
    }
    if agents.is_empty() {
        return (false, "scenario has no agents".to_string());
    }
    for agent in agents {
        if agent.preferences.is_empty() {
            return (false, format!("agent '{}' has no preferences", agent.name));
        }
        if let Some(unknown) = agent.preferences.iter().find(|p| !options.contains(p)) {
            return (
                false,
                format!("agent '{}' ranks '{unknown}', which is not a declared option", agent.name),
            );
        }
    }
    (true, "scenario is valid".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_adversarial::GovernanceMethod;
    use agora_core::Personality;
    use uuid::Uuid;

    fn result(votes: &[&str], winner: &str, satisfaction: &[f64], rounds: usize) -> SimulationResult {
        SimulationResult {
            run_id: Uuid::nil(),
            method: GovernanceMethod::Majority,
            votes: votes.iter().map(|v| v.to_string()).collect(),
            winner: winner.to_string(),
            method_winner: winner.to_string(),
            satisfaction: satisfaction.to_vec(),
            coalitions: None,
            coalition_payoffs: None,
            rounds,
            conflicts: None,
            resolved_conflicts: None,
            networked: false,
            negotiation: None,
            manipulation_type: None,
            noise_level: None,
            bribery_budget: None,
        }
    }

    #[test]
    fn test_consensus_rate() {
        assert!((consensus_rate(&result(&["X", "Y", "X"], "X", &[], 1)) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(consensus_rate(&result(&[], "X", &[], 1)), 0.0);
    }

    #[test]
    fn test_fairness() {
        assert_eq!(fairness_index(&result(&[], "X", &[0.5, 0.5, 0.5], 1)), 1.0);
        assert_eq!(fairness_index(&result(&[], "X", &[0.0, 0.0], 1)), 1.0);
        assert_eq!(fairness_index(&result(&[], "X", &[], 1)), 0.0);
        // [1, 0]: spread 2, mean 0.5 -> Gini 2 / (2 * 4 * 0.5) = 0.5
        assert!((fairness_index(&result(&[], "X", &[1.0, 0.0], 1)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_efficiency() {
        assert_eq!(efficiency(&result(&[], "X", &[], 0), 10), 1.0);
        assert!((efficiency(&result(&[], "X", &[], 1), 10) - 0.9).abs() < 1e-12);
        assert_eq!(efficiency(&result(&[], "X", &[], 12), 10), 0.0);
        assert_eq!(efficiency(&result(&[], "X", &[], 1), 0), 0.0);
    }

    #[test]
    fn test_stability() {
        let batch = vec![
            result(&[], "X", &[], 1),
            result(&[], "Y", &[], 1),
            result(&[], "X", &[], 1),
            result(&[], "X", &[], 1),
        ];
        assert_eq!(stability(&batch), 0.75);
        assert_eq!(stability(&[]), 0.0);
    }

    #[test]
    fn test_summary() {
        let batch = vec![result(&["X", "X"], "X", &[1.0, 1.0], 1), result(&["X", "Y"], "X", &[1.0, 0.0], 1)];
        let summary = summarize_results(&batch, 10);
        assert_eq!(summary.runs, 2);
        assert!((summary.consensus_rate - 0.75).abs() < 1e-12);
        assert!((summary.satisfaction - 0.75).abs() < 1e-12);
        assert_eq!(summary.stability, 1.0);
        assert_eq!(summarize_results(&[], 10), MetricsSummary::default());
    }

    #[test]
    fn test_validate_scenario() {
        let options: Vec<Choice> = vec!["A".into(), "B".into()];
        let good = vec![Agent::new("a", Personality::Stubborn, vec!["A".into()]).unwrap()];
        assert!(validate_scenario(&good, &options).0);

        let stray = vec![Agent::new("a", Personality::Stubborn, vec!["C".into()]).unwrap()];
        let (ok, message) = validate_scenario(&stray, &options);
        assert!(!ok);
        assert!(message.contains("'C'"));

        let empty = vec![Agent::new("a", Personality::Stubborn, vec![]).unwrap()];
        assert!(!validate_scenario(&empty, &options).0);
        assert!(!validate_scenario(&good, &[]).0);
    }
}

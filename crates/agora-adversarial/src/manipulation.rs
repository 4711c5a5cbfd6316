//! Manipulation plans that install adversarial overlays on a population

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use agora_core::{Agent, Choice, Overlay};

/// Kind of manipulation applied to a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManipulationKind {
    Baseline,
    /// Every agent with a second choice reports it instead of its first
    Strategic,
    /// The first half of the population reports a common target
    FalseCoalition,
    /// A random subset of fixed size reports the target
    Bribery,
    /// Every agent reports a random option with some probability
    Noise,
}

impl ManipulationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManipulationKind::Baseline => "baseline",
            ManipulationKind::Strategic => "strategic",
            ManipulationKind::FalseCoalition => "false_coalition",
            ManipulationKind::Bribery => "bribery",
            ManipulationKind::Noise => "noise",
        }
    }
}

impl fmt::Display for ManipulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A manipulation and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulationPlan {
    pub kind: ManipulationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bribery_budget: Option<usize>,
}

impl ManipulationPlan {
    fn of(kind: ManipulationKind) -> Self {
        Self {
            kind,
            target: None,
            noise_level: None,
            bribery_budget: None,
        }
    }

    pub fn baseline() -> Self {
        Self::of(ManipulationKind::Baseline)
    }

    pub fn strategic() -> Self {
        Self::of(ManipulationKind::Strategic)
    }

    pub fn false_coalition(target: impl Into<Choice>) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::of(ManipulationKind::FalseCoalition)
        }
    }

    pub fn bribery(target: impl Into<Choice>, budget: usize) -> Self {
        Self {
            target: Some(target.into()),
            bribery_budget: Some(budget),
            ..Self::of(ManipulationKind::Bribery)
        }
    }

    pub fn noise(level: f64) -> Self {
        Self {
            noise_level: Some(level),
            ..Self::of(ManipulationKind::Noise)
        }
    }

    /// Baseline, strategic, false coalition, bribery with budgets 1 and 2,
    /// noise at 0.1 and 0.3
    pub fn standard_suite(target: &str) -> Vec<ManipulationPlan> {
        vec![
            Self::baseline(),
            Self::strategic(),
            Self::false_coalition(target),
            Self::bribery(target, 1),
            Self::bribery(target, 2),
            Self::noise(0.1),
            Self::noise(0.3),
        ]
    }

    /// Short label, e.g. `bribery(2)` or `noise(0.3)`
    pub fn label(&self) -> String {
        match self.kind {
            ManipulationKind::Bribery => format!("bribery({})", self.bribery_budget.unwrap_or(0)),
            ManipulationKind::Noise => format!("noise({})", self.noise_level.unwrap_or(0.0)),
            kind => kind.as_str().to_string(),
        }
    }

    /// Install overlays on `agents`. Returns the indices of affected agents.
    ///
    /// Existing overlays are cleared first, so applying a baseline plan
    /// restores honest reporting.
    pub fn apply<R: Rng + ?Sized>(&self, agents: &mut [Agent], rng: &mut R) -> Vec<usize> {
        agents.iter_mut().for_each(|a| a.overlay = None);
        let n = agents.len();

        let (affected, overlay): (Vec<usize>, Option<Overlay>) = match self.kind {
            ManipulationKind::Baseline => (Vec::new(), None),
            ManipulationKind::Strategic => (
                (0..n).filter(|&i| agents[i].preferences.len() >= 2).collect(),
                Some(Overlay::Misreport),
            ),
            ManipulationKind::FalseCoalition => match &self.target {
                Some(target) => ((0..n / 2).collect(), Some(Overlay::Coerced(target.clone()))),
                None => (Vec::new(), None),
            },
            ManipulationKind::Bribery => match &self.target {
                Some(target) => {
                    let budget = self.bribery_budget.unwrap_or(0).min(n);
                    let mut picked = index::sample(rng, n, budget).into_vec();
                    picked.sort_unstable();
                    (picked, Some(Overlay::Coerced(target.clone())))
                }
                None => (Vec::new(), None),
            },
            ManipulationKind::Noise => {
                let level = self.noise_level.unwrap_or(0.0).clamp(0.0, 1.0);
                ((0..n).collect(), Some(Overlay::Noise(level)))
            }
        };

        if let Some(overlay) = overlay {
            for &i in &affected {
                agents[i].overlay = Some(overlay.clone());
            }
        }
        tracing::debug!(plan = %self.label(), affected = affected.len(), "Manipulation applied");
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Personality;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population(n: usize) -> Vec<Agent> {
        (0..n)
            .map(|i| {
                Agent::new(format!("a{i}"), Personality::Stubborn, vec!["X".into(), "Y".into()]).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_standard_suite_order() {
        let labels: Vec<String> = ManipulationPlan::standard_suite("Y").iter().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            vec!["baseline", "strategic", "false_coalition", "bribery(1)", "bribery(2)", "noise(0.1)", "noise(0.3)"]
        );
    }

    #[test]
    fn test_false_coalition_covers_first_half() {
        let mut agents = population(5);
        let mut rng = StdRng::seed_from_u64(0);
        let affected = ManipulationPlan::false_coalition("Y").apply(&mut agents, &mut rng);
        assert_eq!(affected, vec![0, 1]);
        assert_eq!(agents[0].overlay, Some(Overlay::Coerced("Y".into())));
        assert!(agents[2].overlay.is_none());
    }

    #[test]
    fn test_bribery_budget_is_capped() {
        let mut agents = population(3);
        let mut rng = StdRng::seed_from_u64(0);
        let affected = ManipulationPlan::bribery("Y", 10).apply(&mut agents, &mut rng);
        assert_eq!(affected, vec![0, 1, 2]);

        let affected = ManipulationPlan::bribery("Y", 1).apply(&mut agents, &mut rng);
        assert_eq!(affected.len(), 1);
        assert_eq!(agents.iter().filter(|a| a.overlay.is_some()).count(), 1);
    }

    #[test]
    fn test_baseline_clears_overlays() {
        let mut agents = population(2);
        let mut rng = StdRng::seed_from_u64(0);
        ManipulationPlan::strategic().apply(&mut agents, &mut rng);
        assert!(agents.iter().all(|a| a.overlay == Some(Overlay::Misreport)));
        ManipulationPlan::baseline().apply(&mut agents, &mut rng);
        assert!(agents.iter().all(|a| a.overlay.is_none()));
    }
}

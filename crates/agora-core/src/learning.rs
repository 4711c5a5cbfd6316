//! Action-value learning for agents
//!
//! A tabular Q-function keyed by `(top preference, coalition)` states and
//! option actions, updated with a single-step backup and consulted through
//! an ε-greedy policy.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::context::Choice;

/// Coalition label used in the state when the agent has none
pub const NO_COALITION: &str = "none";

/// Learning state: the agent's top preference and coalition label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QState {
    pub top_preference: Choice,
    pub coalition: String,
}

impl QState {
    pub fn new(top_preference: impl Into<Choice>, coalition: Option<&str>) -> Self {
        Self {
            top_preference: top_preference.into(),
            coalition: coalition.unwrap_or(NO_COALITION).to_string(),
        }
    }

    fn key(&self) -> String {
        format!("{}|{}", self.top_preference, self.coalition)
    }
}

/// Q-learning hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    /// Learning rate α
    pub alpha: f64,
    /// Discount γ
    pub gamma: f64,
    /// Exploration probability ε
    pub epsilon: f64,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.1,
        }
    }
}

/// Tabular action-value estimates. Unvisited pairs read as 0.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    values: BTreeMap<String, BTreeMap<Choice, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current estimate for a state/action pair
    pub fn get(&self, state: &QState, action: &str) -> f64 {
        self.values
            .get(&state.key())
            .and_then(|row| row.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Overwrite an estimate
    pub fn set(&mut self, state: &QState, action: &str, value: f64) {
        self.values
            .entry(state.key())
            .or_default()
            .insert(action.to_string(), value);
    }

    /// Best estimate over `actions`; 0.0 when there are none
    pub fn best_value(&self, state: &QState, actions: &[Choice]) -> f64 {
        actions
            .iter()
            .map(|a| self.get(state, a))
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
            .unwrap_or(0.0)
    }

    /// ε-greedy selection over `actions`, ties among the best broken uniformly
    pub fn epsilon_greedy<R: Rng + ?Sized>(
        &self,
        state: &QState,
        actions: &[Choice],
        epsilon: f64,
        rng: &mut R,
    ) -> Option<Choice> {
        if actions.is_empty() {
            return None;
        }
        if rng.random_bool(epsilon.clamp(0.0, 1.0)) {
            return actions.choose(rng).cloned();
        }

        let best = self.best_value(state, actions);
        let greedy: Vec<&Choice> = actions
            .iter()
            .filter(|a| (self.get(state, a) - best).abs() < f64::EPSILON)
            .collect();
        greedy.choose(rng).map(|a| (*a).clone())
    }

    /// Single-step backup: Q(s,a) += α (r + γ max Q(s',·) − Q(s,a))
    pub fn update(
        &mut self,
        state: &QState,
        action: &str,
        reward: f64,
        next_state: &QState,
        next_actions: &[Choice],
        params: LearningParams,
    ) -> f64 {
        let current = self.get(state, action);
        let target = reward + params.gamma * self.best_value(next_state, next_actions);
        let updated = current + params.alpha * (target - current);
        self.set(state, action, updated);
        updated
    }

    /// Number of visited states
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn opts(names: &[&str]) -> Vec<Choice> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_update_moves_toward_target() {
        let mut table = QTable::new();
        let s = QState::new("A", None);
        let value = table.update(&s, "A", 1.0, &s, &opts(&["A", "B"]), LearningParams::default());
        // 0 + 0.5 * (1 + 0.9 * 0 - 0)
        assert!((value - 0.5).abs() < 1e-12);

        let value = table.update(&s, "A", 1.0, &s, &opts(&["A", "B"]), LearningParams::default());
        // 0.5 + 0.5 * (1 + 0.9 * 0.5 - 0.5)
        assert!((value - 0.975).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_prefers_best_action() {
        let mut table = QTable::new();
        let s = QState::new("A", Some("c0"));
        table.set(&s, "B", 2.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let pick = table.epsilon_greedy(&s, &opts(&["A", "B", "C"]), 0.0, &mut rng);
            assert_eq!(pick.as_deref(), Some("B"));
        }
    }

    #[test]
    fn test_ties_are_broken_randomly() {
        let table = QTable::new();
        let s = QState::new("A", None);
        let mut rng = StdRng::seed_from_u64(11);
        let picks: std::collections::BTreeSet<_> = (0..64)
            .filter_map(|_| table.epsilon_greedy(&s, &opts(&["A", "B", "C"]), 0.0, &mut rng))
            .collect();
        assert!(picks.len() > 1);
    }

    #[test]
    fn test_empty_actions() {
        let table = QTable::new();
        let s = QState::new("A", None);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(table.epsilon_greedy(&s, &[], 0.1, &mut rng).is_none());
        assert_eq!(table.best_value(&s, &[]), 0.0);
    }
}

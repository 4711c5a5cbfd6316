//! Decision context passed into every decision and negotiation call
//!
//! Recognized keys are typed fields. Anything else lands in `extra` and is
//! ignored by the engine; a missing key always means "not applicable".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One of the choices under vote. Opaque, compared by value.
pub type Choice = String;

/// Key/value context for a decision round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionContext {
    /// Option a flexible agent should fall in line with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub majority_hint: Option<Choice>,
    /// Option a strategic agent expects to win
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likely_winner: Option<Choice>,
    /// Option currently on the table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed: Option<Choice>,
    /// Agent that authored the proposal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_by: Option<String>,
    /// Option every coalition member must vote for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coalition_leader: Option<Choice>,
    /// Credit budget for budgeted allocation voting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quadratic_budget: Option<u32>,
    /// Faulty fraction for Byzantine-tolerant majority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byzantine_ratio: Option<f64>,
    /// Peer adjacency matrix; a positive entry is an edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjacency: Option<Vec<Vec<f64>>>,
    /// Mediation strategy for conflict resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mediation_strategy: Option<String>,
    /// Negotiation rounds to run before voting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiation_rounds: Option<usize>,
    /// Unrecognized keys, kept for round-tripping only
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DecisionContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_majority_hint(mut self, choice: impl Into<Choice>) -> Self {
        self.majority_hint = Some(choice.into());
        self
    }

    pub fn with_likely_winner(mut self, choice: impl Into<Choice>) -> Self {
        self.likely_winner = Some(choice.into());
        self
    }

    /// Put a proposal on the table, optionally naming its author
    pub fn with_proposal(mut self, choice: impl Into<Choice>, author: Option<&str>) -> Self {
        self.proposed = Some(choice.into());
        self.proposed_by = author.map(str::to_string);
        self
    }

    pub fn with_coalition_leader(mut self, choice: impl Into<Choice>) -> Self {
        self.coalition_leader = Some(choice.into());
        self
    }

    pub fn with_quadratic_budget(mut self, budget: u32) -> Self {
        self.quadratic_budget = Some(budget);
        self
    }

    pub fn with_byzantine_ratio(mut self, ratio: f64) -> Self {
        self.byzantine_ratio = Some(ratio);
        self
    }

    pub fn with_adjacency(mut self, adjacency: Vec<Vec<f64>>) -> Self {
        self.adjacency = Some(adjacency);
        self
    }

    pub fn with_mediation_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.mediation_strategy = Some(strategy.into());
        self
    }

    pub fn with_negotiation_rounds(mut self, rounds: usize) -> Self {
        self.negotiation_rounds = Some(rounds);
        self
    }

    /// Whether the adjacency matrix declares an edge from `from` to `to`.
    /// Missing rows or columns are treated as no edge.
    pub fn is_neighbor(&self, from: usize, to: usize) -> bool {
        self.adjacency
            .as_ref()
            .and_then(|m| m.get(from))
            .and_then(|row| row.get(to))
            .is_some_and(|w| *w > 0.0)
    }

    /// A copy of this context with the proposal fields replaced
    pub fn proposing(&self, choice: &Choice, author: &str) -> Self {
        let mut next = self.clone();
        next.proposed = Some(choice.clone());
        next.proposed_by = Some(author.to_string());
        next
    }
}

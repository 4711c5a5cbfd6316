//! Agent types for Agora
//!
//! The core [`Agent`] struct holds an agent's ranked preferences, trust in
//! its peers, learned action values and histories. Decision making goes
//! through one routine, [`Agent::decide`], which consults in order:
//!
//! 1. an adversarial [`Overlay`] (installed only by the manipulation harness)
//! 2. the agent's [`Capability`] (belief/desire/intention or reactive rules)
//! 3. coalition discipline (`coalition_leader` in the context)
//! 4. the fallback policy: personality, or the learned ε-greedy policy

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::argument::Argument;
use crate::capability::{Capability, Overlay};
use crate::config::EngineConfig;
use crate::context::{Choice, DecisionContext};
use crate::error::{AgoraError, Result};
use crate::learning::{LearningParams, QState, QTable, NO_COALITION};
use crate::personality::{NegotiationAction, Personality};

/// Per-agent thresholds and learning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTuning {
    pub learning: LearningParams,
    pub trust_increment: f64,
    pub strategic_trust_threshold: f64,
    pub coalition_trust_threshold: f64,
    pub low_satisfaction_threshold: f64,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for AgentTuning {
    fn from(config: &EngineConfig) -> Self {
        Self {
            learning: LearningParams {
                alpha: config.learning_rate,
                gamma: config.discount,
                epsilon: config.exploration,
            },
            trust_increment: config.trust_increment,
            strategic_trust_threshold: config.strategic_trust_threshold,
            coalition_trust_threshold: config.coalition_trust_threshold,
            low_satisfaction_threshold: config.low_satisfaction_threshold,
        }
    }
}

/// What the agent does when no overlay, capability or coalition applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// Personality-driven decision
    #[default]
    Personality,
    /// ε-greedy over the Q-table, whatever the personality
    Learned,
}

/// One remembered round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub decision: Choice,
    pub outcome: Choice,
    pub context: DecisionContext,
    /// Options that were on the table; empty when unknown
    pub options: Vec<Choice>,
    /// Learning state at the time of the round
    pub state: QState,
    pub satisfaction: f64,
}

/// A decision-making agent
#[derive(Debug, Clone)]
pub struct Agent {
    /// Unique within a run
    pub name: String,
    /// Current personality
    pub personality: Personality,
    /// Personality the agent started with, when it has since adapted
    pub adapted_from: Option<Personality>,
    /// Strict ranking, most preferred first
    pub preferences: Vec<Choice>,
    /// Trust in peers, each within [0, 1]
    pub trust: BTreeMap<String, f64>,
    /// Coalition label, assigned during coalition formation
    pub coalition: Option<String>,
    pub satisfaction_history: Vec<f64>,
    pub memory: Vec<MemoryEntry>,
    /// Append-only
    pub argument_history: Vec<Argument>,
    pub q_table: QTable,
    pub tuning: AgentTuning,
    pub fallback: Fallback,
    pub capability: Option<Capability>,
    /// Adversarial override, only ever set on cloned agents
    pub overlay: Option<Overlay>,
}

impl Agent {
    /// Create an agent. Duplicate preferences are rejected.
    pub fn new(
        name: impl Into<String>,
        personality: Personality,
        preferences: Vec<Choice>,
    ) -> Result<Self> {
        let name = name.into();
        for (i, choice) in preferences.iter().enumerate() {
            if preferences[..i].contains(choice) {
                return Err(AgoraError::DuplicatePreference {
                    agent: name,
                    choice: choice.clone(),
                });
            }
        }

        Ok(Self {
            name,
            personality,
            adapted_from: None,
            preferences,
            trust: BTreeMap::new(),
            coalition: None,
            satisfaction_history: Vec::new(),
            memory: Vec::new(),
            argument_history: Vec::new(),
            q_table: QTable::new(),
            tuning: AgentTuning::default(),
            fallback: Fallback::Personality,
            capability: None,
            overlay: None,
        })
    }

    /// Trust every named peer (other than self) at `initial`
    pub fn with_peers<'a>(mut self, peers: impl IntoIterator<Item = &'a str>, initial: f64) -> Self {
        for peer in peers {
            if peer != self.name {
                self.trust.insert(peer.to_string(), initial.clamp(0.0, 1.0));
            }
        }
        self
    }

    pub fn with_tuning(mut self, tuning: AgentTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Most preferred option
    pub fn top_preference(&self) -> Result<&Choice> {
        self.preferences
            .first()
            .ok_or_else(|| AgoraError::EmptyPreferences { agent: self.name.clone() })
    }

    /// Second preference, or the first when only one is ranked
    pub fn hedge_preference(&self) -> Result<&Choice> {
        match self.preferences.get(1) {
            Some(second) => Ok(second),
            None => self.top_preference(),
        }
    }

    /// Highest trust in any peer; 0.0 with no peers
    pub fn max_trust(&self) -> f64 {
        self.trust.values().copied().fold(0.0, f64::max)
    }

    /// Peer with the highest trust; the first in name order wins ties
    pub fn most_trusted(&self) -> Option<(&str, f64)> {
        self.trust
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (peer, t)| match best {
                Some((_, b)) if b >= *t => best,
                _ => Some((peer.as_str(), *t)),
            })
    }

    pub fn trust_in(&self, peer: &str) -> f64 {
        self.trust.get(peer).copied().unwrap_or(0.0)
    }

    /// Current learning state
    pub fn q_state(&self) -> QState {
        QState::new(
            self.preferences.first().map(String::as_str).unwrap_or(NO_COALITION),
            self.coalition.as_deref(),
        )
    }

    /// Satisfaction with `outcome`: 1.0 for the top preference falling
    /// linearly to 0.0 for the last; 0.0 for unranked outcomes.
    pub fn satisfaction_for(&self, outcome: &str) -> f64 {
        match self.preferences.iter().position(|p| p == outcome) {
            None => 0.0,
            Some(_) if self.preferences.len() == 1 => 1.0,
            Some(idx) => 1.0 - idx as f64 / (self.preferences.len() - 1) as f64,
        }
    }

    /// ε-greedy choice over `options` using the Q-table
    pub fn learned_choice<R: Rng + ?Sized>(&self, options: &[Choice], rng: &mut R) -> Result<Choice> {
        self.q_table
            .epsilon_greedy(&self.q_state(), options, self.tuning.learning.epsilon, rng)
            .ok_or(AgoraError::NoOptions)
    }

    /// Choose an option
    pub fn decide<R: Rng + ?Sized>(
        &self,
        options: &[Choice],
        ctx: &DecisionContext,
        rng: &mut R,
    ) -> Result<Choice> {
        if let Some(choice) = self.overlay.as_ref().and_then(|o| o.report(self, options, rng)) {
            return Ok(choice);
        }
        if let Some(choice) = self
            .capability
            .as_ref()
            .and_then(|c| c.overrides(self, options, ctx))
        {
            return Ok(choice);
        }
        if let (Some(leader), Some(_)) = (&ctx.coalition_leader, &self.coalition) {
            if options.contains(leader) {
                return Ok(leader.clone());
            }
        }
        match self.fallback {
            Fallback::Personality => self.personality.decide(self, options, ctx, rng),
            Fallback::Learned => self.learned_choice(options, rng),
        }
    }

    /// The option this agent reports as its top preference, which an
    /// adversarial overlay may replace
    pub fn reported_top<R: Rng + ?Sized>(&self, options: &[Choice], rng: &mut R) -> Result<Choice> {
        if let Some(choice) = self.overlay.as_ref().and_then(|o| o.report(self, options, rng)) {
            return Ok(choice);
        }
        self.top_preference().cloned()
    }

    /// Record the outcome of a round and learn from it. Returns the
    /// round's satisfaction.
    ///
    /// When the previous memory entry carries its option set, one Q-learning
    /// backup is applied to the previous state/decision with the current
    /// satisfaction as reward. A proposal authored by another agent raises
    /// trust in that agent.
    pub fn update_memory(
        &mut self,
        decision: &str,
        outcome: &str,
        ctx: &DecisionContext,
        options: &[Choice],
    ) -> f64 {
        let satisfaction = self.satisfaction_for(outcome);
        let state = self.q_state();

        if let Some(prev) = self.memory.last() {
            if !prev.options.is_empty() {
                let (prev_state, prev_decision) = (prev.state.clone(), prev.decision.clone());
                self.q_table.update(
                    &prev_state,
                    &prev_decision,
                    satisfaction,
                    &state,
                    options,
                    self.tuning.learning,
                );
            }
        }

        self.satisfaction_history.push(satisfaction);
        self.memory.push(MemoryEntry {
            decision: decision.to_string(),
            outcome: outcome.to_string(),
            context: ctx.clone(),
            options: options.to_vec(),
            state,
            satisfaction,
        });

        if let Some(author) = ctx.proposed_by.as_deref() {
            if author != self.name {
                self.learn_trust(author);
            }
        }

        satisfaction
    }

    /// Raise trust in a known peer by the configured increment, capped at
    /// 1.0. Names outside the trust map are ignored.
    pub fn learn_trust(&mut self, peer: &str) {
        let increment = self.tuning.trust_increment;
        match self.trust.get_mut(peer) {
            Some(entry) => *entry = (*entry + increment).min(1.0),
            None => tracing::debug!(agent = %self.name, %peer, "Ignoring trust update for unknown peer"),
        }
    }

    /// Apply the personality transition for the current satisfaction
    /// history. Returns `(from, to)` when the personality changed.
    pub fn adapt(&mut self) -> Option<(Personality, Personality)> {
        let next = self
            .personality
            .adapt(&self.satisfaction_history, self.tuning.low_satisfaction_threshold);
        if next == self.personality {
            return None;
        }
        let from = self.personality;
        self.adapted_from.get_or_insert(from);
        self.personality = next;
        tracing::debug!(agent = %self.name, %from, to = %next, "Personality adapted");
        Some((from, next))
    }

    /// Negotiation move: invite a highly trusted peer into a coalition, or
    /// propose/accept/argue according to personality
    pub fn negotiate<R: Rng + ?Sized>(
        &self,
        options: &[Choice],
        ctx: &DecisionContext,
        rng: &mut R,
    ) -> Result<NegotiationAction> {
        if let Some((peer, trust)) = self.most_trusted() {
            if trust > self.tuning.coalition_trust_threshold {
                return Ok(NegotiationAction::FormCoalition(peer.to_string()));
            }
        }
        self.personality.negotiate(self, options, ctx, rng)
    }

    /// Make and remember an argument for `target`
    pub fn propose_argument(&mut self, target: &str, reason: impl Into<String>) -> Argument {
        let argument = Argument::support(&self.name, target, reason);
        self.argument_history.push(argument.clone());
        argument
    }

    /// Make and remember an argument for `target` against `against`
    pub fn counter_argument(
        &mut self,
        against: &Argument,
        target: &str,
        reason: impl Into<String>,
    ) -> Argument {
        let argument = Argument::counter(&self.name, target, against.target.clone(), reason);
        self.argument_history.push(argument.clone());
        argument
    }

    /// Remember an incoming argument. A flexible agent moves the argued-for
    /// option to the front when it already ranks it, whether the argument
    /// supports a proposal or counters one; unranked options are never
    /// inserted.
    pub fn receive_argument(&mut self, argument: Argument) {
        if self.personality == Personality::Flexible {
            if let Some(idx) = self.preferences.iter().position(|p| *p == argument.target) {
                let promoted = self.preferences.remove(idx);
                self.preferences.insert(0, promoted);
            }
        }
        self.argument_history.push(argument);
    }

    /// Mean of the satisfaction history; 0.0 when empty
    pub fn mean_satisfaction(&self) -> f64 {
        if self.satisfaction_history.is_empty() {
            0.0
        } else {
            self.satisfaction_history.iter().sum::<f64>() / self.satisfaction_history.len() as f64
        }
    }
}

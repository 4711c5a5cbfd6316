//! Agent construction from configuration records

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::agent::{Agent, AgentTuning, Fallback};
use crate::capability::{BeliefState, Capability, RuleSet};
use crate::config::EngineConfig;
use crate::context::Choice;
use crate::error::{AgoraError, Result};
use crate::personality::Personality;

/// Structural kind of agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    #[default]
    Base,
    /// Belief/desire/intention agent
    #[serde(alias = "belief_desire_intention")]
    Bdi,
    /// Rule-based reactive agent
    Reactive,
}

/// Configuration record for one agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpec {
    pub name: String,
    pub personality: Personality,
    /// Explicit ranking; takes precedence over `options`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Vec<Choice>>,
    /// Options to rank in a random order when no ranking is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Choice>>,
    #[serde(rename = "type")]
    pub kind: AgentKind,
    /// Fallback policy: "personality" (default) or "learned"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub beliefs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub desires: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub intentions: Vec<Choice>,
}

impl AgentSpec {
    /// Record with an explicit ranking
    pub fn new(name: impl Into<String>, personality: Personality, preferences: &[&str]) -> Self {
        Self {
            name: name.into(),
            personality,
            preferences: Some(preferences.iter().map(|p| p.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: AgentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_intentions(mut self, intentions: &[&str]) -> Self {
        self.intentions = intentions.iter().map(|i| i.to_string()).collect();
        self
    }

    /// Reactive agents default to the learned policy once no rule fires;
    /// every other kind defaults to personality
    fn fallback(&self) -> Result<Fallback> {
        match self.strategy.as_deref().map(str::trim) {
            None | Some("") if self.kind == AgentKind::Reactive => Ok(Fallback::Learned),
            None | Some("") | Some("personality") => Ok(Fallback::Personality),
            Some("learned") | Some("q_learning") => Ok(Fallback::Learned),
            Some(other) => Err(AgoraError::InvalidScenario(format!(
                "agent '{}': unknown strategy '{other}'",
                self.name
            ))),
        }
    }
}

/// Builds agents for one scenario
#[derive(Debug, Clone)]
pub struct AgentFactory {
    tuning: AgentTuning,
    initial_trust: f64,
    rng: StdRng,
}

impl AgentFactory {
    /// Factory seeded from `config.seed`, or from OS entropy
    pub fn new(config: &EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            tuning: AgentTuning::from(config),
            initial_trust: config.initial_trust,
            rng,
        }
    }

    /// Factory with default tuning and a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(&EngineConfig::default().with_seed(seed))
    }

    /// Build one agent per record. Every agent starts trusting every other
    /// named agent at the configured initial trust.
    pub fn build(&mut self, specs: &[AgentSpec]) -> Result<Vec<Agent>> {
        let mut seen = BTreeSet::new();
        for spec in specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(AgoraError::DuplicateAgent(spec.name.clone()));
            }
        }
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();

        let agents = specs
            .iter()
            .map(|spec| self.build_one(spec, &names))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = agents.len(), "Built agents");
        Ok(agents)
    }

    fn build_one(&mut self, spec: &AgentSpec, peers: &[&str]) -> Result<Agent> {
        let preferences = match (&spec.preferences, &spec.options) {
            (Some(ranking), _) => ranking.clone(),
            (None, Some(options)) => {
                let mut ranking = options.clone();
                ranking.shuffle(&mut self.rng);
                ranking
            }
            (None, None) => Vec::new(),
        };

        let mut agent = Agent::new(spec.name.clone(), spec.personality, preferences)?
            .with_peers(peers.iter().copied(), self.initial_trust)
            .with_tuning(self.tuning)
            .with_fallback(spec.fallback()?);

        match spec.kind {
            AgentKind::Base => {}
            AgentKind::Bdi => {
                let mut state = BeliefState::new();
                spec.beliefs.iter().for_each(|b| state.believe(b.clone()));
                spec.desires.iter().for_each(|d| state.desire(d.clone()));
                spec.intentions.iter().for_each(|i| state.intend(i.clone()));
                agent = agent.with_capability(Capability::BeliefDesireIntention(state));
            }
            AgentKind::Reactive => {
                agent = agent.with_capability(Capability::Reactive(RuleSet::standard()));
            }
        }
        Ok(agent)
    }
}

/// Build agents from records, optionally with a fixed seed
pub fn build_agents(specs: &[AgentSpec], seed: Option<u64>) -> Result<Vec<Agent>> {
    let mut config = EngineConfig::default();
    config.seed = seed;
    AgentFactory::new(&config).build(specs)
}

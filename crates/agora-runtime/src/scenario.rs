//! Scenario and simulation result records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use agora_adversarial::{Conflict, Debate, GovernanceMethod, ManipulationKind, ManipulationPlan, Resolution};
use agora_core::{Agent, AgentFactory, AgentSpec, AgoraError, Choice, DecisionContext, EngineConfig, Result};

/// One decision problem: the options on the table and the shared context.
///
/// `agents` and `method` are only used when a scenario is loaded from a
/// file; the orchestrator takes its agents and method as arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub options: Vec<Choice>,
    pub context: DecisionContext,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<GovernanceMethod>,
}

impl Scenario {
    pub fn new(options: &[&str]) -> Self {
        Self {
            options: options.iter().map(|o| o.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: DecisionContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_agents(mut self, agents: Vec<AgentSpec>) -> Self {
        self.agents = agents;
        self
    }

    /// Parse a scenario from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AgoraError::InvalidScenario(e.to_string()))
    }

    /// Whether the gossip path applies
    pub fn is_networked(&self) -> bool {
        self.context.adjacency.is_some()
    }

    /// Build the scenario's agent records
    pub fn build_agents(&self, config: &EngineConfig) -> Result<Vec<Agent>> {
        if self.agents.is_empty() {
            return Err(AgoraError::NoAgents);
        }
        AgentFactory::new(config).build(&self.agents)
    }
}

/// Output of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub run_id: Uuid,
    pub method: GovernanceMethod,
    /// Individual decisions, parallel to the input agents. On the gossip
    /// path these are the settled votes.
    pub votes: Vec<Choice>,
    pub winner: Choice,
    /// Winner of `method` over the whole population
    pub method_winner: Choice,
    /// Per-agent satisfaction with `winner`, parallel to `votes`
    pub satisfaction: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coalitions: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coalition_payoffs: Option<BTreeMap<String, f64>>,
    pub rounds: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<Conflict>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_conflicts: Option<Vec<Resolution>>,
    pub networked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiation: Option<Debate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manipulation_type: Option<ManipulationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bribery_budget: Option<usize>,
}

impl SimulationResult {
    /// Tag this result with the manipulation that produced it
    pub fn tagged(mut self, plan: &ManipulationPlan) -> Self {
        self.manipulation_type = Some(plan.kind);
        self.noise_level = plan.noise_level;
        self.bribery_budget = plan.bribery_budget;
        self
    }

    /// Agent names grouped by coalition, if the coalition path ran
    pub fn coalition_of(&self, agent: &str) -> Option<&[String]> {
        self.coalitions
            .as_ref()?
            .iter()
            .find(|members| members.iter().any(|m| m == agent))
            .map(Vec::as_slice)
    }
}

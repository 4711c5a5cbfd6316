//! Pairwise conflict detection and mediation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use agora_core::{AgoraError, Choice};

/// Two agents holding different positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub agents: (String, String),
    pub positions: (Choice, Choice),
    /// Conflict intensity; every detected conflict currently has level 1.0
    pub level: f64,
}

/// How a conflict is mediated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediationStrategy {
    #[default]
    Collaborative,
    Compromise,
    Competitive,
}

impl MediationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediationStrategy::Collaborative => "collaborative",
            MediationStrategy::Compromise => "compromise",
            MediationStrategy::Competitive => "competitive",
        }
    }

    /// Estimated probability the mediation succeeds
    pub fn success_probability(&self) -> f64 {
        match self {
            MediationStrategy::Collaborative => 0.8,
            MediationStrategy::Compromise => 0.7,
            MediationStrategy::Competitive => 0.5,
        }
    }

    /// Parse a strategy name, falling back to collaborative for anything
    /// unrecognised
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(strategy = name, "Unknown mediation strategy, using collaborative");
            MediationStrategy::Collaborative
        })
    }
}

impl fmt::Display for MediationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediationStrategy {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "collaborative" => Ok(MediationStrategy::Collaborative),
            "compromise" => Ok(MediationStrategy::Compromise),
            "competitive" => Ok(MediationStrategy::Competitive),
            other => Err(AgoraError::InvalidScenario(format!("unknown mediation strategy '{other}'"))),
        }
    }
}

/// Outcome of mediating one conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub resolution_type: MediationStrategy,
    pub success_probability: f64,
    pub agents: Vec<String>,
    pub details: String,
}

/// One conflict per unordered pair of agents whose positions differ, in
/// input order
pub fn detect_conflicts(positions: &[(String, Choice)]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (i, (a, pa)) in positions.iter().enumerate() {
        for (b, pb) in &positions[i + 1..] {
            if pa != pb {
                conflicts.push(Conflict {
                    agents: (a.clone(), b.clone()),
                    positions: (pa.clone(), pb.clone()),
                    level: 1.0,
                });
            }
        }
    }
    conflicts
}

/// Mediate a conflict with the named strategy
pub fn resolve_conflict(conflict: &Conflict, strategy: &str) -> Resolution {
    let strategy = MediationStrategy::parse_lenient(strategy);
    let (a, b) = &conflict.agents;
    let (x, y) = &conflict.positions;
    let details = match strategy {
        MediationStrategy::Collaborative => format!("{a} and {b} look for an option serving both {x} and {y}"),
        MediationStrategy::Compromise => format!("{a} and {b} meet between {x} and {y}"),
        MediationStrategy::Competitive => format!("{a} and {b} settle {x} against {y} by vote"),
    };
    Resolution {
        resolution_type: strategy,
        success_probability: strategy.success_probability(),
        agents: vec![a.clone(), b.clone()],
        details,
    }
}

/// Mediate every conflict with the same strategy
pub fn resolve_all(conflicts: &[Conflict], strategy: &str) -> Vec<Resolution> {
    conflicts.iter().map(|c| resolve_conflict(c, strategy)).collect()
}

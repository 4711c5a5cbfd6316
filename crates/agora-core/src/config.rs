//! Engine configuration
//!
//! Every tunable constant of the simulation lives here. Defaults match the
//! reference behaviour; `from_env` overlays `AGORA_*` environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Credit budget for budgeted allocation when neither context nor config sets one
pub const DEFAULT_QUADRATIC_BUDGET: u32 = 9;
/// Faulty fraction for the Byzantine method when neither context nor config sets one
pub const DEFAULT_BYZANTINE_RATIO: f64 = 0.2;

/// Largest `shapley_exact_limit` accepted; exact Shapley visits n! orderings
pub const MAX_SHAPLEY_EXACT_LIMIT: usize = 10;

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for agents, governance methods and the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Round cap for the gossip path (env: AGORA_GOSSIP_ROUNDS)
    pub gossip_rounds: usize,
    /// Round cap used by the efficiency metric (env: AGORA_MAX_ROUNDS)
    pub max_rounds: usize,
    /// Q-learning rate α (env: AGORA_LEARNING_RATE)
    pub learning_rate: f64,
    /// Q-learning discount γ (env: AGORA_DISCOUNT)
    pub discount: f64,
    /// ε of the ε-greedy policy (env: AGORA_EXPLORATION)
    pub exploration: f64,
    /// Trust gained when an adopted proposal came from a peer
    pub trust_increment: f64,
    /// Trust assigned to every known peer at construction
    pub initial_trust: f64,
    /// Trust above which agents pull each other into a coalition
    pub coalition_trust_threshold: f64,
    /// Trust above which a strategic agent follows the likely winner
    pub strategic_trust_threshold: f64,
    /// Mean of the last three satisfaction scores below which a stubborn agent turns flexible
    pub low_satisfaction_threshold: f64,
    /// Credit budget for the budgeted-allocation method when the context has none
    pub default_quadratic_budget: u32,
    /// Faulty fraction for the Byzantine method when the context has none
    pub default_byzantine_ratio: f64,
    /// Largest coalition whose Shapley values are computed over every ordering (env: AGORA_SHAPLEY_EXACT_LIMIT)
    pub shapley_exact_limit: usize,
    /// Sampled orderings for coalitions above the exact limit
    pub shapley_samples: usize,
    /// Seed for the run generator; `None` draws from OS entropy (env: AGORA_SEED)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gossip_rounds: 5,
            max_rounds: 10,
            learning_rate: 0.5,
            discount: 0.9,
            exploration: 0.1,
            trust_increment: 0.1,
            initial_trust: 0.5,
            coalition_trust_threshold: 0.8,
            strategic_trust_threshold: 0.7,
            low_satisfaction_threshold: 0.3,
            default_quadratic_budget: DEFAULT_QUADRATIC_BUDGET,
            default_byzantine_ratio: DEFAULT_BYZANTINE_RATIO,
            shapley_exact_limit: 8,
            shapley_samples: 2000,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load from environment, silently keeping defaults for unparsable values
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring invalid AGORA_* environment, using defaults");
            Self::default()
        })
    }

    /// Load from environment, failing on the first unparsable value
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.gossip_rounds = env_or("AGORA_GOSSIP_ROUNDS", config.gossip_rounds)?;
        config.max_rounds = env_or("AGORA_MAX_ROUNDS", config.max_rounds)?;
        config.learning_rate = env_or("AGORA_LEARNING_RATE", config.learning_rate)?;
        config.discount = env_or("AGORA_DISCOUNT", config.discount)?;
        config.exploration = env_or("AGORA_EXPLORATION", config.exploration)?;
        config.shapley_exact_limit =
            env_or("AGORA_SHAPLEY_EXACT_LIMIT", config.shapley_exact_limit)?;
        config.shapley_samples = env_or("AGORA_SHAPLEY_SAMPLES", config.shapley_samples)?;
        config.seed = match env::var("AGORA_SEED") {
            Ok(raw) => Some(
                raw.parse()
                    .map_err(|_| ConfigError::Invalid(format!("AGORA_SEED={raw}")))?,
            ),
            Err(_) => None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style seed override
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject probabilities outside [0, 1], a zero gossip cap and Shapley
    /// settings that would enumerate unbounded orderings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = [
            ("learning_rate", self.learning_rate),
            ("discount", self.discount),
            ("exploration", self.exploration),
            ("trust_increment", self.trust_increment),
            ("initial_trust", self.initial_trust),
            ("coalition_trust_threshold", self.coalition_trust_threshold),
            ("strategic_trust_threshold", self.strategic_trust_threshold),
            ("low_satisfaction_threshold", self.low_satisfaction_threshold),
            ("default_byzantine_ratio", self.default_byzantine_ratio),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.gossip_rounds == 0 {
            return Err(ConfigError::Invalid("gossip_rounds must be positive".into()));
        }
        if self.shapley_samples == 0 {
            return Err(ConfigError::Invalid("shapley_samples must be positive".into()));
        }
        if self.shapley_exact_limit > MAX_SHAPLEY_EXACT_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "shapley_exact_limit must be at most {MAX_SHAPLEY_EXACT_LIMIT}, got {}",
                self.shapley_exact_limit
            )));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{key}={raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.gossip_rounds, 5);
        assert_eq!(config.default_quadratic_budget, 9);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = EngineConfig {
            exploration: 1.5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            gossip_rounds: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_shapley_work() {
        let config = EngineConfig {
            shapley_samples: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            shapley_exact_limit: 15,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            shapley_exact_limit: MAX_SHAPLEY_EXACT_LIMIT,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EngineConfig = serde_json::from_str(r#"{"gossip_rounds": 3, "seed": 7}"#).unwrap();
        assert_eq!(config.gossip_rounds, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_rounds, 10);
    }
}

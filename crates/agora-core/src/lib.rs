//! # Agora Core
//!
//! Core types for the Agora governance engine:
//! - [`Agent`] - decision-making agent with personality, trust and learned action values
//! - [`DecisionContext`] - key/value context passed into every decision
//! - [`Capability`] - belief/desire/intention and reactive decision hooks
//! - [`AgentFactory`] - builds agents from configuration records
//! - [`EngineConfig`] - tunables shared by every crate
//!
//! ## Quick Start
//!
//! ```rust
//! use agora_core::{build_agents, AgentSpec, DecisionContext, Personality};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let agents = build_agents(
//!     &[AgentSpec::new("ada", Personality::Flexible, &["tea", "coffee"])],
//!     Some(7),
//! )
//! .unwrap();
//!
//! let options = vec!["tea".to_string(), "coffee".to_string()];
//! let ctx = DecisionContext::new().with_majority_hint("coffee");
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! assert_eq!(agents[0].decide(&options, &ctx, &mut rng).unwrap(), "coffee");
//! ```

pub mod agent;
pub mod argument;
pub mod capability;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod learning;
pub mod personality;

pub use agent::{Agent, AgentTuning, Fallback, MemoryEntry};
pub use argument::{Argument, ArgumentKind};
pub use capability::{BeliefState, Capability, DecisionHook, Overlay, ReactiveRule, RuleSet};
pub use config::{
    ConfigError, EngineConfig, DEFAULT_BYZANTINE_RATIO, DEFAULT_QUADRATIC_BUDGET, MAX_SHAPLEY_EXACT_LIMIT,
};
pub use context::{Choice, DecisionContext};
pub use error::{AgoraError, Result};
pub use factory::{build_agents, AgentFactory, AgentKind, AgentSpec};
pub use learning::{LearningParams, QState, QTable};
pub use personality::{NegotiationAction, Personality};

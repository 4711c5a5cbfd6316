//! # Agora Runtime
//!
//! Runs scenarios end to end.
//!
//! - [`Orchestrator`] - coalition path (bloc votes, Shapley payoffs) or gossip path (neighbourhood majority)
//! - [`RobustnessSuite`] - baseline plus six manipulation variants, compared in a [`RobustnessReport`]
//! - [`metrics`] - consensus rate, fairness, efficiency, satisfaction, stability
//!
//! ## Quick Start
//!
//! ```rust
//! use agora_adversarial::GovernanceMethod;
//! use agora_core::{build_agents, AgentSpec, Personality};
//! use agora_runtime::{metrics, Orchestrator, Scenario};
//!
//! let mut agents = build_agents(
//!     &[
//!         AgentSpec::new("a", Personality::Stubborn, &["X", "Y"]),
//!         AgentSpec::new("b", Personality::Stubborn, &["Y", "X"]),
//!         AgentSpec::new("c", Personality::Stubborn, &["X", "Y"]),
//!     ],
//!     Some(7),
//! )
//! .unwrap();
//!
//! let mut orchestrator = Orchestrator::seeded(7);
//! let result = orchestrator
//!     .simulate(&mut agents, &Scenario::new(&["X", "Y"]), GovernanceMethod::Majority)
//!     .unwrap();
//!
//! assert_eq!(result.winner, "X");
//! assert!((metrics::consensus_rate(&result) - 2.0 / 3.0).abs() < 1e-9);
//! ```

pub mod coalition;
pub mod gossip;
pub mod harness;
pub mod metrics;
pub mod orchestrator;
pub mod scenario;

pub use coalition::{coalition_payoffs, form_coalitions, shapley_values, ShapleyMode};
pub use gossip::{gossip_round, run_gossip, GossipOutcome};
pub use harness::{RobustnessReport, RobustnessSuite, VariantComparison};
pub use crate::metrics::{
    consensus_rate, efficiency, fairness_index, satisfaction, stability, summarize_results, validate_scenario,
    MetricsSummary,
};
pub use orchestrator::{simulate_governance, Orchestrator};
pub use scenario::{Scenario, SimulationResult};

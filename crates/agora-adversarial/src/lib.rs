//! # Agora Adversarial
//!
//! Collective decisions and the pressures that bend them.
//!
//! ## Key Types
//!
//! - [`GovernanceMethod`] - majority, plurality, Borda, Condorcet, budgeted "quadratic", Byzantine and leader-based voting
//! - [`Debate`] - multi-round negotiation transcript
//! - [`Conflict`] / [`Resolution`] - pairwise disagreements and their mediation
//! - [`ManipulationPlan`] - adversarial overlays installed on a population
//!
//! ## Quick Start
//!
//! ```rust
//! use agora_adversarial::GovernanceMethod;
//! use agora_core::{build_agents, AgentSpec, DecisionContext, Personality};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let agents = build_agents(
//!     &[
//!         AgentSpec::new("a", Personality::Stubborn, &["A", "B", "C"]),
//!         AgentSpec::new("b", Personality::Stubborn, &["B", "C", "A"]),
//!         AgentSpec::new("c", Personality::Stubborn, &["B", "A", "C"]),
//!     ],
//!     Some(1),
//! )
//! .unwrap();
//! let options: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! let method: GovernanceMethod = "borda".parse().unwrap();
//! let winner = method.run(&agents, &options, &DecisionContext::new(), &mut rng).unwrap();
//! assert_eq!(winner, "B");
//! ```

pub mod conflict;
pub mod consensus;
pub mod debate;
pub mod manipulation;

pub use conflict::{detect_conflicts, resolve_all, resolve_conflict, Conflict, MediationStrategy, Resolution};
pub use consensus::{mode, tally, GovernanceMethod};
pub use debate::{Debate, DebateRound};
pub use manipulation::{ManipulationKind, ManipulationPlan};

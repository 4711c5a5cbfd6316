//! Orchestrator - runs a scenario through the coalition or gossip path

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use uuid::Uuid;

use agora_adversarial::{detect_conflicts, mode, resolve_all, Debate, GovernanceMethod, MediationStrategy};
use agora_core::{Agent, AgoraError, Choice, DecisionContext, EngineConfig, Result};

use crate::coalition::{coalition_payoffs, form_coalitions};
use crate::gossip::run_gossip;
use crate::metrics::validate_scenario;
use crate::scenario::{Scenario, SimulationResult};

/// Runs simulations with one configuration and one random stream
#[derive(Debug, Clone)]
pub struct Orchestrator {
    pub config: EngineConfig,
    rng: StdRng,
}

impl Orchestrator {
    /// Orchestrator seeded from `config.seed`, or from OS entropy
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    /// Orchestrator with default configuration and a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(EngineConfig::default().with_seed(seed))
    }

    /// Independent orchestrator whose stream is drawn from this one
    pub fn fork(&mut self) -> Self {
        let seed = self.rng.random::<u64>();
        Self {
            config: self.config.clone(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// This orchestrator's random stream
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Run one simulation. Takes the gossip path when the scenario context
    /// carries an adjacency matrix, the coalition path otherwise.
    ///
    /// Agents are mutated in place: memory, satisfaction, trust, learned
    /// values, coalition labels and possibly personality.
    pub fn simulate(
        &mut self,
        agents: &mut [Agent],
        scenario: &Scenario,
        method: GovernanceMethod,
    ) -> Result<SimulationResult> {
        if scenario.is_networked() {
            self.simulate_gossip(agents, scenario, method)
        } else {
            self.simulate_coalitions(agents, scenario, method)
        }
    }

    /// Coalition path: trust-based coalitions cast bloc votes, the bloc
    /// majority wins, and each coalition's value is split by Shapley payoff
    pub fn simulate_coalitions(
        &mut self,
        agents: &mut [Agent],
        scenario: &Scenario,
        method: GovernanceMethod,
    ) -> Result<SimulationResult> {
        let ctx = self.prepare(agents, scenario)?;
        let options = &scenario.options;
        let negotiation = self.negotiate(agents, options, &ctx)?;

        let coalitions = form_coalitions(agents, self.config.coalition_trust_threshold);
        let bloc_votes = coalitions
            .iter()
            .map(|members| agents[members[0]].reported_top(options, &mut self.rng))
            .collect::<Result<Vec<_>>>()?;
        let winner = mode(&bloc_votes).ok_or(AgoraError::NoAgents)?;

        let mut payoffs = BTreeMap::new();
        for members in &coalitions {
            let tops = members
                .iter()
                .map(|&i| agents[i].top_preference())
                .collect::<Result<Vec<_>>>()?;
            let shares = coalition_payoffs(
                &tops,
                &winner,
                self.config.shapley_exact_limit,
                self.config.shapley_samples,
                &mut self.rng,
            );
            for (&i, share) in members.iter().zip(shares) {
                payoffs.insert(agents[i].name.clone(), share);
            }
        }

        let votes = self.decisions(agents, options, &ctx)?;
        let method_winner = method.run(agents, options, &ctx, &mut self.rng)?;
        let satisfaction = self.commit(agents, &votes, &winner, &ctx, options);
        let (conflicts, resolved) = self.mediate(agents, &votes, &ctx);

        let groups = coalitions
            .iter()
            .map(|members| members.iter().map(|&i| agents[i].name.clone()).collect())
            .collect();

        let result = SimulationResult {
            run_id: self.run_id(),
            method,
            votes,
            winner,
            method_winner,
            satisfaction,
            coalitions: Some(groups),
            coalition_payoffs: Some(payoffs),
            rounds: 1 + negotiation.as_ref().map_or(0, |d| d.rounds.len()),
            conflicts: Some(conflicts),
            resolved_conflicts: Some(resolved),
            networked: false,
            negotiation,
            manipulation_type: None,
            noise_level: None,
            bribery_budget: None,
        };
        self.finish(&result);
        Ok(result)
    }

    /// Gossip path: agents repeatedly adopt their neighbourhood majority
    /// until the votes settle or the round cap is reached
    pub fn simulate_gossip(
        &mut self,
        agents: &mut [Agent],
        scenario: &Scenario,
        method: GovernanceMethod,
    ) -> Result<SimulationResult> {
        let ctx = self.prepare(agents, scenario)?;
        let options = &scenario.options;
        let negotiation = self.negotiate(agents, options, &ctx)?;

        let initial = self.decisions(agents, options, &ctx)?;
        let (conflicts, resolved) = self.mediate(agents, &initial, &ctx);
        let method_winner = method.run(agents, options, &ctx, &mut self.rng)?;

        let gossip = run_gossip(initial, &ctx, self.config.gossip_rounds);
        let winner = mode(&gossip.votes).ok_or(AgoraError::NoAgents)?;
        let satisfaction = self.commit(agents, &gossip.votes, &winner, &ctx, options);

        let result = SimulationResult {
            run_id: self.run_id(),
            method,
            votes: gossip.votes,
            winner,
            method_winner,
            satisfaction,
            coalitions: None,
            coalition_payoffs: None,
            rounds: gossip.rounds,
            conflicts: Some(conflicts),
            resolved_conflicts: Some(resolved),
            networked: true,
            negotiation,
            manipulation_type: None,
            noise_level: None,
            bribery_budget: None,
        };
        self.finish(&result);
        Ok(result)
    }

    /// Validate the scenario and fill method defaults from the configuration
    fn prepare(&self, agents: &[Agent], scenario: &Scenario) -> Result<DecisionContext> {
        if agents.is_empty() {
            return Err(AgoraError::NoAgents);
        }
        if scenario.options.is_empty() {
            return Err(AgoraError::NoOptions);
        }
        let (valid, message) = validate_scenario(agents, &scenario.options);
        if !valid {
            return Err(AgoraError::InvalidScenario(message));
        }

        let mut ctx = scenario.context.clone();
        ctx.quadratic_budget = ctx.quadratic_budget.or(Some(self.config.default_quadratic_budget));
        ctx.byzantine_ratio = ctx.byzantine_ratio.or(Some(self.config.default_byzantine_ratio));
        Ok(ctx)
    }

    fn negotiate(&mut self, agents: &mut [Agent], options: &[Choice], ctx: &DecisionContext) -> Result<Option<Debate>> {
        match ctx.negotiation_rounds {
            Some(rounds) if rounds > 0 => Debate::run(agents, options, ctx, rounds, &mut self.rng).map(Some),
            _ => Ok(None),
        }
    }

    fn decisions(&mut self, agents: &[Agent], options: &[Choice], ctx: &DecisionContext) -> Result<Vec<Choice>> {
        agents.iter().map(|a| a.decide(options, ctx, &mut self.rng)).collect()
    }

    /// Round boundary: every agent learns from the outcome, then adapts
    fn commit(
        &self,
        agents: &mut [Agent],
        votes: &[Choice],
        winner: &Choice,
        ctx: &DecisionContext,
        options: &[Choice],
    ) -> Vec<f64> {
        agents
            .iter_mut()
            .zip(votes)
            .map(|(agent, vote)| {
                let satisfaction = agent.update_memory(vote, winner, ctx, options);
                agent.adapt();
                satisfaction
            })
            .collect()
    }

    fn mediate(
        &self,
        agents: &[Agent],
        votes: &[Choice],
        ctx: &DecisionContext,
    ) -> (Vec<agora_adversarial::Conflict>, Vec<agora_adversarial::Resolution>) {
        let positions: Vec<(String, Choice)> = agents
            .iter()
            .zip(votes)
            .map(|(a, v)| (a.name.clone(), v.clone()))
            .collect();
        let conflicts = detect_conflicts(&positions);
        let strategy = ctx
            .mediation_strategy
            .as_deref()
            .unwrap_or(MediationStrategy::default().as_str());
        let resolved = resolve_all(&conflicts, strategy);
        (conflicts, resolved)
    }

    fn run_id(&mut self) -> Uuid {
        Uuid::from_bytes(self.rng.random::<[u8; 16]>())
    }

    fn finish(&self, result: &SimulationResult) {
        ::metrics::counter!("agora_simulations_total").increment(1);
        tracing::info!(
            run_id = %result.run_id,
            method = %result.method,
            winner = %result.winner,
            method_winner = %result.method_winner,
            rounds = result.rounds,
            networked = result.networked,
            "Simulation complete"
        );
    }
}

/// Run one simulation with a fresh orchestrator
pub fn simulate_governance(
    agents: &mut [Agent],
    scenario: &Scenario,
    method: GovernanceMethod,
    config: &EngineConfig,
) -> Result<SimulationResult> {
    Orchestrator::new(config.clone()).simulate(agents, scenario, method)
}

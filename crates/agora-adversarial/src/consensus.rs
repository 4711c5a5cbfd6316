//! Collective-decision methods
//!
//! Seven functions mapping `(agents, options, context)` to a winning option.
//! None of them mutates an agent; randomness comes only from the generator
//! passed in.

use rand::seq::{index, IndexedRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use agora_core::{
    Agent, AgoraError, Choice, DecisionContext, Personality, Result, DEFAULT_BYZANTINE_RATIO,
    DEFAULT_QUADRATIC_BUDGET,
};

/// Named governance method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceMethod {
    /// Mode of individual decisions
    Majority,
    /// Single-winner alias of majority
    Plurality,
    /// Positional scoring over full rankings
    Borda,
    /// Pairwise winner, Borda when none exists
    Condorcet,
    /// Budget-splitting allocation (labelled "quadratic"; costs are linear)
    Quadratic,
    /// Majority with a random faulty fraction
    Byzantine,
    /// Leader proposes, others accept within their top two
    Raft,
}

impl GovernanceMethod {
    pub const ALL: [GovernanceMethod; 7] = [
        GovernanceMethod::Majority,
        GovernanceMethod::Plurality,
        GovernanceMethod::Borda,
        GovernanceMethod::Condorcet,
        GovernanceMethod::Quadratic,
        GovernanceMethod::Byzantine,
        GovernanceMethod::Raft,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GovernanceMethod::Majority => "majority",
            GovernanceMethod::Plurality => "plurality",
            GovernanceMethod::Borda => "borda",
            GovernanceMethod::Condorcet => "condorcet",
            GovernanceMethod::Quadratic => "quadratic",
            GovernanceMethod::Byzantine => "byzantine",
            GovernanceMethod::Raft => "raft",
        }
    }

    /// Run this method
    pub fn run<R: Rng + ?Sized>(
        &self,
        agents: &[Agent],
        options: &[Choice],
        ctx: &DecisionContext,
        rng: &mut R,
    ) -> Result<Choice> {
        if agents.is_empty() {
            return Err(AgoraError::NoAgents);
        }
        if options.is_empty() {
            return Err(AgoraError::NoOptions);
        }
        let winner = match self {
            GovernanceMethod::Majority => majority(agents, options, ctx, rng),
            GovernanceMethod::Plurality => plurality(agents, options, ctx, rng),
            GovernanceMethod::Borda => borda_count(agents, options),
            GovernanceMethod::Condorcet => condorcet(agents, options),
            GovernanceMethod::Quadratic => budgeted_allocation(agents, options, ctx),
            GovernanceMethod::Byzantine => byzantine_majority(agents, options, ctx, rng),
            GovernanceMethod::Raft => leader_consensus(agents, options, ctx, rng),
        }?;
        tracing::debug!(method = self.name(), %winner, "Governance method decided");
        Ok(winner)
    }
}

impl fmt::Display for GovernanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GovernanceMethod {
    type Err = AgoraError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(GovernanceMethod::Majority),
            "plurality" => Ok(GovernanceMethod::Plurality),
            "borda" | "borda_count" => Ok(GovernanceMethod::Borda),
            "condorcet" => Ok(GovernanceMethod::Condorcet),
            "quadratic" | "quadratic_voting" | "budgeted" => Ok(GovernanceMethod::Quadratic),
            "byzantine" | "byzantine_majority" => Ok(GovernanceMethod::Byzantine),
            "raft" | "raft_like" | "leader" => Ok(GovernanceMethod::Raft),
            _ => Err(AgoraError::UnknownMethod(s.to_string())),
        }
    }
}

/// Vote counts in first-seen order
pub fn tally<'a>(votes: impl IntoIterator<Item = &'a Choice>) -> Vec<(Choice, usize)> {
    let mut counts: Vec<(Choice, usize)> = Vec::new();
    for vote in votes {
        match counts.iter_mut().find(|(c, _)| c == vote) {
            Some((_, n)) => *n += 1,
            None => counts.push((vote.clone(), 1)),
        }
    }
    counts
}

/// Most frequent vote; the first-seen of equally frequent votes wins
pub fn mode<'a>(votes: impl IntoIterator<Item = &'a Choice>) -> Option<Choice> {
    first_max(tally(votes))
}

fn first_max<T: PartialOrd + Copy>(scores: Vec<(Choice, T)>) -> Option<Choice> {
    let mut best: Option<(Choice, T)> = None;
    for (choice, score) in scores {
        match &best {
            Some((_, b)) if *b >= score => {}
            _ => best = Some((choice, score)),
        }
    }
    best.map(|(c, _)| c)
}

fn decisions<R: Rng + ?Sized>(
    agents: &[Agent],
    options: &[Choice],
    ctx: &DecisionContext,
    rng: &mut R,
) -> Result<Vec<Choice>> {
    agents.iter().map(|a| a.decide(options, ctx, rng)).collect()
}

/// Mode of every agent's decision
pub fn majority<R: Rng + ?Sized>(
    agents: &[Agent],
    options: &[Choice],
    ctx: &DecisionContext,
    rng: &mut R,
) -> Result<Choice> {
    let votes = decisions(agents, options, ctx, rng)?;
    mode(&votes).ok_or(AgoraError::NoAgents)
}

/// Same winner as [`majority`] on every input
pub fn plurality<R: Rng + ?Sized>(
    agents: &[Agent],
    options: &[Choice],
    ctx: &DecisionContext,
    rng: &mut R,
) -> Result<Choice> {
    majority(agents, options, ctx, rng)
}

/// Borda scores in option order: rank `i` earns `n − 1 − i` points
pub fn borda_scores(agents: &[Agent], options: &[Choice]) -> Vec<(Choice, usize)> {
    let n = options.len();
    let mut scores: Vec<(Choice, usize)> = options.iter().map(|o| (o.clone(), 0)).collect();
    for agent in agents {
        for (rank, pref) in agent.preferences.iter().enumerate() {
            if let Some(slot) = scores.iter_mut().find(|(o, _)| o == pref) {
                slot.1 += n.saturating_sub(rank + 1);
            }
        }
    }
    scores
}

/// Highest Borda score; earlier options win ties
pub fn borda_count(agents: &[Agent], options: &[Choice]) -> Result<Choice> {
    first_max(borda_scores(agents, options)).ok_or(AgoraError::NoOptions)
}

/// How many agents rank `a` above `b`, among those ranking both
pub fn pairwise_preference(agents: &[Agent], a: &str, b: &str) -> usize {
    agents
        .iter()
        .filter(|agent| {
            let pa = agent.preferences.iter().position(|p| p == a);
            let pb = agent.preferences.iter().position(|p| p == b);
            matches!((pa, pb), (Some(x), Some(y)) if x < y)
        })
        .count()
}

/// Option beating every other option pairwise, if any
pub fn condorcet_winner(agents: &[Agent], options: &[Choice]) -> Option<Choice> {
    options
        .iter()
        .find(|a| {
            options
                .iter()
                .filter(|b| b != a)
                .all(|b| pairwise_preference(agents, a, b) > pairwise_preference(agents, b, a))
        })
        .cloned()
}

/// Condorcet winner, or the Borda winner when there is none
pub fn condorcet(agents: &[Agent], options: &[Choice]) -> Result<Choice> {
    match condorcet_winner(agents, options) {
        Some(winner) => Ok(winner),
        None => {
            tracing::debug!("No Condorcet winner, falling back to Borda");
            borda_count(agents, options)
        }
    }
}

/// Budget-splitting allocation, labelled "quadratic voting".
///
/// Each agent spends `quadratic_budget` credits (default 9). A flexible
/// agent splits them between its top two preferences, everyone else puts
/// the whole budget on its top preference. Votes cost one credit each, not
/// their square.
// TODO: decide whether genuine quadratic cost (votes = sqrt(credits)) should replace the split.
pub fn budgeted_allocation(agents: &[Agent], options: &[Choice], ctx: &DecisionContext) -> Result<Choice> {
    let budget = ctx.quadratic_budget.unwrap_or(DEFAULT_QUADRATIC_BUDGET);
    let mut allocations: Vec<(Choice, u64)> = Vec::new();
    let mut spend = |choice: &Choice, credits: u32| {
        if !options.contains(choice) {
            return;
        }
        match allocations.iter_mut().find(|(c, _)| c == choice) {
            Some((_, total)) => *total += u64::from(credits),
            None => allocations.push((choice.clone(), u64::from(credits))),
        }
    };

    for agent in agents {
        let top = agent.top_preference()?;
        match agent.preferences.get(1) {
            Some(second) if agent.personality == Personality::Flexible => {
                let half = budget / 2;
                spend(top, budget - half);
                spend(second, half);
            }
            _ => spend(top, budget),
        }
    }

    match first_max(allocations) {
        Some(winner) => Ok(winner),
        None => {
            tracing::warn!("No credits landed on a listed option, defaulting to the first option");
            options.first().cloned().ok_or(AgoraError::NoOptions)
        }
    }
}

/// Majority where `byzantine_ratio` of the agents (default 0.2, rounded
/// down) vote for a uniformly random option
pub fn byzantine_majority<R: Rng + ?Sized>(
    agents: &[Agent],
    options: &[Choice],
    ctx: &DecisionContext,
    rng: &mut R,
) -> Result<Choice> {
    let ratio = ctx.byzantine_ratio.unwrap_or(DEFAULT_BYZANTINE_RATIO).clamp(0.0, 1.0);
    let n = agents.len();
    let faulty_count = ((n as f64) * ratio).floor() as usize;
    let faulty = index::sample(rng, n, faulty_count.min(n)).into_vec();

    let mut votes = Vec::with_capacity(n);
    for (i, agent) in agents.iter().enumerate() {
        let vote = if faulty.contains(&i) {
            options.choose(rng).cloned().ok_or(AgoraError::NoOptions)?
        } else {
            agent.decide(options, ctx, rng)?
        };
        votes.push(vote);
    }
    tracing::debug!(faulty = faulty_count, "Byzantine tally");
    mode(&votes).ok_or(AgoraError::NoAgents)
}

/// Leader-propose/accept consensus.
///
/// A uniformly chosen leader proposes its own decision. Every other agent
/// accepts when the proposal is within its top two preferences. With more
/// than half the population behind it (leader included) the proposal wins;
/// otherwise the result is plain majority.
pub fn leader_consensus<R: Rng + ?Sized>(
    agents: &[Agent],
    options: &[Choice],
    ctx: &DecisionContext,
    rng: &mut R,
) -> Result<Choice> {
    if agents.is_empty() {
        return Err(AgoraError::NoAgents);
    }
    if options.is_empty() {
        return Err(AgoraError::NoOptions);
    }
    let leader_idx = rng.random_range(0..agents.len());
    let leader = &agents[leader_idx];
    let proposal = leader.decide(options, ctx, rng)?;

    let accepting = agents
        .iter()
        .enumerate()
        .filter(|(i, a)| *i != leader_idx && a.preferences.iter().take(2).any(|p| *p == proposal))
        .count();

    if (accepting + 1) * 2 > agents.len() {
        tracing::debug!(leader = %leader.name, %proposal, accepting, "Proposal committed");
        Ok(proposal)
    } else {
        tracing::debug!(leader = %leader.name, %proposal, accepting, "Proposal rejected, falling back to majority");
        majority(agents, options, ctx, rng)
    }
}

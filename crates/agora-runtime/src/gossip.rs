//! Synchronous gossip over a peer-adjacency graph

use rayon::prelude::*;

use agora_adversarial::mode;
use agora_core::{Choice, DecisionContext};

/// One synchronous round: every agent adopts the majority among itself and
/// its neighbours, read from the previous round's votes. Candidates are
/// counted in agent order, so ties go to the lowest-indexed vote.
pub fn gossip_round(votes: &[Choice], ctx: &DecisionContext) -> Vec<Choice> {
    (0..votes.len())
        .into_par_iter()
        .map(|i| {
            let local = (0..votes.len())
                .filter(|&j| j == i || ctx.is_neighbor(i, j))
                .map(|j| &votes[j]);
            mode(local).unwrap_or_else(|| votes[i].clone())
        })
        .collect()
}

/// Outcome of a gossip run
#[derive(Debug, Clone, PartialEq)]
pub struct GossipOutcome {
    pub votes: Vec<Choice>,
    /// Rounds executed; fewer than the cap when a fixed point was reached
    pub rounds: usize,
    pub converged: bool,
}

/// Repeat [`gossip_round`] up to `max_rounds` times, stopping early once a
/// round changes no vote
pub fn run_gossip(initial: Vec<Choice>, ctx: &DecisionContext, max_rounds: usize) -> GossipOutcome {
    let mut votes = initial;
    for round in 1..=max_rounds {
        let next = gossip_round(&votes, ctx);
        let changed = next.iter().zip(&votes).filter(|(a, b)| a != b).count();
        tracing::debug!(round, changed, "Gossip round");
        ::metrics::counter!("agora_gossip_rounds_total").increment(1);
        votes = next;
        if changed == 0 {
            return GossipOutcome {
                votes,
                rounds: round,
                converged: true,
            };
        }
    }
    GossipOutcome {
        votes,
        rounds: max_rounds,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(v: &[&str]) -> Vec<Choice> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_isolated_agents_keep_their_votes() {
        let ctx = DecisionContext::new().with_adjacency(vec![vec![0.0; 3]; 3]);
        let outcome = run_gossip(votes(&["A", "B", "C"]), &ctx, 5);
        assert_eq!(outcome.votes, votes(&["A", "B", "C"]));
        assert_eq!(outcome.rounds, 1);
        assert!(outcome.converged);
    }

    #[test]
    fn test_fully_connected_settles_in_one_round() {
        let ctx = DecisionContext::new().with_adjacency(vec![vec![1.0; 4]; 4]);
        let round = gossip_round(&votes(&["B", "A", "A", "B"]), &ctx);
        assert_eq!(round, votes(&["B", "B", "B", "B"]));
    }

    #[test]
    fn test_line_graph_spreads_majority() {
        // 0 - 1 - 2 - 3 - 4
        let mut adjacency = vec![vec![0.0; 5]; 5];
        for i in 0..4 {
            adjacency[i][i + 1] = 1.0;
            adjacency[i + 1][i] = 1.0;
        }
        let ctx = DecisionContext::new().with_adjacency(adjacency);
        let outcome = run_gossip(votes(&["A", "A", "B", "B", "B"]), &ctx, 5);
        // 1 sees [A, A, B] -> A, 2 sees [A, B, B] -> B
        assert_eq!(outcome.votes, votes(&["A", "A", "B", "B", "B"]));
        assert!(outcome.converged);
    }

    #[test]
    fn test_ragged_matrix_means_no_edge() {
        let ctx = DecisionContext::new().with_adjacency(vec![vec![1.0, 1.0]]);
        let round = gossip_round(&votes(&["A", "B", "B"]), &ctx);
        // agent 0 sees [A, B] and keeps A on the tie; 1 and 2 have no rows
        assert_eq!(round, votes(&["A", "B", "B"]));
    }

    #[test]
    fn test_zero_round_cap() {
        let ctx = DecisionContext::new().with_adjacency(vec![vec![1.0; 2]; 2]);
        let outcome = run_gossip(votes(&["A", "B"]), &ctx, 0);
        assert_eq!(outcome.rounds, 0);
        assert!(!outcome.converged);
    }
}

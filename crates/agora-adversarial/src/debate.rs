//! Negotiation rounds between agents

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_core::{Agent, Argument, Choice, DecisionContext, NegotiationAction, Result};

/// One negotiation round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRound {
    /// Round number, starting at 1
    pub round: u32,
    /// Each agent's move, in agent order
    pub moves: Vec<(String, NegotiationAction)>,
    /// Arguments broadcast during the round
    pub arguments: Vec<Argument>,
    /// Proposal on the table when the round closed
    pub standing_proposal: Option<Choice>,
}

impl DebateRound {
    /// How many agents accepted `choice` this round
    pub fn acceptances(&self, choice: &str) -> usize {
        self.moves
            .iter()
            .filter(|(_, m)| matches!(m, NegotiationAction::Accept(c) if c == choice))
            .count()
    }
}

/// Transcript of a negotiation phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debate {
    pub id: Uuid,
    pub rounds: Vec<DebateRound>,
    /// Proposal on the table at the end, with its author
    pub proposal: Option<(Choice, String)>,
}

impl Debate {
    /// Empty transcript
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            rounds: Vec::new(),
            proposal: None,
        }
    }

    /// Run `rounds` negotiation rounds.
    ///
    /// Moves are computed from the state at the start of a round and only
    /// then applied: arguments are broadcast to every other agent, an
    /// acceptance of the standing proposal raises trust in its author, and
    /// the first proposal of a round goes on the table when it is empty.
    pub fn run<R: Rng + ?Sized>(
        agents: &mut [Agent],
        options: &[Choice],
        ctx: &DecisionContext,
        rounds: usize,
        rng: &mut R,
    ) -> Result<Debate> {
        let mut debate = Debate::new(Uuid::from_bytes(rng.random::<[u8; 16]>()));

        for round in 1..=rounds {
            let round_ctx = match &debate.proposal {
                Some((choice, author)) => ctx.proposing(choice, author),
                None => ctx.clone(),
            };

            let moves = agents
                .iter()
                .map(|a| Ok((a.name.clone(), a.negotiate(options, &round_ctx, rng)?)))
                .collect::<Result<Vec<_>>>()?;

            let mut arguments = Vec::new();
            for (i, (name, action)) in moves.iter().enumerate() {
                let argument = match action {
                    NegotiationAction::Propose(choice) => {
                        if debate.proposal.is_none() {
                            debate.proposal = Some((choice.clone(), name.clone()));
                        }
                        Some(agents[i].propose_argument(choice, format!("{name} proposes {choice}")))
                    }
                    NegotiationAction::Argue(choice) => Some(match &debate.proposal {
                        Some((standing, author)) => {
                            let against = Argument::support(author, standing.clone(), "standing proposal");
                            agents[i].counter_argument(&against, choice, format!("{name} prefers {choice} to {standing}"))
                        }
                        None => agents[i].propose_argument(choice, format!("{name} argues for {choice}")),
                    }),
                    NegotiationAction::Accept(choice) => {
                        if let Some((standing, author)) = &debate.proposal {
                            if standing == choice && author != name {
                                agents[i].learn_trust(author);
                            }
                        }
                        None
                    }
                    NegotiationAction::FormCoalition(peer) => {
                        tracing::debug!(agent = %name, %peer, "Coalition invitation");
                        None
                    }
                };

                if let Some(argument) = argument {
                    for (j, other) in agents.iter_mut().enumerate() {
                        if j != i {
                            other.receive_argument(argument.clone());
                        }
                    }
                    arguments.push(argument);
                }
            }

            tracing::debug!(
                round,
                arguments = arguments.len(),
                proposal = ?debate.proposal.as_ref().map(|(c, _)| c),
                "Negotiation round complete"
            );
            debate.rounds.push(DebateRound {
                round: round as u32,
                moves,
                arguments,
                standing_proposal: debate.proposal.as_ref().map(|(c, _)| c.clone()),
            });
        }

        Ok(debate)
    }

    /// Total arguments exchanged
    pub fn argument_count(&self) -> usize {
        self.rounds.iter().map(|r| r.arguments.len()).sum()
    }
}

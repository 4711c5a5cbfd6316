//! Personality-driven decision policies
//!
//! Each personality is one arm of [`Personality`] with its own `decide` and
//! `negotiate` behaviour. The only state change a personality undergoes is
//! the stubborn→flexible adaptation, modelled as an explicit transition.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::agent::Agent;
use crate::context::{Choice, DecisionContext};
use crate::error::{AgoraError, Result};

/// Default decision policy of an agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    /// Always votes its top preference
    #[default]
    Stubborn,
    /// Falls in line with a majority hint
    Flexible,
    /// Backs a trusted likely winner, otherwise hedges on its second choice
    Strategic,
    /// Acts on learned action values
    Random,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Stubborn,
        Personality::Flexible,
        Personality::Strategic,
        Personality::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Stubborn => "stubborn",
            Personality::Flexible => "flexible",
            Personality::Strategic => "strategic",
            Personality::Random => "random",
        }
    }

    /// Next personality given the most recent satisfaction scores.
    ///
    /// A stubborn agent whose last three rounds average below `threshold`
    /// becomes flexible. Every other personality is a fixed point.
    // NOTE: kept for parity with existing scenarios; intent awaits product-owner confirmation.
    pub fn adapt(self, history: &[f64], threshold: f64) -> Personality {
        if self != Personality::Stubborn || history.len() < 3 {
            return self;
        }
        let recent = &history[history.len() - 3..];
        let mean = recent.iter().sum::<f64>() / 3.0;
        if mean < threshold {
            Personality::Flexible
        } else {
            self
        }
    }

    /// Personality-driven decision for `agent`
    pub fn decide<R: Rng + ?Sized>(
        &self,
        agent: &Agent,
        options: &[Choice],
        ctx: &DecisionContext,
        rng: &mut R,
    ) -> Result<Choice> {
        match self {
            Personality::Stubborn => agent.top_preference().cloned(),
            Personality::Flexible => match &ctx.majority_hint {
                Some(hint) if options.contains(hint) => Ok(hint.clone()),
                _ => agent.top_preference().cloned(),
            },
            Personality::Strategic => {
                if let Some(winner) = trusted_likely_winner(agent, ctx) {
                    return Ok(winner.clone());
                }
                agent.hedge_preference().cloned()
            }
            Personality::Random => agent.learned_choice(options, rng),
        }
    }

    /// Personality-driven negotiation move for `agent`
    pub fn negotiate<R: Rng + ?Sized>(
        &self,
        agent: &Agent,
        options: &[Choice],
        ctx: &DecisionContext,
        rng: &mut R,
    ) -> Result<NegotiationAction> {
        match self {
            Personality::Stubborn => {
                let top = agent.top_preference()?;
                match &ctx.proposed {
                    Some(p) if p != top => Ok(NegotiationAction::Argue(top.clone())),
                    _ => Ok(NegotiationAction::Propose(top.clone())),
                }
            }
            Personality::Flexible => {
                if let Some(p) = ctx.proposed.as_ref().filter(|p| options.contains(p)) {
                    return Ok(NegotiationAction::Accept(p.clone()));
                }
                if let Some(h) = ctx.majority_hint.as_ref().filter(|h| options.contains(h)) {
                    return Ok(NegotiationAction::Accept(h.clone()));
                }
                Ok(NegotiationAction::Propose(agent.top_preference()?.clone()))
            }
            Personality::Strategic => {
                if let Some(winner) = trusted_likely_winner(agent, ctx) {
                    return Ok(NegotiationAction::Accept(winner.clone()));
                }
                Ok(NegotiationAction::Propose(agent.hedge_preference()?.clone()))
            }
            Personality::Random => Ok(NegotiationAction::Propose(agent.learned_choice(options, rng)?)),
        }
    }
}

fn trusted_likely_winner<'a>(agent: &Agent, ctx: &'a DecisionContext) -> Option<&'a Choice> {
    ctx.likely_winner.as_ref().filter(|w| {
        agent.preferences.contains(w) && agent.max_trust() > agent.tuning.strategic_trust_threshold
    })
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Personality {
    type Err = AgoraError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stubborn" => Ok(Personality::Stubborn),
            "flexible" => Ok(Personality::Flexible),
            "strategic" => Ok(Personality::Strategic),
            "random" => Ok(Personality::Random),
            other => Err(AgoraError::InvalidScenario(format!("unknown personality '{other}'"))),
        }
    }
}

/// Move an agent makes during negotiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum NegotiationAction {
    /// Invite the most trusted peer into a coalition
    FormCoalition(String),
    /// Put an option on the table
    Propose(Choice),
    /// Go along with an option already on the table
    Accept(Choice),
    /// Push back with an argument for an option
    Argue(Choice),
}

impl NegotiationAction {
    pub fn name(&self) -> &'static str {
        match self {
            NegotiationAction::FormCoalition(_) => "form_coalition",
            NegotiationAction::Propose(_) => "propose",
            NegotiationAction::Accept(_) => "accept",
            NegotiationAction::Argue(_) => "argue",
        }
    }

    /// The option payload, if any
    pub fn choice(&self) -> Option<&Choice> {
        match self {
            NegotiationAction::FormCoalition(_) => None,
            NegotiationAction::Propose(c) | NegotiationAction::Accept(c) | NegotiationAction::Argue(c) => Some(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stubborn_adapts_after_three_bad_rounds() {
        assert_eq!(
            Personality::Stubborn.adapt(&[1.0, 0.0, 0.2, 0.1], 0.3),
            Personality::Flexible
        );
        assert_eq!(Personality::Stubborn.adapt(&[0.0, 0.0], 0.3), Personality::Stubborn);
        assert_eq!(Personality::Stubborn.adapt(&[0.0, 0.5, 0.5], 0.3), Personality::Stubborn);
        assert_eq!(Personality::Strategic.adapt(&[0.0, 0.0, 0.0], 0.3), Personality::Strategic);
    }

    #[test]
    fn test_parse_personality() {
        assert_eq!("Flexible".parse::<Personality>().unwrap(), Personality::Flexible);
        assert!("chaotic".parse::<Personality>().is_err());
        assert_eq!(Personality::Random.to_string(), "random");
    }
}

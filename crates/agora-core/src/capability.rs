//! Decision hooks layered on top of the personality policy
//!
//! A [`Capability`] gives an agent a deliberative (belief/desire/intention)
//! or reactive (ordered rules) front end. It is consulted before the
//! personality and may decline by returning `None`.
//!
//! An [`Overlay`] is an adversarial override installed on cloned agents by
//! the manipulation harness. It sits in front of everything else.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::agent::Agent;
use crate::context::{Choice, DecisionContext};

/// Hook consulted before the personality-driven decision
pub trait DecisionHook: Send + Sync {
    /// Return a choice to take over the decision, or `None` to fall through
    fn overrides(&self, agent: &Agent, options: &[Choice], ctx: &DecisionContext)
        -> Option<Choice>;
}

/// Belief/desire/intention state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    pub beliefs: BTreeSet<String>,
    pub desires: BTreeSet<String>,
    /// Committed-to options in commitment order
    pub intentions: Vec<Choice>,
}

impl BeliefState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn believe(&mut self, fact: impl Into<String>) {
        self.beliefs.insert(fact.into());
    }

    pub fn desire(&mut self, goal: impl Into<String>) {
        self.desires.insert(goal.into());
    }

    /// Commit to an option; repeated commitments are ignored
    pub fn intend(&mut self, choice: impl Into<Choice>) {
        let choice = choice.into();
        if !self.intentions.contains(&choice) {
            self.intentions.push(choice);
        }
    }

    pub fn drop_intention(&mut self, choice: &str) {
        self.intentions.retain(|c| c != choice);
    }
}

impl DecisionHook for BeliefState {
    fn overrides(&self, _agent: &Agent, options: &[Choice], _ctx: &DecisionContext) -> Option<Choice> {
        self.intentions.iter().find(|i| options.contains(i)).cloned()
    }
}

type Condition = Arc<dyn Fn(&DecisionContext) -> bool + Send + Sync>;
type Action = Arc<dyn Fn(&Agent, &[Choice], &DecisionContext) -> Option<Choice> + Send + Sync>;

/// A `(predicate over context, action)` pair
#[derive(Clone)]
pub struct ReactiveRule {
    pub name: String,
    condition: Condition,
    action: Action,
}

impl ReactiveRule {
    pub fn new<C, A>(name: impl Into<String>, condition: C, action: A) -> Self
    where
        C: Fn(&DecisionContext) -> bool + Send + Sync + 'static,
        A: Fn(&Agent, &[Choice], &DecisionContext) -> Option<Choice> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            condition: Arc::new(condition),
            action: Arc::new(action),
        }
    }

    /// Follow `majority_hint` when it names an available option
    pub fn follow_majority_hint() -> Self {
        Self::new(
            "follow_majority_hint",
            |ctx| ctx.majority_hint.is_some(),
            |_, options, ctx| ctx.majority_hint.clone().filter(|h| options.contains(h)),
        )
    }

    /// Accept the proposal on the table if the agent already ranks it
    pub fn accept_ranked_proposal() -> Self {
        Self::new(
            "accept_ranked_proposal",
            |ctx| ctx.proposed.is_some(),
            |agent, options, ctx| {
                ctx.proposed
                    .clone()
                    .filter(|p| options.contains(p) && agent.preferences.contains(p))
            },
        )
    }

    /// Always choose `choice` when it is available
    pub fn always(choice: impl Into<Choice>) -> Self {
        let choice = choice.into();
        Self::new(
            format!("always:{choice}"),
            |_| true,
            move |_, options, _| Some(choice.clone()).filter(|c| options.contains(c)),
        )
    }

    fn fire(&self, agent: &Agent, options: &[Choice], ctx: &DecisionContext) -> Option<Choice> {
        if (self.condition)(ctx) {
            (self.action)(agent, options, ctx)
        } else {
            None
        }
    }
}

impl fmt::Debug for ReactiveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveRule").field("name", &self.name).finish()
    }
}

/// Ordered rule list; the first rule that fires wins
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub rules: Vec<ReactiveRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ReactiveRule>) -> Self {
        Self { rules }
    }

    /// Rules a reactive agent gets when none are supplied
    pub fn standard() -> Self {
        Self::new(vec![
            ReactiveRule::follow_majority_hint(),
            ReactiveRule::accept_ranked_proposal(),
        ])
    }

    pub fn push(&mut self, rule: ReactiveRule) {
        self.rules.push(rule);
    }
}

impl DecisionHook for RuleSet {
    fn overrides(&self, agent: &Agent, options: &[Choice], ctx: &DecisionContext) -> Option<Choice> {
        self.rules.iter().find_map(|r| r.fire(agent, options, ctx))
    }
}

/// Capability attached to an agent
#[derive(Clone)]
pub enum Capability {
    BeliefDesireIntention(BeliefState),
    Reactive(RuleSet),
    Custom(Arc<dyn DecisionHook>),
}

impl Capability {
    pub fn overrides(&self, agent: &Agent, options: &[Choice], ctx: &DecisionContext) -> Option<Choice> {
        match self {
            Capability::BeliefDesireIntention(state) => state.overrides(agent, options, ctx),
            Capability::Reactive(rules) => rules.overrides(agent, options, ctx),
            Capability::Custom(hook) => hook.overrides(agent, options, ctx),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Capability::BeliefDesireIntention(_) => "bdi",
            Capability::Reactive(_) => "reactive",
            Capability::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::BeliefDesireIntention(state) => f.debug_tuple("BeliefDesireIntention").field(state).finish(),
            Capability::Reactive(rules) => f.debug_tuple("Reactive").field(rules).finish(),
            Capability::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Adversarial override of what an agent reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Overlay {
    /// Report the second-ranked preference instead of the first
    Misreport,
    /// Report a fixed option
    Coerced(Choice),
    /// With the given probability report a uniformly random option
    Noise(f64),
}

impl Overlay {
    /// The overridden report, or `None` to let the agent behave normally
    pub fn report<R: Rng + ?Sized>(&self, agent: &Agent, options: &[Choice], rng: &mut R) -> Option<Choice> {
        match self {
            Overlay::Misreport => agent.preferences.get(1).cloned(),
            Overlay::Coerced(target) => Some(target.clone()),
            Overlay::Noise(level) => {
                if rng.random_bool(level.clamp(0.0, 1.0)) {
                    options.choose(rng).cloned()
                } else {
                    None
                }
            }
        }
    }
}

//! Argument records exchanged during negotiation

use serde::{Deserialize, Serialize};

use crate::context::Choice;

/// Whether an argument supports its target or attacks another position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    Support,
    Counter,
}

/// A single argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Agent that made the argument
    pub author: String,
    /// Option argued for
    pub target: Choice,
    /// Free-text reason
    pub reason: String,
    pub kind: ArgumentKind,
    /// Option being rebutted, for counter arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuts: Option<Choice>,
}

impl Argument {
    /// Argument in favour of `target`
    pub fn support(author: &str, target: impl Into<Choice>, reason: impl Into<String>) -> Self {
        Self {
            author: author.to_string(),
            target: target.into(),
            reason: reason.into(),
            kind: ArgumentKind::Support,
            rebuts: None,
        }
    }

    /// Argument for `target` made against `rebuts`
    pub fn counter(
        author: &str,
        target: impl Into<Choice>,
        rebuts: impl Into<Choice>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            author: author.to_string(),
            target: target.into(),
            reason: reason.into(),
            kind: ArgumentKind::Counter,
            rebuts: Some(rebuts.into()),
        }
    }

    pub fn is_counter(&self) -> bool {
        self.kind == ArgumentKind::Counter
    }
}

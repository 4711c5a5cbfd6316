//! Error types shared by every Agora crate

/// Errors raised by agents, governance methods and the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgoraError {
    #[error("Agent '{agent}' has no ranked preferences")]
    EmptyPreferences { agent: String },

    #[error("No options to decide between")]
    NoOptions,

    #[error("No agents in scenario")]
    NoAgents,

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Unknown governance method: {0}")]
    UnknownMethod(String),

    #[error("Duplicate agent name: {0}")]
    DuplicateAgent(String),

    #[error("Agent '{agent}' ranks '{choice}' more than once")]
    DuplicatePreference { agent: String, choice: String },
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, AgoraError>;

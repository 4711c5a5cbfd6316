//! Subcommands and the helpers they share

pub mod info;
pub mod robustness;
pub mod simulate;

use anyhow::{Context, Result};
use std::path::Path;

use agora_adversarial::GovernanceMethod;
use agora_core::EngineConfig;
use agora_runtime::Scenario;

/// Read and parse a scenario file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    let scenario = Scenario::from_json(&content)
        .with_context(|| format!("Failed to parse scenario: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        agents = scenario.agents.len(),
        options = scenario.options.len(),
        "Loaded scenario"
    );
    Ok(scenario)
}

/// Environment configuration with an optional seed override
pub fn engine_config(seed: Option<u64>) -> Result<EngineConfig> {
    let mut config = EngineConfig::try_from_env().context("Invalid AGORA_* environment")?;
    if seed.is_some() {
        config.seed = seed;
    }
    config.validate().context("Invalid engine configuration")?;
    Ok(config)
}

/// Method named on the command line, else the scenario's, else majority
pub fn resolve_method(flag: Option<&str>, scenario: &Scenario) -> Result<GovernanceMethod> {
    match flag {
        Some(name) => name
            .parse()
            .with_context(|| format!("Unknown governance method '{name}'")),
        None => Ok(scenario.method.unwrap_or(GovernanceMethod::Majority)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_method() {
        let mut scenario = Scenario::new(&["A"]);
        assert_eq!(resolve_method(None, &scenario).unwrap(), GovernanceMethod::Majority);
        scenario.method = Some(GovernanceMethod::Raft);
        assert_eq!(resolve_method(None, &scenario).unwrap(), GovernanceMethod::Raft);
        assert_eq!(resolve_method(Some("condorcet"), &scenario).unwrap(), GovernanceMethod::Condorcet);
        assert!(resolve_method(Some("lottery"), &scenario).is_err());
    }
}

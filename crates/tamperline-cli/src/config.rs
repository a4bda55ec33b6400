//! TOML configuration for the `tamperline` binary.

use std::path::Path;

use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Which script to play and how.
    pub scenario: ScenarioSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[scenario]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScenarioSection {
    /// Built-in script name: `"breach"` or `"soc"`.
    pub script: String,
    /// Pacing factor; every scripted delay is divided by it.
    pub speed: f64,
    /// Answer viewer steps automatically.
    pub auto: bool,
    /// Event the automatic viewer tries to rewrite.
    pub tamper_index: usize,
    /// Value the automatic viewer writes.
    pub tamper_value: String,
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self {
            script: "breach".to_string(),
            speed: 1.0,
            auto: false,
            tamper_index: 4,
            tamper_value: "0".to_string(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

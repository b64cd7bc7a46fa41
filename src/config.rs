// file: src/config.rs
// version: 2.1.0
// guid: 6ea31d79-e2bf-4304-a841-22bf1e595512

use crate::error::{Result, SaltError};
use crate::store::{AgentCommand, DeviceConfigStore, SaltPaths, AGENT_PROGRAM, DEFAULT_AGENT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const LOG_LEVEL_ENV: &str = "SALTUTIL_LOG_LEVEL";
pub const AGENT_TIMEOUT_ENV: &str = "SALTUTIL_AGENT_TIMEOUT";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub paths: SaltPaths,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub program: String,
    pub leading_args: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            program: AGENT_PROGRAM.to_string(),
            leading_args: Vec::new(),
            timeout_seconds: DEFAULT_AGENT_TIMEOUT_SECS,
        }
    }
}

impl From<&AgentConfig> for AgentCommand {
    fn from(config: &AgentConfig) -> Self {
        AgentCommand {
            program: config.program.clone(),
            leading_args: config.leading_args.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

impl Config {
    /// Load configuration from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        let config = Self::apply_env_overrides(config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SaltError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            SaltError::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Self) -> Result<Self> {
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            config.logging.level = level;
        }

        if let Ok(timeout) = std::env::var(AGENT_TIMEOUT_ENV) {
            config.agent.timeout_seconds = parse_timeout(&timeout)?;
        }

        Ok(config)
    }

    /// Reject settings that would make every agent call fail
    pub fn validate(&self) -> Result<()> {
        if self.agent.timeout_seconds == 0 {
            return Err(SaltError::config(
                "agent timeout_seconds must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Build the store described by this configuration
    pub fn store(&self) -> DeviceConfigStore {
        DeviceConfigStore::new()
            .with_paths(self.paths.clone())
            .with_agent(AgentCommand::from(&self.agent))
    }
}

fn parse_timeout(value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(SaltError::config(format!(
            "{} must be greater than 0",
            AGENT_TIMEOUT_ENV
        ))),
        Ok(secs) => Ok(secs),
        Err(e) => Err(SaltError::config(format!(
            "Invalid {} '{}': {}",
            AGENT_TIMEOUT_ENV, value, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_fixed_locations() {
        let config = Config::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.paths, SaltPaths::default());
        assert_eq!(config.agent.program, "salt-call");
        assert_eq!(config.agent.timeout_seconds, 60);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[logging]
level = "debug"

[paths]
nodegroup = "/srv/test/salt-nodegroup"

[agent]
timeout_seconds = 5
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path())?;

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.paths.nodegroup, PathBuf::from("/srv/test/salt-nodegroup"));
        assert_eq!(config.paths.grains, PathBuf::from("/etc/salt/grains"));
        assert_eq!(config.agent.program, "salt-call");
        assert_eq!(config.agent.timeout_seconds, 5);

        Ok(())
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[agent\nprogram = ").unwrap();

        let result = Config::load_from_file(file.path());

        assert!(matches!(result, Err(SaltError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_in_file_is_rejected() {
        // Arrange
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\ntimeout_seconds = 0").unwrap();

        // Act
        let loaded = Config::load_from_file(file.path()).unwrap();
        let result = loaded.validate();

        // Assert
        assert!(matches!(result, Err(SaltError::Config(msg)) if msg.contains("greater than 0")));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_parse_timeout_override() {
        assert_eq!(parse_timeout("30").unwrap(), 30);
        assert_eq!(parse_timeout(" 5 ").unwrap(), 5);
        assert!(matches!(parse_timeout("0"), Err(SaltError::Config(_))));

        let err = parse_timeout("soon").unwrap_err();
        assert!(err.to_string().contains("Invalid SALTUTIL_AGENT_TIMEOUT 'soon'"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from_file(Path::new("/nonexistent/saltutil.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_store_uses_configured_agent() {
        let config = Config {
            agent: AgentConfig {
                program: "/usr/local/bin/salt-call".to_string(),
                leading_args: vec!["--local".to_string()],
                timeout_seconds: 7,
            },
            ..Default::default()
        };

        let store = config.store();

        assert_eq!(store.agent().timeout, Duration::from_secs(7));
        assert_eq!(
            store.agent().command_line("{}"),
            "/usr/local/bin/salt-call --local grains.setvals {}"
        );
    }
}

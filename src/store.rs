// file: src/store.rs
// version: 1.1.0
// guid: 908c6c72-2dc0-411c-876e-2316a363a898

//! Device configuration store: grains, nodegroup and minion ID.
//!
//! Reads go straight to the local files on every call. Writes are delegated to
//! the salt agent (`salt-call grains.setvals <json>`), which owns the grains
//! file; nothing here locks or re-reads it afterwards.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{Result, SaltError};
use crate::grains::{self, DeviceGrains, GrainMap};
use crate::logging::Log;

pub const GRAINS_FILE: &str = "/etc/salt/grains";
pub const NODEGROUP_FILE: &str = "/etc/cacophony/salt-nodegroup";
pub const MINION_ID_FILE: &str = "/etc/salt/minion_id";

pub const AGENT_PROGRAM: &str = "salt-call";
pub const SET_GRAINS_SUBCOMMAND: &str = "grains.setvals";
pub const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 60;

/// Locations of the files the store reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaltPaths {
    pub grains: PathBuf,
    pub nodegroup: PathBuf,
    pub minion_id: PathBuf,
}

impl Default for SaltPaths {
    fn default() -> Self {
        Self {
            grains: PathBuf::from(GRAINS_FILE),
            nodegroup: PathBuf::from(NODEGROUP_FILE),
            minion_id: PathBuf::from(MINION_ID_FILE),
        }
    }
}

/// How the salt agent is invoked.
///
/// The full command line is `<program> <leading_args..> grains.setvals <json>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    pub program: String,
    pub leading_args: Vec<String>,
    pub timeout: Duration,
}

impl Default for AgentCommand {
    fn default() -> Self {
        Self {
            program: AGENT_PROGRAM.to_string(),
            leading_args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_AGENT_TIMEOUT_SECS),
        }
    }
}

impl AgentCommand {
    /// Arguments passed after the program name
    pub fn args(&self, payload: &str) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push(SET_GRAINS_SUBCOMMAND.to_string());
        args.push(payload.to_string());
        args
    }

    /// Command line as logged and embedded in errors
    pub fn command_line(&self, payload: &str) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args(payload))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Stateless accessor for the device's salt configuration
#[derive(Debug, Clone, Default)]
pub struct DeviceConfigStore {
    paths: SaltPaths,
    agent: AgentCommand,
}

impl DeviceConfigStore {
    /// Store over the standard file locations and `salt-call`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths(mut self, paths: SaltPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_agent(mut self, agent: AgentCommand) -> Self {
        self.agent = agent;
        self
    }

    pub fn paths(&self) -> &SaltPaths {
        &self.paths
    }

    pub fn agent(&self) -> &AgentCommand {
        &self.agent
    }

    /// Read the grains file into the raw mapping.
    ///
    /// A missing file is not an error: devices that were never configured
    /// have no grains, so an empty mapping is returned. A non-blank line
    /// without a colon fails the whole read.
    pub fn read_grains(&self, log: &dyn Log) -> Result<GrainMap> {
        let file = match File::open(&self.paths.grains) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log.debug(&format!("No grains file found: {}", e));
                return Ok(GrainMap::new());
            }
            Err(e) => {
                log.error(&format!("Failed to open grains file: {}", e));
                return Err(e.into());
            }
        };

        let grains = grains::read_grains_from(BufReader::new(file)).map_err(|e| {
            match &e {
                SaltError::Parse { .. } => log.error(&e.to_string()),
                _ => log.error(&format!("Error reading grains file: {}", e)),
            }
            e
        })?;

        log.debug(&format!("Grains: {}", serde_json::to_string(&grains)?));
        Ok(grains)
    }

    /// Read the grains file and project it onto [`DeviceGrains`]
    pub fn read_device_grains(&self, log: &dyn Log) -> Result<DeviceGrains> {
        self.read_grains(log).map(|grains| DeviceGrains::from_map(&grains))
    }

    /// Set grains through the salt agent.
    ///
    /// The agent is killed if it outlives the configured timeout or if the
    /// returned future is dropped.
    pub async fn write_grains(&self, grains: &GrainMap, log: &dyn Log) -> Result<()> {
        let payload = serde_json::to_string(grains).map_err(|e| {
            log.error(&format!("Failed to marshal grains: {}", e));
            SaltError::from(e)
        })?;
        self.run_agent(&payload, log).await
    }

    /// Set only the fields present in `grains`
    pub async fn write_device_grains(&self, grains: &DeviceGrains, log: &dyn Log) -> Result<()> {
        let payload = serde_json::to_string(grains).map_err(|e| {
            log.error(&format!("Failed to marshal grains: {}", e));
            SaltError::from(e)
        })?;
        self.run_agent(&payload, log).await
    }

    /// Read the nodegroup file, trimmed. Errors are returned unmodified.
    pub fn read_nodegroup(&self) -> Result<String> {
        let nodegroup = fs::read_to_string(&self.paths.nodegroup)?;
        Ok(nodegroup.trim().to_string())
    }

    /// Read the minion ID file, trimmed. Failures are logged before returning.
    pub fn read_minion_id(&self, log: &dyn Log) -> Result<String> {
        let raw = fs::read_to_string(&self.paths.minion_id).map_err(|e| {
            log.error(&format!("Error reading minion ID: {}", e));
            SaltError::from(e)
        })?;

        let id = raw.trim().to_string();
        log.debug(&format!("Minion ID: '{}'", id));
        Ok(id)
    }

    async fn run_agent(&self, payload: &str, log: &dyn Log) -> Result<()> {
        let command_line = self.agent.command_line(payload);
        log.debug(&format!("Running command: {}", command_line));

        let program = which::which(&self.agent.program).map_err(|e| {
            let err = SaltError::AgentSpawn {
                command: command_line.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, e.to_string()),
            };
            log.error(&err.to_string());
            err
        })?;

        let mut cmd = Command::new(program);
        cmd.args(self.agent.args(payload))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.agent.timeout, cmd.output())
            .await
            .map_err(|_| {
                let err = SaltError::Timeout {
                    command: command_line.clone(),
                    seconds: self.agent.timeout.as_secs(),
                };
                log.error(&err.to_string());
                err
            })?
            .map_err(|e| {
                let err = SaltError::AgentSpawn {
                    command: command_line.clone(),
                    source: e,
                };
                log.error(&err.to_string());
                err
            })?;

        if !output.status.success() {
            // stdout first, then stderr
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            let err = SaltError::AgentFailed {
                command: command_line,
                status: output.status.to_string(),
                output: combined,
            };
            log.error(&err.to_string());
            return Err(err);
        }

        log.debug("Grains set successfully");
        Ok(())
    }
}

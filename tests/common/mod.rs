// file: tests/common/mod.rs
// version: 1.0.0
// guid: 10de8e54-4a1a-41fe-a53f-ec155cad8ac3

//! Shared fixtures for integration tests

#![allow(dead_code)]

use saltutil::{DeviceConfigStore, SaltPaths};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A fake device root holding the three salt files
pub struct DeviceRoot {
    pub dir: TempDir,
}

impl DeviceRoot {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn paths(&self) -> SaltPaths {
        SaltPaths {
            grains: self.dir.path().join("grains"),
            nodegroup: self.dir.path().join("salt-nodegroup"),
            minion_id: self.dir.path().join("minion_id"),
        }
    }

    pub fn store(&self) -> DeviceConfigStore {
        DeviceConfigStore::new().with_paths(self.paths())
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    /// Write a saltutil config pointing at this root and the given agent
    pub fn write_config(&self, agent_program: &str, agent_args: &[&str]) -> PathBuf {
        let paths = self.paths();
        let args = agent_args
            .iter()
            .map(|arg| format!("{:?}", arg))
            .collect::<Vec<_>>()
            .join(", ");
        let content = format!(
            "[paths]\ngrains = {:?}\nnodegroup = {:?}\nminion_id = {:?}\n\n[agent]\nprogram = {:?}\nleading_args = [{}]\ntimeout_seconds = 10\n",
            paths.grains.display().to_string(),
            paths.nodegroup.display().to_string(),
            paths.minion_id.display().to_string(),
            agent_program,
            args,
        );
        self.write("saltutil.toml", &content)
    }
}

// file: src/grains.rs
// version: 1.1.0
// guid: b192f449-808a-4c33-a59b-1a0c877ba4f6

//! Salt grains file format and the structured device view.
//!
//! A grains file is newline separated text. Every non-blank line is
//! `key:value`, split at the first colon, with both sides trimmed. There is no
//! quoting, escaping or comment syntax.

use std::collections::BTreeMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SaltError};

/// Raw grains mapping, every key kept
pub type GrainMap = BTreeMap<String, String>;

pub const DEVICE_NAME: &str = "device_name";
pub const ENVIRONMENT: &str = "environment";
pub const GROUP: &str = "group";

/// Parse grains from text. Fails on the first non-blank line without a colon.
pub fn parse_grains(text: &str) -> Result<GrainMap> {
    let mut grains = GrainMap::new();
    for line in text.lines() {
        parse_line(line, &mut grains)?;
    }
    Ok(grains)
}

/// Parse grains from a buffered reader, one line at a time.
///
/// Lines are split on raw `\n` bytes. Invalid UTF-8 is replaced with U+FFFD
/// rather than failing the read.
pub fn read_grains_from<R: BufRead>(reader: R) -> Result<GrainMap> {
    let mut grains = GrainMap::new();
    for line in reader.split(b'\n') {
        let line = line?;
        parse_line(&String::from_utf8_lossy(&line), &mut grains)?;
    }
    Ok(grains)
}

fn parse_line(raw: &str, grains: &mut GrainMap) -> Result<()> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(());
    }

    match line.split_once(':') {
        Some((key, value)) => {
            grains.insert(key.trim().to_string(), value.trim().to_string());
            Ok(())
        }
        None => Err(SaltError::parse(line)),
    }
}

/// Render grains as `key: value` lines in key order
pub fn format_grains(grains: &GrainMap) -> String {
    grains
        .iter()
        .map(|(key, value)| format!("{}: {}\n", key, value))
        .collect()
}

/// Structured view over the grains a device cares about.
///
/// Keys other than `device_name`, `environment` and `group` are dropped by
/// [`DeviceGrains::from_map`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGrains {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl DeviceGrains {
    pub fn from_map(grains: &GrainMap) -> Self {
        Self {
            device_name: grains.get(DEVICE_NAME).cloned(),
            environment: grains.get(ENVIRONMENT).cloned(),
            group: grains.get(GROUP).cloned(),
        }
    }

    /// Only the fields that are set
    pub fn to_map(&self) -> GrainMap {
        [
            (DEVICE_NAME, &self.device_name),
            (ENVIRONMENT, &self.environment),
            (GROUP, &self.group),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.device_name.is_none() && self.environment.is_none() && self.group.is_none()
    }
}

impl From<&GrainMap> for DeviceGrains {
    fn from(grains: &GrainMap) -> Self {
        Self::from_map(grains)
    }
}

// file: src/cli/args.rs
// version: 2.0.0
// guid: f6g7h8i9-j0k1-2345-6789-012345fghijk

//! Command line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "saltutil")]
#[command(about = "Read device grains, nodegroup and minion ID, and set grains through salt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set the logging level (debug, info, warn, error) [default: info]
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the device grains as JSON
    Grains {
        /// Only device_name, environment and group
        #[arg(short, long)]
        structured: bool,
    },

    /// Set grains through salt-call
    SetGrains {
        /// Grains to set, as KEY=VALUE
        #[arg(required = true, value_parser = parse_key_value)]
        grains: Vec<(String, String)>,
    },

    /// Print the salt nodegroup
    Nodegroup,

    /// Print the salt minion ID
    MinionId,
}

/// Parse a `KEY=VALUE` argument, splitting at the first `=`
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", arg))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", arg));
    }

    Ok((key.to_string(), value.trim().to_string()))
}

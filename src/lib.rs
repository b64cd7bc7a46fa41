// file: src/lib.rs
// version: 3.0.0
// guid: d82472d1-7f0f-4eb4-b0a3-6e1547103eb4

//! # saltutil
//!
//! Small helpers shared by programs running on salt-managed devices:
//!
//! - [`logging`]: a leveled logger rendering records as `[LEVEL] message`.
//! - [`store`]: reads the grains, nodegroup and minion ID files and sets
//!   grains through `salt-call grains.setvals`.
//!
//! ```no_run
//! use saltutil::{DeviceConfigStore, Logger};
//!
//! let logger = Logger::new("info");
//! let store = DeviceConfigStore::new();
//! let grains = store.read_device_grains(&logger)?;
//! println!("group: {:?}", grains.group);
//! # Ok::<(), saltutil::SaltError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod grains;
pub mod logging;
pub mod store;

pub use error::{Result, SaltError};
pub use grains::{DeviceGrains, GrainMap};
pub use logging::{Log, LogLevel, Logger, NullLogger};
pub use store::{AgentCommand, DeviceConfigStore, SaltPaths};

/// Version information for the utility
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

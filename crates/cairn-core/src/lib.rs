//! # cairn-core
//!
//! Configuration and logging foundation shared by every cairn crate.

pub mod config;
pub mod logging;

pub use config::{AppConfig, AppConfigTrait, ConfigError, ConfigSource, Environment, MutationConfig};
pub use logging::{init_logging, LogFormat, LoggingConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Framework name used as the default log target prefix
pub const FRAMEWORK_NAME: &str = "cairn";

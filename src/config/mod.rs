//! Configuration module for Giferator-Disco
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration file is optional: `Config::default()` reproduces the
//! stock discovery job.
//!
//! # Example
//!
//! ```no_run
//! use giferator_disco::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("disco.toml")).unwrap();
//! println!("Retry budget: {}", config.prober.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, ProberConfig, ScanMode, UserAgentConfig, DEFAULT_CRAWLER_NAME,
    DEFAULT_ENDPOINT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;

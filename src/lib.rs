//! Giferator-Disco: a numeric ID space discovery crawler
//!
//! This crate probes a contiguous range of candidate IDs against a remote web
//! endpoint, classifies each ID as live or absent, extracts the image assets
//! referenced by live pages, and streams compact `kind:value` records into a
//! gzip-compressed output file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod range;
pub mod state;

use thiserror::Error;

/// Main error type for discovery operations
#[derive(Debug, Error)]
pub enum DiscoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The retry budget for a single ID ran out. Aborts the whole range.
    #[error("Giving up on id {id} after {attempts} attempts: {cause}")]
    GaveUp {
        id: u64,
        attempts: u32,
        cause: crawler::TransientCause,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Record is not ASCII: {0}")]
    NonAsciiRecord(String),

    #[error("Sink already finished")]
    SinkFinished,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiscoError {
    /// Returns true if this error is the fatal retry-exhaustion signal
    pub fn is_gave_up(&self) -> bool {
        matches!(self, Self::GaveUp { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid endpoint template: {0}")]
    InvalidEndpoint(String),
}

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, ScanMode};
pub use crawler::{extract, run_scan, Prober, ProbeOutcome, Resolved, Scanner};
pub use output::{OutputRecord, RecordKind, RecordSink};
pub use range::ScanRange;

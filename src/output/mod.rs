//! Output module for discovery records
//!
//! This module handles:
//! - The `kind:value` record format
//! - Sinks records are streamed into (gzip file, in-memory)
//! - Scan statistics

mod gzip;
pub mod stats;
mod traits;

pub use gzip::GzipSink;
pub use stats::{log_statistics, ScanStats};
pub use traits::{OutputRecord, RecordKind, RecordSink};

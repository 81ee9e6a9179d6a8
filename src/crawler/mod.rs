//! Crawler module for probing candidate IDs
//!
//! This module contains the core discovery logic, including:
//! - HTTP fetching and per-attempt classification
//! - The retry/backoff loop around a single ID
//! - Asset extraction from found documents
//! - Range scan coordination

mod coordinator;
mod fetcher;
mod parser;
mod prober;

pub use coordinator::{run_scan, ScanOptions, Scanner};
pub use fetcher::{
    build_http_client, classify_response, Document, EndpointTemplate, Fetcher, HttpFetcher,
    ProbeOutcome, Resolved, TransientCause,
};
pub use parser::{
    extract, extract_from_html, match_preview, match_primary, AssetKind, AssetPattern,
    AssetReference, ExtractedAssets, ASSET_HOST, ASSET_PATH_PREFIX, PREVIEW_PATTERN,
    PRIMARY_PATTERN,
};
pub use prober::{ProbeCounters, ProbeTally, Prober, Sleeper, TokioSleeper};

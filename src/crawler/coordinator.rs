//! Range scan orchestration
//!
//! Walks a range in ascending order, strictly one ID at a time:
//! - Probe the ID
//! - Extract assets from found documents
//! - Stream the resulting records into the sink
//!
//! A `GaveUp` from the prober ends the scan immediately. Records already
//! written are left in place.

use crate::config::{Config, OutputConfig, ScanMode};
use crate::crawler::fetcher::{Document, EndpointTemplate, Fetcher, HttpFetcher, Resolved};
use crate::crawler::parser::extract;
use crate::crawler::prober::{Prober, Sleeper, TokioSleeper};
use crate::output::{GzipSink, OutputRecord, RecordSink, ScanStats};
use crate::range::{CandidateId, ScanRange};
use crate::state::RetryPolicy;
use crate::DiscoError;
use std::path::Path;
use std::time::Instant;

/// Log progress every this many IDs
const PROGRESS_INTERVAL: u64 = 100;

/// Which records a found ID produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub mode: ScanMode,

    /// Emit `meta:<id>` after `page:<id>` (full mode only)
    pub emit_meta: bool,
}

impl ScanOptions {
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            mode: config.mode,
            emit_meta: config.emit_meta,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&OutputConfig::default())
    }
}

/// Scans ranges of candidate IDs
pub struct Scanner<F, S = TokioSleeper> {
    prober: Prober<F, S>,
    options: ScanOptions,
}

impl<F: Fetcher, S: Sleeper> Scanner<F, S> {
    pub fn new(prober: Prober<F, S>, options: ScanOptions) -> Self {
        Self { prober, options }
    }

    pub fn prober(&self) -> &Prober<F, S> {
        &self.prober
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Records for a found document, page and meta before assets
    pub fn records_for(&self, document: &Document) -> Vec<OutputRecord> {
        if self.options.mode == ScanMode::Existence {
            return vec![OutputRecord::existence(document.id)];
        }

        let mut records = vec![OutputRecord::page(document.id)];
        if self.options.emit_meta {
            records.push(OutputRecord::meta(document.id));
        }

        let assets = extract(document);
        tracing::debug!(
            id = document.id,
            primary = assets.primary.is_some(),
            preview = assets.preview.is_some(),
            "Assets extracted"
        );
        records.extend(assets.iter().map(OutputRecord::asset));

        records
    }

    /// Probes one ID and returns its records (none when not found)
    pub async fn scan_id(&self, id: CandidateId) -> Result<Vec<OutputRecord>, DiscoError> {
        Ok(match self.prober.probe(id).await? {
            Resolved::Found(document) => self.records_for(&document),
            Resolved::NotFound => Vec::new(),
        })
    }

    /// Scans `range` in ascending order, writing records as they are produced
    ///
    /// The sink is not finished here; the caller owns its lifecycle.
    ///
    /// # Returns
    ///
    /// * `Ok(ScanStats)` - Every ID in the range was classified
    /// * `Err(DiscoError::GaveUp)` - An ID exhausted its retry budget
    /// * `Err(DiscoError)` - The sink failed
    pub async fn scan(
        &self,
        range: ScanRange,
        sink: &mut dyn RecordSink,
    ) -> Result<ScanStats, DiscoError> {
        tracing::info!(start = range.start(), end = range.end(), "Starting scan");

        let mut stats = ScanStats::new(range);
        let probes_before = self.prober.counters();
        let started = Instant::now();

        for id in range.ids() {
            let (found, records) = match self.prober.probe(id).await? {
                Resolved::Found(document) => (true, self.records_for(&document)),
                Resolved::NotFound => (false, Vec::new()),
            };

            for record in &records {
                sink.write_record(record)?;
            }
            stats.record_id(found, &records);

            if stats.ids_probed % PROGRESS_INTERVAL == 0 {
                let elapsed = started.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} / {} ids probed, {} found, {:.2} ids/sec",
                    stats.ids_probed,
                    range.len(),
                    stats.found,
                    stats.ids_probed as f64 / elapsed.max(f64::EPSILON)
                );
            }
        }

        stats.finish(self.prober.counters().since(&probes_before));
        tracing::info!(
            "Scan of {} completed: {} found in {:?}",
            range,
            stats.found,
            started.elapsed()
        );

        Ok(stats)
    }
}

/// Scans `range` against the configured endpoint into a gzip file at `output`
///
/// The output file is truncated first. The gzip stream is closed even when
/// the scan gives up, so a partial file still decodes.
pub async fn run_scan(
    config: &Config,
    range: ScanRange,
    output: &Path,
    config_hash: Option<String>,
) -> Result<ScanStats, DiscoError> {
    let endpoint = EndpointTemplate::parse(&config.prober.endpoint)?;
    let fetcher = HttpFetcher::from_config(config)?;
    let prober = Prober::new(fetcher, endpoint, RetryPolicy::from_config(&config.prober));
    let scanner = Scanner::new(prober, ScanOptions::from_config(&config.output));

    let mut sink = GzipSink::create(output)?;
    let result = scanner.scan(range, &mut sink).await;
    let closed = sink.finish();

    let mut stats = result?;
    closed?;
    stats.config_hash = config_hash;
    Ok(stats)
}

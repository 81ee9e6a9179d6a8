//! Statistics for a finished range scan
//!
//! Counts are accumulated while records stream to the sink and logged once
//! the scan completes.

use crate::crawler::ProbeTally;
use crate::output::traits::{OutputRecord, RecordKind};
use crate::range::ScanRange;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Scan statistics summary
#[derive(Debug, Clone)]
pub struct ScanStats {
    /// Range that was scanned
    pub range: ScanRange,

    /// IDs that received a final classification
    pub ids_probed: u64,

    /// IDs classified as found
    pub found: u64,

    /// IDs classified as not found
    pub not_found: u64,

    /// Records written, by kind
    pub records_by_kind: BTreeMap<RecordKind, u64>,

    /// Network activity during the scan
    pub probe: ProbeTally,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// SHA-256 of the configuration file, if one was used
    pub config_hash: Option<String>,
}

impl ScanStats {
    /// Starts a new summary stamped with the current time
    pub fn new(range: ScanRange) -> Self {
        Self {
            range,
            ids_probed: 0,
            found: 0,
            not_found: 0,
            records_by_kind: BTreeMap::new(),
            probe: ProbeTally::default(),
            started_at: Utc::now(),
            finished_at: None,
            config_hash: None,
        }
    }

    /// Accounts for one classified ID and the records it produced
    pub fn record_id(&mut self, found: bool, records: &[OutputRecord]) {
        self.ids_probed += 1;
        if found {
            self.found += 1;
        } else {
            self.not_found += 1;
        }

        for record in records {
            *self.records_by_kind.entry(record.kind).or_insert(0) += 1;
        }
    }

    /// Total records written
    pub fn total_records(&self) -> u64 {
        self.records_by_kind.values().sum()
    }

    /// Records written of one kind
    pub fn records_of(&self, kind: RecordKind) -> u64 {
        self.records_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Marks the scan complete
    pub fn finish(&mut self, probe: ProbeTally) {
        self.probe = probe;
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Percentage of probed IDs that were found
    pub fn hit_rate(&self) -> f64 {
        if self.ids_probed == 0 {
            return 0.0;
        }
        (self.found as f64 / self.ids_probed as f64) * 100.0
    }
}

/// Logs the summary through `tracing`
pub fn log_statistics(stats: &ScanStats) {
    tracing::info!(
        range = %stats.range,
        ids_probed = stats.ids_probed,
        found = stats.found,
        not_found = stats.not_found,
        hit_rate_pct = stats.hit_rate(),
        "Scan summary"
    );

    for kind in RecordKind::all_kinds() {
        let count = stats.records_of(kind);
        if count > 0 {
            tracing::info!(kind = %kind, count, "Records written");
        }
    }

    tracing::info!(
        attempts = stats.probe.attempts,
        transient_failures = stats.probe.transient_failures,
        backoffs = stats.probe.backoffs,
        duration_seconds = stats.duration_seconds().unwrap_or(0),
        config_hash = stats.config_hash.as_deref().unwrap_or("default"),
        "Probe activity"
    );
}

//! Output records and the sink trait
//!
//! Every discovery is written as one `<kind>:<value>` line. Sinks are
//! append-only and receive records as soon as each ID is classified.

use crate::crawler::{AssetKind, AssetReference};
use crate::range::CandidateId;
use crate::DiscoError;
use std::fmt;

/// Record tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    /// A live page, value is the ID
    Page,

    /// Metadata view of a live page, value is the ID
    Meta,

    /// Primary asset path, or the ID in existence-only scans
    Gif,

    /// Preview asset path
    Jpg,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Meta => "meta",
            Self::Gif => "gif",
            Self::Jpg => "jpg",
        }
    }

    pub fn all_kinds() -> [Self; 4] {
        [Self::Page, Self::Meta, Self::Gif, Self::Jpg]
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub kind: RecordKind,
    pub value: String,
}

impl OutputRecord {
    pub fn new(kind: RecordKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn page(id: CandidateId) -> Self {
        Self::new(RecordKind::Page, id.to_string())
    }

    pub fn meta(id: CandidateId) -> Self {
        Self::new(RecordKind::Meta, id.to_string())
    }

    /// `gif:<id>`, the single record of an existence-only scan
    pub fn existence(id: CandidateId) -> Self {
        Self::new(RecordKind::Gif, id.to_string())
    }

    /// `gif:<path>` for primary assets, `jpg:<path>` for previews
    pub fn asset(asset: &AssetReference) -> Self {
        let kind = match asset.kind {
            AssetKind::Primary => RecordKind::Gif,
            AssetKind::Preview => RecordKind::Jpg,
        };
        Self::new(kind, asset.path.clone())
    }

    /// Rendered line including the trailing newline
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// Append-only destination for records
pub trait RecordSink {
    /// Appends one record
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), DiscoError>;

    /// Flushes and closes the stream
    ///
    /// Stream-backed sinks such as `GzipSink` reject writes afterwards with
    /// `DiscoError::SinkFinished`. The in-memory sink has nothing to close
    /// and keeps accepting records.
    fn finish(&mut self) -> Result<(), DiscoError>;
}

/// In-memory sink, used by tests and by callers embedding the scanner
///
/// `finish` is a no-op here.
impl RecordSink for Vec<OutputRecord> {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), DiscoError> {
        self.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DiscoError> {
        Ok(())
    }
}

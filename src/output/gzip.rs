//! Gzip-compressed, newline-delimited record file

use crate::output::traits::{OutputRecord, RecordSink};
use crate::DiscoError;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `<kind>:<value>\n` lines through a gzip encoder
///
/// The gzip header carries no timestamp, so identical record sequences
/// produce byte-identical files.
pub struct GzipSink<W: Write> {
    encoder: GzEncoder<W>,
    records: u64,
    finished: bool,
}

impl GzipSink<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`
    pub fn create(path: &Path) -> Result<Self, DiscoError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> GzipSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            encoder: GzEncoder::new(writer, Compression::default()),
            records: 0,
            finished: false,
        }
    }

    /// Number of records written so far
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Finishes the stream and returns the underlying writer
    pub fn into_inner(mut self) -> Result<W, DiscoError> {
        self.finish()?;
        Ok(self.encoder.finish()?)
    }
}

impl<W: Write> RecordSink for GzipSink<W> {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), DiscoError> {
        if self.finished {
            return Err(DiscoError::SinkFinished);
        }

        let line = record.to_line();
        if !line.is_ascii() {
            return Err(DiscoError::NonAsciiRecord(record.to_string()));
        }

        self.encoder.write_all(line.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DiscoError> {
        if self.finished {
            return Ok(());
        }

        self.encoder.try_finish()?;
        self.encoder.get_mut().flush()?;
        self.finished = true;
        Ok(())
    }
}

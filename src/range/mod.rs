//! Candidate ID ranges
//!
//! A scan covers an inclusive `[start, end]` range of IDs. Ranges arrive
//! either as two integers or as a tracker item name such as `page:0-199`.

use crate::DiscoError;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Identifier of one probed resource
pub type CandidateId = u64;

/// Inclusive range of candidate IDs, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    start: CandidateId,
    end: CandidateId,
}

impl ScanRange {
    /// Creates a range, rejecting `end < start`
    pub fn new(start: CandidateId, end: CandidateId) -> Result<Self, DiscoError> {
        if end < start {
            return Err(DiscoError::InvalidRange(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses a tracker item name of the form `page:<start>-<end>`
    ///
    /// Any item type other than `page` is rejected.
    pub fn from_item_name(item: &str) -> Result<Self, DiscoError> {
        let (item_type, value) = item
            .split_once(':')
            .ok_or_else(|| DiscoError::InvalidRange(format!("malformed item name '{}'", item)))?;

        if item_type != "page" {
            return Err(DiscoError::InvalidRange(format!(
                "unhandled item type: {}",
                item_type
            )));
        }

        value.parse()
    }

    pub fn start(&self) -> CandidateId {
        self.start
    }

    pub fn end(&self) -> CandidateId {
        self.end
    }

    /// Number of IDs covered, saturating at `u64::MAX` for the full ID space
    pub fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// A valid range always covers at least one ID
    pub fn is_empty(&self) -> bool {
        false
    }

    /// IDs in ascending order
    pub fn ids(&self) -> RangeInclusive<CandidateId> {
        self.start..=self.end
    }
}

impl FromStr for ScanRange {
    type Err = DiscoError;

    /// Parses `<start>-<end>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| DiscoError::InvalidRange(format!("expected <start>-<end>, got '{}'", s)))?;

        let parse = |part: &str| {
            part.trim().parse::<CandidateId>().map_err(|e| {
                DiscoError::InvalidRange(format!("invalid id '{}' in '{}': {}", part, s, e))
            })
        };

        Self::new(parse(start)?, parse(end)?)
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

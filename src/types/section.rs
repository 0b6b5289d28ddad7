//! Contiguous runs of an axis value

use serde::{Deserialize, Serialize};

/// A contiguous run of traces over which an axis field advanced by the
/// expected step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    /// Axis value of the first trace in the run (never negative)
    pub start: i64,
    /// Axis value of the last trace in the run (never negative)
    pub end: i64,
    /// Byte offset of the first trace header of the run
    pub offset: u64,
    /// Byte offset just past the last trace of the run
    pub end_offset: u64,
}

impl Section {
    /// Create a section; negative axis values clamp to 0.
    pub fn new(start: i64, end: i64, offset: u64, end_offset: u64) -> Self {
        Self { start: start.max(0), end: end.max(0), offset, end_offset }
    }

    /// Number of axis steps covered by the run for a given increment.
    pub fn steps(&self, increment: i64) -> u64 {
        if increment == 0 {
            return 1;
        }
        ((self.end - self.start) / increment).unsigned_abs() + 1
    }

    /// Byte length of the run in the file.
    pub fn byte_len(&self) -> u64 {
        self.end_offset.saturating_sub(self.offset)
    }
}

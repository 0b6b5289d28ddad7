//! Header-only trace records

use serde::{Deserialize, Serialize};

use super::DataSampleCode;
use crate::segy::TraceHeader;

/// One trace as yielded by sequential iteration.
///
/// Only the header is materialised; the sample payload is skipped on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteTrace {
    /// Position in iteration order, counted from the first trace read after the last rewind
    pub index: u64,
    /// Byte offset of the trace header in the file
    pub offset: u64,
    /// Total bytes of the trace on disk (header plus samples)
    pub length: u64,
    /// Decoded trace header
    pub header: TraceHeader,
    /// Sample format from the binary header
    pub sample_format: DataSampleCode,
}

impl LiteTrace {
    /// Bytes of sample data following the header.
    pub fn data_length(&self) -> u64 {
        self.header.number_of_samples.max(0) as u64 * self.sample_format.size() as u64
    }

    /// Byte offset of the next trace header.
    pub fn end_offset(&self) -> u64 {
        self.offset + self.length
    }
}

//! Grid shape validation
//!
//! The counts are estimated from three traces only (first, second, last) and are
//! accepted when they multiply back to the total trace count. The rounding biases are
//! empirical: crossline counts round up at half steps, inline counts round to nearest.

use serde::Serialize;
use tracing::debug;

use super::candidates::{AxisCandidate, INLINE_CANDIDATES, MAX_INCREMENT, XLINE_CANDIDATES};
use crate::segy::TraceHeader;

const XLINE_COUNT_BIAS: f64 = 1.5;
const INLINE_ESTIMATE_BIAS: f64 = 0.5;
const INLINE_COUNT_BIAS: f64 = 1.5;

/// Accepted inline/crossline layout of a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridConfig {
    /// Index into [`INLINE_CANDIDATES`]
    pub inline_index: usize,
    /// Index into [`XLINE_CANDIDATES`]
    pub xline_index: usize,
    pub inline_count: i64,
    pub xline_count: i64,
    pub inline_increment: i64,
    pub xline_increment: i64,
}

impl GridConfig {
    /// Inline candidate field, `None` when the index is out of range.
    pub fn inline_axis(&self) -> Option<&'static AxisCandidate> {
        INLINE_CANDIDATES.get(self.inline_index)
    }

    pub fn xline_axis(&self) -> Option<&'static AxisCandidate> {
        XLINE_CANDIDATES.get(self.xline_index)
    }

    /// Total traces of the grid.
    pub fn trace_count(&self) -> i64 {
        self.inline_count * self.xline_count
    }
}

/// Search inline candidates (outer) and crossline candidates (inner) for the first
/// pair whose derived counts multiply to `total`.
pub fn check_trace_header_config(
    first: &TraceHeader,
    second: &TraceHeader,
    last: &TraceHeader,
    total: u64,
) -> Option<GridConfig> {
    let total = i64::try_from(total).ok()?;

    for (inline_index, inline) in INLINE_CANDIDATES.iter().enumerate() {
        for (xline_index, xline) in XLINE_CANDIDATES.iter().enumerate() {
            let Some(config) = derive_config(inline, xline, first, second, last, total) else {
                continue;
            };
            let config = GridConfig { inline_index, xline_index, ..config };

            if config.trace_count() == total
                && config.xline_count > 1
                && config.inline_increment.abs() < MAX_INCREMENT
                && config.xline_increment.abs() < MAX_INCREMENT
            {
                debug!(
                    "Grid accepted: {:?} x {:?}, {} x {} traces, increments {} / {}",
                    inline,
                    xline,
                    config.inline_count,
                    config.xline_count,
                    config.inline_increment,
                    config.xline_increment
                );
                return Some(config);
            }
        }
    }

    debug!("No inline/crossline pair explains {} traces", total);
    None
}

/// Counts and increments implied by one candidate pair; indices are left at 0.
fn derive_config(
    inline: &AxisCandidate,
    xline: &AxisCandidate,
    first: &TraceHeader,
    second: &TraceHeader,
    last: &TraceHeader,
    total: i64,
) -> Option<GridConfig> {
    let xline_increment = xline.value(second) - xline.value(first);
    if xline_increment == 0 {
        return None;
    }
    let xline_span = xline.value(last) - xline.value(first);
    let xline_count = (XLINE_COUNT_BIAS + xline_span as f64 / xline_increment as f64) as i64;
    if xline_count <= 1 {
        return None;
    }

    let inline_span = inline.value(last) - inline.value(first);
    if inline_span == 0 {
        return None;
    }
    let estimated_rows = (INLINE_ESTIMATE_BIAS + total as f64 / xline_count as f64) as i64;
    if estimated_rows <= 0 {
        return None;
    }

    let mut inline_increment = inline_span.signum()
        * ((inline_span - 1).unsigned_abs()).div_ceil(estimated_rows.unsigned_abs()) as i64;
    if inline_increment == 0 {
        inline_increment = inline_span;
    }
    let inline_count = (INLINE_COUNT_BIAS + inline_span as f64 / inline_increment as f64) as i64;

    Some(GridConfig {
        inline_index: 0,
        xline_index: 0,
        inline_count,
        xline_count,
        inline_increment,
        xline_increment,
    })
}

//! Axis detection from a handful of trace headers

use std::io::{Read, Seek};
use tracing::debug;

use super::candidates::{INLINE_CANDIDATES, XLINE_CANDIDATES, is_axis_step};
use crate::segy::{SegyStream, TraceHeader};

/// Index into [`XLINE_CANDIDATES`] of the first field that steps forward between
/// the first two traces.
pub fn check_xline_index(first: &TraceHeader, second: &TraceHeader) -> Option<usize> {
    let found = XLINE_CANDIDATES
        .iter()
        .position(|candidate| is_axis_step(candidate.value(second) - candidate.value(first)));

    match found {
        Some(index) => debug!("Crossline axis: {:?}", XLINE_CANDIDATES[index]),
        None => debug!("No crossline candidate steps between the first two traces"),
    }
    found
}

/// Index of the first trace of the second inline row.
///
/// Inline fields that do not increase between traces 0 and 1 are watched while the
/// stream is read trace by trace from index 2; the first trace where one of them
/// increases over its predecessor starts a new row.
pub fn inline_increment_trace<R: Read + Seek>(
    stream: &mut SegyStream<R>,
    samples: i32,
    total: u64,
) -> Option<u64> {
    if total < 3 {
        return None;
    }

    let first = stream.trace_header(0, samples)?;
    let mut previous = stream.trace_header(1, samples)?;

    let watched: Vec<_> = INLINE_CANDIDATES
        .iter()
        .filter(|candidate| candidate.value(&previous) <= candidate.value(&first))
        .collect();
    if watched.is_empty() {
        debug!("Every inline candidate increases along the first row");
        return None;
    }

    for index in 2..total {
        let current = stream.trace_header(index, samples)?;
        if let Some(candidate) =
            watched.iter().find(|candidate| candidate.value(&current) > candidate.value(&previous))
        {
            debug!("Second inline row starts at trace {} ({:?} increased)", index, candidate);
            return Some(index);
        }
        previous = current;
    }

    debug!("No inline row boundary in {} traces", total);
    None
}

/// Index into [`INLINE_CANDIDATES`] of the first field that is constant along the
/// first row and steps forward into the next row.
pub fn check_inline_index(
    first: &TraceHeader,
    second: &TraceHeader,
    next_row: &TraceHeader,
) -> Option<usize> {
    let found = INLINE_CANDIDATES.iter().position(|candidate| {
        candidate.value(first) == candidate.value(second)
            && is_axis_step(candidate.value(next_row) - candidate.value(second))
    });

    match found {
        Some(index) => debug!("Inline axis: {:?}", INLINE_CANDIDATES[index]),
        None => debug!("No inline candidate steps into the next row"),
    }
    found
}

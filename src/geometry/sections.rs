//! Contiguous-run scan along one axis

use serde::Serialize;
use std::io::{Read, Seek};
use tracing::{debug, info};

use super::candidates::AxisCandidate;
use crate::segy::SegyStream;
use crate::types::Section;

/// Result of walking every trace along one axis field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionScan {
    /// Runs in file order
    pub sections: Vec<Section>,
    /// Smallest axis value seen
    pub min: i64,
    /// Largest axis value seen
    pub max: i64,
    /// Largest positive step between adjacent traces, if any
    pub largest_jump: Option<i64>,
    /// Index of the trace following that step; a likely row start when steps are irregular
    pub largest_jump_trace: Option<u64>,
    /// Traces read
    pub traces: u64,
}

impl SectionScan {
    /// True when some run stops short of the axis maximum or starts after its minimum.
    pub fn has_gaps(&self) -> bool {
        let (min, max) = (self.min.max(0), self.max.max(0));
        self.sections.iter().any(|section| section.end < max || section.start > min)
    }
}

/// Walk the whole stream from the first trace, splitting it into runs over which
/// `axis` advances by exactly `expected_increment`.
///
/// Returns `None` when the stream cannot be rewound or holds no traces. The cursor is
/// left at the end of the data.
pub fn scan_sections<R: Read + Seek>(
    stream: &mut SegyStream<R>,
    axis: &AxisCandidate,
    expected_increment: i64,
) -> Option<SectionScan> {
    if !stream.rewind() {
        return None;
    }

    let mut traces = stream.by_ref();
    let first = traces.next()?;

    let mut run_start = axis.value(&first.header);
    let mut run_offset = first.offset;
    let mut previous = run_start;
    let mut previous_end = first.end_offset();
    let mut scan = SectionScan {
        sections: Vec::new(),
        min: run_start,
        max: run_start,
        largest_jump: None,
        largest_jump_trace: None,
        traces: 1,
    };

    for trace in traces {
        let value = axis.value(&trace.header);
        let delta = value - previous;

        if delta > 0 && scan.largest_jump.is_none_or(|largest| delta > largest) {
            scan.largest_jump = Some(delta);
            scan.largest_jump_trace = Some(trace.index);
        }

        if delta != expected_increment {
            scan.sections.push(Section::new(run_start, previous, run_offset, previous_end));
            run_start = value;
            run_offset = trace.offset;
        }

        scan.min = scan.min.min(value);
        scan.max = scan.max.max(value);
        scan.traces += 1;
        previous = value;
        previous_end = trace.end_offset();
    }
    scan.sections.push(Section::new(run_start, previous, run_offset, previous_end));

    info!(
        "Scanned {} traces along {:?}: {} sections, range {}..={}",
        scan.traces,
        axis,
        scan.sections.len(),
        scan.min,
        scan.max
    );
    if scan.has_gaps() {
        debug!("Sections do not all span the full axis range");
    }
    Some(scan)
}

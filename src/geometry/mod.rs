//! Survey geometry inference
//!
//! Works out which trace header fields carry the inline and crossline numbers, how
//! many rows and columns the survey has, and whether traces are missing.
//!
//! The building blocks operate on a few headers fetched by random access:
//!
//! 1. [`check_xline_index`] picks the crossline field from traces 0 and 1
//! 2. [`inline_increment_trace`] finds the first trace of the second row
//! 3. [`check_inline_index`] picks the inline field from traces 0, 1 and that row start
//! 4. [`check_trace_header_config`] validates grid counts against the trace total
//! 5. [`scan_sections`] walks every trace along the crossline field and records runs
//!
//! [`infer_geometry`] chains them into a [`GeometryReport`]. Nothing here returns an
//! error: an ungridded survey is a normal outcome.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sigrun::{GeometryOutcome, Sigrun, geometry};
//!
//! # fn main() -> sigrun::Result<()> {
//! let mut stream = Sigrun::open("survey.sgy")?;
//! let samples = stream.binary_header().samples_per_trace;
//! let report = geometry::infer_geometry(&mut stream, samples);
//!
//! match report.outcome() {
//!     GeometryOutcome::Gridded(grid) => {
//!         println!("{} inlines x {} crosslines", grid.inline_count, grid.xline_count)
//!     }
//!     GeometryOutcome::Ungridded(reason) => println!("no grid: {:?}", reason),
//! }
//! # Ok(())
//! # }
//! ```

mod candidates;
mod detect;
mod grid;
mod sections;


pub use candidates::{AxisCandidate, INLINE_CANDIDATES, MAX_INCREMENT, XLINE_CANDIDATES};
pub use detect::{check_inline_index, check_xline_index, inline_increment_trace};
pub use grid::{GridConfig, check_trace_header_config};
pub use sections::{SectionScan, scan_sections};

use serde::Serialize;
use std::io::{Read, Seek};
use tracing::info;

use crate::segy::SegyStream;

/// Why no grid could be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UngriddedReason {
    /// File size is not a whole number of equal-length traces
    IrregularFile,
    /// Fewer than two traces
    TooFewTraces,
    /// A header needed for detection could not be read
    Unreadable,
    NoCrosslineAxis,
    NoInlineAxis,
    /// No inline/crossline pair explains the trace count
    NoGridConfig,
    /// The grid counts fit but some rows are incomplete
    MissingTraces,
}

/// Final verdict of [`infer_geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeometryOutcome {
    Gridded(GridConfig),
    Ungridded(UngriddedReason),
}

/// Everything [`infer_geometry`] learned about a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeometryReport {
    pub total_traces: Option<u64>,
    /// Index into [`XLINE_CANDIDATES`]
    pub xline_index: Option<usize>,
    /// Index into [`INLINE_CANDIDATES`]
    pub inline_index: Option<usize>,
    /// First trace of the second inline row
    pub next_row_trace: Option<u64>,
    pub grid: Option<GridConfig>,
    pub sections: Option<SectionScan>,
    outcome: GeometryOutcome,
}

impl GeometryReport {
    fn ungridded(total_traces: Option<u64>, reason: UngriddedReason) -> Self {
        Self {
            total_traces,
            xline_index: None,
            inline_index: None,
            next_row_trace: None,
            grid: None,
            sections: None,
            outcome: GeometryOutcome::Ungridded(reason),
        }
    }

    pub fn outcome(&self) -> &GeometryOutcome {
        &self.outcome
    }

    pub fn is_gridded(&self) -> bool {
        matches!(self.outcome, GeometryOutcome::Gridded(_))
    }

    pub fn xline_axis(&self) -> Option<&'static AxisCandidate> {
        self.xline_index.and_then(|index| XLINE_CANDIDATES.get(index))
    }

    pub fn inline_axis(&self) -> Option<&'static AxisCandidate> {
        self.inline_index.and_then(|index| INLINE_CANDIDATES.get(index))
    }
}

/// Infer the inline/crossline grid of a stream whose traces hold `samples` samples.
///
/// Reads the first, second and last trace and the start of the second row by random
/// access, then scans every trace along the crossline axis. The stream's cursor is
/// left at the end of the data; rewind before iterating again.
pub fn infer_geometry<R: Read + Seek>(stream: &mut SegyStream<R>, samples: i32) -> GeometryReport {
    let Some(total) = stream.number_of_traces(samples) else {
        return GeometryReport::ungridded(None, UngriddedReason::IrregularFile);
    };
    if total < 2 {
        return GeometryReport::ungridded(Some(total), UngriddedReason::TooFewTraces);
    }

    let headers = (
        stream.trace_header(0, samples),
        stream.trace_header(1, samples),
        stream.trace_header(total - 1, samples),
    );
    let (Some(first), Some(second), Some(last)) = headers else {
        return GeometryReport::ungridded(Some(total), UngriddedReason::Unreadable);
    };

    let mut report = GeometryReport::ungridded(Some(total), UngriddedReason::NoCrosslineAxis);

    report.xline_index = check_xline_index(&first, &second);
    let Some(detected_xline) = report.xline_axis() else {
        return report;
    };

    report.next_row_trace = inline_increment_trace(stream, samples, total);
    let next_row = report.next_row_trace.and_then(|index| stream.trace_header(index, samples));
    report.inline_index =
        next_row.and_then(|next_row| check_inline_index(&first, &second, &next_row));
    if report.inline_index.is_none() {
        report.outcome = GeometryOutcome::Ungridded(UngriddedReason::NoInlineAxis);
        return report;
    }

    report.grid = check_trace_header_config(&first, &second, &last, total);

    let grid_axis = report
        .grid
        .as_ref()
        .and_then(|grid| grid.xline_axis().map(|axis| (axis, grid.xline_increment)));
    let (axis, increment) = grid_axis.unwrap_or_else(|| {
        (detected_xline, detected_xline.value(&second) - detected_xline.value(&first))
    });
    report.sections = scan_sections(stream, axis, increment);

    let has_gaps = report.sections.as_ref().is_none_or(SectionScan::has_gaps);
    report.outcome = match report.grid {
        Some(grid) if !has_gaps => GeometryOutcome::Gridded(grid),
        Some(_) => GeometryOutcome::Ungridded(UngriddedReason::MissingTraces),
        None => GeometryOutcome::Ungridded(UngriddedReason::NoGridConfig),
    };

    info!("Geometry inference over {} traces: {:?}", total, report.outcome);
    report
}

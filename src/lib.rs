//! SEG-Y header decoding and survey geometry inference.
//!
//! Sigrun reads the fixed-layout headers of SEG-Y seismic files through configurable
//! field layouts, streams trace headers sequentially or by index, and infers the
//! inline/crossline grid a survey was recorded on.
//!
//! # Features
//!
//! - **Configurable layouts**: byte ranges validated once, loadable from YAML
//! - **Header-only streaming**: sample payloads are skipped on disk, never decoded
//! - **Random access**: closed-form trace offsets for regular files
//! - **Geometry inference**: axis field detection, grid counts and missing-trace runs
//!
//! ## Example
//!
//! ```rust,no_run
//! use sigrun::{Sigrun, geometry};
//!
//! fn main() -> sigrun::Result<()> {
//!     let mut stream = Sigrun::open("survey.sgy")?;
//!     for line in stream.text_header().printable_lines().iter().take(3) {
//!         println!("{}", line);
//!     }
//!
//!     let samples = stream.binary_header().samples_per_trace;
//!     let report = geometry::infer_geometry(&mut stream, samples);
//!     println!("{:?}", report.outcome());
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod progress;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// File format and analysis
pub mod geometry;
pub mod segy;

// Core exports
pub use config::SegyFormat;
pub use error::*;
pub use progress::{ListenerId, ListenerRegistry, ProgressListener};
pub use types::*;

// Main API exports
pub use geometry::{GeometryOutcome, GeometryReport, GridConfig, SectionScan};
pub use segy::{BinaryHeader, SegyStream, TextHeader, TraceHeader};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Unified entry point for opening SEG-Y files.
///
/// # Examples
///
/// ```rust,no_run
/// use sigrun::{Sigrun, SegyFormat, ListenerRegistry};
/// use std::sync::Arc;
///
/// # fn main() -> sigrun::Result<()> {
/// let format = SegyFormat::from_path("vendor-layout.yaml")?;
/// let listeners = Arc::new(ListenerRegistry::new());
/// listeners.register(Arc::new(|offset: u64| println!("{} bytes read", offset)));
///
/// let stream = Sigrun::open_with("survey.sgy", format, listeners)?;
/// # Ok(())
/// # }
/// ```
pub struct Sigrun;

impl Sigrun {
    /// Open a SEG-Y file with the standard layouts.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is not readable
    /// - File is shorter than the text and binary headers
    /// - The binary header's data sample code is unknown
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SegyStream<BufReader<File>>> {
        Self::open_with(path, SegyFormat::standard(), Arc::new(ListenerRegistry::new()))
    }

    /// Open a SEG-Y file with custom layouts and a listener registry.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        format: SegyFormat,
        listeners: Arc<ListenerRegistry>,
    ) -> Result<SegyStream<BufReader<File>>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SegyError::file_error(path.to_path_buf(), e))?;
        SegyStream::new(BufReader::new(file), format, listeners)
    }
}

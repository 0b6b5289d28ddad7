//! Synthetic SEG-Y files for tests and benchmarks
//!
//! [`SyntheticSegy`] assembles a complete file in memory from decoded headers, so tests
//! can describe a survey by its field values instead of byte offsets.

#![cfg(any(test, feature = "benchmark"))]

use std::io::Cursor;
use std::sync::Arc;

use crate::progress::ListenerRegistry;
use crate::segy::{BinaryHeader, SegyStream, TextHeader, TraceHeader};
use crate::types::DataSampleCode;
use crate::{Result, SegyFormat};

/// First inline number of [`SyntheticSegy::grid`].
pub const GRID_FIRST_INLINE: i32 = 100;
/// First crossline number of [`SyntheticSegy::grid`].
pub const GRID_FIRST_CROSSLINE: i32 = 1000;

/// In-memory SEG-Y file builder.
#[derive(Debug, Clone)]
pub struct SyntheticSegy {
    format: SegyFormat,
    text: TextHeader,
    binary: BinaryHeader,
    sample_format: DataSampleCode,
    traces: Vec<TraceHeader>,
}

impl SyntheticSegy {
    /// Empty file with `samples` samples per trace.
    pub fn new(samples: i32, sample_format: DataSampleCode) -> Self {
        let text = TextHeader::from_lines((1..=40).map(|line| match line {
            1 => "C 1 CLIENT SIGRUN TEST SUITE".to_string(),
            2 => "C 2 SYNTHETIC SURVEY".to_string(),
            40 => "C40 END TEXTUAL HEADER".to_string(),
            n => format!("C{:2}", n),
        }));

        let binary = BinaryHeader {
            line_number: 1,
            sample_interval: 4000,
            samples_per_trace: samples,
            data_sample_code: sample_format.code(),
            format_revision: 0x0100,
            fixed_length_trace_flag: 1,
            ..Default::default()
        };

        Self { format: SegyFormat::standard(), text, binary, sample_format, traces: Vec::new() }
    }

    /// Regular grid of `inlines` rows by `crosslines` columns, crossline varying fastest.
    ///
    /// Inline numbers start at [`GRID_FIRST_INLINE`] and crossline numbers at
    /// [`GRID_FIRST_CROSSLINE`], both with a step of 1, in the standard inline and
    /// crossline fields.
    pub fn grid(inlines: usize, crosslines: usize, samples: i32) -> Self {
        Self::grid_with(inlines, crosslines, samples, |header, row, column| {
            header.inline = GRID_FIRST_INLINE + row as i32;
            header.crossline = GRID_FIRST_CROSSLINE + column as i32;
        })
    }

    /// Regular grid whose axis fields are written by `encode(header, row, column)`.
    pub fn grid_with<F>(inlines: usize, crosslines: usize, samples: i32, mut encode: F) -> Self
    where
        F: FnMut(&mut TraceHeader, usize, usize),
    {
        let mut synthetic = Self::new(samples, DataSampleCode::IeeeFloat32);
        for row in 0..inlines {
            for column in 0..crosslines {
                let mut header = TraceHeader {
                    trace_sequence_line: column as i32 + 1,
                    trace_sequence_file: synthetic.traces.len() as i32 + 1,
                    number_of_samples: samples,
                    ..Default::default()
                };
                encode(&mut header, row, column);
                synthetic.traces.push(header);
            }
        }
        synthetic
    }

    /// Encode with different layouts.
    pub fn with_format(mut self, format: SegyFormat) -> Self {
        self.format = format;
        self
    }

    pub fn push_trace(&mut self, header: TraceHeader) -> &mut Self {
        self.traces.push(header);
        self
    }

    /// Drop one trace, shifting the following ones down.
    pub fn remove_trace(&mut self, index: usize) -> TraceHeader {
        self.traces.remove(index)
    }

    pub fn traces(&self) -> &[TraceHeader] {
        &self.traces
    }

    pub fn trace_mut(&mut self, index: usize) -> &mut TraceHeader {
        &mut self.traces[index]
    }

    pub fn binary_mut(&mut self) -> &mut BinaryHeader {
        &mut self.binary
    }

    pub fn format(&self) -> &SegyFormat {
        &self.format
    }

    /// Serialize headers and zeroed samples.
    ///
    /// Every trace carries the binary header's sample count on disk, whatever its own
    /// header declares.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header_length = self.format.header_length();
        let trace_header_size = self.format.trace.size();
        let data_length = self.binary.samples_per_trace.max(0) as usize * self.sample_format.size();

        let mut bytes = Vec::with_capacity(
            header_length + self.traces.len() * (trace_header_size + data_length),
        );
        bytes.resize(header_length, 0);

        let (text, binary) = bytes.split_at_mut(self.format.text.size());
        self.text.encode(&self.format.text, text)?;
        self.binary.encode(&self.format.binary, binary)?;

        let mut buf = vec![0u8; trace_header_size];
        for header in &self.traces {
            buf.fill(0);
            header.encode(&self.format.trace, &mut buf)?;
            bytes.extend_from_slice(&buf);
            bytes.resize(bytes.len() + data_length, 0);
        }
        Ok(bytes)
    }

    /// Open the serialized file as a stream with no listeners.
    pub fn open(&self) -> Result<SegyStream<Cursor<Vec<u8>>>> {
        SegyStream::new(
            Cursor::new(self.to_bytes()?),
            self.format.clone(),
            Arc::new(ListenerRegistry::new()),
        )
    }
}

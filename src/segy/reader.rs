//! Sequential and random-access SEG-Y trace reader
//!
//! [`SegyStream`] owns a seekable byte source with a single read cursor. The text and
//! binary headers are decoded once at construction; afterwards traces can be walked in
//! file order (header only, the samples are skipped on disk) or fetched by index using
//! the closed-form offset of a regular file.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sigrun::Sigrun;
//!
//! fn scan() -> sigrun::Result<()> {
//!     let mut stream = Sigrun::open("survey.sgy")?;
//!     let samples = stream.binary_header().samples_per_trace;
//!     println!("{:?} traces", stream.number_of_traces(samples));
//!
//!     for trace in stream.traces() {
//!         println!("trace {} inline {}", trace.index, trace.header.inline);
//!     }
//!
//!     if let Some(header) = stream.trace_header(10, samples) {
//!         println!("trace 10 crossline {}", header.crossline);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Model
//!
//! Missing or truncated text/binary headers fail construction with
//! [`SegyError::NotSegy`]. Once the stream is open, trace access never returns an
//! error: a truncated trace, a negative sample count or a failing source is logged,
//! the source is dropped and the read reports "no data". A closed stream cannot be
//! resumed.

use std::io::{self, Read, Seek, SeekFrom};
use std::mem;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use super::format::{BinaryHeader, TextHeader, TraceHeader};
use crate::config::SegyFormat;
use crate::progress::{ListenerId, ListenerRegistry, ProgressListener};
use crate::types::{DataSampleCode, LiteTrace};
use crate::{Result, SegyError};

/// One-trace lookahead slot driving sequential iteration.
#[derive(Debug)]
enum Lookahead {
    /// Nothing read ahead yet
    Empty,
    /// Trace read and waiting to be yielded
    Pending(LiteTrace),
    /// End of data, truncation or closed source
    Exhausted,
}

/// Outcome of reading one trace header at the cursor.
enum HeaderRead {
    Header(TraceHeader),
    /// Clean end of file: not a single byte left
    End,
    Failed(String),
}

/// SEG-Y reader over any seekable byte source.
pub struct SegyStream<R> {
    source: Option<R>,
    format: SegyFormat,
    text_header: TextHeader,
    binary_header: BinaryHeader,
    sample_format: DataSampleCode,
    header_length: u64,
    file_size: u64,
    position: u64,
    next_index: u64,
    lookahead: Lookahead,
    listeners: Arc<ListenerRegistry>,
}

impl<R: Read + Seek> SegyStream<R> {
    /// Decode the text and binary headers of `source` and position the cursor at the
    /// first trace.
    pub fn new(mut source: R, format: SegyFormat, listeners: Arc<ListenerRegistry>) -> Result<Self> {
        let file_size = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let text_header = TextHeader::parse_from_reader(&mut source, &format.text)?;
        listeners.notify(format.text.size() as u64);

        let binary_header = BinaryHeader::parse_from_reader(&mut source, &format.binary)?;
        let header_length = format.header_length() as u64;
        listeners.notify(header_length);

        let sample_format = binary_header.sample_format()?;

        info!(
            "Opened SEG-Y stream: {} bytes, {} samples/trace, {}",
            file_size, binary_header.samples_per_trace, sample_format
        );

        Ok(Self {
            source: Some(source),
            format,
            text_header,
            binary_header,
            sample_format,
            header_length,
            file_size,
            position: header_length,
            next_index: 0,
            lookahead: Lookahead::Empty,
            listeners,
        })
    }

    /// True when another trace can be read sequentially.
    ///
    /// Reads ahead at most one trace; repeated calls do not move the cursor.
    pub fn has_next(&mut self) -> bool {
        if matches!(self.lookahead, Lookahead::Empty) {
            self.lookahead = self.advance();
        }
        matches!(self.lookahead, Lookahead::Pending(_))
    }

    /// Iterate over every trace from the first one.
    pub fn traces(&mut self) -> Traces<'_, R> {
        self.rewind();
        Traces { stream: self }
    }

    /// Read the trace header at the cursor and skip its samples.
    fn advance(&mut self) -> Lookahead {
        if self.source.is_none() {
            return Lookahead::Exhausted;
        }

        let offset = self.position;
        let header = match self.read_trace_header() {
            HeaderRead::Header(header) => header,
            HeaderRead::End => {
                info!("End of SEG-Y stream after {} traces", self.next_index);
                return Lookahead::Exhausted;
            }
            HeaderRead::Failed(reason) => {
                self.close_source(&format!("trace header at offset {}: {}", offset, reason));
                return Lookahead::Exhausted;
            }
        };

        if header.number_of_samples < 0 {
            self.close_source(&format!(
                "trace at offset {} declares {} samples",
                offset, header.number_of_samples
            ));
            return Lookahead::Exhausted;
        }

        let trace = LiteTrace {
            index: self.next_index,
            offset,
            length: self.trace_length(header.number_of_samples),
            header,
            sample_format: self.sample_format,
        };

        let end_offset = trace.end_offset();
        if end_offset > self.file_size {
            self.close_source(&format!(
                "trace {} at offset {} ends at {} beyond file size {}",
                trace.index, offset, end_offset, self.file_size
            ));
            return Lookahead::Exhausted;
        }

        // relative skip keeps a BufReader's buffer when the samples fit inside it
        let skip = end_offset.saturating_sub(self.position);
        let skipped = match (self.source.as_mut(), i64::try_from(skip)) {
            (Some(source), Ok(skip)) => source.seek_relative(skip).map_err(|e| e.to_string()),
            (Some(_), Err(_)) => Err(format!("{} bytes of samples", skip)),
            (None, _) => return Lookahead::Exhausted,
        };
        if let Err(reason) = skipped {
            self.close_source(&format!("skipping samples of trace {}: {}", trace.index, reason));
            return Lookahead::Exhausted;
        }

        trace!("Read trace {} at offset {} ({} bytes)", trace.index, offset, trace.length);
        self.position = end_offset;
        self.next_index += 1;
        self.listeners.notify(end_offset);
        Lookahead::Pending(trace)
    }

    /// Read one trace header at the cursor, tracking the bytes consumed.
    fn read_trace_header(&mut self) -> HeaderRead {
        let Some(source) = self.source.as_mut() else {
            return HeaderRead::Failed("source is closed".to_string());
        };

        let mut buf = vec![0u8; self.format.trace.size()];
        let filled = match read_full(source, &mut buf) {
            Ok(filled) => filled,
            Err(e) => return HeaderRead::Failed(e.to_string()),
        };
        self.position += filled as u64;

        if filled == 0 {
            return HeaderRead::End;
        }
        if filled < buf.len() {
            return HeaderRead::Failed(format!("short read of {} of {} bytes", filled, buf.len()));
        }

        match TraceHeader::decode(&buf, &self.format.trace) {
            Ok(header) => HeaderRead::Header(header),
            Err(e) => HeaderRead::Failed(e.to_string()),
        }
    }

    /// Total byte length of the source, measured at open.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Bytes of text plus binary header preceding the first trace.
    pub fn header_length(&self) -> u64 {
        self.header_length
    }

    pub fn trace_header_size(&self) -> u64 {
        self.format.trace.size() as u64
    }

    /// Bytes per trace for a given sample count; negative counts are treated as 0.
    pub fn trace_length(&self, samples: i32) -> u64 {
        self.trace_header_size() + samples.max(0) as u64 * self.sample_format.size() as u64
    }

    /// True when the trace region divides evenly into traces of `samples` samples.
    pub fn is_regular(&self, samples: i32) -> bool {
        match self.file_size.checked_sub(self.header_length) {
            Some(data) => data % self.trace_length(samples) == 0,
            None => false,
        }
    }

    /// Trace count of a regular file, `None` on a size mismatch.
    pub fn number_of_traces(&self, samples: i32) -> Option<u64> {
        if !self.is_regular(samples) {
            warn!(
                "File size {} does not match {}-byte header plus whole {}-byte traces",
                self.file_size,
                self.header_length,
                self.trace_length(samples)
            );
            return None;
        }
        Some((self.file_size - self.header_length) / self.trace_length(samples))
    }

    /// Read the first trace header without notifying listeners.
    ///
    /// The cursor is left just after that header and the lookahead is dropped;
    /// seek or rewind before iterating again. A missing or truncated first header
    /// closes the stream.
    pub fn peek_trace_header(&mut self) -> Option<TraceHeader> {
        if !self.seek_abs(self.header_length) {
            return None;
        }
        match self.read_trace_header() {
            HeaderRead::Header(header) => {
                debug!("Peeked first trace header at offset {}", self.header_length);
                Some(header)
            }
            HeaderRead::End => {
                self.close_source("no trace header to peek");
                None
            }
            HeaderRead::Failed(reason) => {
                self.close_source(&format!("peeking first trace header: {}", reason));
                None
            }
        }
    }

    /// Random access to trace `index` of a file with `samples` samples per trace.
    ///
    /// Notifies listeners with the offset of trace `index + 1`. A read past the end
    /// or a truncated header closes the stream.
    pub fn trace_header(&mut self, index: u64, samples: i32) -> Option<TraceHeader> {
        let trace_length = self.trace_length(samples);
        let Some(offset) =
            index.checked_mul(trace_length).and_then(|o| o.checked_add(self.header_length))
        else {
            warn!("Offset of trace {} overflows", index);
            return None;
        };

        if !self.seek_abs(offset) {
            return None;
        }

        match self.read_trace_header() {
            HeaderRead::Header(header) => {
                trace!("Random access read of trace {} at offset {}", index, offset);
                self.listeners.notify(offset + trace_length);
                Some(header)
            }
            HeaderRead::End => {
                self.close_source(&format!("trace {} at offset {} is past the end", index, offset));
                None
            }
            HeaderRead::Failed(reason) => {
                self.close_source(&format!("trace {} at offset {}: {}", index, offset, reason));
                None
            }
        }
    }

    /// Move the cursor to an absolute byte offset; false when closed or the seek fails.
    pub fn seek_abs(&mut self, pos: u64) -> bool {
        self.seek(SeekFrom::Start(pos))
    }

    /// Move the cursor relative to its current position.
    pub fn seek_offset(&mut self, delta: i64) -> bool {
        self.seek(SeekFrom::Current(delta))
    }

    fn seek(&mut self, target: SeekFrom) -> bool {
        let Some(source) = self.source.as_mut() else {
            warn!("Seek {:?} on a closed SEG-Y stream", target);
            return false;
        };
        match source.seek(target) {
            Ok(position) => {
                self.position = position;
                self.lookahead = Lookahead::Empty;
                true
            }
            Err(e) => {
                warn!("Seek {:?} failed: {}", target, e);
                false
            }
        }
    }

    /// Move back to the first trace and restart the iteration index.
    pub fn rewind(&mut self) -> bool {
        if !self.seek_abs(self.header_length) {
            return false;
        }
        self.next_index = 0;
        true
    }

    pub fn register_listener(&self, listener: Arc<dyn ProgressListener>) -> ListenerId {
        self.listeners.register(listener)
    }

    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }

    /// Shared handle to the listener registry, for registration from other threads.
    pub fn listeners(&self) -> Arc<ListenerRegistry> {
        Arc::clone(&self.listeners)
    }

    pub fn text_header(&self) -> &TextHeader {
        &self.text_header
    }

    pub fn binary_header(&self) -> &BinaryHeader {
        &self.binary_header
    }

    pub fn sample_format(&self) -> DataSampleCode {
        self.sample_format
    }

    pub fn format(&self) -> &SegyFormat {
        &self.format
    }

    /// Absolute byte offset of the read cursor.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Release the source. Closing twice is an error.
    pub fn close(&mut self) -> Result<()> {
        match self.source.take() {
            Some(_) => {
                info!("Closed SEG-Y stream at offset {}", self.position);
                self.lookahead = Lookahead::Exhausted;
                Ok(())
            }
            None => Err(SegyError::Closed),
        }
    }

    fn close_source(&mut self, reason: &str) {
        warn!("Closing SEG-Y stream: {}", reason);
        self.source = None;
        self.lookahead = Lookahead::Exhausted;
    }
}

impl<R: Read + Seek> Iterator for SegyStream<R> {
    type Item = LiteTrace;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.lookahead, Lookahead::Empty) {
            self.lookahead = self.advance();
        }
        match mem::replace(&mut self.lookahead, Lookahead::Empty) {
            Lookahead::Pending(trace) => Some(trace),
            Lookahead::Exhausted => {
                self.lookahead = Lookahead::Exhausted;
                None
            }
            Lookahead::Empty => None,
        }
    }
}

impl<R> std::fmt::Debug for SegyStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegyStream")
            .field("open", &self.source.is_some())
            .field("file_size", &self.file_size)
            .field("sample_format", &self.sample_format)
            .field("position", &self.position)
            .field("lookahead", &self.lookahead)
            .finish()
    }
}

/// Iterator over every trace of a stream, returned by [`SegyStream::traces`].
#[derive(Debug)]
pub struct Traces<'a, R> {
    stream: &'a mut SegyStream<R>,
}

impl<R: Read + Seek> Iterator for Traces<'_, R> {
    type Item = LiteTrace;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next()
    }
}

/// Fill `buf` from `source`, stopping early only at end of input.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

//! SEG-Y file format support
//!
//! - [`format`]: header sizes, standard field tables and the decoded header types
//! - [`reader`]: [`SegyStream`], sequential and random access to trace headers
//! - [`ebcdic`]: the IBM-1047 code page used by text headers

pub mod ebcdic;
pub mod format;
pub mod reader;

pub use format::{BinaryHeader, TextHeader, TraceHeader};
pub use reader::{SegyStream, Traces};

//! SEG-Y format configuration
//!
//! A [`SegyFormat`] bundles the three field layouts a stream decodes with. The
//! standard layouts follow the SEG-Y rev 1 byte positions; files written by tools
//! that repurpose header slots can be described in YAML:
//!
//! ```yaml
//! text_encoding: ascii          # ebcdic (default), ascii or auto
//! trace_header_size: 256        # optional, at least 240
//! trace:                        # optional, replaces the standard trace table
//!   - { name: inline, start: 220, end: 224 }
//!   - { name: crossline, start: 20, end: 24 }
//! trace_extra:                  # optional, appended to the trace table
//!   - { name: vendor_line, start: 240, end: 244 }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::segy::format::{
    BINARY_FIELDS, BINARY_HEADER_SIZE, TEXT_HEADER_LINES, TEXT_LINE_WIDTH, TRACE_FIELDS,
    TRACE_HEADER_SIZE,
};
use crate::types::{FieldEntry, FieldLayout, TextEncoding};
use crate::{Result, SegyError};

/// The text, binary and trace layouts used to decode one file.
#[derive(Debug, Clone)]
pub struct SegyFormat {
    pub text: FieldLayout,
    pub binary: FieldLayout,
    pub trace: FieldLayout,
}

/// YAML description of a [`SegyFormat`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatDescription {
    pub text_encoding: TextEncoding,
    pub trace_header_size: Option<usize>,
    pub binary: Option<Vec<FieldEntry>>,
    pub trace: Option<Vec<FieldEntry>>,
    pub trace_extra: Vec<FieldEntry>,
}

impl Default for SegyFormat {
    fn default() -> Self {
        Self::standard()
    }
}

impl SegyFormat {
    /// Standard layouts: EBCDIC text header, baseline binary and trace fields.
    pub fn standard() -> Self {
        Self {
            text: standard_text_layout(TextEncoding::Ebcdic),
            binary: FieldLayout::from_trusted("binary", BINARY_HEADER_SIZE, standard_entries(&BINARY_FIELDS)),
            trace: FieldLayout::from_trusted("trace", TRACE_HEADER_SIZE, standard_entries(&TRACE_FIELDS)),
        }
    }

    /// Build a format from explicit layouts.
    pub fn new(text: FieldLayout, binary: FieldLayout, trace: FieldLayout) -> Result<Self> {
        if binary.size() < BINARY_HEADER_SIZE {
            return Err(SegyError::config(format!(
                "binary header layout is {} bytes, expected {}",
                binary.size(),
                BINARY_HEADER_SIZE
            )));
        }
        if trace.size() < TRACE_HEADER_SIZE {
            return Err(SegyError::config(format!(
                "trace header layout is {} bytes, expected at least {}",
                trace.size(),
                TRACE_HEADER_SIZE
            )));
        }
        Ok(Self { text, binary, trace })
    }

    /// Same layouts, different text header encoding.
    pub fn with_text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.text = self.text.with_encoding(encoding);
        self
    }

    pub fn from_description(description: &FormatDescription) -> Result<Self> {
        let text = FieldLayout::card_image("text", TEXT_HEADER_LINES, TEXT_LINE_WIDTH, description.text_encoding)?;

        let binary_entries = match &description.binary {
            Some(entries) => entries.clone(),
            None => standard_entries(&BINARY_FIELDS),
        };
        let binary = FieldLayout::new("binary", BINARY_HEADER_SIZE, binary_entries)?;

        let trace_size = description.trace_header_size.unwrap_or(TRACE_HEADER_SIZE);
        let mut trace_entries = match &description.trace {
            Some(entries) => entries.clone(),
            None => standard_entries(&TRACE_FIELDS),
        };
        trace_entries.extend(description.trace_extra.iter().cloned());
        let trace = FieldLayout::new("trace", trace_size, trace_entries)?;

        debug!(
            "Built SEG-Y format: {:?} text, {} binary fields, {} trace fields over {} bytes",
            description.text_encoding,
            binary.len(),
            trace.len(),
            trace.size()
        );

        Self::new(text, binary, trace)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let description: FormatDescription = serde_yaml_ng::from_str(yaml)
            .map_err(|e| SegyError::config(format!("YAML parsing failed: {}", e)))?;
        Self::from_description(&description)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml =
            fs::read_to_string(path).map_err(|e| SegyError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Bytes before the first trace header.
    pub fn header_length(&self) -> usize {
        self.text.size() + self.binary.size()
    }
}

fn standard_entries(table: &[(&str, usize, usize)]) -> Vec<FieldEntry> {
    table.iter().map(|(name, start, end)| FieldEntry::int(*name, *start, *end)).collect()
}

fn standard_text_layout(encoding: TextEncoding) -> FieldLayout {
    let entries = (0..TEXT_HEADER_LINES)
        .map(|line| {
            FieldEntry::text(
                format!("line_{:02}", line + 1),
                line * TEXT_LINE_WIDTH,
                (line + 1) * TEXT_LINE_WIDTH,
            )
        })
        .collect();
    FieldLayout::from_trusted("text", TEXT_HEADER_LINES * TEXT_LINE_WIDTH, entries).with_encoding(encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layouts_pass_validation() {
        let standard = SegyFormat::standard();
        let validated = SegyFormat::from_description(&FormatDescription::default()).unwrap();

        assert_eq!(standard.text.entries(), validated.text.entries());
        assert_eq!(standard.binary.entries(), validated.binary.entries());
        assert_eq!(standard.trace.entries(), validated.trace.entries());
        assert_eq!(standard.header_length(), 3600);
        assert_eq!(standard.trace.size(), 240);
        assert_eq!(standard.trace.get("inline").unwrap().range(), 188..192);
        assert_eq!(standard.binary.get("data_sample_code").unwrap().range(), 24..26);
    }

    #[test]
    fn yaml_replaces_trace_table() {
        let yaml = r#"
text_encoding: ascii
trace:
  - { name: inline, start: 220, end: 224 }
  - { name: crossline, start: 20, end: 24 }
  - { name: number_of_samples, start: 114, end: 116 }
"#;
        let format = SegyFormat::from_yaml_str(yaml).unwrap();
        assert_eq!(format.text.encoding(), TextEncoding::Ascii);
        assert_eq!(format.trace.len(), 3);
        assert_eq!(format.trace.get("inline").unwrap().range(), 220..224);
        assert_eq!(format.binary.len(), BINARY_FIELDS.len());
    }

    #[test]
    fn yaml_extends_trace_header() {
        let yaml = r#"
trace_header_size: 256
trace_extra:
  - { name: vendor_line, start: 240, end: 244 }
  - { name: vendor_note, start: 244, end: 256, kind: text }
"#;
        let format = SegyFormat::from_yaml_str(yaml).unwrap();
        assert_eq!(format.trace.size(), 256);
        assert_eq!(format.trace.len(), TRACE_FIELDS.len() + 2);
        assert!(format.trace.contains("vendor_note"));
    }

    #[test]
    fn yaml_layout_errors_surface() {
        // extra field collides with the standard inline slot
        let yaml = "trace_extra:\n  - { name: my_inline, start: 188, end: 192 }\n";
        assert!(matches!(SegyFormat::from_yaml_str(yaml), Err(SegyError::Layout { .. })));

        // standard table does not fit a shorter header
        let yaml = "trace_header_size: 200\n";
        assert!(matches!(SegyFormat::from_yaml_str(yaml), Err(SegyError::Layout { .. })));

        let yaml = "trace_header_size: 200\ntrace:\n  - { name: inline, start: 0, end: 4 }\n";
        assert!(matches!(SegyFormat::from_yaml_str(yaml), Err(SegyError::Config { .. })));
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        let result = SegyFormat::from_yaml_str("trace_headers: []\n");
        assert!(matches!(result, Err(SegyError::Config { .. })));
    }

    #[test]
    fn missing_format_file() {
        let result = SegyFormat::from_path("/definitely/not/here/format.yaml");
        assert!(matches!(result, Err(SegyError::File { .. })));
    }
}

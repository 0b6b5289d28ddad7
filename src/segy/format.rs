//! SEG-Y header structures and parsing
//!
//! Defines the three fixed-size headers of a SEG-Y file and decodes them
//! through configurable [`FieldLayout`]s.
//!
//! ## SEG-Y File Structure
//!
//! 1. **Text Header** (3200 bytes) - 40 card images of 80 characters, usually EBCDIC
//! 2. **Binary Header** (400 bytes) - survey-wide scalars (sample interval, sample format, ...)
//! 3. **Traces** - each a trace header (240 bytes) followed by its samples
//!
//! All integers are big-endian two's complement. Trace `i` of a regular file starts at
//! `3600 + i * (240 + samples * sample_size)`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use tracing::{debug, trace};

use crate::types::field_data::{self, DecodedFields, FieldValue};
use crate::types::{DataSampleCode, FieldKind, FieldLayout};
use crate::{Result, SegyError};

/// Size of the text (card image) header in bytes
pub const TEXT_HEADER_SIZE: usize = 3200;
/// Number of card images in the text header
pub const TEXT_HEADER_LINES: usize = 40;
/// Characters per card image
pub const TEXT_LINE_WIDTH: usize = 80;
/// Size of the binary header in bytes
pub const BINARY_HEADER_SIZE: usize = 400;
/// Size of a standard trace header in bytes
pub const TRACE_HEADER_SIZE: usize = 240;

/// Baseline binary header fields: name, start byte, end byte.
pub const BINARY_FIELDS: [(&str, usize, usize); 7] = [
    ("line_number", 4, 8),
    ("sample_interval", 16, 18),
    ("samples_per_trace", 20, 22),
    ("data_sample_code", 24, 26),
    ("format_revision", 300, 302),
    ("fixed_length_trace_flag", 302, 304),
    ("extended_text_headers", 304, 306),
];

/// Baseline trace header fields: name, start byte, end byte.
pub const TRACE_FIELDS: [(&str, usize, usize); 19] = [
    ("trace_sequence_line", 0, 4),
    ("trace_sequence_file", 4, 8),
    ("original_field_record", 8, 12),
    ("trace_number_in_record", 12, 16),
    ("energy_source_point", 16, 20),
    ("ensemble_number", 20, 24),
    ("source_x", 72, 76),
    ("source_y", 76, 80),
    ("number_of_samples", 114, 116),
    ("cdp_x", 180, 184),
    ("cdp_y", 184, 188),
    ("inline", 188, 192),
    ("crossline", 192, 196),
    ("transduction_constant", 204, 208),
    ("transduction_units", 210, 212),
    ("energy_direction_vertical", 218, 220),
    ("source_energy_direction", 220, 224),
    ("source_measurement", 224, 228),
    ("source_measurement_unit", 230, 232),
];

/// Decoded text header: 40 card images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextHeader {
    lines: Vec<String>,
}

impl TextHeader {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }

    pub fn parse_from_reader<R: Read>(reader: &mut R, layout: &FieldLayout) -> Result<Self> {
        let buf = read_header_bytes(reader, layout, "text header")?;
        Self::decode(&buf, layout)
    }

    pub fn decode(buf: &[u8], layout: &FieldLayout) -> Result<Self> {
        let fields = layout.decode(buf)?;
        let lines = fields
            .iter()
            .filter_map(|(_, value)| value.as_text().map(str::to_string))
            .collect::<Vec<_>>();

        debug!("Decoded text header: {} lines", lines.len());
        Ok(Self { lines })
    }

    /// Write the lines into the text fields of `layout`, in declaration order.
    pub fn encode(&self, layout: &FieldLayout, buf: &mut [u8]) -> Result<()> {
        let mut fields = DecodedFields::with_capacity(self.lines.len());
        let text_entries = layout.entries().iter().filter(|e| e.kind == FieldKind::Text);
        for (entry, line) in text_entries.zip(&self.lines) {
            fields.push(entry.name.clone(), FieldValue::Text(line.clone()));
        }
        layout.encode(&fields, buf)
    }

    /// Lines exactly as decoded.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Lines with control characters replaced by spaces.
    pub fn printable_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.chars().map(|c| if c.is_control() { ' ' } else { c }).collect())
            .collect()
    }
}

/// Decoded binary header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryHeader {
    pub line_number: i32,
    /// Sample interval in microseconds
    pub sample_interval: i32,
    pub samples_per_trace: i32,
    /// Raw data sample format code, see [`BinaryHeader::sample_format`]
    pub data_sample_code: i32,
    pub format_revision: i32,
    pub fixed_length_trace_flag: i32,
    pub extended_text_headers: i32,
    /// Configured fields outside the baseline set
    pub extra: BTreeMap<String, i32>,
}

impl BinaryHeader {
    pub fn parse_from_reader<R: Read>(reader: &mut R, layout: &FieldLayout) -> Result<Self> {
        let buf = read_header_bytes(reader, layout, "binary header")?;
        let header = Self::decode(&buf, layout)?;

        debug!(
            "Parsed binary header: line={}, interval={}us, samples={}, format code={}",
            header.line_number,
            header.sample_interval,
            header.samples_per_trace,
            header.data_sample_code
        );
        Ok(header)
    }

    pub fn decode(buf: &[u8], layout: &FieldLayout) -> Result<Self> {
        let (values, extra) = decode_ints(buf, layout, &BINARY_FIELDS)?;
        let [
            line_number,
            sample_interval,
            samples_per_trace,
            data_sample_code,
            format_revision,
            fixed_length_trace_flag,
            extended_text_headers,
        ] = values;

        Ok(Self {
            line_number,
            sample_interval,
            samples_per_trace,
            data_sample_code,
            format_revision,
            fixed_length_trace_flag,
            extended_text_headers,
            extra,
        })
    }

    pub fn encode(&self, layout: &FieldLayout, buf: &mut [u8]) -> Result<()> {
        encode_ints(buf, layout, &self.values(), &self.extra)
    }

    /// Resolve the data sample code to a known sample format.
    pub fn sample_format(&self) -> Result<DataSampleCode> {
        DataSampleCode::from_code(self.data_sample_code)
            .ok_or(SegyError::UnsupportedSampleFormat { code: self.data_sample_code })
    }

    /// Baseline fields by layout name.
    pub fn values(&self) -> [(&'static str, i32); 7] {
        [
            ("line_number", self.line_number),
            ("sample_interval", self.sample_interval),
            ("samples_per_trace", self.samples_per_trace),
            ("data_sample_code", self.data_sample_code),
            ("format_revision", self.format_revision),
            ("fixed_length_trace_flag", self.fixed_length_trace_flag),
            ("extended_text_headers", self.extended_text_headers),
        ]
    }

    /// Look up any decoded field by layout name.
    pub fn field(&self, name: &str) -> Option<i32> {
        lookup(&self.values(), &self.extra, name)
    }
}

/// Decoded trace header.
///
/// Values are taken as-is from the file; whether a field is populated or
/// meaningful is for the geometry engine to work out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceHeader {
    pub trace_sequence_line: i32,
    pub trace_sequence_file: i32,
    pub original_field_record: i32,
    pub trace_number_in_record: i32,
    pub energy_source_point: i32,
    /// Ensemble (CDP) number
    pub ensemble_number: i32,
    pub source_x: i32,
    pub source_y: i32,
    pub number_of_samples: i32,
    pub cdp_x: i32,
    pub cdp_y: i32,
    pub inline: i32,
    pub crossline: i32,
    pub transduction_constant: i32,
    pub transduction_units: i32,
    pub energy_direction_vertical: i32,
    pub source_energy_direction: i32,
    pub source_measurement: i32,
    pub source_measurement_unit: i32,
    /// Configured fields outside the baseline set
    pub extra: BTreeMap<String, i32>,
}

impl TraceHeader {
    pub fn decode(buf: &[u8], layout: &FieldLayout) -> Result<Self> {
        let (values, extra) = decode_ints(buf, layout, &TRACE_FIELDS)?;
        let [
            trace_sequence_line,
            trace_sequence_file,
            original_field_record,
            trace_number_in_record,
            energy_source_point,
            ensemble_number,
            source_x,
            source_y,
            number_of_samples,
            cdp_x,
            cdp_y,
            inline,
            crossline,
            transduction_constant,
            transduction_units,
            energy_direction_vertical,
            source_energy_direction,
            source_measurement,
            source_measurement_unit,
        ] = values;

        trace!("Decoded trace header: inline={}, crossline={}", inline, crossline);

        Ok(Self {
            trace_sequence_line,
            trace_sequence_file,
            original_field_record,
            trace_number_in_record,
            energy_source_point,
            ensemble_number,
            source_x,
            source_y,
            number_of_samples,
            cdp_x,
            cdp_y,
            inline,
            crossline,
            transduction_constant,
            transduction_units,
            energy_direction_vertical,
            source_energy_direction,
            source_measurement,
            source_measurement_unit,
            extra,
        })
    }

    pub fn encode(&self, layout: &FieldLayout, buf: &mut [u8]) -> Result<()> {
        encode_ints(buf, layout, &self.values(), &self.extra)
    }

    /// Baseline fields by layout name.
    pub fn values(&self) -> [(&'static str, i32); 19] {
        [
            ("trace_sequence_line", self.trace_sequence_line),
            ("trace_sequence_file", self.trace_sequence_file),
            ("original_field_record", self.original_field_record),
            ("trace_number_in_record", self.trace_number_in_record),
            ("energy_source_point", self.energy_source_point),
            ("ensemble_number", self.ensemble_number),
            ("source_x", self.source_x),
            ("source_y", self.source_y),
            ("number_of_samples", self.number_of_samples),
            ("cdp_x", self.cdp_x),
            ("cdp_y", self.cdp_y),
            ("inline", self.inline),
            ("crossline", self.crossline),
            ("transduction_constant", self.transduction_constant),
            ("transduction_units", self.transduction_units),
            ("energy_direction_vertical", self.energy_direction_vertical),
            ("source_energy_direction", self.source_energy_direction),
            ("source_measurement", self.source_measurement),
            ("source_measurement_unit", self.source_measurement_unit),
        ]
    }

    /// Look up any decoded field by layout name.
    pub fn field(&self, name: &str) -> Option<i32> {
        lookup(&self.values(), &self.extra, name)
    }
}

/// Read exactly one header's worth of bytes; a short read means the source is not SEG-Y.
fn read_header_bytes<R: Read>(reader: &mut R, layout: &FieldLayout, what: &str) -> Result<Vec<u8>> {
    trace!("Reading {} ({} bytes)", what, layout.size());
    let mut buf = vec![0u8; layout.size()];
    reader.read_exact(&mut buf).map_err(|e| {
        SegyError::not_segy(
            format!("{} reading", what),
            format!("Failed to read {} bytes: {}", layout.size(), e),
        )
    })?;
    Ok(buf)
}

/// Decode the baseline integer fields plus any extra integer fields of the layout.
///
/// Baseline fields the layout does not declare decode as 0.
fn decode_ints<const N: usize>(
    buf: &[u8],
    layout: &FieldLayout,
    baseline: &[(&str, usize, usize); N],
) -> Result<([i32; N], BTreeMap<String, i32>)> {
    if buf.len() < layout.size() {
        return Err(SegyError::Parse {
            context: format!("{} header", layout.name()),
            details: format!("buffer has {} bytes, layout needs {}", buf.len(), layout.size()),
        });
    }

    let mut values = [0i32; N];
    for (slot, (name, _, _)) in values.iter_mut().zip(baseline) {
        if let Some(entry) = layout.get(name).filter(|e| e.kind == FieldKind::Int) {
            *slot = field_data::read_int(buf, entry)?;
        }
    }

    let mut extra = BTreeMap::new();
    for entry in layout.entries() {
        if entry.kind == FieldKind::Int && !baseline.iter().any(|(name, _, _)| *name == entry.name) {
            extra.insert(entry.name.clone(), field_data::read_int(buf, entry)?);
        }
    }

    Ok((values, extra))
}

fn encode_ints(
    buf: &mut [u8],
    layout: &FieldLayout,
    values: &[(&'static str, i32)],
    extra: &BTreeMap<String, i32>,
) -> Result<()> {
    let mut fields = DecodedFields::with_capacity(values.len() + extra.len());
    for (name, value) in values {
        if layout.contains(name) {
            fields.push(*name, FieldValue::Int(*value));
        }
    }
    for (name, value) in extra {
        fields.push(name.clone(), FieldValue::Int(*value));
    }
    layout.encode(&fields, buf)
}

fn lookup(values: &[(&'static str, i32)], extra: &BTreeMap<String, i32>, name: &str) -> Option<i32> {
    values
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, value)| *value)
        .or_else(|| extra.get(name).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegyFormat;
    use crate::segy::ebcdic;
    use crate::types::FieldEntry;

    #[test]
    fn text_header_of_repeated_letters() {
        let format = SegyFormat::standard();
        let buf = vec![0xC1u8; TEXT_HEADER_SIZE]; // EBCDIC 'A'

        let header = TextHeader::decode(&buf, &format.text).unwrap();
        assert_eq!(header.lines().len(), TEXT_HEADER_LINES);
        for line in header.lines() {
            assert_eq!(line, &"A".repeat(TEXT_LINE_WIDTH));
        }
    }

    #[test]
    fn text_header_printable_lines_hide_control_bytes() {
        let format = SegyFormat::standard();
        let mut buf = vec![ebcdic::EBCDIC_SPACE; TEXT_HEADER_SIZE];
        buf[0] = ebcdic::EBCDIC_C;
        buf[1] = 0x00;
        buf[2] = 0x25; // line feed

        let header = TextHeader::decode(&buf, &format.text).unwrap();
        assert_eq!(header.line(0).unwrap().chars().nth(2), Some('\n'));

        let printable = header.printable_lines();
        assert!(printable[0].starts_with("C   "));
        assert!(printable.iter().all(|line| !line.chars().any(char::is_control)));
    }

    #[test]
    fn binary_header_ieee_sample_code() {
        let format = SegyFormat::standard();
        let mut buf = vec![0u8; BINARY_HEADER_SIZE];
        buf[24..26].copy_from_slice(&[0, 5]);
        buf[20..22].copy_from_slice(&1001i16.to_be_bytes());
        buf[16..18].copy_from_slice(&4000i16.to_be_bytes());

        let header = BinaryHeader::decode(&buf, &format.binary).unwrap();
        assert_eq!(header.data_sample_code, 5);
        assert_eq!(header.sample_format().unwrap(), DataSampleCode::IeeeFloat32);
        assert_eq!(header.sample_format().unwrap().size(), 4);
        assert_eq!(header.samples_per_trace, 1001);
        assert_eq!(header.sample_interval, 4000);
        assert_eq!(header.field("samples_per_trace"), Some(1001));
    }

    #[test]
    fn binary_header_unknown_sample_code() {
        let header = BinaryHeader { data_sample_code: 42, ..Default::default() };
        assert!(matches!(
            header.sample_format(),
            Err(SegyError::UnsupportedSampleFormat { code: 42 })
        ));
    }

    #[test]
    fn trace_header_inline_field() {
        let format = SegyFormat::standard();
        let mut buf = vec![0u8; TRACE_HEADER_SIZE];
        buf[188..192].copy_from_slice(&[0, 0, 0, 10]);
        buf[192..196].copy_from_slice(&(-7i32).to_be_bytes());
        buf[114..116].copy_from_slice(&[0x01, 0xF4]);

        let header = TraceHeader::decode(&buf, &format.trace).unwrap();
        assert_eq!(header.inline, 10);
        assert_eq!(header.crossline, -7);
        assert_eq!(header.number_of_samples, 500);
        assert_eq!(header.field("inline"), Some(10));
        assert_eq!(header.field("no_such_field"), None);
    }

    #[test]
    fn trace_header_extra_fields_roundtrip() {
        let mut entries: Vec<FieldEntry> = TRACE_FIELDS
            .iter()
            .map(|(name, start, end)| FieldEntry::int(*name, *start, *end))
            .collect();
        entries.push(FieldEntry::int("vendor_line", 240, 244));
        let layout = FieldLayout::new("trace", 256, entries).unwrap();

        let mut header = TraceHeader { inline: 1200, crossline: 455, ..Default::default() };
        header.extra.insert("vendor_line".to_string(), 77);

        let mut buf = vec![0u8; 256];
        header.encode(&layout, &mut buf).unwrap();
        let decoded = TraceHeader::decode(&buf, &layout).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(decoded.field("vendor_line"), Some(77));
    }

    #[test]
    fn missing_baseline_fields_decode_as_zero() {
        let layout = FieldLayout::new("trace", 240, vec![FieldEntry::int("crossline", 20, 24)]).unwrap();
        let mut buf = vec![0u8; 240];
        buf[20..24].copy_from_slice(&31i32.to_be_bytes());
        buf[188..192].copy_from_slice(&99i32.to_be_bytes());

        let header = TraceHeader::decode(&buf, &layout).unwrap();
        assert_eq!(header.crossline, 31);
        assert_eq!(header.inline, 0);
        assert!(header.extra.is_empty());
    }

    #[test]
    fn short_header_reads_are_structural_errors() {
        let format = SegyFormat::standard();
        let mut cursor = std::io::Cursor::new(vec![0u8; 100]);
        let result = TextHeader::parse_from_reader(&mut cursor, &format.text);
        assert!(matches!(result, Err(SegyError::NotSegy { .. })));

        let mut cursor = std::io::Cursor::new(vec![0u8; 399]);
        let result = BinaryHeader::parse_from_reader(&mut cursor, &format.binary);
        assert!(matches!(result, Err(SegyError::NotSegy { .. })));
    }
}

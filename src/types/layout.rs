//! Header field layouts

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

use super::field_data::{self, DecodedFields, FieldValue};
use crate::segy::ebcdic;
use crate::{Result, SegyError};

/// How the bytes of a field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Big-endian two's complement integer, 2 or 4 bytes wide.
    #[default]
    Int,
    /// Single-byte encoded text.
    Text,
}

/// Single-byte code page used for text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// IBM-1047 EBCDIC, the code page SEG-Y mandates for the text header.
    #[default]
    Ebcdic,
    /// ASCII / Latin-1, written by many modern tools.
    Ascii,
    /// Pick EBCDIC or ASCII from the buffer contents at decode time.
    Auto,
}

impl TextEncoding {
    /// Guess the encoding of a text header buffer.
    ///
    /// Card images start with `C` (`0xC3` in EBCDIC, `0x43` in ASCII). When the
    /// first byte is inconclusive the encoding with more printable bytes wins.
    pub fn detect(bytes: &[u8]) -> TextEncoding {
        match bytes.first() {
            Some(&ebcdic::EBCDIC_C) => return TextEncoding::Ebcdic,
            Some(b'C') => return TextEncoding::Ascii,
            _ => {}
        }

        let ascii_printable = bytes.iter().filter(|b| b.is_ascii_graphic() || **b == b' ').count();
        let ebcdic_printable = bytes
            .iter()
            .map(|&b| ebcdic::decode_byte(b))
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .count();

        if ascii_printable > ebcdic_printable { TextEncoding::Ascii } else { TextEncoding::Ebcdic }
    }

    /// Resolve `Auto` against a concrete buffer.
    pub fn resolve(self, bytes: &[u8]) -> TextEncoding {
        match self {
            TextEncoding::Auto => TextEncoding::detect(bytes),
            other => other,
        }
    }
}

/// One named byte range within a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Field name, unique within its layout
    pub name: String,
    /// First byte of the field (0-based, inclusive)
    pub start: usize,
    /// One past the last byte of the field
    pub end: usize,
    /// Interpretation of the bytes
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldEntry {
    /// Integer field over `start..end`.
    pub fn int(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self { name: name.into(), start, end, kind: FieldKind::Int }
    }

    /// Text field over `start..end`.
    pub fn text(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self { name: name.into(), start, end, kind: FieldKind::Text }
    }

    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Immutable table mapping header field names to byte ranges.
///
/// Every range is checked when the layout is built: it must lie inside the
/// header, must not overlap another range, and integer fields must be 2 or 4
/// bytes wide. Decoding a buffer of at least `size` bytes therefore cannot fail.
#[derive(Debug, Clone)]
pub struct FieldLayout {
    name: String,
    size: usize,
    encoding: TextEncoding,
    entries: Vec<FieldEntry>,
    index_map: HashMap<String, usize>,
}

impl FieldLayout {
    /// Build and validate a layout for a header of `size` bytes.
    pub fn new(name: impl Into<String>, size: usize, entries: Vec<FieldEntry>) -> Result<Self> {
        let name = name.into();

        let mut index_map = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.start >= entry.end || entry.end > size {
                return Err(SegyError::layout(
                    &name,
                    format!(
                        "field '{}' range {}..{} is outside 0..{}",
                        entry.name, entry.start, entry.end, size
                    ),
                ));
            }

            if entry.kind == FieldKind::Int && !matches!(entry.width(), 2 | 4) {
                return Err(SegyError::layout(
                    &name,
                    format!(
                        "integer field '{}' is {} bytes wide (expected 2 or 4)",
                        entry.name,
                        entry.width()
                    ),
                ));
            }

            if index_map.insert(entry.name.clone(), index).is_some() {
                return Err(SegyError::layout(
                    &name,
                    format!("field '{}' is declared twice", entry.name),
                ));
            }
        }

        let mut by_start: Vec<&FieldEntry> = entries.iter().collect();
        by_start.sort_by_key(|entry| entry.start);
        for pair in by_start.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(SegyError::layout(
                    &name,
                    format!(
                        "field '{}' ({}..{}) overlaps '{}' ({}..{})",
                        pair[1].name,
                        pair[1].start,
                        pair[1].end,
                        pair[0].name,
                        pair[0].start,
                        pair[0].end
                    ),
                ));
            }
        }

        Ok(Self { name, size, encoding: TextEncoding::default(), entries, index_map })
    }

    /// Build a layout from a table already known to be valid.
    pub(crate) fn from_trusted(name: &str, size: usize, entries: Vec<FieldEntry>) -> Self {
        let index_map =
            entries.iter().enumerate().map(|(index, entry)| (entry.name.clone(), index)).collect();
        Self { name: name.to_string(), size, encoding: TextEncoding::default(), entries, index_map }
    }

    /// Layout of a card-image text header: `lines` text fields of `width` bytes.
    pub fn card_image(
        name: impl Into<String>,
        lines: usize,
        width: usize,
        encoding: TextEncoding,
    ) -> Result<Self> {
        let entries = (0..lines)
            .map(|line| FieldEntry::text(format!("line_{:02}", line + 1), line * width, (line + 1) * width))
            .collect();
        Ok(Self::new(name, lines * width, entries)?.with_encoding(encoding))
    }

    /// Replace the text encoding used by `Text` fields.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Get a field by name (O(1) lookup).
    pub fn get(&self, name: &str) -> Option<&FieldEntry> {
        self.index_map.get(name).map(|&index| &self.entries[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode every declared field of `buf`.
    pub fn decode(&self, buf: &[u8]) -> Result<DecodedFields> {
        self.check_buffer(buf)?;
        let encoding = self.encoding.resolve(buf);

        let mut fields = DecodedFields::with_capacity(self.entries.len());
        for entry in &self.entries {
            let value = match entry.kind {
                FieldKind::Int => FieldValue::Int(field_data::read_int(buf, entry)?),
                FieldKind::Text => {
                    FieldValue::Text(field_data::read_text(buf, entry, encoding)?)
                }
            };
            fields.push(entry.name.clone(), value);
        }
        Ok(fields)
    }

    /// Write `fields` back into `buf` over the declared ranges.
    ///
    /// Bytes outside the declared ranges are left untouched. Fields missing from
    /// `fields` are skipped; names unknown to the layout are an error.
    pub fn encode(&self, fields: &DecodedFields, buf: &mut [u8]) -> Result<()> {
        self.check_buffer(buf)?;
        let encoding = match self.encoding {
            TextEncoding::Auto => TextEncoding::Ebcdic,
            other => other,
        };

        for (name, value) in fields.iter() {
            let entry = self
                .get(name)
                .ok_or_else(|| SegyError::FieldNotFound { field: name.to_string() })?;
            match (entry.kind, value) {
                (FieldKind::Int, FieldValue::Int(v)) => field_data::write_int(buf, entry, *v)?,
                (FieldKind::Text, FieldValue::Text(s)) => {
                    field_data::write_text(buf, entry, s, encoding)?
                }
                (kind, value) => {
                    return Err(SegyError::Parse {
                        context: format!("{} layout encoding", self.name),
                        details: format!(
                            "field '{}' is {:?} but value is {:?}",
                            entry.name, kind, value
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_buffer(&self, buf: &[u8]) -> Result<()> {
        if buf.len() < self.size {
            return Err(SegyError::Parse {
                context: format!("{} header", self.name),
                details: format!("buffer has {} bytes, layout needs {}", buf.len(), self.size),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_bounds_ranges() {
        let result = FieldLayout::new("binary", 400, vec![FieldEntry::int("revision", 398, 402)]);
        assert!(matches!(result, Err(SegyError::Layout { .. })));

        let result = FieldLayout::new("binary", 400, vec![FieldEntry::int("empty", 10, 10)]);
        assert!(matches!(result, Err(SegyError::Layout { .. })));
    }

    #[test]
    fn rejects_overlapping_ranges() {
        let result = FieldLayout::new(
            "trace",
            240,
            vec![FieldEntry::int("inline", 188, 192), FieldEntry::int("crossline", 190, 194)],
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn rejects_odd_integer_widths_and_duplicates() {
        let result = FieldLayout::new("trace", 240, vec![FieldEntry::int("odd", 0, 3)]);
        assert!(matches!(result, Err(SegyError::Layout { .. })));

        let result = FieldLayout::new(
            "trace",
            240,
            vec![FieldEntry::int("inline", 188, 192), FieldEntry::int("inline", 220, 224)],
        );
        assert!(matches!(result, Err(SegyError::Layout { .. })));
    }

    #[test]
    fn text_fields_may_have_any_width() {
        let layout = FieldLayout::new("note", 7, vec![FieldEntry::text("note", 0, 7)]);
        assert!(layout.is_ok());
    }

    #[test]
    fn card_image_has_forty_eighty_byte_lines() {
        let layout = FieldLayout::card_image("text", 40, 80, TextEncoding::Ebcdic).unwrap();
        assert_eq!(layout.size(), 3200);
        assert_eq!(layout.len(), 40);
        assert_eq!(layout.get("line_01").unwrap().range(), 0..80);
        assert_eq!(layout.get("line_40").unwrap().range(), 3120..3200);
    }

    #[test]
    fn decode_rejects_short_buffers() {
        let layout = FieldLayout::new("binary", 400, vec![FieldEntry::int("code", 24, 26)]).unwrap();
        let result = layout.decode(&[0u8; 399]);
        assert!(matches!(result, Err(SegyError::Parse { .. })));
    }

    #[test]
    fn encode_rejects_unknown_fields() {
        let layout = FieldLayout::new("binary", 400, vec![FieldEntry::int("code", 24, 26)]).unwrap();
        let mut fields = DecodedFields::default();
        fields.push("missing", FieldValue::Int(1));
        let mut buf = [0u8; 400];
        assert!(matches!(layout.encode(&fields, &mut buf), Err(SegyError::FieldNotFound { .. })));
    }

    #[test]
    fn detects_text_encoding() {
        let mut ebcdic_card = vec![0x40u8; 80];
        ebcdic_card[0] = 0xC3;
        assert_eq!(TextEncoding::detect(&ebcdic_card), TextEncoding::Ebcdic);

        let ascii_card = b"C 1 CLIENT ACME".to_vec();
        assert_eq!(TextEncoding::detect(&ascii_card), TextEncoding::Ascii);

        let ascii_body = b"  LINE 001 PROCESSED".to_vec();
        assert_eq!(TextEncoding::detect(&ascii_body), TextEncoding::Ascii);
        assert_eq!(TextEncoding::Auto.resolve(&ascii_body), TextEncoding::Ascii);
        assert_eq!(TextEncoding::Ebcdic.resolve(&ascii_body), TextEncoding::Ebcdic);
    }
}

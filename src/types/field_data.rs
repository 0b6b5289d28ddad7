//! Field value codec: big-endian integers and single-byte text

use serde::{Deserialize, Serialize};

use super::layout::{FieldEntry, TextEncoding};
use crate::segy::ebcdic;
use crate::{Result, SegyError};

/// Decoded value of one header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i32),
    Text(String),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Int(_) => None,
        }
    }
}

/// Field values in layout declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFields {
    values: Vec<(String, FieldValue)>,
}

impl DecodedFields {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { values: Vec::with_capacity(capacity) }
    }

    /// Append a value; a later value for the same name shadows an earlier one.
    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.values.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(FieldValue::as_int)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read a big-endian signed integer field. The width selects `i16` or `i32`.
pub fn read_int(data: &[u8], entry: &FieldEntry) -> Result<i32> {
    let bytes = data.get(entry.range()).ok_or_else(|| out_of_bounds(data, entry))?;

    match *bytes {
        [b0, b1] => Ok(i16::from_be_bytes([b0, b1]) as i32),
        [b0, b1, b2, b3] => Ok(i32::from_be_bytes([b0, b1, b2, b3])),
        _ => Err(SegyError::Parse {
            context: "Integer field decoding".to_string(),
            details: format!("field '{}' is {} bytes wide", entry.name, bytes.len()),
        }),
    }
}

/// Write a big-endian signed integer field.
pub fn write_int(buf: &mut [u8], entry: &FieldEntry, value: i32) -> Result<()> {
    let width = entry.width();
    let len = buf.len();
    let bytes = buf.get_mut(entry.range()).ok_or_else(|| SegyError::Parse {
        context: "Integer field encoding".to_string(),
        details: format!(
            "field '{}' ({}..{}) extends beyond buffer of {} bytes",
            entry.name, entry.start, entry.end, len
        ),
    })?;

    match width {
        2 => {
            let narrow = i16::try_from(value).map_err(|_| SegyError::FieldOverflow {
                field: entry.name.clone(),
                value: value as i64,
            })?;
            bytes.copy_from_slice(&narrow.to_be_bytes());
        }
        4 => bytes.copy_from_slice(&value.to_be_bytes()),
        other => {
            return Err(SegyError::Parse {
                context: "Integer field encoding".to_string(),
                details: format!("field '{}' is {} bytes wide", entry.name, other),
            });
        }
    }
    Ok(())
}

/// Decode a text field, one character per byte.
pub fn read_text(data: &[u8], entry: &FieldEntry, encoding: TextEncoding) -> Result<String> {
    let bytes = data.get(entry.range()).ok_or_else(|| out_of_bounds(data, entry))?;

    Ok(match encoding.resolve(bytes) {
        TextEncoding::Ascii => bytes.iter().map(|&b| char::from(b)).collect(),
        _ => ebcdic::decode(bytes),
    })
}

/// Encode a text field, padding with spaces and truncating to the field width.
///
/// Characters without a single-byte representation are written as `?`.
pub fn write_text(
    buf: &mut [u8],
    entry: &FieldEntry,
    text: &str,
    encoding: TextEncoding,
) -> Result<()> {
    let len = buf.len();
    let bytes = buf.get_mut(entry.range()).ok_or_else(|| SegyError::Parse {
        context: "Text field encoding".to_string(),
        details: format!(
            "field '{}' ({}..{}) extends beyond buffer of {} bytes",
            entry.name, entry.start, entry.end, len
        ),
    })?;

    let encode = |c: char| -> u8 {
        match encoding {
            TextEncoding::Ascii => u8::try_from(c).unwrap_or(b'?'),
            _ => ebcdic::encode_char(c).unwrap_or(ebcdic::EBCDIC_QUESTION),
        }
    };
    let pad = encode(' ');

    let mut chars = text.chars();
    for slot in bytes.iter_mut() {
        *slot = chars.next().map(encode).unwrap_or(pad);
    }
    Ok(())
}

fn out_of_bounds(data: &[u8], entry: &FieldEntry) -> SegyError {
    SegyError::Parse {
        context: "Field decoding".to_string(),
        details: format!(
            "field '{}' ({}..{}) extends beyond buffer of {} bytes",
            entry.name,
            entry.start,
            entry.end,
            data.len()
        ),
    }
}

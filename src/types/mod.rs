//! Core types for SEG-Y header representation.
//!
//! This module provides the foundational data structures shared by the
//! stream reader and the geometry engine.
//!
//! ## Architecture
//!
//! - [`FieldLayout`] maps header field names to validated byte ranges
//! - [`FieldValue`] / [`DecodedFields`] hold the result of applying a layout to a buffer
//! - [`DataSampleCode`] maps the binary header's sample format code to a byte width
//! - [`LiteTrace`] is a header-only trace record produced by sequential reads
//! - [`Section`] is a contiguous run of an axis value found by the gap scan
//!
//! ## Usage Example
//!
//! ```rust
//! use sigrun::types::{FieldEntry, FieldLayout, FieldValue};
//!
//! let layout = FieldLayout::new(
//!     "trace",
//!     240,
//!     vec![FieldEntry::int("inline", 188, 192), FieldEntry::int("number_of_samples", 114, 116)],
//! )
//! .unwrap();
//!
//! let mut header = vec![0u8; 240];
//! header[188..192].copy_from_slice(&[0, 0, 0, 10]);
//! header[114..116].copy_from_slice(&[0x03, 0xE8]);
//!
//! let fields = layout.decode(&header).unwrap();
//! assert_eq!(fields.get("inline"), Some(&FieldValue::Int(10)));
//! assert_eq!(fields.int("number_of_samples"), Some(1000));
//! ```

pub mod field_data;
mod layout;
mod sample_format;
mod section;
mod trace;

pub use field_data::{DecodedFields, FieldValue};
pub use layout::{FieldEntry, FieldKind, FieldLayout, TextEncoding};
pub use sample_format::DataSampleCode;
pub use section::Section;
pub use trace::LiteTrace;

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    const ALL_CODES: [DataSampleCode; 14] = [
        DataSampleCode::IbmFloat32,
        DataSampleCode::Int32,
        DataSampleCode::Int16,
        DataSampleCode::FixedPointWithGain,
        DataSampleCode::IeeeFloat32,
        DataSampleCode::IeeeFloat64,
        DataSampleCode::Int24,
        DataSampleCode::Int8,
        DataSampleCode::Int64,
        DataSampleCode::UInt32,
        DataSampleCode::UInt16,
        DataSampleCode::UInt64,
        DataSampleCode::UInt24,
        DataSampleCode::UInt8,
    ];

    prop_compose! {
        // Non-overlapping integer fields packed into a header of `size` bytes.
        fn arb_int_layout()(
            widths in prop::collection::vec(prop::sample::select(vec![2usize, 4]), 1..24),
            gaps in prop::collection::vec(0usize..6, 24),
            tail in 0usize..16
        ) -> FieldLayout {
            let mut entries = Vec::with_capacity(widths.len());
            let mut cursor = 0;
            for (index, width) in widths.iter().enumerate() {
                cursor += gaps[index];
                entries.push(FieldEntry::int(format!("field_{}", index), cursor, cursor + width));
                cursor += width;
            }
            FieldLayout::new("generated", cursor + tail, entries).unwrap()
        }
    }

    proptest! {
        #[test]
        fn prop_decode_encode_roundtrip_over_declared_ranges(
            layout in arb_int_layout(),
            seed in prop::collection::vec(any::<u8>(), 512)
        ) {
            let original = &seed[..layout.size()];
            let fields = layout.decode(original).unwrap();
            prop_assert_eq!(fields.len(), layout.len());

            let mut rebuilt = vec![0u8; layout.size()];
            layout.encode(&fields, &mut rebuilt).unwrap();

            for entry in layout.entries() {
                prop_assert_eq!(&rebuilt[entry.range()], &original[entry.range()]);
            }
        }

        #[test]
        fn prop_text_roundtrip_is_byte_exact(
            bytes in prop::collection::vec(any::<u8>(), 80),
            ascii in any::<bool>()
        ) {
            let encoding = if ascii { TextEncoding::Ascii } else { TextEncoding::Ebcdic };
            let layout = FieldLayout::new("card", 80, vec![FieldEntry::text("line_01", 0, 80)])
                .unwrap()
                .with_encoding(encoding);

            let fields = layout.decode(&bytes).unwrap();
            let mut rebuilt = vec![0u8; 80];
            layout.encode(&fields, &mut rebuilt).unwrap();
            prop_assert_eq!(rebuilt, bytes);
        }

        #[test]
        fn prop_sample_codes_roundtrip(code in -4i32..24) {
            match DataSampleCode::from_code(code) {
                Some(format) => {
                    prop_assert_eq!(format.code(), code);
                    prop_assert!(matches!(format.size(), 1 | 2 | 3 | 4 | 8));
                }
                None => prop_assert!(!(1..=12).contains(&code) && code != 15 && code != 16),
            }
        }
    }

    #[test]
    fn data_sample_code_sizes() {
        assert_eq!(DataSampleCode::from_code(5).map(|c| c.size()), Some(4));
        assert_eq!(DataSampleCode::IbmFloat32.size(), 4);
        assert_eq!(DataSampleCode::Int16.size(), 2);
        assert_eq!(DataSampleCode::IeeeFloat64.size(), 8);
        assert_eq!(DataSampleCode::Int24.size(), 3);
        assert_eq!(DataSampleCode::Int8.size(), 1);

        for code in ALL_CODES {
            assert_eq!(DataSampleCode::from_code(code.code()), Some(code));
        }
    }

    #[test]
    fn unknown_sample_codes_are_rejected() {
        assert_eq!(DataSampleCode::from_code(0), None);
        assert_eq!(DataSampleCode::from_code(13), None);
        assert_eq!(DataSampleCode::from_code(-5), None);
    }
}

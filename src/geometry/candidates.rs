//! Trace header fields that may carry the inline and crossline axes
//!
//! Writers disagree on where the grid coordinates go, so each axis has a fixed list
//! of fields to try, in priority order. Detection takes the first field that fits.

use serde::Serialize;

use crate::segy::TraceHeader;

/// Increments at or above this bound are never accepted as an axis step.
pub const MAX_INCREMENT: i64 = 1000;

/// One trace header field considered as an axis.
#[derive(Clone, Copy)]
pub struct AxisCandidate {
    /// Trace header field name
    pub field: &'static str,
    /// 1-based byte position of the field in the standard trace header
    pub byte: u16,
    value_of: fn(&TraceHeader) -> i32,
}

impl AxisCandidate {
    /// Value of this field in `header`, widened for difference arithmetic.
    pub fn value(&self, header: &TraceHeader) -> i64 {
        i64::from((self.value_of)(header))
    }
}

impl std::fmt::Debug for AxisCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (byte {})", self.field, self.byte)
    }
}

impl Serialize for AxisCandidate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("AxisCandidate", 2)?;
        state.serialize_field("field", self.field)?;
        state.serialize_field("byte", &self.byte)?;
        state.end()
    }
}

macro_rules! candidate {
    ($field:ident, $byte:expr) => {
        AxisCandidate { field: stringify!($field), byte: $byte, value_of: |header| header.$field }
    };
}

/// Fields that may hold the inline number, highest priority first.
pub static INLINE_CANDIDATES: [AxisCandidate; 7] = [
    candidate!(inline, 189),
    candidate!(source_energy_direction, 221),
    candidate!(transduction_constant, 205),
    candidate!(trace_sequence_file, 5),
    candidate!(original_field_record, 9),
    candidate!(trace_number_in_record, 13),
    candidate!(cdp_x, 181),
];

/// Fields that may hold the crossline number, highest priority first.
pub static XLINE_CANDIDATES: [AxisCandidate; 6] = [
    candidate!(crossline, 193),
    candidate!(ensemble_number, 21),
    candidate!(transduction_units, 211),
    candidate!(source_measurement, 225),
    candidate!(cdp_y, 185),
    candidate!(energy_source_point, 17),
];

/// True for a step that is positive and below [`MAX_INCREMENT`].
pub(crate) fn is_axis_step(delta: i64) -> bool {
    delta > 0 && delta < MAX_INCREMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_read_their_fields() {
        let header = TraceHeader {
            inline: 11,
            source_energy_direction: 22,
            crossline: 33,
            energy_source_point: 44,
            cdp_x: -5,
            ..Default::default()
        };

        assert_eq!(INLINE_CANDIDATES[0].value(&header), 11);
        assert_eq!(INLINE_CANDIDATES[1].value(&header), 22);
        assert_eq!(INLINE_CANDIDATES[6].value(&header), -5);
        assert_eq!(XLINE_CANDIDATES[0].value(&header), 33);
        assert_eq!(XLINE_CANDIDATES[5].value(&header), 44);
    }

    #[test]
    fn byte_labels_match_standard_layout() {
        let format = crate::SegyFormat::standard();
        for candidate in INLINE_CANDIDATES.iter().chain(XLINE_CANDIDATES.iter()) {
            let entry = format.trace.get(candidate.field).unwrap();
            assert_eq!(entry.start + 1, candidate.byte as usize, "{:?}", candidate);
        }
    }

    #[test]
    fn axis_step_bounds() {
        assert!(!is_axis_step(0));
        assert!(!is_axis_step(-3));
        assert!(is_axis_step(1));
        assert!(is_axis_step(999));
        assert!(!is_axis_step(1000));
    }
}

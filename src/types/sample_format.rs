//! Trace sample format codes

use serde::{Deserialize, Serialize};

/// On-disk encoding of trace samples, from the binary header's data sample
/// format code. Only the byte width is used; samples are never decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSampleCode {
    /// 4-byte IBM floating point (code 1)
    IbmFloat32,
    /// 4-byte two's complement integer (code 2)
    Int32,
    /// 2-byte two's complement integer (code 3)
    Int16,
    /// 4-byte fixed point with gain, obsolete (code 4)
    FixedPointWithGain,
    /// 4-byte IEEE floating point (code 5)
    IeeeFloat32,
    /// 8-byte IEEE floating point (code 6)
    IeeeFloat64,
    /// 3-byte two's complement integer (code 7)
    Int24,
    /// 1-byte two's complement integer (code 8)
    Int8,
    /// 8-byte two's complement integer (code 9)
    Int64,
    /// 4-byte unsigned integer (code 10)
    UInt32,
    /// 2-byte unsigned integer (code 11)
    UInt16,
    /// 8-byte unsigned integer (code 12)
    UInt64,
    /// 3-byte unsigned integer (code 15)
    UInt24,
    /// 1-byte unsigned integer (code 16)
    UInt8,
}

impl DataSampleCode {
    /// Look up a binary header code.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(DataSampleCode::IbmFloat32),
            2 => Some(DataSampleCode::Int32),
            3 => Some(DataSampleCode::Int16),
            4 => Some(DataSampleCode::FixedPointWithGain),
            5 => Some(DataSampleCode::IeeeFloat32),
            6 => Some(DataSampleCode::IeeeFloat64),
            7 => Some(DataSampleCode::Int24),
            8 => Some(DataSampleCode::Int8),
            9 => Some(DataSampleCode::Int64),
            10 => Some(DataSampleCode::UInt32),
            11 => Some(DataSampleCode::UInt16),
            12 => Some(DataSampleCode::UInt64),
            15 => Some(DataSampleCode::UInt24),
            16 => Some(DataSampleCode::UInt8),
            _ => None,
        }
    }

    /// The binary header code for this format.
    pub const fn code(&self) -> i32 {
        match self {
            DataSampleCode::IbmFloat32 => 1,
            DataSampleCode::Int32 => 2,
            DataSampleCode::Int16 => 3,
            DataSampleCode::FixedPointWithGain => 4,
            DataSampleCode::IeeeFloat32 => 5,
            DataSampleCode::IeeeFloat64 => 6,
            DataSampleCode::Int24 => 7,
            DataSampleCode::Int8 => 8,
            DataSampleCode::Int64 => 9,
            DataSampleCode::UInt32 => 10,
            DataSampleCode::UInt16 => 11,
            DataSampleCode::UInt64 => 12,
            DataSampleCode::UInt24 => 15,
            DataSampleCode::UInt8 => 16,
        }
    }

    /// Returns the size in bytes of one sample.
    pub const fn size(&self) -> usize {
        match self {
            DataSampleCode::Int8 | DataSampleCode::UInt8 => 1,
            DataSampleCode::Int16 | DataSampleCode::UInt16 => 2,
            DataSampleCode::Int24 | DataSampleCode::UInt24 => 3,
            DataSampleCode::IbmFloat32
            | DataSampleCode::Int32
            | DataSampleCode::FixedPointWithGain
            | DataSampleCode::IeeeFloat32
            | DataSampleCode::UInt32 => 4,
            DataSampleCode::IeeeFloat64 | DataSampleCode::Int64 | DataSampleCode::UInt64 => 8,
        }
    }
}

impl std::fmt::Display for DataSampleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (code {}, {} bytes)", self, self.code(), self.size())
    }
}

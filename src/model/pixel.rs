use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CoreError;

/// Largest integer every pixel type stores exactly (2^53).
pub const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Logical element type of a raster. Values are held as `f64` and are exact for
/// every integer type up to 2^53.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    #[default]
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

/// Integer types in the order they are tried when looking for the smallest fit.
const INTEGER_LADDER: [PixelType; 8] = [
    PixelType::U8,
    PixelType::I8,
    PixelType::U16,
    PixelType::I16,
    PixelType::U32,
    PixelType::I32,
    PixelType::U64,
    PixelType::I64,
];

const UNSIGNED_LADDER: [PixelType; 4] = [
    PixelType::U8,
    PixelType::U16,
    PixelType::U32,
    PixelType::U64,
];

impl PixelType {
    pub fn is_integer(self) -> bool {
        !self.is_float()
    }

    pub fn is_float(self) -> bool {
        matches!(self, PixelType::F32 | PixelType::F64)
    }

    pub fn bits(self) -> u32 {
        match self {
            PixelType::U8 | PixelType::I8 => 8,
            PixelType::U16 | PixelType::I16 => 16,
            PixelType::U32 | PixelType::I32 | PixelType::F32 => 32,
            PixelType::U64 | PixelType::I64 | PixelType::F64 => 64,
        }
    }

    /// Inclusive value range of the type.
    pub fn range(self) -> (f64, f64) {
        match self {
            PixelType::U8 => (0.0, u8::MAX as f64),
            PixelType::U16 => (0.0, u16::MAX as f64),
            PixelType::U32 => (0.0, u32::MAX as f64),
            PixelType::U64 => (0.0, u64::MAX as f64),
            PixelType::I8 => (i8::MIN as f64, i8::MAX as f64),
            PixelType::I16 => (i16::MIN as f64, i16::MAX as f64),
            PixelType::I32 => (i32::MIN as f64, i32::MAX as f64),
            PixelType::I64 => (i64::MIN as f64, i64::MAX as f64),
            PixelType::F32 => (f32::MIN as f64, f32::MAX as f64),
            PixelType::F64 => (f64::MIN, f64::MAX),
        }
    }

    pub fn contains(self, value: f64) -> bool {
        let (min, max) = self.range();
        value >= min && value <= max
    }

    /// Converts a value the way a clipping cast does: clamp to the range, then
    /// truncate towards zero for integer types.
    pub fn cast_value(self, value: f64) -> f64 {
        let (min, max) = self.range();
        match self {
            PixelType::F64 => value,
            PixelType::F32 => value as f32 as f64,
            _ if value.is_nan() => 0.0,
            _ => value.clamp(min, max).trunc(),
        }
    }

    /// Smallest standard integer type holding `[min, max]`; `I64` when nothing fits.
    pub fn smallest_integer_for(min: f64, max: f64) -> PixelType {
        INTEGER_LADDER
            .iter()
            .copied()
            .find(|candidate| candidate.contains(min) && candidate.contains(max))
            .unwrap_or(PixelType::I64)
    }

    /// Next unsigned type able to hold `value`, used when a label outgrows its array.
    pub fn next_unsigned_for(value: f64) -> Option<PixelType> {
        UNSIGNED_LADDER
            .iter()
            .copied()
            .find(|candidate| candidate.contains(value))
    }

    /// Floating point type produced when `self` and `other` are combined and at
    /// least one side is floating point.
    pub fn float_result(self, other: PixelType) -> PixelType {
        let needs_double = |pixel: PixelType| match pixel {
            PixelType::F64 => true,
            PixelType::F32 => false,
            integer => integer.bits() > 16,
        };
        if needs_double(self) || needs_double(other) {
            PixelType::F64
        } else {
            PixelType::F32
        }
    }

    /// Smallest type able to hold every value of both types.
    pub fn common(self, other: PixelType) -> PixelType {
        if self == other {
            return self;
        }
        if self.is_float() || other.is_float() {
            return self.float_result(other);
        }
        let (left_min, left_max) = self.range();
        let (right_min, right_max) = other.range();
        PixelType::smallest_integer_for(left_min.min(right_min), left_max.max(right_max))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PixelType::U8 => "u8",
            PixelType::U16 => "u16",
            PixelType::U32 => "u32",
            PixelType::U64 => "u64",
            PixelType::I8 => "i8",
            PixelType::I16 => "i16",
            PixelType::I32 => "i32",
            PixelType::I64 => "i64",
            PixelType::F32 => "f32",
            PixelType::F64 => "f64",
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PixelType {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let pixel_type = match value.trim().to_ascii_lowercase().as_str() {
            "u8" | "uint8" => PixelType::U8,
            "u16" | "uint16" => PixelType::U16,
            "u32" | "uint32" => PixelType::U32,
            "u64" | "uint64" => PixelType::U64,
            "i8" | "int8" => PixelType::I8,
            "i16" | "int16" => PixelType::I16,
            "i32" | "int32" => PixelType::I32,
            "i64" | "int64" => PixelType::I64,
            "f32" | "float32" => PixelType::F32,
            "f64" | "float64" => PixelType::F64,
            other => {
                return Err(CoreError::InvalidMetadata(format!(
                    "unknown pixel type `{other}`"
                )));
            }
        };
        Ok(pixel_type)
    }
}

//! Characteristic value codecs
//!
//! Every micro:bit characteristic carries a fixed little-endian layout.
//! [`GattValue`] ties a Rust type to that layout:
//!
//! | Layout        | Type                 | Bytes | Wire format                          |
//! |---------------|----------------------|-------|--------------------------------------|
//! | `U8`          | `u8`                 | 1     | raw byte                             |
//! | `I8`          | `i8`                 | 1     | two's complement                     |
//! | `U16`         | `u16`                | 2     | little-endian                        |
//! | `I16`         | `i16`                | 2     | little-endian                        |
//! | `Vector3`     | [`Vector3`]          | 6     | `[x: i16 LE][y: i16 LE][z: i16 LE]`  |
//! | `Calibration` | [`CalibrationState`] | 1     | enum byte                            |
//! | `LedMatrix`   | [`LedMatrix`]        | 5     | one byte per row, bit k = column 4-k |
//! | `Text`        | `String`             | ≤ 20  | UTF-8, no prefix or terminator       |
//! | `Raw`         | `Vec<u8>`            | any   | opaque                               |
//!
//! Decoding a buffer shorter than the layout fails with
//! [`CodecError::TooShort`]. Trailing bytes beyond a fixed layout are ignored.

mod scalar;
mod types;

pub use types::{CalibrationState, LedMatrix, Vector3};

use crate::config::gatt::MAX_VALUE_SIZE;

/// Encoded characteristic value
pub type Payload = heapless::Vec<u8, MAX_VALUE_SIZE>;

/// Errors that can occur while encoding or decoding a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Buffer shorter than the fixed layout requires
    #[error("value too short: expected {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    /// Value does not fit the characteristic
    #[error("value too long: at most {max} bytes, got {actual}")]
    TooLong { max: usize, actual: usize },
    /// Text characteristic held bytes that are not UTF-8
    #[error("value is not valid UTF-8")]
    InvalidUtf8,
}

/// Binary layout declared for a characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueLayout {
    U8,
    I8,
    U16,
    I16,
    Vector3,
    Calibration,
    LedMatrix,
    Text,
    Raw,
}

impl ValueLayout {
    /// Exact encoded width, or `None` for variable-length layouts
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            ValueLayout::U8 | ValueLayout::I8 | ValueLayout::Calibration => Some(1),
            ValueLayout::U16 | ValueLayout::I16 => Some(2),
            ValueLayout::LedMatrix => Some(5),
            ValueLayout::Vector3 => Some(6),
            ValueLayout::Text | ValueLayout::Raw => None,
        }
    }

    /// Whether a value of layout `self` may be used on a characteristic
    /// declared with `declared`. Raw bytes fit anything.
    pub fn compatible_with(self, declared: ValueLayout) -> bool {
        self == ValueLayout::Raw || declared == ValueLayout::Raw || self == declared
    }
}

/// A value that can be carried by a GATT characteristic
pub trait GattValue: Sized {
    /// Wire layout of this type
    const LAYOUT: ValueLayout;

    /// Decode from a characteristic value
    fn decode(data: &[u8]) -> Result<Self, CodecError>;

    /// Encode into a characteristic value
    fn encode(&self) -> Result<Payload, CodecError>;
}

/// Check that `data` holds at least `expected` bytes
pub(crate) fn require_len(data: &[u8], expected: usize) -> Result<(), CodecError> {
    if data.len() < expected {
        return Err(CodecError::TooShort {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Build a payload from a slice that is known to fit
pub(crate) fn payload_from(data: &[u8]) -> Result<Payload, CodecError> {
    Payload::from_slice(data).map_err(|_| CodecError::TooLong {
        max: MAX_VALUE_SIZE,
        actual: data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_lengths() {
        assert_eq!(ValueLayout::U16.fixed_len(), Some(2));
        assert_eq!(ValueLayout::Vector3.fixed_len(), Some(6));
        assert_eq!(ValueLayout::LedMatrix.fixed_len(), Some(5));
        assert_eq!(ValueLayout::Calibration.fixed_len(), Some(1));
        assert_eq!(ValueLayout::Text.fixed_len(), None);
    }

    #[test]
    fn test_layout_compatibility() {
        assert!(ValueLayout::U16.compatible_with(ValueLayout::U16));
        assert!(ValueLayout::Raw.compatible_with(ValueLayout::Vector3));
        assert!(ValueLayout::Text.compatible_with(ValueLayout::Raw));
        assert!(!ValueLayout::I16.compatible_with(ValueLayout::U16));
    }

    #[test]
    fn test_require_len() {
        assert!(require_len(&[1, 2], 2).is_ok());
        assert_eq!(
            require_len(&[1], 2),
            Err(CodecError::TooShort {
                expected: 2,
                actual: 1
            })
        );
    }
}

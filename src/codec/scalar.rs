//! Integer, text and raw byte codecs

use super::{payload_from, require_len, CodecError, GattValue, Payload, ValueLayout};
use crate::config::led::TEXT_MAX_LEN;

impl GattValue for u8 {
    const LAYOUT: ValueLayout = ValueLayout::U8;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        require_len(data, 1)?;
        Ok(data[0])
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        payload_from(&[*self])
    }
}

impl GattValue for i8 {
    const LAYOUT: ValueLayout = ValueLayout::I8;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        require_len(data, 1)?;
        Ok(data[0] as i8)
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        payload_from(&self.to_le_bytes())
    }
}

impl GattValue for u16 {
    const LAYOUT: ValueLayout = ValueLayout::U16;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        require_len(data, 2)?;
        Ok(u16::from_le_bytes([data[0], data[1]]))
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        payload_from(&self.to_le_bytes())
    }
}

impl GattValue for i16 {
    const LAYOUT: ValueLayout = ValueLayout::I16;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        require_len(data, 2)?;
        Ok(i16::from_le_bytes([data[0], data[1]]))
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        payload_from(&self.to_le_bytes())
    }
}

/// LED text and the Device Information strings
impl GattValue for String {
    const LAYOUT: ValueLayout = ValueLayout::Text;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        core::str::from_utf8(data)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8)
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        if self.len() > TEXT_MAX_LEN {
            return Err(CodecError::TooLong {
                max: TEXT_MAX_LEN,
                actual: self.len(),
            });
        }
        payload_from(self.as_bytes())
    }
}

impl GattValue for Vec<u8> {
    const LAYOUT: ValueLayout = ValueLayout::Raw;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        Ok(data.to_vec())
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        payload_from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::gatt::MAX_VALUE_SIZE;

    #[test]
    fn test_u16_little_endian() {
        let encoded = 1000u16.encode().unwrap();
        assert_eq!(encoded.as_slice(), &[0xE8, 0x03]);
        assert_eq!(u16::decode(&[0xE8, 0x03]).unwrap(), 1000);
    }

    #[test]
    fn test_period_roundtrip() {
        for period in [1u16, 2, 5, 10, 20, 80, 160, 640, u16::MAX] {
            let encoded = period.encode().unwrap();
            assert_eq!(encoded.len(), 2);
            assert_eq!(u16::decode(&encoded).unwrap(), period);
        }
    }

    #[test]
    fn test_i16_negative() {
        let encoded = (-2i16).encode().unwrap();
        assert_eq!(encoded.as_slice(), &[0xFE, 0xFF]);
        assert_eq!(i16::decode(&encoded).unwrap(), -2);
    }

    #[test]
    fn test_u16_too_short() {
        let result = u16::decode(&[0x01]);
        assert_eq!(
            result,
            Err(CodecError::TooShort {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_empty_buffer() {
        assert!(matches!(u8::decode(&[]), Err(CodecError::TooShort { .. })));
        assert!(matches!(i8::decode(&[]), Err(CodecError::TooShort { .. })));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        assert_eq!(u16::decode(&[0x10, 0x00, 0xAA]).unwrap(), 16);
    }

    #[test]
    fn test_temperature_negative() {
        assert_eq!(i8::decode(&[0xF6]).unwrap(), -10);
    }

    #[test]
    fn test_text_is_raw_utf8() {
        let encoded = String::from("Hello!").encode().unwrap();
        assert_eq!(encoded.as_slice(), b"Hello!");

        let decoded = String::decode("héllo".as_bytes()).unwrap();
        assert_eq!(decoded, "héllo");
    }

    #[test]
    fn test_text_too_long() {
        let text = "a".repeat(TEXT_MAX_LEN + 1);
        assert_eq!(
            text.encode(),
            Err(CodecError::TooLong {
                max: TEXT_MAX_LEN,
                actual: TEXT_MAX_LEN + 1
            })
        );
    }

    #[test]
    fn test_text_invalid_utf8() {
        assert_eq!(String::decode(&[0xFF, 0xFE]), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn test_raw_limit() {
        assert!(vec![0u8; MAX_VALUE_SIZE].encode().is_ok());
        assert!(matches!(
            vec![0u8; MAX_VALUE_SIZE + 1].encode(),
            Err(CodecError::TooLong { .. })
        ));
    }
}

//! Structured micro:bit values

use core::fmt;

use log::warn;

use super::{payload_from, require_len, CodecError, GattValue, Payload, ValueLayout};
use crate::config::calibration;
use crate::config::led::MATRIX_SIZE;

/// Three-axis sensor reading (accelerometer or magnetometer)
///
/// Payload: `[x: i16 LE][y: i16 LE][z: i16 LE]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vector3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl GattValue for Vector3 {
    const LAYOUT: ValueLayout = ValueLayout::Vector3;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        require_len(data, 6)?;
        Ok(Self {
            x: i16::from_le_bytes([data[0], data[1]]),
            y: i16::from_le_bytes([data[2], data[3]]),
            z: i16::from_le_bytes([data[4], data[5]]),
        })
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        let mut buf = [0u8; 6];
        buf[0..2].copy_from_slice(&self.x.to_le_bytes());
        buf[2..4].copy_from_slice(&self.y.to_le_bytes());
        buf[4..6].copy_from_slice(&self.z.to_le_bytes());
        payload_from(&buf)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {}, y: {}, z: {}", self.x, self.y, self.z)
    }
}

/// Magnetometer calibration state
///
/// Bytes outside 0..=3 are kept as [`CalibrationState::Unrecognized`]
/// rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// State unknown (0x00)
    Unknown,
    /// Calibration requested (0x01)
    Requested,
    /// Calibration completed OK (0x02)
    CompletedOk,
    /// Calibration completed with error (0x03)
    CompletedWithError,
    /// Any other byte
    Unrecognized(u8),
}

impl CalibrationState {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            calibration::UNKNOWN => Self::Unknown,
            calibration::REQUESTED => Self::Requested,
            calibration::COMPLETED_OK => Self::CompletedOk,
            calibration::COMPLETED_WITH_ERROR => Self::CompletedWithError,
            other => Self::Unrecognized(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Unknown => calibration::UNKNOWN,
            Self::Requested => calibration::REQUESTED,
            Self::CompletedOk => calibration::COMPLETED_OK,
            Self::CompletedWithError => calibration::COMPLETED_WITH_ERROR,
            Self::Unrecognized(byte) => byte,
        }
    }

    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for CalibrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("State unknown"),
            Self::Requested => f.write_str("Calibration requested"),
            Self::CompletedOk => f.write_str("Calibration completed OK"),
            Self::CompletedWithError => f.write_str("Calibration completed with error"),
            Self::Unrecognized(byte) => write!(f, "Unrecognized calibration state {}", byte),
        }
    }
}

impl GattValue for CalibrationState {
    const LAYOUT: ValueLayout = ValueLayout::Calibration;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        require_len(data, 1)?;
        let state = Self::from_byte(data[0]);
        if !state.is_recognized() {
            warn!("Unrecognized calibration state 0x{:02x}", data[0]);
        }
        Ok(state)
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        payload_from(&[self.as_byte()])
    }
}

/// State of the 5x5 LED matrix
///
/// One byte per row, top row first. Bit `k` of a row byte lights column
/// `4 - k`, so column 0 (leftmost) is bit 4 and column 4 is bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedMatrix {
    rows: [u8; MATRIX_SIZE],
}

impl LedMatrix {
    const ROW_MASK: u8 = 0b0001_1111;

    /// All LEDs off
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw row bytes, dropping bits above the five columns
    pub fn from_rows(rows: [u8; MATRIX_SIZE]) -> Self {
        Self {
            rows: rows.map(|row| row & Self::ROW_MASK),
        }
    }

    /// Build from a grid of lit flags indexed `[row][column]`
    pub fn from_grid(grid: [[bool; MATRIX_SIZE]; MATRIX_SIZE]) -> Self {
        let mut matrix = Self::new();
        for (row, columns) in grid.iter().enumerate() {
            for (column, &lit) in columns.iter().enumerate() {
                matrix.set(row, column, lit);
            }
        }
        matrix
    }

    pub fn rows(&self) -> [u8; MATRIX_SIZE] {
        self.rows
    }

    /// Whether the LED at `row`, `column` is lit. Out-of-range positions are off.
    pub fn get(&self, row: usize, column: usize) -> bool {
        match Self::bit(column) {
            Some(bit) if row < MATRIX_SIZE => self.rows[row] & bit != 0,
            _ => false,
        }
    }

    /// Light or clear the LED at `row`, `column`. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, column: usize, lit: bool) {
        let Some(bit) = Self::bit(column) else {
            return;
        };
        if row >= MATRIX_SIZE {
            return;
        }
        if lit {
            self.rows[row] |= bit;
        } else {
            self.rows[row] &= !bit;
        }
    }

    pub fn grid(&self) -> [[bool; MATRIX_SIZE]; MATRIX_SIZE] {
        let mut grid = [[false; MATRIX_SIZE]; MATRIX_SIZE];
        for (row, columns) in grid.iter_mut().enumerate() {
            for (column, lit) in columns.iter_mut().enumerate() {
                *lit = self.get(row, column);
            }
        }
        grid
    }

    fn bit(column: usize) -> Option<u8> {
        (column < MATRIX_SIZE).then(|| 1 << (MATRIX_SIZE - 1 - column))
    }
}

/// Rows top to bottom, `#` for lit and `.` for dark
impl fmt::Display for LedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.grid().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            for &lit in row {
                f.write_str(if lit { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

impl GattValue for LedMatrix {
    const LAYOUT: ValueLayout = ValueLayout::LedMatrix;

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        require_len(data, MATRIX_SIZE)?;
        let mut rows = [0u8; MATRIX_SIZE];
        rows.copy_from_slice(&data[..MATRIX_SIZE]);
        Ok(Self::from_rows(rows))
    }

    fn encode(&self) -> Result<Payload, CodecError> {
        payload_from(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector3_layout() {
        let reading = Vector3 {
            x: 1,
            y: -1,
            z: 1024,
        };
        let encoded = reading.encode().unwrap();
        assert_eq!(
            encoded.as_slice(),
            &[0x01, 0x00, 0xFF, 0xFF, 0x00, 0x04]
        );
        assert_eq!(Vector3::decode(&encoded).unwrap(), reading);
    }

    #[test]
    fn test_vector3_extremes_roundtrip() {
        let reading = Vector3 {
            x: i16::MIN,
            y: 0,
            z: i16::MAX,
        };
        let encoded = reading.encode().unwrap();
        assert_eq!(Vector3::decode(&encoded).unwrap(), reading);
    }

    #[test]
    fn test_vector3_too_short() {
        let result = Vector3::decode(&[0x01, 0x00, 0x02, 0x00, 0x03]);
        assert_eq!(
            result,
            Err(CodecError::TooShort {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_calibration_known_states() {
        for (byte, state) in [
            (0, CalibrationState::Unknown),
            (1, CalibrationState::Requested),
            (2, CalibrationState::CompletedOk),
            (3, CalibrationState::CompletedWithError),
        ] {
            assert_eq!(CalibrationState::decode(&[byte]).unwrap(), state);
            assert_eq!(state.encode().unwrap().as_slice(), &[byte]);
        }
    }

    #[test]
    fn test_calibration_unrecognized_is_not_an_error() {
        let state = CalibrationState::decode(&[7]).expect("Should decode");
        assert_eq!(state, CalibrationState::Unrecognized(7));
        assert!(!state.is_recognized());
        assert_eq!(state.as_byte(), 7);
    }

    #[test]
    fn test_calibration_empty() {
        assert!(matches!(
            CalibrationState::decode(&[]),
            Err(CodecError::TooShort { expected: 1, .. })
        ));
    }

    #[test]
    fn test_led_column_four_is_bit_zero() {
        let mut matrix = LedMatrix::new();
        matrix.set(0, 4, true);
        assert_eq!(matrix.encode().unwrap().as_slice(), &[0b0000_0001, 0, 0, 0, 0]);
    }

    #[test]
    fn test_led_column_zero_is_bit_four() {
        let mut matrix = LedMatrix::new();
        matrix.set(0, 0, true);
        assert_eq!(matrix.encode().unwrap().as_slice(), &[0b0001_0000, 0, 0, 0, 0]);
    }

    #[test]
    fn test_led_decode_grid() {
        // Heart
        let matrix = LedMatrix::decode(&[0x0A, 0x1F, 0x1F, 0x0E, 0x04]).unwrap();
        let grid = matrix.grid();
        assert_eq!(grid[0], [false, true, false, true, false]);
        assert_eq!(grid[1], [true; 5]);
        assert_eq!(grid[4], [false, false, true, false, false]);
        assert_eq!(LedMatrix::from_grid(grid), matrix);
    }

    #[test]
    fn test_led_high_bits_ignored() {
        let matrix = LedMatrix::decode(&[0xE1, 0, 0, 0, 0]).unwrap();
        assert_eq!(matrix.rows()[0], 0x01);
        assert!(matrix.get(0, 4));
    }

    #[test]
    fn test_led_clear_and_out_of_range() {
        let mut matrix = LedMatrix::from_rows([0x1F; 5]);
        matrix.set(2, 2, false);
        assert_eq!(matrix.rows()[2], 0b0001_1011);

        matrix.set(5, 0, true);
        matrix.set(0, 5, true);
        assert!(!matrix.get(5, 0));
        assert!(!matrix.get(0, 5));
        assert_eq!(matrix.rows()[0], 0x1F);
    }

    #[test]
    fn test_led_too_short() {
        assert_eq!(
            LedMatrix::decode(&[0x01, 0x02]),
            Err(CodecError::TooShort {
                expected: 5,
                actual: 2
            })
        );
    }

    #[test]
    fn test_led_matrix_display() {
        let matrix = LedMatrix::from_rows([0b10001, 0, 0b00100, 0, 0b11111]);
        assert_eq!(matrix.to_string(), "#...# ..... ..#.. ..... #####");
    }
}

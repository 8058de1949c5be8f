//! Protocol and discovery constants for the micro:bit Bluetooth profile

/// Device discovery defaults
pub mod discovery {
    /// Advertised name prefix of every micro:bit
    pub const NAME_PREFIX: &str = "BBC micro:bit";

    /// How long to scan for a matching device before giving up
    pub const SCAN_TIMEOUT_MS: u64 = 10_000;

    /// Interval between peripheral list polls while scanning
    pub const SCAN_POLL_INTERVAL_MS: u64 = 100;
}

/// GATT value limits
pub mod gatt {
    /// Maximum length of an attribute value (ATT protocol limit)
    pub const MAX_VALUE_SIZE: usize = 512;
}

/// LED service constants
pub mod led {
    /// Rows (and columns) of the LED matrix
    pub const MATRIX_SIZE: usize = 5;

    /// Maximum LED text length accepted by the firmware, in bytes
    pub const TEXT_MAX_LEN: usize = 20;
}

/// Magnetometer calibration state bytes
pub mod calibration {
    pub const UNKNOWN: u8 = 0;
    pub const REQUESTED: u8 = 1;
    pub const COMPLETED_OK: u8 = 2;
    pub const COMPLETED_WITH_ERROR: u8 = 3;
}

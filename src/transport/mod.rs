//! GATT transports
//!
//! The session talks to the device through the [`Transport`] trait. The
//! btleplug backend drives a real adapter; tests use the in-memory mock.

mod traits;

#[cfg(feature = "btleplug")]
mod btleplug;

#[cfg(feature = "btleplug")]
pub use self::btleplug::BtleplugTransport;
#[cfg(test)]
pub use traits::mock;
pub use traits::{DeviceFilter, Transport, TransportError, WriteMode};

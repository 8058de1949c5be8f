//! Host-side client for the BBC micro:bit Bluetooth profile.
//!
//! A [`Session`] selects a device by name prefix, connects to its GATT
//! server and hands out typed handles for the characteristics it exposes.
//! Values move through the [`codec`] layouts; notifications arrive as a
//! [`Subscription`] stream.

pub mod codec;
pub mod config;
pub mod error;
pub mod gatt;
pub mod notify;
pub mod registry;
pub mod session;
pub mod transport;

pub use error::Error;
pub use notify::Subscription;
pub use session::{CharacteristicHandle, ConnectionState, Disconnect, Resolution, Session};
#[cfg(feature = "btleplug")]
pub use transport::BtleplugTransport;
pub use transport::{DeviceFilter, Transport, TransportError, WriteMode};

//! GATT central transport trait for abstraction and testability
//!
//! This trait defines the interface the session needs from a Bluetooth
//! stack, allowing the btleplug backend to be swapped with a mock for testing.

use core::future::Future;
use std::time::Duration;

use futures::stream::BoxStream;
use uuid::Uuid;

use crate::config::discovery;
use crate::gatt::{CharacteristicAddress, DeviceInfo, Notification, RemoteService};
use crate::registry;

/// Errors that can occur during transport operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No Bluetooth adapter on this host
    #[error("Bluetooth not available on this computer")]
    NoAdapter,
    /// Scan finished without a matching device
    #[error("no matching device found")]
    NoDeviceFound,
    /// Operation needs a selected device
    #[error("no device selected")]
    NoDeviceSelected,
    /// Link is down
    #[error("GATT server is disconnected")]
    NotConnected,
    /// Characteristic missing from the discovered table
    #[error("characteristic {0} not found on device")]
    UnknownCharacteristic(Uuid),
    /// Error reported by the platform Bluetooth stack
    #[error("{0}")]
    Platform(String),
}

/// How a value is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    WithResponse,
    WithoutResponse,
}

/// Which devices may be selected, and which services they may expose
#[derive(Debug, Clone)]
pub struct DeviceFilter {
    /// Required prefix of the advertised name
    pub name_prefix: String,
    /// Services the session may use; empty means no restriction
    pub services: Vec<Uuid>,
    /// How long to look for a matching device
    pub scan_timeout: Duration,
}

impl DeviceFilter {
    pub fn matches_name(&self, name: &str) -> bool {
        name.starts_with(&self.name_prefix)
    }

    pub fn allows_service(&self, service: &Uuid) -> bool {
        self.services.is_empty() || self.services.contains(service)
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            name_prefix: discovery::NAME_PREFIX.to_string(),
            services: registry::default_service_allow_list(),
            scan_timeout: Duration::from_millis(discovery::SCAN_TIMEOUT_MS),
        }
    }
}

/// Abstract GATT central interface
///
/// A transport drives one peripheral at a time. `select_device` picks it;
/// every later call acts on that peripheral.
pub trait Transport {
    /// Find a device matching `filter`
    fn select_device(
        &mut self,
        filter: &DeviceFilter,
    ) -> impl Future<Output = Result<DeviceInfo, TransportError>>;

    /// Establish the GATT link to the selected device
    fn connect(&mut self) -> impl Future<Output = Result<(), TransportError>>;

    /// Discover every primary service and its characteristics
    fn discover_services(
        &mut self,
    ) -> impl Future<Output = Result<Vec<RemoteService>, TransportError>>;

    /// Read a characteristic value
    fn read(
        &self,
        address: CharacteristicAddress,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>>;

    /// Write a characteristic value
    fn write(
        &self,
        address: CharacteristicAddress,
        value: &[u8],
        mode: WriteMode,
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Enable notifications (or indications) on a characteristic
    fn subscribe(
        &self,
        address: CharacteristicAddress,
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Disable notifications on a characteristic
    fn unsubscribe(
        &self,
        address: CharacteristicAddress,
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Stream of value-changed events for every subscribed characteristic
    ///
    /// Each call returns an independent stream that sees every event
    /// delivered after the call, in delivery order.
    fn notifications(
        &self,
    ) -> impl Future<Output = Result<BoxStream<'static, Notification>, TransportError>>;

    /// Stream that yields once each time the link to the device drops
    fn disconnections(
        &self,
    ) -> impl Future<Output = Result<BoxStream<'static, ()>, TransportError>>;

    /// Close the GATT link
    fn disconnect(&mut self) -> impl Future<Output = Result<(), TransportError>>;
}

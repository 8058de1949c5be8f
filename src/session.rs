//! Device session
//!
//! A [`Session`] owns one transport and the single device it selected.
//!
//! ```text
//! request_device -> Connecting --connect_gatt--> Connected --disconnect / link drop--> Disconnected
//!                        ^                                                               |
//!                        +-------------------------- connect_gatt ----------------------+
//! ```
//!
//! Characteristic handles carry the connection generation they were resolved
//! under, so a handle from an earlier connection is rejected after a
//! reconnect instead of silently addressing the new link.

use core::fmt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::codec::GattValue;
use crate::error::Error;
use crate::gatt::{CharacteristicAddress, DeviceInfo, Operation, Properties, RemoteService};
use crate::notify::Subscription;
use crate::registry::{self, CharacteristicDescriptor, Lookup, Namespace};
use crate::transport::{DeviceFilter, Transport, TransportError, WriteMode};

/// Link state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Connected => f.write_str("connected"),
        }
    }
}

/// Outcome of [`Session::disconnect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    Disconnected,
    /// Nothing to do; the session was not connected
    AlreadyDisconnected,
}

/// Resolved characteristic on the connected device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicHandle {
    pub address: CharacteristicAddress,
    /// Properties reported by the device
    pub properties: Properties,
    /// Registry entry, when the characteristic is a known one
    pub descriptor: Option<&'static CharacteristicDescriptor>,
    generation: u64,
}

impl CharacteristicHandle {
    pub fn uuid(&self) -> Uuid {
        self.address.characteristic
    }

    pub fn name(&self) -> Lookup {
        registry::lookup(&self.address.characteristic, Namespace::Characteristic)
    }
}

impl fmt::Display for CharacteristicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.address.characteristic)
    }
}

/// Outcome of resolving one characteristic in [`Session::resolve_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub descriptor: CharacteristicDescriptor,
    pub result: Result<CharacteristicHandle, Error>,
}

/// State shared with the link-drop listener
struct Link {
    state: watch::Sender<ConnectionState>,
    generation: AtomicU64,
}

impl Link {
    fn new(state: ConnectionState) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            state,
            generation: AtomicU64::new(0),
        }
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Move to `next`. Returns whether the state changed.
    fn set(&self, next: ConnectionState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        })
    }

    /// Mark `generation` as dropped if it is still the live connection.
    fn drop_generation(&self, generation: u64) -> bool {
        self.state.send_if_modified(|state| {
            if *state != ConnectionState::Connected
                || self.generation.load(Ordering::SeqCst) != generation
            {
                return false;
            }
            *state = ConnectionState::Disconnected;
            true
        })
    }

    fn live_generation(&self) -> Option<u64> {
        (self.state() == ConnectionState::Connected)
            .then(|| self.generation.load(Ordering::SeqCst))
    }
}

/// Session with one micro:bit
pub struct Session<T: Transport> {
    transport: T,
    device: DeviceInfo,
    filter: DeviceFilter,
    link: Arc<Link>,
    /// Discovered services that pass the allow-list
    services: Vec<RemoteService>,
    handles: HashMap<Uuid, CharacteristicHandle>,
    watcher: Option<JoinHandle<()>>,
}

impl<T: Transport> Session<T> {
    /// Select a device matching `filter`.
    ///
    /// The session starts in [`ConnectionState::Connecting`]; call
    /// [`connect_gatt`](Self::connect_gatt) next.
    pub async fn request_device(mut transport: T, filter: DeviceFilter) -> Result<Self, Error> {
        debug!("Requesting device with name prefix {:?}", filter.name_prefix);

        let device = transport
            .select_device(&filter)
            .await
            .map_err(|err| match err {
                TransportError::NoAdapter => {
                    Error::PlatformUnsupported(TransportError::NoAdapter.to_string())
                }
                TransportError::NoDeviceFound => Error::SelectionCancelled,
                other => Error::transport(Operation::SelectDevice, other),
            })?;
        info!("Selected {} ({})", device.name, device.id);

        Ok(Self {
            transport,
            device,
            filter,
            link: Arc::new(Link::new(ConnectionState::Connecting)),
            services: Vec::new(),
            handles: HashMap::new(),
            watcher: None,
        })
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn state(&self) -> ConnectionState {
        self.link.state()
    }

    /// Receiver that observes every state transition
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.link.state.subscribe()
    }

    /// Connect to the device's GATT server and discover its services.
    ///
    /// On failure the session returns to `Disconnected` and may be retried.
    pub async fn connect_gatt(&mut self) -> Result<(), Error> {
        if self.state() == ConnectionState::Connected {
            debug!("Already connected to {}", self.device.name);
            return Ok(());
        }

        self.link.set(ConnectionState::Connecting);
        debug!("Connecting to GATT server of {} ({})", self.device.name, self.device.id);

        match self.open().await {
            Ok(()) => {
                info!("Connected to {}", self.device.name);
                Ok(())
            }
            Err(err) => {
                warn!("Connection to {} failed: {}", self.device.name, err);
                if self.transport.disconnect().await.is_err() {
                    debug!("Link already down after failed connect");
                }
                self.link.set(ConnectionState::Disconnected);
                Err(err)
            }
        }
    }

    async fn open(&mut self) -> Result<(), Error> {
        self.transport
            .connect()
            .await
            .map_err(|err| Error::transport(Operation::Connect, err))?;

        let discovered = self
            .transport
            .discover_services()
            .await
            .map_err(|err| Error::transport(Operation::Discover, err))?;

        let mut disconnections = self
            .transport
            .disconnections()
            .await
            .map_err(|err| Error::transport(Operation::Connect, err))?;

        self.services = discovered
            .into_iter()
            .filter(|s| self.filter.allows_service(&s.uuid))
            .collect();
        self.handles.clear();
        debug!("Discovered {} allowed services", self.services.len());

        let generation = self.link.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.link.set(ConnectionState::Connected);

        let link = self.link.clone();
        let name = self.device.name.clone();
        self.watcher = Some(tokio::spawn(async move {
            if disconnections.next().await.is_some() && link.drop_generation(generation) {
                warn!("{} disconnected", name);
            }
        }));

        Ok(())
    }

    /// Discovered services the session may use
    pub fn services(&self) -> Result<&[RemoteService], Error> {
        self.link
            .live_generation()
            .ok_or(Error::NoDeviceConnected)?;
        Ok(&self.services)
    }

    /// Resolve one characteristic.
    ///
    /// Services outside the allow-list are reported as not present.
    pub fn resolve_characteristic(
        &self,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<CharacteristicHandle, Error> {
        let generation = self
            .link
            .live_generation()
            .ok_or(Error::NoDeviceConnected)?;

        let remote = self
            .services
            .iter()
            .find(|s| s.uuid == service)
            .ok_or(Error::ServiceNotFound { service })?
            .characteristic(characteristic)
            .ok_or(Error::CharacteristicNotFound {
                service,
                characteristic,
            })?;

        Ok(CharacteristicHandle {
            address: CharacteristicAddress {
                service,
                characteristic,
            },
            properties: remote.properties,
            descriptor: registry::characteristic(&characteristic),
            generation,
        })
    }

    /// Resolve a known characteristic
    pub fn resolve(&self, descriptor: &CharacteristicDescriptor) -> Result<CharacteristicHandle, Error> {
        self.resolve_characteristic(descriptor.service, descriptor.uuid())
    }

    /// Resolve each characteristic independently and remember the ones found.
    ///
    /// A failure is logged and returned in its [`Resolution`]; it never stops
    /// the remaining characteristics from resolving.
    pub fn resolve_all(&mut self, descriptors: &[CharacteristicDescriptor]) -> Vec<Resolution> {
        let resolutions: Vec<Resolution> = descriptors
            .iter()
            .map(|descriptor| Resolution {
                descriptor: *descriptor,
                result: self.resolve(descriptor),
            })
            .collect();

        for resolution in &resolutions {
            match &resolution.result {
                Ok(handle) => {
                    debug!("Resolved {}", handle);
                    self.handles.insert(handle.uuid(), *handle);
                }
                Err(err) => warn!("Could not resolve {}: {}", resolution.descriptor.name(), err),
            }
        }

        resolutions
    }

    /// Previously resolved handle for a known characteristic
    pub fn handle(&self, descriptor: &CharacteristicDescriptor) -> Result<CharacteristicHandle, Error> {
        let generation = self
            .link
            .live_generation()
            .ok_or(Error::NoDeviceConnected)?;
        self.handles
            .get(&descriptor.uuid())
            .filter(|h| h.generation == generation)
            .copied()
            .ok_or(Error::CharacteristicUnavailable(descriptor.uuid()))
    }

    /// Read and decode a characteristic value
    pub async fn read<V: GattValue>(&self, handle: &CharacteristicHandle) -> Result<V, Error> {
        let readable = handle.properties.contains(Properties::READ);
        self.check::<V>(handle, Operation::Read, readable)?;

        debug!("Reading {}", handle);
        let data = self
            .transport
            .read(handle.address)
            .await
            .map_err(|err| Error::transport(Operation::Read, err))?;
        Ok(V::decode(&data)?)
    }

    /// Encode and write a characteristic value
    pub async fn write<V: GattValue>(&self, handle: &CharacteristicHandle, value: &V) -> Result<(), Error> {
        self.check::<V>(handle, Operation::Write, handle.properties.writable())?;
        let payload = value.encode()?;

        let mode = if handle.properties.contains(Properties::WRITE) {
            WriteMode::WithResponse
        } else {
            WriteMode::WithoutResponse
        };

        debug!("Writing {} bytes to {}", payload.len(), handle);
        self.transport
            .write(handle.address, &payload, mode)
            .await
            .map_err(|err| Error::transport(Operation::Write, err))
    }

    /// Start notifications and relay decoded values.
    pub async fn subscribe<V>(&self, handle: &CharacteristicHandle) -> Result<Subscription<V>, Error>
    where
        V: GattValue + Send + 'static,
    {
        self.check::<V>(handle, Operation::Subscribe, handle.properties.subscribable())?;

        // Open the event stream first so the first notification is not missed
        let notifications = self
            .transport
            .notifications()
            .await
            .map_err(|err| Error::transport(Operation::Subscribe, err))?;

        debug!("Starting notifications on {}", handle);
        self.transport
            .subscribe(handle.address)
            .await
            .map_err(|err| Error::transport(Operation::Subscribe, err))?;

        // Ends once this handle's connection is gone, even if a later one is live
        let link = self.link.clone();
        let generation = handle.generation;
        let mut state = self.watch_state();
        let closed = async move {
            loop {
                let _ = state.borrow_and_update();
                if link.live_generation() != Some(generation) || state.changed().await.is_err() {
                    break;
                }
            }
        };

        Ok(Subscription::new(*handle, notifications, closed))
    }

    /// Stop notifications for a subscription.
    ///
    /// After a disconnect the device has already dropped every
    /// subscription, so this only discards the stream.
    pub async fn unsubscribe<V>(&self, subscription: Subscription<V>) -> Result<(), Error> {
        let handle = *subscription.handle();
        drop(subscription);

        if self.link.live_generation() != Some(handle.generation) {
            debug!("Subscription to {} already ended with its connection", handle);
            return Ok(());
        }

        debug!("Stopping notifications on {}", handle);
        self.transport
            .unsubscribe(handle.address)
            .await
            .map_err(|err| Error::transport(Operation::Unsubscribe, err))
    }

    /// Close the link.
    ///
    /// Calling this when not connected reports
    /// [`Disconnect::AlreadyDisconnected`] and changes nothing, not even the
    /// state of a session that has selected a device but not yet connected.
    pub async fn disconnect(&mut self) -> Result<Disconnect, Error> {
        if self.state() != ConnectionState::Connected {
            warn!("There is no device connected");
            return Ok(Disconnect::AlreadyDisconnected);
        }

        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        self.handles.clear();

        debug!("Disconnecting from {}", self.device.name);
        let result = self.transport.disconnect().await;
        self.link.set(ConnectionState::Disconnected);
        result.map_err(|err| Error::transport(Operation::Disconnect, err))?;

        info!("Disconnected from {}", self.device.name);
        Ok(Disconnect::Disconnected)
    }

    /// Check the preconditions of an operation on `handle`.
    fn check<V: GattValue>(
        &self,
        handle: &CharacteristicHandle,
        operation: Operation,
        supported: bool,
    ) -> Result<(), Error> {
        match self.link.live_generation() {
            None => return Err(Error::NoDeviceConnected),
            Some(generation) if generation != handle.generation => {
                return Err(Error::CharacteristicUnavailable(handle.uuid()));
            }
            Some(_) => {}
        }

        if !supported {
            return Err(Error::Unsupported {
                characteristic: handle.uuid(),
                operation,
            });
        }

        if let Some(descriptor) = handle.descriptor {
            if !V::LAYOUT.compatible_with(descriptor.layout) {
                return Err(Error::LayoutMismatch {
                    characteristic: handle.uuid(),
                    declared: descriptor.layout,
                    requested: V::LAYOUT,
                });
            }
        }

        Ok(())
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

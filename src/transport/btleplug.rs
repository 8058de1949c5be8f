//! btleplug transport backend

use std::time::{Duration, Instant};

use ::btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use ::btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::BoxStream;
use futures::StreamExt;
use log::debug;

use super::{DeviceFilter, Transport, TransportError, WriteMode};
use crate::config::discovery::SCAN_POLL_INTERVAL_MS;
use crate::gatt::{
    CharacteristicAddress, DeviceInfo, Notification, Properties, RemoteCharacteristic,
    RemoteService,
};

impl From<::btleplug::Error> for TransportError {
    fn from(err: ::btleplug::Error) -> Self {
        match err {
            ::btleplug::Error::NotConnected => TransportError::NotConnected,
            other => TransportError::Platform(other.to_string()),
        }
    }
}

/// Transport over the host's first Bluetooth adapter.
pub struct BtleplugTransport {
    adapter: Adapter,
    peripheral: Option<Peripheral>,
}

impl BtleplugTransport {
    /// Open the first Bluetooth adapter.
    pub async fn new() -> Result<Self, TransportError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(TransportError::NoAdapter)?;

        Ok(Self {
            adapter,
            peripheral: None,
        })
    }

    fn peripheral(&self) -> Result<&Peripheral, TransportError> {
        self.peripheral
            .as_ref()
            .ok_or(TransportError::NoDeviceSelected)
    }

    /// Find the btleplug characteristic for an address.
    fn characteristic(&self, address: CharacteristicAddress) -> Result<Characteristic, TransportError> {
        self.peripheral()?
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == address.characteristic && c.service_uuid == address.service)
            .ok_or(TransportError::UnknownCharacteristic(address.characteristic))
    }

    /// Poll discovered peripherals until one matches the filter or the scan times out.
    async fn find_device(&self, filter: &DeviceFilter) -> Result<(Peripheral, DeviceInfo), TransportError> {
        let start = Instant::now();

        while start.elapsed() < filter.scan_timeout {
            for peripheral in self.adapter.peripherals().await? {
                let Some(props) = peripheral.properties().await? else {
                    continue;
                };
                if let Some(name) = props.local_name {
                    if filter.matches_name(&name) {
                        let info = DeviceInfo {
                            name,
                            id: peripheral.address().to_string(),
                        };
                        return Ok((peripheral, info));
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(SCAN_POLL_INTERVAL_MS)).await;
        }

        Err(TransportError::NoDeviceFound)
    }
}

impl Transport for BtleplugTransport {
    async fn select_device(&mut self, filter: &DeviceFilter) -> Result<DeviceInfo, TransportError> {
        self.adapter.start_scan(ScanFilter::default()).await?;
        let found = self.find_device(filter).await;
        self.adapter.stop_scan().await?;

        let (peripheral, info) = found?;
        debug!("Found {} ({})", info.name, info.id);
        self.peripheral = Some(peripheral);
        Ok(info)
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        self.peripheral()?.connect().await?;
        Ok(())
    }

    async fn discover_services(&mut self) -> Result<Vec<RemoteService>, TransportError> {
        let peripheral = self.peripheral()?;
        peripheral.discover_services().await?;

        let services = peripheral
            .services()
            .into_iter()
            .filter(|s| s.primary)
            .map(|s| RemoteService {
                uuid: s.uuid,
                characteristics: s
                    .characteristics
                    .into_iter()
                    .map(|c| RemoteCharacteristic {
                        uuid: c.uuid,
                        properties: Properties::from_bits_truncate(c.properties.bits()),
                    })
                    .collect(),
            })
            .collect();
        Ok(services)
    }

    async fn read(&self, address: CharacteristicAddress) -> Result<Vec<u8>, TransportError> {
        let characteristic = self.characteristic(address)?;
        Ok(self.peripheral()?.read(&characteristic).await?)
    }

    async fn write(
        &self,
        address: CharacteristicAddress,
        value: &[u8],
        mode: WriteMode,
    ) -> Result<(), TransportError> {
        let characteristic = self.characteristic(address)?;
        let write_type = match mode {
            WriteMode::WithResponse => WriteType::WithResponse,
            WriteMode::WithoutResponse => WriteType::WithoutResponse,
        };
        self.peripheral()?
            .write(&characteristic, value, write_type)
            .await?;
        Ok(())
    }

    async fn subscribe(&self, address: CharacteristicAddress) -> Result<(), TransportError> {
        let characteristic = self.characteristic(address)?;
        self.peripheral()?.subscribe(&characteristic).await?;
        Ok(())
    }

    async fn unsubscribe(&self, address: CharacteristicAddress) -> Result<(), TransportError> {
        let characteristic = self.characteristic(address)?;
        self.peripheral()?.unsubscribe(&characteristic).await?;
        Ok(())
    }

    async fn notifications(&self) -> Result<BoxStream<'static, Notification>, TransportError> {
        let stream = self.peripheral()?.notifications().await?;
        Ok(stream
            .map(|n| Notification {
                characteristic: n.uuid,
                value: n.value,
            })
            .boxed())
    }

    async fn disconnections(&self) -> Result<BoxStream<'static, ()>, TransportError> {
        let target = self.peripheral()?.id();
        let events = self.adapter.events().await?;
        Ok(events
            .filter_map(move |event| {
                let dropped = matches!(event, CentralEvent::DeviceDisconnected(ref id) if *id == target);
                async move { dropped.then_some(()) }
            })
            .boxed())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.peripheral()?.disconnect().await?;
        Ok(())
    }
}

//! GATT data model shared by the registry, transports and the session

use core::fmt;

use bitflags::bitflags;
use uuid::Uuid;

bitflags! {
    /// Characteristic properties, using the bit values of the
    /// Bluetooth Core characteristic declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Properties: u8 {
        const BROADCAST = 0x01;
        const READ = 0x02;
        const WRITE_WITHOUT_RESPONSE = 0x04;
        const WRITE = 0x08;
        const NOTIFY = 0x10;
        const INDICATE = 0x20;
        const AUTHENTICATED_SIGNED_WRITES = 0x40;
        const EXTENDED_PROPERTIES = 0x80;
    }
}

impl Properties {
    /// Any form of write
    pub fn writable(self) -> bool {
        self.intersects(Self::WRITE | Self::WRITE_WITHOUT_RESPONSE)
    }

    /// Any form of server-initiated update
    pub fn subscribable(self) -> bool {
        self.intersects(Self::NOTIFY | Self::INDICATE)
    }
}

/// Renders as `[READ, NOTIFY]`
impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("]")
    }
}

/// Identity of a selected peripheral
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Advertised local name
    pub name: String,
    /// Platform identifier (Bluetooth address where available)
    pub id: String,
}

/// Characteristic as discovered on the remote device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCharacteristic {
    pub uuid: Uuid,
    pub properties: Properties,
}

/// Primary service as discovered on the remote device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteService {
    pub uuid: Uuid,
    pub characteristics: Vec<RemoteCharacteristic>,
}

impl RemoteService {
    pub fn characteristic(&self, uuid: Uuid) -> Option<&RemoteCharacteristic> {
        self.characteristics.iter().find(|c| c.uuid == uuid)
    }
}

/// Address of a characteristic on the connected device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacteristicAddress {
    pub service: Uuid,
    pub characteristic: Uuid,
}

/// Value-changed event delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub characteristic: Uuid,
    pub value: Vec<u8>,
}

/// GATT operation, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SelectDevice,
    Connect,
    Discover,
    Read,
    Write,
    Subscribe,
    Unsubscribe,
    Disconnect,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SelectDevice => "select device",
            Operation::Connect => "connect",
            Operation::Discover => "discover services",
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Subscribe => "start notifications",
            Operation::Unsubscribe => "stop notifications",
            Operation::Disconnect => "disconnect",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_display() {
        let props = Properties::READ | Properties::NOTIFY;
        assert_eq!(props.to_string(), "[READ, NOTIFY]");
        assert_eq!(Properties::empty().to_string(), "[]");
    }

    #[test]
    fn test_properties_helpers() {
        assert!(Properties::WRITE_WITHOUT_RESPONSE.writable());
        assert!(!Properties::READ.writable());
        assert!(Properties::INDICATE.subscribable());
        assert!(!(Properties::READ | Properties::WRITE).subscribable());
    }
}

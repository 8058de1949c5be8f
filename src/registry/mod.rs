//! Registry of known micro:bit services and characteristics
//!
//! A single static table, shared by the session, the relay and the tools.
//! Lookups are pure and never fail: a UUID that is not in the table maps to
//! [`Lookup::UnknownService`] or [`Lookup::UnknownCharacteristic`] depending on
//! which namespace the caller was searching.

mod uuids;

use core::fmt;

use uuid::Uuid;

use crate::codec::ValueLayout;
use crate::gatt::Properties;

pub use uuids::*;

/// UUID with its human-readable name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UuidEntry {
    pub uuid: Uuid,
    pub name: &'static str,
}

/// Known characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicDescriptor {
    pub entry: UuidEntry,
    /// UUID of the owning service
    pub service: Uuid,
    /// Declared wire layout
    pub layout: ValueLayout,
    /// Operations the firmware supports
    pub operations: Properties,
}

impl CharacteristicDescriptor {
    pub fn uuid(&self) -> Uuid {
        self.entry.uuid
    }

    pub fn name(&self) -> &'static str {
        self.entry.name
    }
}

/// Known service and its characteristics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub entry: UuidEntry,
    pub characteristics: &'static [CharacteristicDescriptor],
}

impl ServiceDescriptor {
    pub fn uuid(&self) -> Uuid {
        self.entry.uuid
    }

    pub fn name(&self) -> &'static str {
        self.entry.name
    }
}

/// Which half of the table a lookup is searching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Service,
    Characteristic,
}

/// Result of a reverse lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Known(&'static str),
    UnknownService,
    UnknownCharacteristic,
}

impl Lookup {
    pub fn is_known(self) -> bool {
        matches!(self, Lookup::Known(_))
    }

    fn unknown(namespace: Namespace) -> Self {
        match namespace {
            Namespace::Service => Lookup::UnknownService,
            Namespace::Characteristic => Lookup::UnknownCharacteristic,
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Known(name) => f.write_str(name),
            Lookup::UnknownService => f.write_str("Unknown Micro:Bit Service"),
            Lookup::UnknownCharacteristic => f.write_str("Unknown Micro:Bit Characteristic"),
        }
    }
}

/// All registry entries, services first
pub fn entries() -> impl Iterator<Item = &'static UuidEntry> {
    SERVICES
        .iter()
        .map(|s| &s.entry)
        .chain(characteristics().map(|c| &c.entry))
}

/// All known characteristics
pub fn characteristics() -> impl Iterator<Item = &'static CharacteristicDescriptor> {
    SERVICES.iter().flat_map(|s| s.characteristics.iter())
}

/// Find the display name of `uuid`.
///
/// The whole table is searched regardless of `namespace`; the namespace only
/// selects which unknown result is returned when nothing matches.
pub fn lookup(uuid: &Uuid, namespace: Namespace) -> Lookup {
    entries()
        .find(|entry| entry.uuid == *uuid)
        .map(|entry| Lookup::Known(entry.name))
        .unwrap_or(Lookup::unknown(namespace))
}

/// [`lookup`] on a UUID string. Unparseable strings are unknown.
pub fn lookup_str(uuid: &str, namespace: Namespace) -> Lookup {
    match Uuid::parse_str(uuid) {
        Ok(uuid) => lookup(&uuid, namespace),
        Err(_) => Lookup::unknown(namespace),
    }
}

pub fn service(uuid: &Uuid) -> Option<&'static ServiceDescriptor> {
    SERVICES.iter().find(|s| s.entry.uuid == *uuid)
}

pub fn characteristic(uuid: &Uuid) -> Option<&'static CharacteristicDescriptor> {
    characteristics().find(|c| c.entry.uuid == *uuid)
}

/// Services a session may use unless the caller narrows the list
pub fn default_service_allow_list() -> Vec<Uuid> {
    SERVICES.iter().map(ServiceDescriptor::uuid).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_accelerometer_data() {
        let result = lookup_str("e95dca4b-251d-470a-a062-fa1922dfa9a8", Namespace::Characteristic);
        assert_eq!(result, Lookup::Known("Accelerometer Data"));
        assert_eq!(result.to_string(), "Accelerometer Data");
    }

    #[test]
    fn test_lookup_unknown_characteristic() {
        let result = lookup_str("12345678-9abc-def0-1234-56789abcdef0", Namespace::Characteristic);
        assert_eq!(result, Lookup::UnknownCharacteristic);
        assert_eq!(result.to_string(), "Unknown Micro:Bit Characteristic");
    }

    #[test]
    fn test_lookup_unknown_service() {
        let uuid = Uuid::from_u128(0x0000180f_0000_1000_8000_00805f9b34fb); // Battery
        assert_eq!(lookup(&uuid, Namespace::Service), Lookup::UnknownService);
    }

    #[test]
    fn test_lookup_ignores_namespace_on_match() {
        assert_eq!(
            lookup(&LED_SERVICE.uuid(), Namespace::Characteristic),
            Lookup::Known("LED Service")
        );
    }

    #[test]
    fn test_lookup_unparseable() {
        assert_eq!(lookup_str("not-a-uuid", Namespace::Service), Lookup::UnknownService);
    }

    #[test]
    fn test_table_size() {
        assert_eq!(SERVICES.len(), 12);
        assert_eq!(characteristics().count(), 33);
    }

    #[test]
    fn test_uuids_unique() {
        let mut seen = HashSet::new();
        for entry in entries() {
            assert!(seen.insert(entry.uuid), "duplicate UUID {}", entry.uuid);
        }
    }

    #[test]
    fn test_characteristics_point_at_owning_service() {
        for service in SERVICES.iter() {
            for c in service.characteristics {
                assert_eq!(c.service, service.uuid(), "{}", c.name());
            }
        }
    }

    #[test]
    fn test_uart_names() {
        assert_eq!(
            lookup_str("6e400002-b5a3-f393-e0a9-e50e24dcca9e", Namespace::Characteristic),
            Lookup::Known("Tx Characteristic")
        );
        assert_eq!(
            lookup_str("6e400003-b5a3-f393-e0a9-e50e24dcca9e", Namespace::Characteristic),
            Lookup::Known("Rx Characteristic")
        );
    }

    #[test]
    fn test_find_descriptors() {
        let magnetometer = service(&MAGNETOMETER_SERVICE.uuid()).expect("Should find");
        assert_eq!(magnetometer.characteristics.len(), 4);

        let calibration = characteristic(&MAGNETOMETER_CALIBRATION.uuid()).expect("Should find");
        assert_eq!(calibration.layout, ValueLayout::Calibration);
        assert!(calibration.operations.contains(Properties::WRITE));
    }

    #[test]
    fn test_default_allow_list() {
        let allow = default_service_allow_list();
        assert_eq!(allow.len(), 12);
        assert!(allow.contains(&UART_SERVICE.uuid()));
    }
}

//! Session error type

use uuid::Uuid;

use crate::codec::{CodecError, ValueLayout};
use crate::gatt::Operation;
use crate::registry::{lookup, Namespace};
use crate::transport::TransportError;

/// Errors reported by session operations
///
/// Precondition failures (`NoDeviceConnected`, `CharacteristicUnavailable`,
/// `Unsupported`, `LayoutMismatch`) are returned before any transport call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("There is no device connected")]
    NoDeviceConnected,

    #[error("{name} ({service}) is not present on this device", name = lookup(.service, Namespace::Service))]
    ServiceNotFound { service: Uuid },

    #[error(
        "{name} ({characteristic}) is not present in this service",
        name = lookup(.characteristic, Namespace::Characteristic)
    )]
    CharacteristicNotFound { service: Uuid, characteristic: Uuid },

    /// Never resolved, or resolved under a connection that has since dropped
    #[error("There is no {name} characteristic", name = lookup(.0, Namespace::Characteristic))]
    CharacteristicUnavailable(Uuid),

    #[error(
        "{name} does not support {operation}",
        name = lookup(.characteristic, Namespace::Characteristic)
    )]
    Unsupported {
        characteristic: Uuid,
        operation: Operation,
    },

    #[error(
        "{name} carries {declared:?} values, not {requested:?}",
        name = lookup(.characteristic, Namespace::Characteristic)
    )]
    LayoutMismatch {
        characteristic: Uuid,
        declared: ValueLayout,
        requested: ValueLayout,
    },

    #[error("{operation} failed: {source}")]
    Transport {
        operation: Operation,
        source: TransportError,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("device selection cancelled: no matching device")]
    SelectionCancelled,

    #[error("{0}")]
    PlatformUnsupported(String),
}

impl Error {
    pub(crate) fn transport(operation: Operation, source: TransportError) -> Self {
        Error::Transport { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ACCELEROMETER_PERIOD, LED_SERVICE};

    #[test]
    fn test_messages_use_registry_names() {
        let err = Error::CharacteristicUnavailable(ACCELEROMETER_PERIOD.uuid());
        assert_eq!(err.to_string(), "There is no Accelerometer Period characteristic");

        let err = Error::ServiceNotFound {
            service: LED_SERVICE.uuid(),
        };
        assert!(err.to_string().starts_with("LED Service ("));
    }

    #[test]
    fn test_transport_message() {
        let err = Error::transport(Operation::Read, TransportError::NotConnected);
        assert_eq!(err.to_string(), "read failed: GATT server is disconnected");
    }
}

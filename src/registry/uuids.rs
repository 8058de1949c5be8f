//! micro:bit Bluetooth profile
//!
//! UUIDs and display names of every service and characteristic exposed by
//! the micro:bit firmware, plus the standard GAP/GATT/DIS services.

use uuid::Uuid;

use super::{CharacteristicDescriptor, ServiceDescriptor, UuidEntry};
use crate::codec::ValueLayout;
use crate::gatt::Properties;

const R: Properties = Properties::READ;
const W: Properties = Properties::WRITE;
const RW: Properties = Properties::READ.union(Properties::WRITE);
const RN: Properties = Properties::READ.union(Properties::NOTIFY);
const RWN: Properties = RW.union(Properties::NOTIFY);

const fn chr(
    uuid: u128,
    name: &'static str,
    service: u128,
    layout: ValueLayout,
    operations: Properties,
) -> CharacteristicDescriptor {
    CharacteristicDescriptor {
        entry: UuidEntry {
            uuid: Uuid::from_u128(uuid),
            name,
        },
        service: Uuid::from_u128(service),
        layout,
        operations,
    }
}

const fn srv(
    uuid: u128,
    name: &'static str,
    characteristics: &'static [CharacteristicDescriptor],
) -> ServiceDescriptor {
    ServiceDescriptor {
        entry: UuidEntry {
            uuid: Uuid::from_u128(uuid),
            name,
        },
        characteristics,
    }
}

// Services

const GENERIC_ACCESS_UUID: u128 = 0x00001800_0000_1000_8000_00805f9b34fb;
const GENERIC_ATTRIBUTE_UUID: u128 = 0x00001801_0000_1000_8000_00805f9b34fb;
const DEVICE_INFORMATION_UUID: u128 = 0x0000180a_0000_1000_8000_00805f9b34fb;
const ACCELEROMETER_SERVICE_UUID: u128 = 0xe95d0753_251d_470a_a062_fa1922dfa9a8;
const MAGNETOMETER_SERVICE_UUID: u128 = 0xe95df2d8_251d_470a_a062_fa1922dfa9a8;
const BUTTON_SERVICE_UUID: u128 = 0xe95d9882_251d_470a_a062_fa1922dfa9a8;
const IO_PIN_SERVICE_UUID: u128 = 0xe95d127b_251d_470a_a062_fa1922dfa9a8;
const LED_SERVICE_UUID: u128 = 0xe95dd91d_251d_470a_a062_fa1922dfa9a8;
const EVENT_SERVICE_UUID: u128 = 0xe95d93af_251d_470a_a062_fa1922dfa9a8;
const DFU_CONTROL_SERVICE_UUID: u128 = 0xe95d93b0_251d_470a_a062_fa1922dfa9a8;
const TEMPERATURE_SERVICE_UUID: u128 = 0xe95d6100_251d_470a_a062_fa1922dfa9a8;
const UART_SERVICE_UUID: u128 = 0x6e400001_b5a3_f393_e0a9_e50e24dcca9e;

// Generic Access

pub const DEVICE_NAME: CharacteristicDescriptor = chr(
    0x00002a00_0000_1000_8000_00805f9b34fb,
    "Device Name",
    GENERIC_ACCESS_UUID,
    ValueLayout::Text,
    R,
);
pub const APPEARANCE: CharacteristicDescriptor = chr(
    0x00002a01_0000_1000_8000_00805f9b34fb,
    "Appearance",
    GENERIC_ACCESS_UUID,
    ValueLayout::U16,
    R,
);
pub const PERIPHERAL_PREFERRED_CONNECTION_PARAMETERS: CharacteristicDescriptor = chr(
    0x00002a04_0000_1000_8000_00805f9b34fb,
    "Peripheral Preferred Connection Parameters",
    GENERIC_ACCESS_UUID,
    ValueLayout::Raw,
    R,
);

// Generic Attribute

pub const SERVICE_CHANGED: CharacteristicDescriptor = chr(
    0x00002a05_0000_1000_8000_00805f9b34fb,
    "Service Changed",
    GENERIC_ATTRIBUTE_UUID,
    ValueLayout::Raw,
    Properties::INDICATE,
);

// Device Information

pub const MODEL_NUMBER_STRING: CharacteristicDescriptor = chr(
    0x00002a24_0000_1000_8000_00805f9b34fb,
    "Model Number String",
    DEVICE_INFORMATION_UUID,
    ValueLayout::Text,
    R,
);
pub const SERIAL_NUMBER_STRING: CharacteristicDescriptor = chr(
    0x00002a25_0000_1000_8000_00805f9b34fb,
    "Serial Number String",
    DEVICE_INFORMATION_UUID,
    ValueLayout::Text,
    R,
);
pub const HARDWARE_REVISION_STRING: CharacteristicDescriptor = chr(
    0x00002a27_0000_1000_8000_00805f9b34fb,
    "Hardware Revision String",
    DEVICE_INFORMATION_UUID,
    ValueLayout::Text,
    R,
);
pub const FIRMWARE_REVISION_STRING: CharacteristicDescriptor = chr(
    0x00002a26_0000_1000_8000_00805f9b34fb,
    "Firmware Revision String",
    DEVICE_INFORMATION_UUID,
    ValueLayout::Text,
    R,
);
pub const MANUFACTURER_NAME_STRING: CharacteristicDescriptor = chr(
    0x00002a29_0000_1000_8000_00805f9b34fb,
    "Manufacturer Name String",
    DEVICE_INFORMATION_UUID,
    ValueLayout::Text,
    R,
);

// Accelerometer

pub const ACCELEROMETER_DATA: CharacteristicDescriptor = chr(
    0xe95dca4b_251d_470a_a062_fa1922dfa9a8,
    "Accelerometer Data",
    ACCELEROMETER_SERVICE_UUID,
    ValueLayout::Vector3,
    RN,
);
pub const ACCELEROMETER_PERIOD: CharacteristicDescriptor = chr(
    0xe95dfb24_251d_470a_a062_fa1922dfa9a8,
    "Accelerometer Period",
    ACCELEROMETER_SERVICE_UUID,
    ValueLayout::U16,
    RW,
);

// Magnetometer

pub const MAGNETOMETER_DATA: CharacteristicDescriptor = chr(
    0xe95dfb11_251d_470a_a062_fa1922dfa9a8,
    "Magnetometer Data",
    MAGNETOMETER_SERVICE_UUID,
    ValueLayout::Vector3,
    RN,
);
pub const MAGNETOMETER_PERIOD: CharacteristicDescriptor = chr(
    0xe95d386c_251d_470a_a062_fa1922dfa9a8,
    "Magnetometer Period",
    MAGNETOMETER_SERVICE_UUID,
    ValueLayout::U16,
    RW,
);
pub const MAGNETOMETER_BEARING: CharacteristicDescriptor = chr(
    0xe95d9715_251d_470a_a062_fa1922dfa9a8,
    "Magnetometer Bearing",
    MAGNETOMETER_SERVICE_UUID,
    ValueLayout::U16,
    RN,
);
pub const MAGNETOMETER_CALIBRATION: CharacteristicDescriptor = chr(
    0xe95db358_251d_470a_a062_fa1922dfa9a8,
    "Magnetometer Calibration",
    MAGNETOMETER_SERVICE_UUID,
    ValueLayout::Calibration,
    RWN,
);

// Buttons

pub const BUTTON_A_STATE: CharacteristicDescriptor = chr(
    0xe95dda90_251d_470a_a062_fa1922dfa9a8,
    "Button A State",
    BUTTON_SERVICE_UUID,
    ValueLayout::U8,
    RN,
);
pub const BUTTON_B_STATE: CharacteristicDescriptor = chr(
    0xe95dda91_251d_470a_a062_fa1922dfa9a8,
    "Button B State",
    BUTTON_SERVICE_UUID,
    ValueLayout::U8,
    RN,
);

// IO pins

pub const PIN_DATA: CharacteristicDescriptor = chr(
    0xe95d8d00_251d_470a_a062_fa1922dfa9a8,
    "Pin Data",
    IO_PIN_SERVICE_UUID,
    ValueLayout::Raw,
    RWN,
);
pub const PIN_AD_CONFIGURATION: CharacteristicDescriptor = chr(
    0xe95d5899_251d_470a_a062_fa1922dfa9a8,
    "Pin AD Configuration",
    IO_PIN_SERVICE_UUID,
    ValueLayout::Raw,
    RW,
);
pub const PIN_IO_CONFIGURATION: CharacteristicDescriptor = chr(
    0xe95db9fe_251d_470a_a062_fa1922dfa9a8,
    "Pin IO Configuration",
    IO_PIN_SERVICE_UUID,
    ValueLayout::Raw,
    RW,
);
pub const PWM_CONTROL: CharacteristicDescriptor = chr(
    0xe95dd822_251d_470a_a062_fa1922dfa9a8,
    "PWM Control",
    IO_PIN_SERVICE_UUID,
    ValueLayout::Raw,
    W,
);

// LEDs

pub const LED_MATRIX_STATE: CharacteristicDescriptor = chr(
    0xe95d7b77_251d_470a_a062_fa1922dfa9a8,
    "LED Matrix State",
    LED_SERVICE_UUID,
    ValueLayout::LedMatrix,
    RW,
);
pub const LED_TEXT: CharacteristicDescriptor = chr(
    0xe95d93ee_251d_470a_a062_fa1922dfa9a8,
    "LED Text",
    LED_SERVICE_UUID,
    ValueLayout::Text,
    W,
);
pub const SCROLLING_DELAY: CharacteristicDescriptor = chr(
    0xe95d0d2d_251d_470a_a062_fa1922dfa9a8,
    "Scrolling Delay",
    LED_SERVICE_UUID,
    ValueLayout::U16,
    RW,
);

// Events

pub const MICROBIT_REQUIREMENTS: CharacteristicDescriptor = chr(
    0xe95db84c_251d_470a_a062_fa1922dfa9a8,
    "MicroBit Requirements",
    EVENT_SERVICE_UUID,
    ValueLayout::Raw,
    RN,
);
pub const MICROBIT_EVENT: CharacteristicDescriptor = chr(
    0xe95d9775_251d_470a_a062_fa1922dfa9a8,
    "MicroBit Event",
    EVENT_SERVICE_UUID,
    ValueLayout::Raw,
    RN,
);
pub const CLIENT_REQUIREMENTS: CharacteristicDescriptor = chr(
    0xe95d23c4_251d_470a_a062_fa1922dfa9a8,
    "Client Requirements",
    EVENT_SERVICE_UUID,
    ValueLayout::Raw,
    W,
);
pub const CLIENT_EVENT: CharacteristicDescriptor = chr(
    0xe95d5404_251d_470a_a062_fa1922dfa9a8,
    "Client Event",
    EVENT_SERVICE_UUID,
    ValueLayout::Raw,
    W,
);

// DFU

pub const DFU_CONTROL: CharacteristicDescriptor = chr(
    0xe95d93b1_251d_470a_a062_fa1922dfa9a8,
    "DFU Control",
    DFU_CONTROL_SERVICE_UUID,
    ValueLayout::Raw,
    RW,
);

// Temperature

pub const TEMPERATURE: CharacteristicDescriptor = chr(
    0xe95d9250_251d_470a_a062_fa1922dfa9a8,
    "Temperature",
    TEMPERATURE_SERVICE_UUID,
    ValueLayout::I8,
    RN,
);
pub const TEMPERATURE_PERIOD: CharacteristicDescriptor = chr(
    0xe95d1b25_251d_470a_a062_fa1922dfa9a8,
    "Temperature Period",
    TEMPERATURE_SERVICE_UUID,
    ValueLayout::U16,
    RW,
);

// UART (named from the micro:bit's point of view)

pub const UART_TX: CharacteristicDescriptor = chr(
    0x6e400002_b5a3_f393_e0a9_e50e24dcca9e,
    "Tx Characteristic",
    UART_SERVICE_UUID,
    ValueLayout::Raw,
    Properties::INDICATE,
);
pub const UART_RX: CharacteristicDescriptor = chr(
    0x6e400003_b5a3_f393_e0a9_e50e24dcca9e,
    "Rx Characteristic",
    UART_SERVICE_UUID,
    ValueLayout::Raw,
    Properties::WRITE.union(Properties::WRITE_WITHOUT_RESPONSE),
);

pub const GENERIC_ACCESS: ServiceDescriptor = srv(
    GENERIC_ACCESS_UUID,
    "Generic Access",
    &[DEVICE_NAME, APPEARANCE, PERIPHERAL_PREFERRED_CONNECTION_PARAMETERS],
);
pub const GENERIC_ATTRIBUTE: ServiceDescriptor =
    srv(GENERIC_ATTRIBUTE_UUID, "Generic Attribute", &[SERVICE_CHANGED]);
pub const DEVICE_INFORMATION: ServiceDescriptor = srv(
    DEVICE_INFORMATION_UUID,
    "Device Information",
    &[
        MODEL_NUMBER_STRING,
        SERIAL_NUMBER_STRING,
        HARDWARE_REVISION_STRING,
        FIRMWARE_REVISION_STRING,
        MANUFACTURER_NAME_STRING,
    ],
);
pub const ACCELEROMETER_SERVICE: ServiceDescriptor = srv(
    ACCELEROMETER_SERVICE_UUID,
    "Accelerometer Service",
    &[ACCELEROMETER_DATA, ACCELEROMETER_PERIOD],
);
pub const MAGNETOMETER_SERVICE: ServiceDescriptor = srv(
    MAGNETOMETER_SERVICE_UUID,
    "Magnetometer Service",
    &[
        MAGNETOMETER_DATA,
        MAGNETOMETER_PERIOD,
        MAGNETOMETER_BEARING,
        MAGNETOMETER_CALIBRATION,
    ],
);
pub const BUTTON_SERVICE: ServiceDescriptor = srv(
    BUTTON_SERVICE_UUID,
    "Button Service",
    &[BUTTON_A_STATE, BUTTON_B_STATE],
);
pub const IO_PIN_SERVICE: ServiceDescriptor = srv(
    IO_PIN_SERVICE_UUID,
    "IO Pin Service",
    &[
        PIN_DATA,
        PIN_AD_CONFIGURATION,
        PIN_IO_CONFIGURATION,
        PWM_CONTROL,
    ],
);
pub const LED_SERVICE: ServiceDescriptor = srv(
    LED_SERVICE_UUID,
    "LED Service",
    &[LED_MATRIX_STATE, LED_TEXT, SCROLLING_DELAY],
);
pub const EVENT_SERVICE: ServiceDescriptor = srv(
    EVENT_SERVICE_UUID,
    "Event Service",
    &[
        MICROBIT_REQUIREMENTS,
        MICROBIT_EVENT,
        CLIENT_REQUIREMENTS,
        CLIENT_EVENT,
    ],
);
pub const DFU_CONTROL_SERVICE: ServiceDescriptor =
    srv(DFU_CONTROL_SERVICE_UUID, "DFU Control Service", &[DFU_CONTROL]);
pub const TEMPERATURE_SERVICE: ServiceDescriptor = srv(
    TEMPERATURE_SERVICE_UUID,
    "Temperature Service",
    &[TEMPERATURE, TEMPERATURE_PERIOD],
);
pub const UART_SERVICE: ServiceDescriptor =
    srv(UART_SERVICE_UUID, "UART Service", &[UART_TX, UART_RX]);

/// Every known service, in profile order
pub static SERVICES: [ServiceDescriptor; 12] = [
    GENERIC_ACCESS,
    GENERIC_ATTRIBUTE,
    DEVICE_INFORMATION,
    ACCELEROMETER_SERVICE,
    MAGNETOMETER_SERVICE,
    BUTTON_SERVICE,
    IO_PIN_SERVICE,
    LED_SERVICE,
    EVENT_SERVICE,
    DFU_CONTROL_SERVICE,
    TEMPERATURE_SERVICE,
    UART_SERVICE,
];

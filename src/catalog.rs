//! Static component catalog: every sensor and output the kit knows about

use crate::types::{CatalogEntry, Role};

/// Sensor used by the local generator when a selection has none
pub const DEFAULT_SENSOR: &str = "Moisture Sensor";
/// Output used by the local generator when a selection has none
pub const DEFAULT_OUTPUT: &str = "Power LED";

pub const GENERIC_SENSOR_USAGE: &str = "Used as an input signal in this project.";
pub const GENERIC_OUTPUT_USAGE: &str = "Activates when alert condition is true.";

const HUMIDITY_USAGE: &str = "Monitors ambient temperature and humidity to detect hot conditions.";

pub static SENSORS: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Humidity Temperature Sensor",
        pin: "D7",
        role: Role::Sensor,
        usage: HUMIDITY_USAGE,
    },
    CatalogEntry {
        name: "Humidity & Temperature Sensor",
        pin: "D7",
        role: Role::Sensor,
        usage: HUMIDITY_USAGE,
    },
    CatalogEntry {
        name: "Moisture Sensor",
        pin: "A0",
        role: Role::Sensor,
        usage: "Monitors soil moisture to detect dry soil conditions.",
    },
    CatalogEntry {
        name: "Distance Sensor",
        pin: "Trig: D5, Echo: D6",
        role: Role::Sensor,
        usage: "Monitors object distance to detect near obstacles.",
    },
    CatalogEntry {
        name: "Light Sensor",
        pin: "A1",
        role: Role::Sensor,
        usage: "Monitors ambient light level to detect dark conditions.",
    },
    CatalogEntry {
        name: "Motion Sensor",
        pin: "D3",
        role: Role::Sensor,
        usage: "Monitors movement in the area.",
    },
    CatalogEntry {
        name: "Flow Sensor",
        pin: "D2",
        role: Role::Sensor,
        usage: "Monitors whether liquid flow is detected.",
    },
];

pub static OUTPUTS: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Buzzer",
        pin: "D8",
        role: Role::Output,
        usage: "Makes sound when alert condition is true.",
    },
    CatalogEntry {
        name: "Multicolor LED",
        pin: "D9",
        role: Role::Output,
        usage: "Turns ON when alert condition is true.",
    },
    CatalogEntry {
        name: "Relay",
        pin: "D4",
        role: Role::Output,
        usage: "Switches connected load ON when alert condition is true.",
    },
    CatalogEntry {
        name: "Power LED",
        pin: "D13",
        role: Role::Output,
        usage: "Lights up when alert condition is true.",
    },
];

pub fn sensor(name: &str) -> Option<&'static CatalogEntry> {
    SENSORS.iter().find(|e| e.name == name)
}

pub fn output(name: &str) -> Option<&'static CatalogEntry> {
    OUTPUTS.iter().find(|e| e.name == name)
}

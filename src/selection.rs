//! Selection classifier: splits raw component names into known sensors and outputs

use crate::catalog;
use crate::types::*;

/// Resolve the code-generation category of a catalog sensor
pub fn sensor_kind(entry: &CatalogEntry) -> SensorKind {
    match entry.name {
        "Humidity Temperature Sensor" | "Humidity & Temperature Sensor" => SensorKind::Humidity,
        "Distance Sensor" => SensorKind::Distance,
        _ if entry.pin.starts_with('A') => SensorKind::Analog(match entry.name {
            "Moisture Sensor" => AnalogRule::Dry,
            "Light Sensor" => AnalogRule::Dark,
            _ => AnalogRule::High,
        }),
        _ => SensorKind::Digital,
    }
}

pub fn select_sensor(entry: &'static CatalogEntry) -> SelectedSensor {
    SelectedSensor {
        entry,
        kind: sensor_kind(entry),
    }
}

/// Partition requested names by catalog membership.
///
/// Unknown names are dropped silently; duplicates collapse into the sets.
pub fn classify<S: AsRef<str>>(names: &[S]) -> ClassifiedSelection {
    let mut selection = ClassifiedSelection::default();

    for name in names {
        let name = name.as_ref();
        if let Some(entry) = catalog::sensor(name) {
            selection.sensors.insert(select_sensor(entry));
        } else if let Some(entry) = catalog::output(name) {
            selection.outputs.insert(entry);
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_splits_by_role() {
        let sel = classify(&["Buzzer", "Moisture Sensor", "Relay"]);
        assert_eq!(sel.sensor_names(), vec!["Moisture Sensor"]);
        assert_eq!(sel.output_names(), vec!["Buzzer", "Relay"]);
        assert!(sel.is_complete());
    }

    #[test]
    fn test_classify_drops_unknown_and_duplicates() {
        let sel = classify(&["Light Sensor", "Flux Capacitor", "Light Sensor", ""]);
        assert_eq!(sel.sensor_names(), vec!["Light Sensor"]);
        assert!(sel.outputs.is_empty());
        assert!(!sel.is_complete());
    }

    #[test]
    fn test_classify_empty() {
        let names: Vec<String> = vec![];
        let sel = classify(&names);
        assert!(sel.sensors.is_empty());
        assert!(sel.outputs.is_empty());
    }

    #[test]
    fn test_sensor_kinds() {
        let kind = |name| sensor_kind(catalog::sensor(name).unwrap());
        assert_eq!(kind("Humidity Temperature Sensor"), SensorKind::Humidity);
        assert_eq!(kind("Humidity & Temperature Sensor"), SensorKind::Humidity);
        assert_eq!(kind("Distance Sensor"), SensorKind::Distance);
        assert_eq!(kind("Moisture Sensor"), SensorKind::Analog(AnalogRule::Dry));
        assert_eq!(kind("Light Sensor"), SensorKind::Analog(AnalogRule::Dark));
        assert_eq!(kind("Motion Sensor"), SensorKind::Digital);
        assert_eq!(kind("Flow Sensor"), SensorKind::Digital);
    }

    #[test]
    fn test_unlisted_analog_sensor_uses_high_rule() {
        let entry = CatalogEntry {
            name: "Gas Sensor",
            pin: "A2",
            role: Role::Sensor,
            usage: "",
        };
        assert_eq!(sensor_kind(&entry), SensorKind::Analog(AnalogRule::High));
    }
}

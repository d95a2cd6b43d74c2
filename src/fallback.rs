//! Deterministic local guide generator
//!
//! Used whenever the remote model is unavailable or refuses for a recoverable
//! reason. Output depends only on the classified selection: no clock, no
//! randomness, and both sets are walked in name order.

use crate::catalog::{self, DEFAULT_OUTPUT, DEFAULT_SENSOR};
use crate::selection::select_sensor;
use crate::sketch::{SketchBuilder, BAUD_RATE};
use crate::types::*;

const DHT_DEFAULT_PIN: u8 = 7;
const DIGITAL_SENSOR_DEFAULT_PIN: u8 = 2;
const OUTPUT_DEFAULT_PIN: u8 = 13;
const TRIG_DEFAULT_PIN: u8 = 5;
const ECHO_DEFAULT_PIN: u8 = 6;

/// Sentence required when a humidity sensor drives a buzzer
pub const HUMIDITY_BUZZER_SENTENCE: &str =
    "If temperature is above 40C, the buzzer turns ON and makes sound.";

/// Sketch source plus the human-readable alert rules it implements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSketch {
    pub code: String,
    pub alert_rules: Vec<String>,
}

/// Sensors to describe, substituting the default when none were selected
fn used_sensors(selection: &ClassifiedSelection) -> Vec<SelectedSensor> {
    if selection.sensors.is_empty() {
        catalog::sensor(DEFAULT_SENSOR).map(select_sensor).into_iter().collect()
    } else {
        selection.sensors.iter().cloned().collect()
    }
}

fn used_outputs(selection: &ClassifiedSelection) -> Vec<&'static CatalogEntry> {
    if selection.outputs.is_empty() {
        catalog::output(DEFAULT_OUTPUT).into_iter().collect()
    } else {
        selection.outputs.iter().copied().collect()
    }
}

/// Parse `D<n>` (either case) into a pin number
pub fn digital_pin(pin: &str) -> Option<u8> {
    let digits = pin.strip_prefix('D').or_else(|| pin.strip_prefix('d'))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse a composite `Trig: D5, Echo: D6` pin spec
fn trig_echo_pins(pin: &str) -> (u8, u8) {
    let mut trig = None;
    let mut echo = None;
    for part in pin.split(',') {
        if let Some((label, value)) = part.split_once(':') {
            let label = label.trim();
            if label.eq_ignore_ascii_case("trig") {
                trig = digital_pin(value.trim());
            } else if label.eq_ignore_ascii_case("echo") {
                echo = digital_pin(value.trim());
            }
        }
    }
    (trig.unwrap_or(TRIG_DEFAULT_PIN), echo.unwrap_or(ECHO_DEFAULT_PIN))
}

/// Identifier stem: the component name without a trailing "Sensor"
fn stem(name: &str) -> &str {
    name.strip_suffix(" Sensor").unwrap_or(name)
}

fn words(name: &str) -> impl Iterator<Item = &str> {
    stem(name)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// `Power LED` -> `POWER_LED`
pub fn const_name(name: &str) -> String {
    words(name).map(|w| w.to_ascii_uppercase()).collect::<Vec<_>>().join("_")
}

/// `Power LED` -> `powerLed`
pub fn var_name(name: &str) -> String {
    words(name)
        .enumerate()
        .map(|(i, w)| {
            let lower = w.to_ascii_lowercase();
            if i == 0 {
                lower
            } else {
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect()
}

/// Emit the Arduino sketch for a selection
pub fn generate_sketch(selection: &ClassifiedSelection) -> GeneratedSketch {
    let mut sketch = SketchBuilder::new();
    let mut alert_rules = Vec::new();
    let mut humidity_emitted = false;

    for sensor in used_sensors(selection) {
        let name = sensor.name();
        let pin = sensor.entry.pin;

        match sensor.kind {
            SensorKind::Humidity => {
                // Every humidity sensor shares one DHT driver on the same pin
                if humidity_emitted {
                    continue;
                }
                humidity_emitted = true;

                let dht_pin = digital_pin(pin).unwrap_or(DHT_DEFAULT_PIN);
                sketch
                    .include("DHT.h")
                    .declare(format!("const int DHT_PIN = {};", dht_pin))
                    .declare("#define DHTTYPE DHT11")
                    .global("DHT dht(DHT_PIN, DHTTYPE);")
                    .setup("dht.begin();")
                    .read("float temperatureC = dht.readTemperature();")
                    .read("float humidityPercent = dht.readHumidity();")
                    .read("if (isnan(temperatureC) || isnan(humidityPercent)) {")
                    .read("  Serial.println(\"DHT read failed. Check wiring.\");")
                    .read("  delay(1000);")
                    .read("  return;")
                    .read("}")
                    .print_value("Temperature (C): ", "temperatureC")
                    .print_value("Humidity (%): ", "humidityPercent")
                    .alert_when("temperatureC > 40.0");
                alert_rules.push("- If temperature is above 40C, alert turns ON.".to_string());
            }
            SensorKind::Distance => {
                let (trig, echo) = trig_echo_pins(pin);
                let base = const_name(name);
                let var = var_name(name);
                let trig_const = format!("{}_TRIG_PIN", base);
                let echo_const = format!("{}_ECHO_PIN", base);
                let pulse = format!("{}PulseUs", var);
                let distance = format!("{}Cm", var);

                sketch
                    .declare(format!("const int {} = {};", trig_const, trig))
                    .declare(format!("const int {} = {};", echo_const, echo))
                    .setup(format!("pinMode({}, OUTPUT);", trig_const))
                    .setup(format!("pinMode({}, INPUT);", echo_const))
                    .read(format!("digitalWrite({}, LOW);", trig_const))
                    .read("delayMicroseconds(2);")
                    .read(format!("digitalWrite({}, HIGH);", trig_const))
                    .read("delayMicroseconds(10);")
                    .read(format!("digitalWrite({}, LOW);", trig_const))
                    .read(format!("long {} = pulseIn({}, HIGH, 30000);", pulse, echo_const))
                    .read(format!("float {} = ({} * 0.0343f) / 2.0f;", distance, pulse))
                    .print_value("Distance (cm): ", &distance)
                    .alert_when(&format!("{} > 0 && {} < 20", distance, distance));
                alert_rules.push("- If distance is less than 20 cm, alert turns ON.".to_string());
            }
            SensorKind::Analog(rule) => {
                let pin_const = format!("{}_PIN", const_name(name));
                let value = format!("{}Value", var_name(name));

                sketch
                    .declare(format!("const int {} = {};", pin_const, pin))
                    .setup(format!("pinMode({}, INPUT);", pin_const))
                    .read(format!("int {} = analogRead({});", value, pin_const))
                    .print_value(&format!("{}: ", name), &value);

                let (condition, rule_line) = match rule {
                    AnalogRule::Dry => (
                        format!("{} < 400", value),
                        "- If moisture value drops below 400 (dry soil), alert turns ON.".to_string(),
                    ),
                    AnalogRule::Dark => (
                        format!("{} < 300", value),
                        "- If light value drops below 300 (dark), alert turns ON.".to_string(),
                    ),
                    AnalogRule::High => (
                        format!("{} > 600", value),
                        format!("- If {} reading is above 600, alert turns ON.", name),
                    ),
                };
                sketch.alert_when(&condition);
                alert_rules.push(rule_line);
            }
            SensorKind::Digital => {
                let pin_const = format!("{}_PIN", const_name(name));
                let value = format!("{}Value", var_name(name));
                let pin_number = digital_pin(pin).unwrap_or(DIGITAL_SENSOR_DEFAULT_PIN);

                sketch
                    .declare(format!("const int {} = {};", pin_const, pin_number))
                    .setup(format!("pinMode({}, INPUT);", pin_const))
                    .read(format!("int {} = digitalRead({});", value, pin_const))
                    .print_value(&format!("{}: ", name), &value)
                    .alert_when(&format!("{} == HIGH", value));
                alert_rules.push(format!("- If {} is HIGH, alert turns ON.", name));
            }
        }
    }

    for device in used_outputs(selection) {
        let pin_const = format!("{}_PIN", const_name(device.name));
        let pin_number = digital_pin(device.pin).unwrap_or(OUTPUT_DEFAULT_PIN);

        sketch
            .declare(format!("const int {} = {};", pin_const, pin_number))
            .setup(format!("pinMode({}, OUTPUT);", pin_const))
            .follow_alert(&pin_const);
    }

    GeneratedSketch {
        code: sketch.render(),
        alert_rules,
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}

/// Build the complete markdown guide, sketch included
pub fn build_fallback_guide(selection: &ClassifiedSelection) -> String {
    let sensors = used_sensors(selection);
    let outputs = used_outputs(selection);
    let sketch = generate_sketch(selection);

    let pin_map = sensors
        .iter()
        .map(|s| format!("- {}: {}", s.name(), s.entry.pin))
        .chain(outputs.iter().map(|o| format!("- {}: {}", o.name, o.pin)))
        .collect::<Vec<_>>()
        .join("\n");

    let sensor_uses = sensors
        .iter()
        .map(|s| format!("- {}: {}", s.name(), usage_or(s.entry.usage, catalog::GENERIC_SENSOR_USAGE)))
        .collect::<Vec<_>>()
        .join("\n");

    let output_uses = outputs
        .iter()
        .map(|o| format!("- {}: {}", o.name, usage_or(o.usage, catalog::GENERIC_OUTPUT_USAGE)))
        .collect::<Vec<_>>()
        .join("\n");

    let summary = [
        format!(
            "- You will build a simple Arduino monitoring system using {} input sensor{}.",
            sensors.len(),
            plural(sensors.len())
        ),
        format!(
            "- The board reads live sensor values and controls {} output device{} automatically.",
            outputs.len(),
            plural(outputs.len())
        ),
        "- Outputs turn ON when conditions are met and turn OFF when conditions return to normal."
            .to_string(),
    ]
    .join("\n");

    let has_humidity = sensors.iter().any(|s| s.kind == SensorKind::Humidity);
    let has_buzzer = outputs.iter().any(|o| o.name == "Buzzer");

    let example_line = if has_humidity && has_buzzer {
        format!("- {}", HUMIDITY_BUZZER_SENTENCE)
    } else {
        "- Example: when a sensor condition crosses its threshold, selected outputs turn ON; otherwise they stay OFF."
            .to_string()
    };

    let libraries = if has_humidity {
        "Install \"DHT sensor library\" by Adafruit from Tools -> Manage Libraries.\n\
         When asked, also install its dependency \"Adafruit Unified Sensor\"."
    } else {
        "No additional libraries are required for this starter version."
    };

    format!(
        r#"1. PROJECT TITLE
Smart Sensor Starter Project

A beginner-friendly Arduino project using your selected components.
This fallback guide was generated locally so you can continue building.

2. PROJECT DESCRIPTION

This project builds an automated monitoring and alert system using your selected components.

What you will build (simple overview):
{summary}

Selected sensor uses:
{sensor_uses}

Selected output device uses:
{output_uses}

Alert logic used in code:
{alert_rules}

3. EXPECTED OUTPUT

- Serial Monitor shows live sensor values and final "Alert state: ON/OFF" every second.
- Output behavior for your selected devices:
{output_uses}
- Outputs turn ON when any alert condition is true and turn OFF when no alert condition is true.
{example_line}

4. CONNECTING THE SENSORS TO PCB

[IMAGE PLACEHOLDER]

Plug in the female connector onto the male connector on the PCB and the other end to the sensor. Similarly connect 2-pin connectors and 4-pin connectors.

Always connect:
- Positive (VCC) to Positive
- Negative (GND) to Negative

Pin Mapping:
{pin_map}

5. POWERING THE PCB

[IMAGE PLACEHOLDER]

Power up PCB using power adapter:
Connect one end to the box and other end to the socket.

6. CONNECT PCB TO COMPUTER

[IMAGE PLACEHOLDER]

Connect PCB to your computer using USB cable.
The USB cable allows your computer to send and receive data.

7. ARDUINO IDE SETUP

a) Tools -> Board -> Arduino/Genuino Uno
b) Tools -> Port -> COM <any number>

```cpp
{code}
```

8. ADD LIBRARIES

{libraries}

9. TEST YOUR CODE

Upload the code, open Serial Monitor at {baud} baud, and verify sensor values are printing every second.

10. DISCONNECT USB CABLE FROM PCB

11. WELL DONE
"#,
        alert_rules = sketch.alert_rules.join("\n"),
        code = sketch.code,
        baud = BAUD_RATE,
    )
}

fn usage_or(usage: &'static str, generic: &'static str) -> &'static str {
    if usage.trim().is_empty() {
        generic
    } else {
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::classify;

    #[test]
    fn test_identifier_names() {
        assert_eq!(const_name("Moisture Sensor"), "MOISTURE");
        assert_eq!(const_name("Power LED"), "POWER_LED");
        assert_eq!(var_name("Power LED"), "powerLed");
        assert_eq!(var_name("Distance Sensor"), "distance");
        assert_eq!(var_name("Multicolor LED"), "multicolorLed");
    }

    #[test]
    fn test_digital_pin_parsing() {
        assert_eq!(digital_pin("D13"), Some(13));
        assert_eq!(digital_pin("d4"), Some(4));
        assert_eq!(digital_pin("A0"), None);
        assert_eq!(digital_pin("D"), None);
        assert_eq!(digital_pin("D1x"), None);
        assert_eq!(trig_echo_pins("Trig: D5, Echo: D6"), (5, 6));
        assert_eq!(trig_echo_pins("Echo: D11, Trig: D10"), (10, 11));
        assert_eq!(trig_echo_pins("garbage"), (5, 6));
    }

    #[test]
    fn test_moisture_led_sketch() {
        let sketch = generate_sketch(&classify(&["Moisture Sensor", "Power LED"]));
        assert!(sketch.code.contains("const int MOISTURE_PIN = A0;"));
        assert!(sketch.code.contains("const int POWER_LED_PIN = 13;"));
        assert!(sketch.code.contains("int moistureValue = analogRead(MOISTURE_PIN);"));
        assert!(sketch.code.contains("if (moistureValue < 400) { alert = true; }"));
        assert!(sketch.code.contains("digitalWrite(POWER_LED_PIN, alert ? HIGH : LOW);"));
        assert_eq!(sketch.code.matches("const int ").count(), 2);
        assert!(!sketch.code.contains("#include"));
    }

    #[test]
    fn test_humidity_driver_emitted_once() {
        let sketch = generate_sketch(&classify(&[
            "Humidity Temperature Sensor",
            "Humidity & Temperature Sensor",
            "Buzzer",
        ]));
        assert_eq!(sketch.code.matches("#include <DHT.h>").count(), 1);
        assert_eq!(sketch.code.matches("DHT dht(DHT_PIN, DHTTYPE);").count(), 1);
        assert_eq!(sketch.code.matches("float temperatureC").count(), 1);
        assert_eq!(sketch.alert_rules.len(), 1);
        assert!(sketch.code.starts_with("#include <DHT.h>\n\nconst int DHT_PIN = 7;\n#define DHTTYPE DHT11"));
    }

    #[test]
    fn test_distance_sketch() {
        let sketch = generate_sketch(&classify(&["Distance Sensor", "Relay"]));
        assert!(sketch.code.contains("const int DISTANCE_TRIG_PIN = 5;"));
        assert!(sketch.code.contains("const int DISTANCE_ECHO_PIN = 6;"));
        assert!(sketch.code.contains("long distancePulseUs = pulseIn(DISTANCE_ECHO_PIN, HIGH, 30000);"));
        assert!(sketch.code.contains("float distanceCm = (distancePulseUs * 0.0343f) / 2.0f;"));
        assert!(sketch.code.contains("if (distanceCm > 0 && distanceCm < 20) { alert = true; }"));
    }

    #[test]
    fn test_digital_and_light_rules() {
        let sketch = generate_sketch(&classify(&["Motion Sensor", "Light Sensor", "Buzzer"]));
        assert!(sketch.code.contains("const int MOTION_PIN = 3;"));
        assert!(sketch.code.contains("if (motionValue == HIGH) { alert = true; }"));
        assert!(sketch.code.contains("if (lightValue < 300) { alert = true; }"));
        // Light sorts before Motion
        assert_eq!(
            sketch.alert_rules,
            vec![
                "- If light value drops below 300 (dark), alert turns ON.".to_string(),
                "- If Motion Sensor is HIGH, alert turns ON.".to_string(),
            ]
        );
    }

    #[test]
    fn test_every_output_follows_shared_alert() {
        let sketch = generate_sketch(&classify(&["Flow Sensor", "Buzzer", "Relay", "Multicolor LED"]));
        assert_eq!(sketch.code.matches("alert ? HIGH : LOW").count(), 3);
        assert_eq!(sketch.code.matches("bool alert = false;").count(), 1);
    }

    #[test]
    fn test_empty_selection_uses_defaults() {
        let guide = build_fallback_guide(&ClassifiedSelection::default());
        assert!(guide.contains("- Moisture Sensor: A0"));
        assert!(guide.contains("- Power LED: D13"));
        assert!(guide.contains("using 1 input sensor."));
    }

    #[test]
    fn test_guide_section_order() {
        let guide = build_fallback_guide(&classify(&["Moisture Sensor", "Power LED"]));
        let headings = [
            "1. PROJECT TITLE",
            "2. PROJECT DESCRIPTION",
            "3. EXPECTED OUTPUT",
            "4. CONNECTING THE SENSORS TO PCB",
            "5. POWERING THE PCB",
            "6. CONNECT PCB TO COMPUTER",
            "7. ARDUINO IDE SETUP",
            "```cpp",
            "8. ADD LIBRARIES",
            "9. TEST YOUR CODE",
            "10. DISCONNECT USB CABLE FROM PCB",
            "11. WELL DONE",
        ];
        let positions: Vec<usize> = headings
            .iter()
            .map(|h| guide.find(h).unwrap_or_else(|| panic!("missing {}", h)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(guide.matches("```").count(), 2);
        assert!(guide.contains("No additional libraries are required"));
    }

    #[test]
    fn test_humidity_buzzer_sentence() {
        let guide = build_fallback_guide(&classify(&["Humidity Temperature Sensor", "Buzzer"]));
        let expected = guide.find("3. EXPECTED OUTPUT").unwrap();
        let wiring = guide.find("4. CONNECTING").unwrap();
        assert!(guide[expected..wiring].contains(HUMIDITY_BUZZER_SENTENCE));
        assert!(guide.contains("DHT sensor library"));

        let other = build_fallback_guide(&classify(&["Humidity Temperature Sensor", "Relay"]));
        assert!(!other.contains(HUMIDITY_BUZZER_SENTENCE));
    }

    #[test]
    fn test_guide_is_idempotent_and_order_independent() {
        let a = build_fallback_guide(&classify(&["Buzzer", "Light Sensor", "Distance Sensor", "Relay"]));
        let b = build_fallback_guide(&classify(&["Relay", "Distance Sensor", "Buzzer", "Light Sensor"]));
        let c = build_fallback_guide(&classify(&["Relay", "Distance Sensor", "Buzzer", "Light Sensor"]));
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_plural_summary() {
        let guide = build_fallback_guide(&classify(&["Light Sensor", "Flow Sensor", "Relay"]));
        assert!(guide.contains("using 2 input sensors."));
        assert!(guide.contains("controls 1 output device automatically."));
    }
}

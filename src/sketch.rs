//! Structured builder for Arduino sketches
//!
//! Statements accumulate into typed sections and are joined exactly once in
//! `render`, so section order never depends on the order sensors are visited.

/// Serial monitor baud rate used by every generated sketch
pub const BAUD_RATE: u32 = 9600;
/// Delay at the end of each loop cycle, in milliseconds
pub const CYCLE_DELAY_MS: u32 = 1000;

const INDENT: &str = "  ";

#[derive(Debug, Clone, Default)]
pub struct SketchBuilder {
    includes: Vec<String>,
    declarations: Vec<String>,
    globals: Vec<String>,
    setup: Vec<String>,
    reads: Vec<String>,
    serial: Vec<String>,
    alerts: Vec<String>,
    outputs: Vec<String>,
}

impl SketchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `#include <header>`; repeated headers are kept once
    pub fn include(&mut self, header: &str) -> &mut Self {
        let line = format!("#include <{}>", header);
        if !self.includes.contains(&line) {
            self.includes.push(line);
        }
        self
    }

    /// Top-level pin constant or `#define`
    pub fn declare(&mut self, line: impl Into<String>) -> &mut Self {
        self.declarations.push(line.into());
        self
    }

    /// Top-level object, e.g. a driver instance
    pub fn global(&mut self, line: impl Into<String>) -> &mut Self {
        self.globals.push(line.into());
        self
    }

    pub fn setup(&mut self, stmt: impl AsRef<str>) -> &mut Self {
        self.setup.push(indent(stmt.as_ref()));
        self
    }

    pub fn read(&mut self, stmt: impl AsRef<str>) -> &mut Self {
        self.reads.push(indent(stmt.as_ref()));
        self
    }

    /// `Serial.print(label)` followed by `Serial.println(expr)`
    pub fn print_value(&mut self, label: &str, expr: &str) -> &mut Self {
        self.serial.push(indent(&format!("Serial.print(\"{}\");", label)));
        self.serial.push(indent(&format!("Serial.println({});", expr)));
        self
    }

    /// Raise the shared alert flag when `condition` holds
    pub fn alert_when(&mut self, condition: &str) -> &mut Self {
        self.alerts.push(indent(&format!("if ({}) {{ alert = true; }}", condition)));
        self
    }

    /// Drive a pin from the shared alert flag
    pub fn follow_alert(&mut self, pin_const: &str) -> &mut Self {
        self.outputs.push(indent(&format!("digitalWrite({}, alert ? HIGH : LOW);", pin_const)));
        self
    }

    pub fn render(&self) -> String {
        let blocks: Vec<String> = [&self.includes, &self.declarations, &self.globals]
            .into_iter()
            .filter(|lines| !lines.is_empty())
            .map(|lines| lines.join("\n"))
            .collect();

        let mut out = String::new();
        if !blocks.is_empty() {
            out.push_str(&blocks.join("\n\n"));
            out.push_str("\n\n");
        }

        out.push_str("void setup() {\n");
        out.push_str(&format!("{INDENT}Serial.begin({});\n", BAUD_RATE));
        push_lines(&mut out, &self.setup);
        out.push_str(&format!("{INDENT}Serial.println(\"Project started. Monitoring sensors...\");\n"));
        out.push_str("}\n\n");

        out.push_str("void loop() {\n");
        push_lines(&mut out, &self.reads);
        out.push('\n');
        push_lines(&mut out, &self.serial);
        out.push('\n');
        out.push_str(&format!("{INDENT}bool alert = false;\n"));
        push_lines(&mut out, &self.alerts);
        out.push('\n');
        push_lines(&mut out, &self.outputs);
        out.push('\n');
        out.push_str(&format!("{INDENT}Serial.print(\"Alert state: \");\n"));
        out.push_str(&format!("{INDENT}Serial.println(alert ? \"ON\" : \"OFF\");\n"));
        out.push_str(&format!("{INDENT}Serial.println(\"----------------------\");\n"));
        out.push_str(&format!("{INDENT}delay({});\n", CYCLE_DELAY_MS));
        out.push('}');

        out
    }
}

fn indent(stmt: &str) -> String {
    format!("{}{}", INDENT, stmt)
}

fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes_are_deduplicated() {
        let mut sketch = SketchBuilder::new();
        sketch.include("DHT.h").include("Wire.h").include("DHT.h");
        let code = sketch.render();
        assert_eq!(code.matches("#include <DHT.h>").count(), 1);
        assert!(code.starts_with("#include <DHT.h>\n#include <Wire.h>\n\n"));
    }

    #[test]
    fn test_render_layout() {
        let mut sketch = SketchBuilder::new();
        sketch
            .declare("const int FLOW_PIN = 2;")
            .declare("const int RELAY_PIN = 4;")
            .setup("pinMode(FLOW_PIN, INPUT);")
            .setup("pinMode(RELAY_PIN, OUTPUT);")
            .read("int flowValue = digitalRead(FLOW_PIN);")
            .print_value("Flow Sensor: ", "flowValue")
            .alert_when("flowValue == HIGH")
            .follow_alert("RELAY_PIN");

        let expected = "\
const int FLOW_PIN = 2;
const int RELAY_PIN = 4;

void setup() {
  Serial.begin(9600);
  pinMode(FLOW_PIN, INPUT);
  pinMode(RELAY_PIN, OUTPUT);
  Serial.println(\"Project started. Monitoring sensors...\");
}

void loop() {
  int flowValue = digitalRead(FLOW_PIN);

  Serial.print(\"Flow Sensor: \");
  Serial.println(flowValue);

  bool alert = false;
  if (flowValue == HIGH) { alert = true; }

  digitalWrite(RELAY_PIN, alert ? HIGH : LOW);

  Serial.print(\"Alert state: \");
  Serial.println(alert ? \"ON\" : \"OFF\");
  Serial.println(\"----------------------\");
  delay(1000);
}";
        assert_eq!(sketch.render(), expected);
    }

    #[test]
    fn test_globals_follow_declarations() {
        let mut sketch = SketchBuilder::new();
        sketch.global("DHT dht(DHT_PIN, DHTTYPE);").declare("const int DHT_PIN = 7;");
        let code = sketch.render();
        let decl = code.find("const int DHT_PIN").unwrap();
        let global = code.find("DHT dht(").unwrap();
        assert!(decl < global);
    }
}

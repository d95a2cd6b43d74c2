//! Structured prompt sent to the remote model

use crate::fallback::HUMIDITY_BUZZER_SENTENCE;
use crate::types::ClassifiedSelection;

/// Sentence the model must print when the parts cannot form one project
pub const INCOMPATIBLE_SENTENCE: &str =
    "We cannot connect all selected sensors into one meaningful project.";

fn component_list<'a>(items: impl Iterator<Item = (&'a str, &'a str)>, empty: &str) -> String {
    let lines: Vec<String> = items
        .map(|(name, pin)| format!("- {} (Pin: {})", name, pin))
        .collect();
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

/// Build the full instruction prompt for a classified selection
pub fn build_prompt(selection: &ClassifiedSelection) -> String {
    let sensors = component_list(
        selection.sensors.iter().map(|s| (s.name(), s.entry.pin)),
        "No input sensors selected",
    );
    let outputs = component_list(
        selection.outputs.iter().map(|o| (o.name, o.pin)),
        "No output devices selected",
    );

    format!(
        r#"You are an Arduino project instructor for beginners.
Create one complete, practical project guide and one complete Arduino sketch.

Selected Input Sensors:
{sensors}

Selected Output Devices:
{outputs}

Task rules:
- If all selected components can work together in one meaningful project, use all of them.
- If not, print this exact sentence first:
"{incompatible}"
- Then choose a compatible subset and continue with a complete guide for that subset.
- Always use exact pin mapping from the list above.
- Keep code and explanations beginner-friendly.

Output requirements:
- Respond in markdown only.
- Do not use HTML.
- Do not use tables.
- Return exactly one complete guide.
- Return exactly one fenced code block with language tag cpp.
- The cpp block must contain one full, copy-paste-ready Arduino sketch.
- Do not output snippets, pseudocode, placeholders, TODO text, or omitted parts.
- In PROJECT DESCRIPTION, include:
  1) A simple 2-3 line beginner-friendly overview of what the user is going to build
  2) "Sensor uses" bullet list for each selected sensor
  3) "Output device uses" bullet list for each selected output device
  4) "Control logic" bullet list in IF condition -> THEN output format with numeric thresholds.
- In EXPECTED OUTPUT, include exact behavior for each selected output device.
- If final project includes Humidity & Temperature Sensor and Buzzer, include this exact line:
"{humidity_buzzer}"

Follow this exact section format:

1. PROJECT TITLE
[Short heading of the project]

[Small simple description - 2-3 beginner-friendly lines]

2. PROJECT DESCRIPTION

[Explain what the user is building and how it works end-to-end.
Then include:
- A simple 2-3 line beginner-friendly overview of what they are going to build.
- Sensor uses: one bullet for each selected sensor. If no sensor is selected, show 'no input sensor selected'.
- Output device uses: one bullet for each selected output device. If no output device is selected, show 'no output device selected'.
- Control logic: one bullet for each IF condition -> THEN output rule, with clear threshold values.]

3. EXPECTED OUTPUT

[Clearly explain what user should see in Serial Monitor.
Then list how each selected output behaves for each trigger condition.]

4. CONNECTING THE SENSORS TO PCB

[IMAGE PLACEHOLDER]

Below image, write:
"Plug in the female connector onto the male connector on the PCB and the other end to the sensor. Similarly connect 2-pin connectors and 4-pin connectors.

Always connect:
- Positive (VCC) to Positive
- Negative (GND) to Negative"

Pin Mapping:
[List only the sensors/outputs used in the final project with their pins]

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

[Generate FULL ready-to-paste Arduino code. Code must:
- Compile on Arduino Uno
- Declare explicit pin constants for every selected sensor/output
- Use only required libraries
- Include full setup() and full loop()
- Include helper functions only if needed
- Read all selected sensors used in the project
- Control all selected outputs used in the project
- Print clear Serial Monitor logs for sensor values and output state
- Keep logic simple and readable for beginners]

8. ADD LIBRARIES

[Include only necessary libraries based on the sensors used]

9. TEST YOUR CODE

[Brief testing instructions]

10. DISCONNECT USB CABLE FROM PCB

11. WELL DONE

[BACK TO HOME BUTTON]

Final check before output:
- Ensure code block is complete and compilable.
- Ensure every used component appears in pin mapping and code.

Generate the final guide now."#,
        incompatible = INCOMPATIBLE_SENTENCE,
        humidity_buzzer = HUMIDITY_BUZZER_SENTENCE,
    )
}

//! JSON import/export of schematics.
//!
//! The format lists components with the wire each terminal sits on:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "components": [
//!     { "id": "c1", "type": "battery", "name": "B1",
//!       "start": { "wireId": "w1" }, "end": { "wireId": "w2" }, "voltage": 9 },
//!     { "id": "c2", "type": "resistor", "name": "R1",
//!       "start": { "wireId": "w1" }, "end": { "wireId": "w2" }, "resistance": 100 }
//!   ]
//! }
//! ```
//!
//! Listed quantities are fixed inputs. Extra fields such as drawing
//! coordinates are ignored on import.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, NodeId, Terminal};
use crate::components::{ComponentKind, Quantity, Value};
use crate::error::{LabError, Result};

/// Format version written by [`to_json`].
pub const FORMAT_VERSION: &str = "1.0";

/// An identifier that may be written as a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Number(u64),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(s) => f.write_str(s),
            Label::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Top-level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchematicFile {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub components: Vec<ComponentRecord>,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: Label,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub name: String,
    pub start: TerminalRecord,
    pub end: TerminalRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

impl ComponentRecord {
    fn quantity(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::Resistance => self.resistance,
            Quantity::Voltage => self.voltage,
            Quantity::Current => self.current,
            Quantity::Power => self.power,
        }
    }

    fn quantity_mut(&mut self, quantity: Quantity) -> &mut Option<f64> {
        match quantity {
            Quantity::Resistance => &mut self.resistance,
            Quantity::Voltage => &mut self.voltage,
            Quantity::Current => &mut self.current,
            Quantity::Power => &mut self.power,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerminalRecord {
    #[serde(rename = "wireId", default)]
    pub wire_id: Option<Label>,
}

/// Build a schematic from a parsed document.
///
/// Terminals naming the same `wireId` are wired together; a wire id used by
/// a single terminal leaves it unwired.
pub fn from_file_data(file: &SchematicFile) -> Result<Circuit> {
    let mut circuit = Circuit::new();
    let mut wires: IndexMap<Label, Vec<NodeId>> = IndexMap::new();

    for record in &file.components {
        let kind: ComponentKind = record.component_type.parse()?;
        if !record.name.is_empty() && circuit.find_by_name(&record.name).is_some() {
            return Err(LabError::DuplicateComponent {
                name: record.name.clone(),
            });
        }

        let id = circuit.add_component(kind, record.name.clone());
        let component = circuit.component_mut(id)?;
        for quantity in Quantity::ALL {
            if let Some(value) = record.quantity(quantity) {
                component.values.fix(quantity, value);
            }
        }
        if let Some(closed) = record.closed {
            component.closed = closed;
        }

        for (terminal, wire) in [(Terminal::Start, &record.start), (Terminal::End, &record.end)] {
            if let Some(label) = &wire.wire_id {
                wires
                    .entry(label.clone())
                    .or_default()
                    .push(component.terminal(terminal));
            }
        }
    }

    for (label, members) in wires {
        match members.split_first() {
            Some((&first, rest)) if !rest.is_empty() => {
                for &other in rest {
                    circuit.connect(first, other)?;
                }
            }
            _ => log::debug!("wire {} has a single terminal, leaving it unwired", label),
        }
    }

    Ok(circuit)
}

/// Parse a JSON schematic.
pub fn from_json(json: &str) -> Result<Circuit> {
    let file: SchematicFile = serde_json::from_str(json)?;
    from_file_data(&file)
}

/// Read a JSON schematic from disk.
pub fn load(path: &Path) -> Result<Circuit> {
    let content = std::fs::read_to_string(path).map_err(|e| LabError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    from_json(&content)
}

/// Describe a schematic as a document. Only fixed quantities are listed.
pub fn to_file_data(circuit: &Circuit) -> SchematicFile {
    let components = circuit
        .components()
        .map(|component| {
            let wire = |terminal| TerminalRecord {
                wire_id: circuit
                    .terminal_wire(component.id, terminal)
                    .map(|w| Label::Text(w.to_string())),
            };
            let mut record = ComponentRecord {
                id: Label::Text(component.id.to_string()),
                component_type: component.kind.as_str().to_string(),
                name: component.name.clone(),
                start: wire(Terminal::Start),
                end: wire(Terminal::End),
                resistance: None,
                voltage: None,
                current: None,
                power: None,
                closed: (component.kind == ComponentKind::Switch).then_some(component.closed),
            };
            for quantity in Quantity::ALL {
                if let Value::Fixed(value) = component.values.get(quantity) {
                    *record.quantity_mut(quantity) = Some(*value);
                }
            }
            record
        })
        .collect();

    SchematicFile {
        version: FORMAT_VERSION.to_string(),
        title: None,
        components,
    }
}

/// Serialize a schematic as pretty-printed JSON.
pub fn to_json(circuit: &Circuit) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_file_data(circuit))?)
}

/// Write a schematic to disk as JSON.
pub fn save(circuit: &Circuit, path: &Path) -> Result<()> {
    let json = to_json(circuit)?;
    std::fs::write(path, json).map_err(|e| LabError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIVIDER: &str = r#"{
        "version": "1.0",
        "timestamp": "2025-01-01T00:00:00Z",
        "components": [
            { "id": "b", "type": "battery", "name": "B1", "x": 10, "y": 20,
              "start": { "id": "n1", "wireId": "w1" }, "end": { "wireId": "w3" }, "voltage": 9 },
            { "id": "r1", "type": "resistor", "name": "R1",
              "start": { "wireId": "w1" }, "end": { "wireId": 2 }, "resistance": 100 },
            { "id": "a", "type": "ampermeter", "name": "A1",
              "start": { "wireId": 2 }, "end": { "wireId": "w3" } },
            { "id": "s", "type": "switch", "name": "SW1", "closed": false,
              "start": { "wireId": "loose" }, "end": { "wireId": null } }
        ]
    }"#;

    #[test]
    fn test_import() {
        let c = from_json(DIVIDER).unwrap();
        assert_eq!(c.len(), 4);

        let b = c.find_by_name("B1").unwrap();
        assert_eq!(b.values.voltage, Value::Fixed(9.0));
        let ammeter = c.find_by_name("A1").unwrap();
        assert_eq!(ammeter.kind, ComponentKind::Ammeter);
        assert!(!c.find_by_name("SW1").unwrap().closed);

        let r1 = c.id_of("R1").unwrap();
        assert_eq!(
            c.terminal_wire(r1, Terminal::End),
            c.terminal_wire(ammeter.id, Terminal::Start)
        );
        assert_eq!(c.terminal_wire(c.id_of("SW1").unwrap(), Terminal::Start), None);
        assert_eq!(c.wires().count(), 3);
    }

    #[test]
    fn test_export_lists_fixed_values_and_wires() {
        let c = from_json(DIVIDER).unwrap();
        let file = to_file_data(&c);

        assert_eq!(file.version, FORMAT_VERSION);
        let r1 = file.components.iter().find(|r| r.name == "R1").unwrap();
        assert_eq!(r1.component_type, "resistor");
        assert_eq!(r1.resistance, Some(100.0));
        assert_eq!(r1.current, None);
        assert!(r1.closed.is_none());
        let a1 = file.components.iter().find(|r| r.name == "A1").unwrap();
        assert_eq!(a1.component_type, "ammeter");
        assert_eq!(r1.end.wire_id, a1.start.wire_id);

        let reloaded = from_json(&to_json(&c).unwrap()).unwrap();
        assert_eq!(reloaded.wires().count(), 3);
        assert!(!reloaded.find_by_name("SW1").unwrap().closed);
    }

    #[test]
    fn test_import_errors() {
        let unknown = r#"{ "components": [ { "id": 1, "type": "capacitor",
            "start": {}, "end": {} } ] }"#;
        assert!(matches!(
            from_json(unknown),
            Err(LabError::UnknownComponentType { .. })
        ));

        let duplicate = r#"{ "components": [
            { "id": 1, "type": "resistor", "name": "R1", "start": {}, "end": {} },
            { "id": 2, "type": "resistor", "name": "R1", "start": {}, "end": {} } ] }"#;
        assert!(matches!(
            from_json(duplicate),
            Err(LabError::DuplicateComponent { .. })
        ));

        assert!(matches!(from_json("{ not json"), Err(LabError::Json(_))));
    }
}

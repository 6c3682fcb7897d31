//! Component model for the schematic.
//!
//! Every component is an idealized two-terminal element:
//! - Battery: ideal EMF source (`start` is the positive pole)
//! - Resistor, Bulb: passive loads
//! - Switch: zero resistance, conducts only while closed
//! - Ammeter: zero resistance by default
//! - Voltmeter: draws zero current by default
//!
//! Components hold their terminal node ids, never references to nodes or
//! wires; connectivity lives in the [`crate::circuit::Circuit`] arena.

mod values;

pub use values::{Quantity, Value, Values};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::circuit::{ComponentId, NodeId, Terminal};
use crate::error::LabError;

/// The type tag of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Battery,
    Resistor,
    Switch,
    Bulb,
    #[serde(alias = "ampermeter")]
    Ammeter,
    Voltmeter,
}

impl ComponentKind {
    /// Kinds through which current may only flow from `start` to `end`.
    pub fn is_directional(&self) -> bool {
        matches!(
            self,
            ComponentKind::Battery
                | ComponentKind::Ammeter
                | ComponentKind::Voltmeter
                | ComponentKind::Bulb
        )
    }

    /// Lowercase name, as used in summaries and the JSON format.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Battery => "battery",
            ComponentKind::Resistor => "resistor",
            ComponentKind::Switch => "switch",
            ComponentKind::Bulb => "bulb",
            ComponentKind::Ammeter => "ammeter",
            ComponentKind::Voltmeter => "voltmeter",
        }
    }

    /// Name prefix used when a component is created without a name.
    pub fn prefix(&self) -> &'static str {
        match self {
            ComponentKind::Battery => "B",
            ComponentKind::Resistor => "R",
            ComponentKind::Switch => "SW",
            ComponentKind::Bulb => "L",
            ComponentKind::Ammeter => "A",
            ComponentKind::Voltmeter => "V",
        }
    }

    /// The quantity a bare positional value sets (e.g. `R1 a b 100`).
    pub fn primary_quantity(&self) -> Option<Quantity> {
        match self {
            ComponentKind::Battery => Some(Quantity::Voltage),
            ComponentKind::Resistor | ComponentKind::Bulb => Some(Quantity::Resistance),
            _ => None,
        }
    }

    /// Initial values for a freshly placed component.
    pub fn default_values(&self) -> Values {
        let mut values = Values::default();
        match self {
            ComponentKind::Ammeter | ComponentKind::Switch => values.fix(Quantity::Resistance, 0.0),
            ComponentKind::Voltmeter => values.fix(Quantity::Current, 0.0),
            _ => {}
        }
        values
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "battery" => Ok(ComponentKind::Battery),
            "resistor" => Ok(ComponentKind::Resistor),
            "switch" => Ok(ComponentKind::Switch),
            "bulb" | "lamp" => Ok(ComponentKind::Bulb),
            "ammeter" | "ampermeter" => Ok(ComponentKind::Ammeter),
            "voltmeter" => Ok(ComponentKind::Voltmeter),
            _ => Err(LabError::UnknownComponentType {
                component_type: s.to_string(),
            }),
        }
    }
}

/// A two-terminal element placed on the schematic.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub name: String,
    /// Positive pole for batteries
    pub start: NodeId,
    /// Negative pole for batteries
    pub end: NodeId,
    pub values: Values,
    /// Switch state; ignored for other kinds.
    pub closed: bool,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        kind: ComponentKind,
        name: String,
        start: NodeId,
        end: NodeId,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            start,
            end,
            values: kind.default_values(),
            closed: true,
        }
    }

    /// Node id of one terminal.
    pub fn terminal(&self, terminal: Terminal) -> NodeId {
        match terminal {
            Terminal::Start => self.start,
            Terminal::End => self.end,
        }
    }

    /// Which terminal a node is, if it belongs to this component.
    pub fn terminal_of(&self, node: NodeId) -> Option<Terminal> {
        if node == self.start {
            Some(Terminal::Start)
        } else if node == self.end {
            Some(Terminal::End)
        } else {
            None
        }
    }

    /// Whether current can pass at all (open switches cannot conduct).
    pub fn conducts(&self) -> bool {
        self.kind != ComponentKind::Switch || self.closed
    }

    pub fn is_battery(&self) -> bool {
        self.kind == ComponentKind::Battery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(kind: ComponentKind) -> Component {
        Component::new(ComponentId(0), kind, "X1".to_string(), NodeId(0), NodeId(1))
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Battery".parse::<ComponentKind>().unwrap(), ComponentKind::Battery);
        assert_eq!("ampermeter".parse::<ComponentKind>().unwrap(), ComponentKind::Ammeter);
        assert!("capacitor".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn test_directional_kinds() {
        assert!(ComponentKind::Bulb.is_directional());
        assert!(ComponentKind::Battery.is_directional());
        assert!(!ComponentKind::Resistor.is_directional());
        assert!(!ComponentKind::Switch.is_directional());
    }

    #[test]
    fn test_meter_defaults() {
        let a = make(ComponentKind::Ammeter);
        assert_eq!(a.values.resistance, Value::Fixed(0.0));
        let v = make(ComponentKind::Voltmeter);
        assert_eq!(v.values.current, Value::Fixed(0.0));
        let r = make(ComponentKind::Resistor);
        assert_eq!(r.values, Values::default());
    }

    #[test]
    fn test_switch_conducts_only_when_closed() {
        let mut sw = make(ComponentKind::Switch);
        assert!(sw.conducts());
        sw.closed = false;
        assert!(!sw.conducts());

        let mut r = make(ComponentKind::Resistor);
        r.closed = false;
        assert!(r.conducts());
    }

    #[test]
    fn test_terminal_lookup() {
        let c = make(ComponentKind::Resistor);
        assert_eq!(c.terminal(Terminal::End), NodeId(1));
        assert_eq!(c.terminal_of(NodeId(0)), Some(Terminal::Start));
        assert_eq!(c.terminal_of(NodeId(5)), None);
    }
}

//! Abstract Syntax Tree types for the schematic DSL.

use std::collections::HashMap;

use crate::components::ComponentKind;

/// Complete AST representation of a parsed schematic.
#[derive(Debug, Clone, Default)]
pub struct SchematicAst {
    /// All component instances
    pub components: Vec<ComponentDef>,
    /// Pairs of net names declared identical with `.join`
    pub joins: Vec<(String, String)>,
    /// Optional `.title` text
    pub title: Option<String>,
}

impl SchematicAst {
    /// Create a new empty schematic AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A component line from the DSL.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    pub kind: ComponentKind,
    /// Unique component name
    pub name: String,
    /// Net names of the start and end terminals
    pub nets: [String; 2],
    /// Positional value (battery EMF, resistance)
    pub value: Option<f64>,
    /// Fixed quantities keyed by `r`, `v`, `i`, `p`
    pub params: HashMap<String, f64>,
    /// Switch state, if given
    pub closed: Option<bool>,
    /// Source line number for error reporting
    pub line: usize,
}

/// Parse a component kind from a leading keyword (`BATTERY B1 ...`).
pub fn kind_from_keyword(keyword: &str) -> Option<ComponentKind> {
    match keyword.to_ascii_uppercase().as_str() {
        "BATTERY" => Some(ComponentKind::Battery),
        "RESISTOR" => Some(ComponentKind::Resistor),
        "BULB" | "LAMP" => Some(ComponentKind::Bulb),
        "SWITCH" => Some(ComponentKind::Switch),
        "AMMETER" => Some(ComponentKind::Ammeter),
        "VOLTMETER" => Some(ComponentKind::Voltmeter),
        _ => None,
    }
}

/// Infer a component kind from its name prefix (`R1`, `SW2`, ...).
pub fn kind_from_name(name: &str) -> Option<ComponentKind> {
    let upper = name.to_ascii_uppercase();
    if upper.starts_with("SW") {
        return Some(ComponentKind::Switch);
    }
    match upper.chars().next()? {
        'B' => Some(ComponentKind::Battery),
        'R' => Some(ComponentKind::Resistor),
        'L' => Some(ComponentKind::Bulb),
        'S' => Some(ComponentKind::Switch),
        'A' => Some(ComponentKind::Ammeter),
        'V' => Some(ComponentKind::Voltmeter),
        _ => None,
    }
}

/// Parse a switch state keyword.
pub fn switch_state(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "closed" | "close" => Some(true),
        "off" | "open" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(kind_from_name("R12"), Some(ComponentKind::Resistor));
        assert_eq!(kind_from_name("sw1"), Some(ComponentKind::Switch));
        assert_eq!(kind_from_name("S1"), Some(ComponentKind::Switch));
        assert_eq!(kind_from_name("Vm"), Some(ComponentKind::Voltmeter));
        assert_eq!(kind_from_name("X1"), None);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(kind_from_keyword("lamp"), Some(ComponentKind::Bulb));
        assert_eq!(switch_state("Open"), Some(false));
        assert_eq!(switch_state("maybe"), None);
    }
}

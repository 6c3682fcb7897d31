//! Active-path filter: drops loops that cannot carry current.

use std::fmt;

use crate::circuit::{Circuit, ComponentId, Terminal};

use super::paths::Path;

/// Why a loop carries no current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blockage {
    /// A switch on the loop is open.
    OpenSwitch(ComponentId),
    /// A directional component is entered through its `end` terminal.
    ReverseBiased(ComponentId),
    /// The loop names a component that is no longer in the registry.
    MissingComponent(ComponentId),
}

impl Blockage {
    pub fn component(&self) -> ComponentId {
        match *self {
            Blockage::OpenSwitch(id) | Blockage::ReverseBiased(id) | Blockage::MissingComponent(id) => id,
        }
    }

    /// Human-readable form using component names.
    pub fn describe(&self, circuit: &Circuit) -> String {
        let name = circuit.name_of(self.component());
        match self {
            Blockage::OpenSwitch(_) => format!("switch {} is open", name),
            Blockage::ReverseBiased(_) => format!("{} is reverse-biased", name),
            Blockage::MissingComponent(_) => format!("{} is not in the schematic", name),
        }
    }
}

impl fmt::Display for Blockage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blockage::OpenSwitch(id) => write!(f, "open switch {}", id),
            Blockage::ReverseBiased(id) => write!(f, "reverse-biased {}", id),
            Blockage::MissingComponent(id) => write!(f, "missing component {}", id),
        }
    }
}

/// Loops split by whether they conduct.
#[derive(Debug, Clone, Default)]
pub struct Filtered {
    pub active: Vec<Path>,
    pub blocked: Vec<(Path, Blockage)>,
}

/// The first reason `path` cannot conduct, if any.
///
/// Only the interior of the loop is inspected; the source at either end
/// is oriented by construction. A directional component is forward when
/// its `start` terminal sits on the wire the loop entered it through.
pub fn blockage(circuit: &Circuit, path: &Path) -> Option<Blockage> {
    let components = path.components();
    let interior = 1..components.len().saturating_sub(1);

    for index in interior {
        let id = components[index];
        let Some(component) = circuit.component(id) else {
            return Some(Blockage::MissingComponent(id));
        };
        if !component.conducts() {
            return Some(Blockage::OpenSwitch(id));
        }
        if component.kind.is_directional() {
            let entry = path.entry_wire(index);
            if entry.is_none() || circuit.terminal_wire(id, Terminal::Start) != entry {
                return Some(Blockage::ReverseBiased(id));
            }
        }
    }
    None
}

/// Keep the loops that conduct, in discovery order.
pub fn filter_active(circuit: &Circuit, paths: &[Path]) -> Filtered {
    let mut filtered = Filtered::default();
    for path in paths {
        match blockage(circuit, path) {
            None => filtered.active.push(path.clone()),
            Some(reason) => {
                log::debug!("loop {} blocked: {}", path.label(circuit), reason.describe(circuit));
                filtered.blocked.push((path.clone(), reason));
            }
        }
    }
    filtered
}

//! Component registry: an arena of components, nodes and wires.

use indexmap::IndexMap;

use super::types::{ComponentId, Node, NodeId, Terminal, Wire, WireId};
use crate::components::{Component, ComponentKind, Quantity};
use crate::dsl::SchematicAst;
use crate::error::{LabError, Result};

/// The schematic being edited and solved.
///
/// Components, nodes and wires refer to each other only by id. The registry
/// is owned by whoever drives the simulation and is passed explicitly into
/// every engine stage.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    components: IndexMap<ComponentId, Component>,
    nodes: IndexMap<NodeId, Node>,
    wires: IndexMap<WireId, Wire>,
    next_component: usize,
    next_node: usize,
    next_wire: usize,
}

impl Circuit {
    /// Create an empty schematic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schematic from a parsed DSL description.
    pub fn from_ast(ast: SchematicAst) -> Result<Self> {
        let mut circuit = Circuit::new();
        // Net name -> terminals on that net, in declaration order
        let mut nets: IndexMap<String, Vec<NodeId>> = IndexMap::new();

        for def in &ast.components {
            if circuit.find_by_name(&def.name).is_some() {
                return Err(LabError::DuplicateComponent {
                    name: def.name.clone(),
                });
            }

            let id = circuit.add_component(def.kind, def.name.clone());
            let component = circuit.component_mut(id)?;

            if let Some(value) = def.value {
                let quantity = def.kind.primary_quantity().ok_or_else(|| {
                    LabError::invalid_component(
                        &def.name,
                        def.line,
                        format!("a {} takes no positional value", def.kind),
                    )
                })?;
                component.values.fix(quantity, value);
            }

            for (key, &value) in &def.params {
                let quantity = Quantity::from_key(key).ok_or_else(|| {
                    LabError::invalid_component(&def.name, def.line, format!("unknown parameter '{}'", key))
                })?;
                component.values.fix(quantity, value);
            }

            if let Some(closed) = def.closed {
                component.closed = closed;
            }

            let (start, end) = (component.start, component.end);
            nets.entry(def.nets[0].clone()).or_default().push(start);
            nets.entry(def.nets[1].clone()).or_default().push(end);
        }

        // Apply `.join` directives by folding the second net into the first
        for (a, b) in &ast.joins {
            if a == b {
                continue;
            }
            let moved = nets.shift_remove(b).unwrap_or_default();
            nets.entry(a.clone()).or_default().extend(moved);
        }

        for (_, members) in nets {
            if let Some((&first, rest)) = members.split_first() {
                for &other in rest {
                    circuit.connect(first, other)?;
                }
            }
        }

        log::debug!(
            "built schematic with {} components and {} wires",
            circuit.components.len(),
            circuit.wires.len()
        );

        Ok(circuit)
    }

    // ============ Components ============

    /// Place a new component with two fresh, unwired terminals.
    pub fn add_component(&mut self, kind: ComponentKind, name: impl Into<String>) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;

        let mut name = name.into();
        if name.is_empty() {
            name = format!("{}{}", kind.prefix(), id.0 + 1);
        }

        let start = self.alloc_node(id, Terminal::Start);
        let end = self.alloc_node(id, Terminal::End);
        self.components
            .insert(id, Component::new(id, kind, name, start, end));
        id
    }

    /// Remove a component, detaching both terminals from their wires.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component> {
        let (start, end) = {
            let component = self.component(id).ok_or(LabError::ComponentNotFound { id })?;
            (component.start, component.end)
        };
        self.disconnect(start)?;
        self.disconnect(end)?;
        self.nodes.shift_remove(&start);
        self.nodes.shift_remove(&end);
        self.components
            .shift_remove(&id)
            .ok_or(LabError::ComponentNotFound { id })
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component> {
        self.components
            .get_mut(&id)
            .ok_or(LabError::ComponentNotFound { id })
    }

    /// All components in placement order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Components of one kind in placement order.
    pub fn components_of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.components.values().filter(move |c| c.kind == kind)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Component> {
        self.components.values().find(|c| c.name == name)
    }

    /// Look up a component id by name.
    pub fn id_of(&self, name: &str) -> Result<ComponentId> {
        self.find_by_name(name)
            .map(|c| c.id)
            .ok_or_else(|| LabError::NameNotFound {
                name: name.to_string(),
            })
    }

    /// Display name of a component, or its id if it no longer exists.
    pub fn name_of(&self, id: ComponentId) -> String {
        self.component(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The battery acting as the source: the first one placed.
    pub fn find_source(&self) -> Option<ComponentId> {
        self.components_of_kind(ComponentKind::Battery)
            .next()
            .map(|c| c.id)
    }

    /// Open or close a switch.
    pub fn set_switch(&mut self, id: ComponentId, closed: bool) -> Result<()> {
        let component = self.component_mut(id)?;
        if component.kind != ComponentKind::Switch {
            return Err(LabError::NotASwitch {
                name: component.name.clone(),
            });
        }
        component.closed = closed;
        Ok(())
    }

    /// Flip a switch, returning its new state.
    pub fn toggle_switch(&mut self, id: ComponentId) -> Result<bool> {
        let closed = !self.component(id).ok_or(LabError::ComponentNotFound { id })?.closed;
        self.set_switch(id, closed)?;
        Ok(closed)
    }

    // ============ Nodes and wires ============

    fn alloc_node(&mut self, owner: ComponentId, terminal: Terminal) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                owner,
                terminal,
                wire: None,
            },
        );
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(&id)
    }

    /// All live wires in creation order.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.values()
    }

    /// The wire a node currently belongs to.
    pub fn wire_of(&self, node: NodeId) -> Option<WireId> {
        self.nodes.get(&node).and_then(|n| n.wire)
    }

    /// The wire one terminal of a component sits on.
    pub fn terminal_wire(&self, id: ComponentId, terminal: Terminal) -> Option<WireId> {
        self.component(id)
            .and_then(|c| self.wire_of(c.terminal(terminal)))
    }

    /// Join two nodes onto one wire.
    ///
    /// If both nodes are already on different wires, every member of `b`'s
    /// wire moves onto `a`'s wire and `b`'s wire is retired.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<WireId> {
        if a == b {
            return Err(LabError::InvalidConnection {
                a,
                b,
                message: "a node cannot be wired to itself".to_string(),
            });
        }
        let wire_a = self.node(a).ok_or(LabError::NodeNotFound { id: a })?.wire;
        let wire_b = self.node(b).ok_or(LabError::NodeNotFound { id: b })?.wire;

        let target = match (wire_a, wire_b) {
            (Some(wa), Some(wb)) if wa == wb => wa,
            (Some(wa), Some(wb)) => {
                let retired = self.wires.shift_remove(&wb).map(|w| w.nodes).unwrap_or_default();
                for &node in &retired {
                    if let Some(n) = self.nodes.get_mut(&node) {
                        n.wire = Some(wa);
                    }
                }
                if let Some(wire) = self.wires.get_mut(&wa) {
                    wire.nodes.extend(retired);
                }
                log::trace!("merged wire {} into {}", wb, wa);
                wa
            }
            (Some(wa), None) => {
                self.attach(b, wa);
                wa
            }
            (None, Some(wb)) => {
                self.attach(a, wb);
                wb
            }
            (None, None) => {
                let id = WireId(self.next_wire);
                self.next_wire += 1;
                self.wires.insert(id, Wire { id, nodes: Vec::new() });
                self.attach(a, id);
                self.attach(b, id);
                id
            }
        };
        Ok(target)
    }

    fn attach(&mut self, node: NodeId, wire: WireId) {
        if let Some(w) = self.wires.get_mut(&wire) {
            w.nodes.push(node);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.wire = Some(wire);
        }
    }

    /// Take a node off its wire. A wire left with fewer than two members is
    /// discarded.
    pub fn disconnect(&mut self, node: NodeId) -> Result<()> {
        let wire_id = match self.node(node).ok_or(LabError::NodeNotFound { id: node })?.wire {
            Some(w) => w,
            None => return Ok(()),
        };
        if let Some(n) = self.nodes.get_mut(&node) {
            n.wire = None;
        }

        let remaining = match self.wires.get_mut(&wire_id) {
            Some(wire) => {
                wire.nodes.retain(|&n| n != node);
                wire.nodes.len()
            }
            None => return Ok(()),
        };

        if remaining < 2 {
            if let Some(wire) = self.wires.shift_remove(&wire_id) {
                for n in wire.nodes {
                    if let Some(n) = self.nodes.get_mut(&n) {
                        n.wire = None;
                    }
                }
            }
            log::trace!("discarded wire {}", wire_id);
        }
        Ok(())
    }

    /// Components electrically adjacent to `node`: every component other than
    /// `exclude` with a terminal on the same wire.
    pub fn adjacent(&self, node: NodeId, exclude: ComponentId) -> Vec<ComponentId> {
        let wire = match self.wire_of(node).and_then(|w| self.wires.get(&w)) {
            Some(wire) => wire,
            None => return Vec::new(),
        };

        let mut adjacent = Vec::new();
        for member in wire.nodes() {
            if let Some(n) = self.nodes.get(member) {
                if n.owner != exclude && !adjacent.contains(&n.owner) {
                    adjacent.push(n.owner);
                }
            }
        }
        adjacent
    }
}

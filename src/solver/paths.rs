//! Loop discovery: every simple current loop from the source back to itself.

use std::collections::HashSet;
use std::fmt;

use crate::circuit::{validate_source_wiring, Circuit, ComponentId, Terminal, WireId};
use crate::error::Result;

/// One simple current loop.
///
/// `components` starts and ends with the source battery. `junctions[k]` is
/// the wire joining `components[k]` to `components[k + 1]`, so current
/// leaves the source through `junctions[0]` (its positive wire) and returns
/// through the last junction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    components: Vec<ComponentId>,
    junctions: Vec<WireId>,
}

impl Path {
    /// Build a path from its components and the wires between them.
    ///
    /// # Panics
    /// If `junctions` is not exactly one shorter than `components`.
    pub(crate) fn new(components: Vec<ComponentId>, junctions: Vec<WireId>) -> Self {
        assert_eq!(
            junctions.len() + 1,
            components.len(),
            "a path needs one junction between each pair of components"
        );
        Self {
            components,
            junctions,
        }
    }

    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    pub fn junctions(&self) -> &[WireId] {
        &self.junctions
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The wire through which the component at `index` was entered.
    pub fn entry_wire(&self, index: usize) -> Option<WireId> {
        index
            .checked_sub(1)
            .and_then(|i| self.junctions.get(i))
            .copied()
    }

    /// Human-readable form using component names.
    pub fn label(&self, circuit: &Circuit) -> String {
        self.components
            .iter()
            .map(|&id| circuit.name_of(id))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.components.iter().map(|id| id.to_string()).collect();
        write!(f, "[{}]", ids.join(", "))
    }
}

/// Result of a discovery run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub paths: Vec<Path>,
    /// Components entered during the search.
    pub visits: usize,
    /// Set when the path limit or the visit budget stopped the search early.
    pub truncated: bool,
}

/// Enumerate every simple loop through `source`.
///
/// The walk enters the source at its negative terminal and leaves through
/// the positive one; a loop is recorded when it reaches a wire shared with
/// the source's negative terminal. Components and wires visited are scoped
/// to the current branch, so sibling branches may pass through the same
/// components but no loop crosses a wire twice.
///
/// The search stops once `max_paths` loops are found or `max_visits`
/// components have been entered, and marks the result as truncated.
///
/// Fails with [`crate::error::LabError::InvalidSourceWiring`] before any
/// traversal if the source is floating or shorted.
pub fn discover_paths(
    circuit: &Circuit,
    source: ComponentId,
    max_paths: usize,
    max_visits: usize,
) -> Result<Discovery> {
    validate_source_wiring(circuit, source)?;

    let mut walker = Walker {
        circuit,
        source,
        max_paths,
        max_visits,
        visited: HashSet::new(),
        visited_wires: HashSet::new(),
        components: vec![source],
        junctions: Vec::new(),
        found: Discovery::default(),
    };
    walker.visit(source, Terminal::End);

    log::debug!(
        "discovered {} loop(s) through {} in {} visit(s){}",
        walker.found.paths.len(),
        circuit.name_of(source),
        walker.found.visits,
        if walker.found.truncated { " (truncated)" } else { "" }
    );
    Ok(walker.found)
}

struct Walker<'a> {
    circuit: &'a Circuit,
    source: ComponentId,
    max_paths: usize,
    max_visits: usize,
    visited: HashSet<ComponentId>,
    visited_wires: HashSet<WireId>,
    components: Vec<ComponentId>,
    junctions: Vec<WireId>,
    found: Discovery,
}

impl Walker<'_> {
    fn visit(&mut self, current: ComponentId, entered: Terminal) {
        if self.found.paths.len() >= self.max_paths || self.found.visits >= self.max_visits {
            self.found.truncated = true;
            return;
        }
        self.found.visits += 1;

        let Some(component) = self.circuit.component(current) else {
            return;
        };
        let exit = component.terminal(entered.opposite());
        let Some(exit_wire) = self.circuit.wire_of(exit) else {
            return;
        };
        // The source's positive wire is marked on the way out, so coming
        // back to it ends the branch without a loop.
        if self.visited_wires.contains(&exit_wire) {
            return;
        }
        let adjacent = self.circuit.adjacent(exit, current);

        if current != self.source && adjacent.contains(&self.source) {
            let mut components = self.components.clone();
            components.push(self.source);
            let mut junctions = self.junctions.clone();
            junctions.push(exit_wire);
            self.found.paths.push(Path::new(components, junctions));
            return;
        }

        self.visited.insert(current);
        self.visited_wires.insert(exit_wire);

        for next in adjacent {
            if self.visited.contains(&next) {
                continue;
            }
            let entry = if self.circuit.terminal_wire(next, Terminal::Start) == Some(exit_wire) {
                Terminal::Start
            } else {
                Terminal::End
            };

            self.components.push(next);
            self.junctions.push(exit_wire);
            self.visit(next, entry);
            self.components.pop();
            self.junctions.pop();
        }

        self.visited_wires.remove(&exit_wire);
        self.visited.remove(&current);
    }
}

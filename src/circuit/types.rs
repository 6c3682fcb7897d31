//! Core identifier types for the component/node/wire arena.

use std::fmt;

/// A unique identifier for a component in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A unique identifier for a terminal node.
///
/// Every node belongs to exactly one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A unique identifier for a wire (a set of nodes at one potential).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub usize);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// Which end of a two-terminal component a node is.
///
/// For batteries `Start` is the positive pole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    Start,
    End,
}

impl Terminal {
    /// The other terminal of the same component.
    pub fn opposite(self) -> Self {
        match self {
            Terminal::Start => Terminal::End,
            Terminal::End => Terminal::Start,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Start => write!(f, "start"),
            Terminal::End => write!(f, "end"),
        }
    }
}

/// A terminal point owned by one component, optionally on one wire.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Owning component
    pub owner: ComponentId,
    /// Which terminal of the owner this is
    pub terminal: Terminal,
    /// Current wire membership
    pub wire: Option<WireId>,
}

/// An unordered, growable set of electrically identical nodes.
#[derive(Debug, Clone)]
pub struct Wire {
    pub id: WireId,
    pub(crate) nodes: Vec<NodeId>,
}

impl Wire {
    /// Member nodes in the order they joined.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

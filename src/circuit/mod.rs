//! Schematic graph representation and validation.
//!
//! This module provides the arena the engine reads from. The [`Circuit`]
//! registry owns every component, terminal node and wire; components, nodes
//! and wires refer to each other by id only.

mod graph;
mod types;
mod validate;

pub use graph::Circuit;
pub use types::*;
pub use validate::validate_source_wiring;

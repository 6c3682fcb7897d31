//! # Circuit Lab
//!
//! A DC circuit solver for classroom schematic builders.
//!
//! This library provides:
//! - An arena model of components, terminal nodes and wires
//! - A text DSL and a JSON format for describing schematics
//! - A solving engine that finds every conducting loop, folds the loops into
//!   a series/parallel tree and resolves voltage, current, resistance and
//!   power on every component by constraint propagation
//!
//! ## Architecture
//!
//! - [`circuit`] - Component/node/wire registry and source wiring checks
//! - [`components`] - Component kinds and their fixed/automatic values
//! - [`dsl`] - Parser for the schematic description language
//! - [`schematic`] - JSON import/export
//! - [`solver`] - Path discovery, tree building, equations and the solver
//!
//! ## Usage
//!
//! ```
//! use circuit_lab::{dsl, Circuit, Simulator};
//! use circuit_lab::components::Quantity;
//!
//! let ast = dsl::parse("B1 p n 9V\nR1 p a 100\nR2 a n 200").unwrap();
//! let mut sim = Simulator::new(Circuit::from_ast(ast).unwrap());
//! let report = sim.tick();
//!
//! assert_eq!(report.tree.label(sim.circuit()), "B1, R1, R2, B1");
//! let r2 = sim.circuit().find_by_name("R2").unwrap();
//! assert!((r2.values.get(Quantity::Voltage).get().unwrap() - 6.0).abs() < 1e-9);
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! circuit-lab lamp.cir --toggle SW1
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmCircuitLab } from 'circuit_lab';
//!
//! const lab = new WasmCircuitLab(schematicDsl);
//! console.log(lab.tick());
//! ```
//!
//! ## Solving Method
//!
//! Each tick works from the user's fixed values only:
//!
//! 1. Enumerate every simple loop leaving the battery's positive pole
//! 2. Discard loops with an open switch or a reverse-biased meter or bulb
//! 3. Fold the remaining loops into nested series and parallel groups
//! 4. Emit Ohm's law and power law per component plus Kirchhoff rules per group
//! 5. Apply them repeatedly until no new value appears
//! 6. Cross-check the result and write it back to the components

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod schematic;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{LabError, Result};
pub use solver::{SimulationConfig, Simulator, TickReport};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuitLab;

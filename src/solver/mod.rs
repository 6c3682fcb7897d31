//! Circuit solving engine.
//!
//! One tick runs these stages in order:
//!
//! 1. [`paths`]: enumerate every simple loop through the source battery
//! 2. [`active`]: drop loops broken by open switches or reversed components
//! 3. [`tree`]: fold the active loops into a series/parallel tree
//! 4. [`equations`]: generate Ohm's law, power law and Kirchhoff relations
//! 5. [`constraint`]: propagate known values to a fixed point
//! 6. [`check`]: cross-check the solution against Ohm's law and the power law
//! 7. write the solved values back onto the components
//!
//! ```text
//!   B1 ──R1──┬──R2──┐          tree:  B1, R1, [R2 | R3], B1
//!   │        └──R3──┤
//!   └────────────────┘
//! ```
//!
//! [`Simulator`] drives the stages and returns a [`TickReport`].

pub mod active;
pub mod check;
pub mod constraint;
pub mod equations;
pub mod paths;
mod simulator;
pub mod tree;

pub use active::{filter_active, Blockage, Filtered};
pub use check::{cross_validate, format_number, Law, Mismatch};
pub use constraint::{ConstraintSolver, Knowns, SolveOutcome, SolveStatus};
pub use equations::{Equation, EquationSet, GroupId, KirchhoffRule, Relation, Target, Unknown};
pub use paths::{discover_paths, Discovery, Path};
pub use simulator::{run_tick, ComponentSnapshot, Diagnostic, SimulationConfig, Simulator, TickReport};
pub use tree::{build_tree, CircuitTree};

/// Maximum propagation passes per tick.
pub const MAX_PASSES: usize = 100;

/// Absolute tolerance for the post-solve law checks.
pub const TOLERANCE: f64 = 1e-3;

/// Maximum number of loops enumerated per tick.
pub const MAX_PATHS: usize = 10_000;

/// Maximum number of components path discovery enters per tick.
pub const MAX_VISITS: usize = 1_000_000;

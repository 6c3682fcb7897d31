//! Fixed-point propagation over the equation pool.
//!
//! Each pass applies every equation and every Kirchhoff rule once. A value
//! only ever moves from undefined to defined, so the number of passes that
//! make progress is bounded by the number of unknowns.

use std::collections::HashMap;
use std::fmt;

use crate::circuit::{Circuit, ComponentId};
use crate::components::Quantity;

use super::equations::{Equation, EquationSet, KirchhoffRule, Target, Unknown};
use super::MAX_PASSES;

/// Values defined so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Knowns {
    values: HashMap<Unknown, f64>,
}

impl Knowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the fixed inputs of every component in `set`.
    pub fn seed(circuit: &Circuit, set: &EquationSet) -> Self {
        let mut knowns = Knowns::new();
        for id in set.all_components() {
            let Some(component) = circuit.component(id) else {
                continue;
            };
            for quantity in Quantity::ALL {
                if let Some(value) = component.values.get(quantity).input() {
                    knowns.define(Unknown::component(id, quantity), value);
                }
            }
        }
        knowns
    }

    pub fn get(&self, unknown: Unknown) -> Option<f64> {
        self.values.get(&unknown).copied()
    }

    pub fn component(&self, id: ComponentId, quantity: Quantity) -> Option<f64> {
        self.get(Unknown::component(id, quantity))
    }

    pub fn is_defined(&self, unknown: Unknown) -> bool {
        self.values.contains_key(&unknown)
    }

    /// Define an unknown. Returns `false` if it was already defined or the
    /// value is not finite.
    pub fn define(&mut self, unknown: Unknown, value: f64) -> bool {
        if !value.is_finite() || self.values.contains_key(&unknown) {
            return false;
        }
        self.values.insert(unknown, value);
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Every tracked quantity was defined.
    Converged,
    /// A pass made no progress with quantities still undefined.
    Underdetermined,
    /// The pass bound was reached while values were still being defined.
    IterationLimit,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Converged => write!(f, "converged"),
            SolveStatus::Underdetermined => write!(f, "underdetermined"),
            SolveStatus::IterationLimit => write!(f, "iteration limit reached"),
        }
    }
}

/// Result of one solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub values: Knowns,
    pub status: SolveStatus,
    /// Passes run, including the final one that made no progress.
    pub passes: usize,
    /// Number of undefined-to-defined transitions.
    pub transitions: usize,
    /// Component quantities left undefined.
    pub unresolved: Vec<(ComponentId, Quantity)>,
}

impl SolveOutcome {
    pub fn is_converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// Fixed-point solver for an [`EquationSet`].
#[derive(Debug, Clone)]
pub struct ConstraintSolver {
    /// Upper bound on propagation passes
    pub max_passes: usize,
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            max_passes: MAX_PASSES,
        }
    }

    pub fn with_max_passes(max_passes: usize) -> Self {
        Self { max_passes }
    }

    /// Propagate values from `seed` until nothing changes or the pass bound
    /// is reached.
    pub fn solve(&self, set: &EquationSet, seed: Knowns) -> SolveOutcome {
        let mut knowns = seed;
        let mut passes = 0;
        let mut transitions = 0;
        let mut settled = false;

        while passes < self.max_passes {
            passes += 1;
            let mut changed = 0;
            for equation in &set.equations {
                changed += apply_equation(equation, &mut knowns) as usize;
            }
            for rule in &set.rules {
                changed += apply_rule(rule, &mut knowns);
            }
            transitions += changed;
            if changed == 0 {
                settled = true;
                break;
            }
        }

        let unresolved = unresolved(set, &knowns);
        let status = if !settled {
            SolveStatus::IterationLimit
        } else if unresolved.is_empty() {
            SolveStatus::Converged
        } else {
            SolveStatus::Underdetermined
        };

        log::debug!(
            "solve {} after {} pass(es), {} value(s) defined",
            status,
            passes,
            transitions
        );

        SolveOutcome {
            values: knowns,
            status,
            passes,
            transitions,
            unresolved,
        }
    }
}

/// Quantities tracked for completeness: all four for ordinary components,
/// EMF, current and power for the source.
fn unresolved(set: &EquationSet, knowns: &Knowns) -> Vec<(ComponentId, Quantity)> {
    let mut missing = Vec::new();
    if let Some(source) = set.source {
        for quantity in [Quantity::Voltage, Quantity::Current, Quantity::Power] {
            if knowns.component(source, quantity).is_none() {
                missing.push((source, quantity));
            }
        }
    }
    for &id in &set.components {
        for quantity in Quantity::ALL {
            if knowns.component(id, quantity).is_none() {
                missing.push((id, quantity));
            }
        }
    }
    missing
}

fn define(knowns: &mut Knowns, unknown: Unknown, value: f64, why: &dyn fmt::Display) -> bool {
    let defined = knowns.define(unknown, value);
    if defined {
        log::trace!("{} = {} ({})", unknown, value, why);
    }
    defined
}

fn apply_equation(equation: &Equation, knowns: &mut Knowns) -> bool {
    let solves = equation.solves();
    if knowns.is_defined(solves) {
        return false;
    }
    let [a, b] = equation.requires();
    let (Some(a), Some(b)) = (knowns.get(a), knowns.get(b)) else {
        return false;
    };
    match equation.relation.evaluate(a, b) {
        Some(value) => define(knowns, solves, value, equation),
        None => false,
    }
}

fn apply_rule(rule: &KirchhoffRule, knowns: &mut Knowns) -> usize {
    match rule {
        KirchhoffRule::EqualCurrent(targets) => share(knowns, targets, Quantity::Current, rule.name()),
        KirchhoffRule::EqualVoltage(targets) => share(knowns, targets, Quantity::Voltage, rule.name()),
        KirchhoffRule::VoltageSum { total, parts } => {
            complete(knowns, *total, parts, Quantity::Voltage, Combine::Sum, rule.name())
        }
        KirchhoffRule::CurrentSum { total, parts } => {
            complete(knowns, *total, parts, Quantity::Current, Combine::Sum, rule.name())
        }
        KirchhoffRule::SeriesResistance { total, parts } => {
            complete(knowns, *total, parts, Quantity::Resistance, Combine::Sum, rule.name())
        }
        KirchhoffRule::ParallelResistance { total, parts } => {
            // A branch known to carry no current is open and adds no conductance
            let conducting: Vec<Target> = parts
                .iter()
                .copied()
                .filter(|&p| knowns.get(Unknown::new(p, Quantity::Current)) != Some(0.0))
                .collect();
            if conducting.is_empty() {
                return 0;
            }
            complete(
                knowns,
                *total,
                &conducting,
                Quantity::Resistance,
                Combine::Reciprocal,
                rule.name(),
            )
        }
    }
}

/// Copy the first known value of `quantity` to every target still missing it.
fn share(knowns: &mut Knowns, targets: &[Target], quantity: Quantity, why: &str) -> usize {
    let known = targets
        .iter()
        .find_map(|&t| knowns.get(Unknown::new(t, quantity)));
    let Some(value) = known else {
        return 0;
    };
    targets
        .iter()
        .filter(|&&t| define(knowns, Unknown::new(t, quantity), value, &why))
        .count()
}

#[derive(Debug, Clone, Copy)]
enum Combine {
    /// total = Σ parts
    Sum,
    /// 1/total = Σ 1/parts
    Reciprocal,
}

/// Solve `total` against `parts` when exactly one of them is undefined.
fn complete(
    knowns: &mut Knowns,
    total: Target,
    parts: &[Target],
    quantity: Quantity,
    combine: Combine,
    why: &str,
) -> usize {
    let total_value = knowns.get(Unknown::new(total, quantity));
    let part_values: Vec<Option<f64>> = parts
        .iter()
        .map(|&p| knowns.get(Unknown::new(p, quantity)))
        .collect();
    let missing_parts = part_values.iter().filter(|v| v.is_none()).count();
    let known_parts = part_values.iter().flatten().copied();

    let solved = match (total_value, missing_parts) {
        (None, 0) => match combine {
            Combine::Sum => Some((Unknown::new(total, quantity), known_parts.sum::<f64>())),
            Combine::Reciprocal => {
                let parts: Vec<f64> = known_parts.collect();
                if parts.is_empty() {
                    None
                } else if parts.iter().any(|&r| r == 0.0) {
                    // A zero-resistance branch shorts the whole group
                    Some((Unknown::new(total, quantity), 0.0))
                } else {
                    let conductance: f64 = parts.iter().map(|r| 1.0 / r).sum();
                    Some((Unknown::new(total, quantity), 1.0 / conductance))
                }
            }
        },
        (Some(total_value), 1) => {
            let index = part_values.iter().position(|v| v.is_none());
            let target = index.map(|i| Unknown::new(parts[i], quantity));
            let remainder = match combine {
                Combine::Sum => Some(total_value - known_parts.sum::<f64>()),
                Combine::Reciprocal => {
                    let parts: Vec<f64> = known_parts.collect();
                    if total_value == 0.0 || parts.iter().any(|&r| r == 0.0) {
                        None
                    } else {
                        let conductance = 1.0 / total_value - parts.iter().map(|r| 1.0 / r).sum::<f64>();
                        (conductance > 0.0).then(|| 1.0 / conductance)
                    }
                }
            };
            target.zip(remainder)
        }
        _ => None,
    };

    match solved {
        Some((unknown, value)) => define(knowns, unknown, value, &why) as usize,
        None => 0,
    }
}

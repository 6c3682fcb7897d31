//! Post-solve consistency checks.

use std::fmt;

use crate::circuit::{Circuit, ComponentId};
use crate::components::Quantity;

use super::constraint::Knowns;
use super::equations::EquationSet;

/// The law a [`Mismatch`] violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Law {
    /// V = I·R
    Ohm,
    /// P = V·I
    Power,
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Law::Ohm => write!(f, "Ohm's law"),
            Law::Power => write!(f, "power law"),
        }
    }
}

/// A component whose solved values disagree with a law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mismatch {
    pub component: ComponentId,
    pub law: Law,
    /// The stored value (V for Ohm's law, P for the power law)
    pub stated: f64,
    /// The value the law predicts from the other two quantities
    pub expected: f64,
}

impl Mismatch {
    pub fn error(&self) -> f64 {
        (self.stated - self.expected).abs()
    }

    /// Human-readable form using the component name.
    pub fn describe(&self, circuit: &Circuit) -> String {
        self.render(&circuit.name_of(self.component))
    }

    fn render(&self, name: &str) -> String {
        let (lhs, rhs) = match self.law {
            Law::Ohm => ("V", "I*R"),
            Law::Power => ("P", "V*I"),
        };
        format!(
            "{} violated on {}: {} = {} but {} = {}",
            self.law,
            name,
            lhs,
            format_number(self.stated),
            rhs,
            format_number(self.expected)
        )
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&self.component.to_string()))
    }
}

/// Check Ohm's law on every non-battery component and the power law on
/// every component, wherever all the quantities involved are defined.
pub fn cross_validate(circuit: &Circuit, set: &EquationSet, knowns: &Knowns, tolerance: f64) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for id in set.all_components() {
        let value = |q| knowns.component(id, q);
        let (r, v, i, p) = (
            value(Quantity::Resistance),
            value(Quantity::Voltage),
            value(Quantity::Current),
            value(Quantity::Power),
        );
        let is_battery = circuit.component(id).is_some_and(|c| c.is_battery());

        if let (false, Some(r), Some(v), Some(i)) = (is_battery, r, v, i) {
            if (v - i * r).abs() > tolerance {
                mismatches.push(Mismatch {
                    component: id,
                    law: Law::Ohm,
                    stated: v,
                    expected: i * r,
                });
            }
        }
        if let (Some(p), Some(v), Some(i)) = (p, v, i) {
            if (p - v * i).abs() > tolerance {
                mismatches.push(Mismatch {
                    component: id,
                    law: Law::Power,
                    stated: p,
                    expected: v * i,
                });
            }
        }
    }

    for mismatch in &mismatches {
        log::warn!("{}", mismatch.describe(circuit));
    }
    mismatches
}

/// Format a value for display: up to six significant decimals, trailing
/// zeros dropped.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-4..1e9).contains(&magnitude) {
        return format!("{:e}", value);
    }
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;
    use crate::solver::constraint::ConstraintSolver;
    use crate::solver::equations::Unknown;
    use crate::solver::tree::CircuitTree;

    fn single_resistor() -> (Circuit, EquationSet) {
        let c = Circuit::from_ast(dsl::parse("B1 p n 9\nR1 p n 100").unwrap()).unwrap();
        let (b, r) = (c.id_of("B1").unwrap(), c.id_of("R1").unwrap());
        let tree = CircuitTree::Series(vec![
            CircuitTree::Leaf(b),
            CircuitTree::Leaf(r),
            CircuitTree::Leaf(b),
        ]);
        let set = EquationSet::generate(&tree, b);
        (c, set)
    }

    #[test]
    fn test_consistent_solution_passes() {
        let (c, set) = single_resistor();
        let outcome = ConstraintSolver::new().solve(&set, Knowns::seed(&c, &set));
        assert!(cross_validate(&c, &set, &outcome.values, 1e-3).is_empty());
    }

    #[test]
    fn test_over_specified_component_is_reported() {
        let (c, set) = single_resistor();
        let r = c.id_of("R1").unwrap();
        let mut knowns = Knowns::new();
        knowns.define(Unknown::component(r, Quantity::Resistance), 100.0);
        knowns.define(Unknown::component(r, Quantity::Voltage), 9.0);
        knowns.define(Unknown::component(r, Quantity::Current), 0.1);
        knowns.define(Unknown::component(r, Quantity::Power), 0.9);

        let found = cross_validate(&c, &set, &knowns, 1e-3);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].law, Law::Ohm);
        assert_eq!(found[0].component, r);
        assert!((found[0].error() - 1.0).abs() < 1e-9);
        assert_eq!(
            found[0].describe(&c),
            "Ohm's law violated on R1: V = 9 but I*R = 10"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(9.0), "9");
        assert_eq!(format_number(0.03), "0.03");
        assert_eq!(format_number(-1.5), "-1.5");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(2e-6), "2e-6");
    }
}

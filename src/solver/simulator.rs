//! Main simulator interface.

use std::fmt;

use crate::circuit::{Circuit, ComponentId};
use crate::components::{ComponentKind, Quantity};
use crate::error::{LabError, WiringFault};

use super::active::{filter_active, Blockage};
use super::check::{cross_validate, format_number, Mismatch};
use super::constraint::{ConstraintSolver, Knowns, SolveOutcome, SolveStatus};
use super::equations::EquationSet;
use super::paths::{discover_paths, Path};
use super::tree::{build_tree, CircuitTree};
use super::{MAX_PASSES, MAX_PATHS, MAX_VISITS, TOLERANCE};

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Maximum propagation passes per tick.
    pub max_passes: usize,
    /// Allowed absolute error when cross-checking Ohm's law and the power law.
    pub tolerance: f64,
    /// Maximum number of loops path discovery will enumerate.
    pub max_paths: usize,
    /// Maximum number of components path discovery will enter.
    pub max_visits: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_passes: MAX_PASSES,
            tolerance: TOLERANCE,
            max_paths: MAX_PATHS,
            max_visits: MAX_VISITS,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of propagation passes.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set the cross-validation tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the path discovery limit.
    ///
    /// Discovery stops once this many loops are found and the tick reports
    /// it. This does not bound the search itself; see
    /// [`with_max_visits`](Self::with_max_visits).
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }

    /// Set the search budget of path discovery.
    ///
    /// Densely meshed schematics have exponentially many partial walks even
    /// when few of them close a loop; discovery stops after entering this
    /// many components and the tick reports it.
    pub fn with_max_visits(mut self, max_visits: usize) -> Self {
        self.max_visits = max_visits;
        self
    }
}

/// A condition a tick ran into. None of these abort the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The schematic has no battery.
    NoSource,
    /// The source battery is floating or shorted; nothing was solved.
    InvalidWiring { source: ComponentId, fault: WiringFault },
    /// The active network is not series/parallel reducible.
    UnsupportedTopology { message: String },
    /// Path discovery stopped at the loop limit.
    PathLimit { limit: usize },
    /// Path discovery ran out of its search budget.
    VisitLimit { limit: usize },
    /// Quantities left undefined after solving.
    Unresolved {
        status: SolveStatus,
        missing: Vec<(ComponentId, Quantity)>,
    },
    /// A solved component disagrees with Ohm's law or the power law.
    Mismatch(Mismatch),
    /// Any other engine failure.
    Engine { message: String },
}

impl Diagnostic {
    fn from_error(error: LabError, source: ComponentId) -> Self {
        match error {
            LabError::InvalidSourceWiring { fault, .. } => Diagnostic::InvalidWiring { source, fault },
            LabError::UnsupportedTopology { message } => Diagnostic::UnsupportedTopology { message },
            other => Diagnostic::Engine {
                message: other.to_string(),
            },
        }
    }

    /// Human-readable form using component names.
    pub fn describe(&self, circuit: &Circuit) -> String {
        match self {
            Diagnostic::InvalidWiring { source, fault } => {
                format!("invalid wiring on {}: {}", circuit.name_of(*source), fault)
            }
            Diagnostic::Unresolved { status, missing } => {
                let names: Vec<String> = missing
                    .iter()
                    .map(|(id, q)| format!("{}.{}", circuit.name_of(*id), q.symbol()))
                    .collect();
                format!("{}; undefined: {}", status, names.join(", "))
            }
            Diagnostic::Mismatch(mismatch) => mismatch.describe(circuit),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoSource => write!(f, "no battery in the schematic"),
            Diagnostic::InvalidWiring { source, fault } => {
                write!(f, "invalid wiring on {}: {}", source, fault)
            }
            Diagnostic::UnsupportedTopology { message } => {
                write!(f, "unsupported topology: {}", message)
            }
            Diagnostic::PathLimit { limit } => {
                write!(f, "path discovery stopped after {} loops", limit)
            }
            Diagnostic::VisitLimit { limit } => {
                write!(f, "path discovery stopped after {} visits", limit)
            }
            Diagnostic::Unresolved { status, missing } => {
                let names: Vec<String> = missing
                    .iter()
                    .map(|(id, q)| format!("{}.{}", id, q.symbol()))
                    .collect();
                write!(f, "{}; undefined: {}", status, names.join(", "))
            }
            Diagnostic::Mismatch(mismatch) => write!(f, "{}", mismatch),
            Diagnostic::Engine { message } => f.write_str(message),
        }
    }
}

/// Solved values of one component after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSnapshot {
    pub id: ComponentId,
    pub name: String,
    pub kind: ComponentKind,
    pub resistance: Option<f64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub power: Option<f64>,
}

impl ComponentSnapshot {
    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::Resistance => self.resistance,
            Quantity::Voltage => self.voltage,
            Quantity::Current => self.current,
            Quantity::Power => self.power,
        }
    }

    /// One summary line, e.g. `R1 (resistor): R=100Ω, V=9V, I=0.09A, P=0.81W`.
    ///
    /// Batteries have no resistance entry.
    pub fn line(&self) -> String {
        let quantities: &[Quantity] = if self.kind == ComponentKind::Battery {
            &[Quantity::Voltage, Quantity::Current, Quantity::Power]
        } else {
            &Quantity::ALL
        };
        let fields: Vec<String> = quantities
            .iter()
            .map(|&q| match self.get(q) {
                Some(v) => format!("{}={}{}", q.symbol(), format_number(v), q.unit()),
                None => format!("{}=undefined", q.symbol()),
            })
            .collect();
        format!("{} ({}): {}", self.name, self.kind, fields.join(", "))
    }
}

/// Everything one tick found out.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// The battery that drove the tick
    pub source: Option<ComponentId>,
    /// Every loop through the source
    pub paths: Vec<Path>,
    /// Loops that conduct
    pub active_paths: Vec<Path>,
    /// Loops that do not, with the reason
    pub blocked: Vec<(Path, Blockage)>,
    pub tree: CircuitTree,
    /// Solved values of every component in the tree, source first
    pub snapshots: Vec<ComponentSnapshot>,
    /// `None` when nothing was solved (no source, bad wiring, empty tree)
    pub outcome: Option<SolveOutcome>,
    pub diagnostics: Vec<Diagnostic>,
    /// Number of stored values the write-back changed
    pub changed: usize,
}

impl TickReport {
    pub fn snapshot(&self, id: ComponentId) -> Option<&ComponentSnapshot> {
        self.snapshots.iter().find(|s| s.id == id)
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &Mismatch> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::Mismatch(m) => Some(m),
            _ => None,
        })
    }

    /// Whether the tick solved every tracked quantity without warnings.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.outcome.as_ref().is_some_and(|o| o.is_converged())
    }

    /// Multi-line text summary using component names.
    pub fn summary(&self, circuit: &Circuit) -> String {
        let mut lines = vec![
            format!("Tree: {}", self.tree.label(circuit)),
            format!(
                "Loops: {} active of {}",
                self.active_paths.len(),
                self.paths.len()
            ),
        ];

        if self.snapshots.is_empty() {
            lines.push("(no components)".to_string());
        } else {
            lines.extend(self.snapshots.iter().map(ComponentSnapshot::line));
        }

        if let Some(outcome) = &self.outcome {
            lines.push(format!(
                "Solver: {} after {} pass(es)",
                outcome.status, outcome.passes
            ));
        }

        if !self.diagnostics.is_empty() {
            lines.push("Warnings:".to_string());
            for diagnostic in &self.diagnostics {
                lines.push(format!("  - {}", diagnostic.describe(circuit)));
            }
        }

        lines.join("\n")
    }
}

/// Run one solving pass over `circuit` and write the results back.
///
/// Never fails: every problem is reported as a [`Diagnostic`] and leaves the
/// affected components untouched.
pub fn run_tick(circuit: &mut Circuit, config: &SimulationConfig) -> TickReport {
    let mut report = TickReport::default();

    let Some(source) = circuit.find_source() else {
        log::info!("no battery, nothing to solve");
        report.diagnostics.push(Diagnostic::NoSource);
        return report;
    };
    report.source = Some(source);

    let discovery = match discover_paths(circuit, source, config.max_paths, config.max_visits) {
        Ok(discovery) => discovery,
        Err(error) => {
            log::warn!("{}", error);
            report.diagnostics.push(Diagnostic::from_error(error, source));
            return report;
        }
    };
    if discovery.truncated {
        let diagnostic = if discovery.paths.len() >= config.max_paths {
            Diagnostic::PathLimit {
                limit: config.max_paths,
            }
        } else {
            Diagnostic::VisitLimit {
                limit: config.max_visits,
            }
        };
        log::warn!("{}", diagnostic);
        report.diagnostics.push(diagnostic);
    }

    let filtered = filter_active(circuit, &discovery.paths);
    report.paths = discovery.paths;
    report.active_paths = filtered.active;
    report.blocked = filtered.blocked;
    log::debug!(
        "{} of {} loop(s) active",
        report.active_paths.len(),
        report.paths.len()
    );

    report.tree = match build_tree(&report.active_paths) {
        Ok(tree) => tree,
        Err(error) => {
            log::warn!("{}", error);
            report.diagnostics.push(Diagnostic::from_error(error, source));
            return report;
        }
    };
    if report.tree.is_empty() {
        log::info!("no conducting loop through {}", circuit.name_of(source));
        return report;
    }
    log::debug!("tree: {}", report.tree.label(circuit));

    let set = EquationSet::generate(&report.tree, source);
    let seed = Knowns::seed(circuit, &set);
    let outcome = ConstraintSolver::with_max_passes(config.max_passes).solve(&set, seed);

    if !outcome.unresolved.is_empty() || outcome.status == SolveStatus::IterationLimit {
        let diagnostic = Diagnostic::Unresolved {
            status: outcome.status,
            missing: outcome.unresolved.clone(),
        };
        log::warn!("{}", diagnostic.describe(circuit));
        report.diagnostics.push(diagnostic);
    }

    report.diagnostics.extend(
        cross_validate(circuit, &set, &outcome.values, config.tolerance)
            .into_iter()
            .map(Diagnostic::Mismatch),
    );

    report.snapshots = snapshots(circuit, &set, &outcome.values);
    report.changed = write_back(circuit, &set, &outcome.values);
    report.outcome = Some(outcome);
    report
}

fn snapshots(circuit: &Circuit, set: &EquationSet, knowns: &Knowns) -> Vec<ComponentSnapshot> {
    set.all_components()
        .filter_map(|id| {
            let component = circuit.component(id)?;
            let value = |q| knowns.component(id, q);
            Some(ComponentSnapshot {
                id,
                name: component.name.clone(),
                kind: component.kind,
                resistance: if component.is_battery() {
                    None
                } else {
                    value(Quantity::Resistance)
                },
                voltage: value(Quantity::Voltage),
                current: value(Quantity::Current),
                power: value(Quantity::Power),
            })
        })
        .collect()
}

/// Store solved values on every automatic quantity of the components in
/// the tree. Returns how many stored values changed.
fn write_back(circuit: &mut Circuit, set: &EquationSet, knowns: &Knowns) -> usize {
    let mut changed = 0;
    for id in set.all_components() {
        let Ok(component) = circuit.component_mut(id) else {
            continue;
        };
        for quantity in Quantity::ALL {
            if quantity == Quantity::Resistance && component.is_battery() {
                continue;
            }
            let value = knowns.component(id, quantity);
            if component.values.get_mut(quantity).assign(value) {
                changed += 1;
            }
        }
    }
    log::debug!("write-back changed {} value(s)", changed);
    changed
}

/// The simulation context: owns the schematic and solves it on demand.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    circuit: Circuit,
    config: SimulationConfig,
}

impl Simulator {
    /// Create a new simulator for the given circuit with default configuration.
    pub fn new(circuit: Circuit) -> Self {
        Self::with_config(circuit, SimulationConfig::default())
    }

    /// Create a new simulator for the given circuit with custom configuration.
    pub fn with_config(circuit: Circuit, config: SimulationConfig) -> Self {
        Self { circuit, config }
    }

    /// Solve the current schematic and store the results on its components.
    pub fn tick(&mut self) -> TickReport {
        run_tick(&mut self.circuit, &self.config)
    }

    /// Get a reference to the circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Edit the schematic between ticks.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;
    use crate::solver::Law;
    use approx::assert_relative_eq;

    fn simulator(src: &str) -> Simulator {
        Simulator::new(Circuit::from_ast(dsl::parse(src).unwrap()).unwrap())
    }

    fn stored(sim: &Simulator, name: &str, quantity: Quantity) -> Option<f64> {
        sim.circuit()
            .find_by_name(name)
            .unwrap()
            .values
            .get(quantity)
            .get()
    }

    #[test]
    fn test_single_loop() {
        let mut sim = simulator("B1 p n 9V\nR1 p n 3");
        let report = sim.tick();

        assert!(report.is_clean(), "{:?}", report.diagnostics);
        assert_relative_eq!(stored(&sim, "R1", Quantity::Current).unwrap(), 3.0);
        assert_relative_eq!(stored(&sim, "R1", Quantity::Voltage).unwrap(), 9.0);
        assert_relative_eq!(stored(&sim, "R1", Quantity::Power).unwrap(), 27.0);
        assert_relative_eq!(stored(&sim, "B1", Quantity::Current).unwrap(), 3.0);
    }

    #[test]
    fn test_series_resistors() {
        let mut sim = simulator("B1 p n 9\nR1 p a 100\nR2 a n 200");
        let report = sim.tick();

        assert_eq!(report.tree.label(sim.circuit()), "B1, R1, R2, B1");
        let current = 9.0 / 300.0;
        assert_relative_eq!(stored(&sim, "R1", Quantity::Current).unwrap(), current);
        assert_relative_eq!(stored(&sim, "R2", Quantity::Current).unwrap(), current);
        assert_relative_eq!(stored(&sim, "R1", Quantity::Voltage).unwrap(), current * 100.0, epsilon = 1e-12);
        assert_relative_eq!(stored(&sim, "R2", Quantity::Voltage).unwrap(), current * 200.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_resistors() {
        let mut sim = simulator("B1 p n 9\nR1 p n 100\nR2 p n 200");
        let report = sim.tick();

        assert_eq!(report.tree.label(sim.circuit()), "B1, [R1 | R2], B1");
        assert_relative_eq!(stored(&sim, "R1", Quantity::Voltage).unwrap(), 9.0);
        assert_relative_eq!(stored(&sim, "R2", Quantity::Voltage).unwrap(), 9.0);
        assert_relative_eq!(stored(&sim, "R1", Quantity::Current).unwrap(), 0.09, epsilon = 1e-12);
        assert_relative_eq!(stored(&sim, "R2", Quantity::Current).unwrap(), 0.045, epsilon = 1e-12);
        assert_relative_eq!(
            stored(&sim, "B1", Quantity::Current).unwrap(),
            9.0 / 100.0 + 9.0 / 200.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_parallel_branch_from_total_current() {
        // R2 is unknown; the fixed source current pins it down
        let mut sim = simulator("B1 p n 9 i=0.135\nR1 p n 100\nR2 p n");
        let report = sim.tick();

        assert!(report.is_clean(), "{:?}", report.diagnostics);
        assert_relative_eq!(stored(&sim, "R2", Quantity::Voltage).unwrap(), 9.0);
        assert_relative_eq!(stored(&sim, "R2", Quantity::Resistance).unwrap(), 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_series_then_parallel() {
        let mut sim = simulator("B1 p n 12\nR0 p a 2\nR1 a n 6\nR2 a n 3");
        sim.tick();

        // 2 + (6 | 3) = 4 ohms, 3 A total
        assert_relative_eq!(stored(&sim, "R0", Quantity::Current).unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(stored(&sim, "R1", Quantity::Voltage).unwrap(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(stored(&sim, "R2", Quantity::Current).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_switch_removes_loop() {
        let mut sim = simulator("B1 p n 9\nSW1 p a off\nR1 a n 10");
        let report = sim.tick();

        assert!(report.active_paths.is_empty());
        assert_eq!(report.blocked.len(), 1);
        assert!(report.tree.is_empty());
        assert!(report.outcome.is_none());
        assert_eq!(report.changed, 0);
        assert_eq!(stored(&sim, "R1", Quantity::Current), None);
    }

    #[test]
    fn test_toggle_switch_between_ticks() {
        let mut sim = simulator("B1 p n 9\nSW1 p a off\nL1 a n 30");
        sim.tick();
        assert_eq!(stored(&sim, "L1", Quantity::Current), None);

        let sw = sim.circuit().id_of("SW1").unwrap();
        assert!(sim.circuit_mut().toggle_switch(sw).unwrap());
        let report = sim.tick();

        assert_eq!(report.tree.label(sim.circuit()), "B1, SW1, L1, B1");
        assert!(report.is_clean(), "{:?}", report.diagnostics);
        assert_relative_eq!(stored(&sim, "L1", Quantity::Current).unwrap(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(stored(&sim, "SW1", Quantity::Voltage).unwrap(), 0.0);
    }

    #[test]
    fn test_second_tick_is_idempotent() {
        let mut sim = simulator("B1 p n 9\nR1 p a 100\nR2 a n 200");
        let first = sim.tick();
        assert!(first.changed > 0);
        let before = sim.circuit().clone();

        let second = sim.tick();
        assert_eq!(second.changed, 0);
        for component in before.components() {
            let after = sim.circuit().component(component.id).unwrap();
            assert_eq!(after.values, component.values);
        }
    }

    #[test]
    fn test_shorted_battery_is_rejected() {
        let mut sim = simulator("B1 p p 9\nR1 p p 10");
        let report = sim.tick();

        assert!(matches!(
            report.diagnostics[..],
            [Diagnostic::InvalidWiring {
                fault: WiringFault::SharedWire,
                ..
            }]
        ));
        assert!(report.outcome.is_none());
        assert_eq!(stored(&sim, "R1", Quantity::Current), None);
    }

    #[test]
    fn test_no_battery() {
        let mut sim = simulator("R1 a b 10");
        let report = sim.tick();
        assert_eq!(report.diagnostics, vec![Diagnostic::NoSource]);
        assert!(report.tree.is_empty());
        assert_eq!(stored(&sim, "R1", Quantity::Voltage), None);
    }

    #[test]
    fn test_bridge_is_reported() {
        let mut sim = simulator("B1 p n 9\nR1 p a 1\nR2 p b 1\nR3 a n 1\nR4 b n 1\nR5 a b 1");
        let report = sim.tick();

        assert_eq!(report.paths.len(), 4);
        assert!(matches!(
            report.diagnostics[..],
            [Diagnostic::UnsupportedTopology { .. }]
        ));
        assert!(report.tree.is_empty());
    }

    #[test]
    fn test_power_mismatch_is_warned() {
        let mut sim = simulator("B1 p n 9\nR1 p n 100 p=1W");
        let report = sim.tick();

        let mismatches: Vec<_> = report.mismatches().collect();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].law, Law::Power);
        // Fixed inputs survive the write-back
        assert_eq!(stored(&sim, "R1", Quantity::Power), Some(1.0));
    }

    #[test]
    fn test_path_limit_is_reported() {
        let sim_src = "B1 p n 9\nR1 p n 1\nR2 p n 1\nR3 p n 1";
        let mut sim = Simulator::with_config(
            Circuit::from_ast(dsl::parse(sim_src).unwrap()).unwrap(),
            SimulationConfig::new().with_max_paths(2),
        );
        let report = sim.tick();
        assert!(report
            .diagnostics
            .contains(&Diagnostic::PathLimit { limit: 2 }));
        assert_eq!(report.paths.len(), 2);
    }

    #[test]
    fn test_three_branches_between_interior_wires() {
        let mut sim = simulator("B1 p n 9\nR0 p a 1\nR1 a b 3\nR2 a b 3\nR3 a b 3\nR4 b n 1");
        let report = sim.tick();

        assert_eq!(report.paths.len(), 3);
        assert_eq!(report.tree.label(sim.circuit()), "B1, R0, [R1 | R2 | R3], R4, B1");
        assert!(report.is_clean(), "{:?}", report.diagnostics);
        assert_relative_eq!(stored(&sim, "B1", Quantity::Current).unwrap(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(stored(&sim, "B1", Quantity::Power).unwrap(), 27.0, epsilon = 1e-9);
        for name in ["R1", "R2", "R3"] {
            assert_relative_eq!(stored(&sim, name, Quantity::Current).unwrap(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(stored(&sim, name, Quantity::Voltage).unwrap(), 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_nested_group_beside_parallel_sibling() {
        // R0 + ((R1 | R2) + R3 | R5)
        let mut sim = simulator("B1 p n 12\nR0 p a 2\nR1 a b 4\nR2 a b 4\nR3 b n 4\nR5 a n 6");
        let report = sim.tick();

        assert_eq!(report.paths.len(), 3);
        assert_eq!(
            report.tree.label(sim.circuit()),
            "B1, R0, [[R1 | R2], R3 | R5], B1"
        );
        assert!(report.is_clean(), "{:?}", report.diagnostics);

        // (2 + 4) | 6 = 3 ohms, 5 ohms in total
        let total = 12.0 / 5.0;
        let across = total * 3.0;
        assert_relative_eq!(stored(&sim, "R0", Quantity::Current).unwrap(), total, epsilon = 1e-9);
        assert_relative_eq!(stored(&sim, "R5", Quantity::Current).unwrap(), across / 6.0, epsilon = 1e-9);
        assert_relative_eq!(stored(&sim, "R3", Quantity::Current).unwrap(), across / 6.0, epsilon = 1e-9);
        assert_relative_eq!(stored(&sim, "R1", Quantity::Current).unwrap(), across / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_visit_budget_bounds_dense_mesh() {
        // Five wires hanging off the positive pole, every pair joined by three
        // resistors; the negative pole leads to a dead end.
        let wires = ["p", "w1", "w2", "w3", "w4"];
        let mut src = String::from("B1 p n 9\nR0 n z 1\n");
        let mut count = 1;
        for (i, a) in wires.iter().enumerate() {
            for b in &wires[i + 1..] {
                for _ in 0..3 {
                    src.push_str(&format!("R{} {} {} 1\n", count, a, b));
                    count += 1;
                }
            }
        }
        let mut sim = Simulator::with_config(
            Circuit::from_ast(dsl::parse(&src).unwrap()).unwrap(),
            SimulationConfig::new().with_max_paths(1).with_max_visits(200),
        );
        let report = sim.tick();

        assert!(report.paths.is_empty());
        assert_eq!(report.diagnostics, vec![Diagnostic::VisitLimit { limit: 200 }]);
        assert!(report.tree.is_empty());
    }

    #[test]
    fn test_meters() {
        // Ammeter in series, voltmeter across the load on its own loop
        let mut sim = simulator("B1 p n 10\nA1 p a\nR1 a n 5\nV1 a n");
        let report = sim.tick();

        assert_eq!(report.tree.label(sim.circuit()), "B1, A1, [R1 | V1], B1");
        assert_relative_eq!(stored(&sim, "A1", Quantity::Current).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(stored(&sim, "A1", Quantity::Voltage).unwrap(), 0.0);
        assert_relative_eq!(stored(&sim, "V1", Quantity::Voltage).unwrap(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_summary() {
        let mut sim = simulator("B1 p n 9\nR1 p n 100");
        let report = sim.tick();
        let summary = report.summary(sim.circuit());

        assert!(summary.contains("Tree: B1, R1, B1"));
        assert!(summary.contains("Loops: 1 active of 1"));
        assert!(summary.contains("R1 (resistor): R=100Ω, V=9V, I=0.09A, P=0.81W"));
        assert!(summary.contains("B1 (battery): V=9V, I=0.09A, P=0.81W"));
        assert!(!summary.contains("Warnings:"));
    }

    #[test]
    fn test_config_builders() {
        let config = SimulationConfig::new()
            .with_max_passes(5)
            .with_tolerance(1e-6)
            .with_max_paths(3)
            .with_max_visits(40);
        assert_eq!(config.max_passes, 5);
        assert_eq!(config.max_paths, 3);
        assert_eq!(config.max_visits, 40);
        assert_relative_eq!(config.tolerance, 1e-6);
        assert_eq!(SimulationConfig::default().max_passes, 100);
    }
}

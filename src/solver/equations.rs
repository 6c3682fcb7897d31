//! Equation generation from a series/parallel tree.
//!
//! Every series or parallel node below the root becomes a *group* with its
//! own voltage, current and resistance unknowns, and the circuit body (the
//! root without the source at either end) is one more series group. Groups
//! are tied to their members by Kirchhoff rules and to each other through
//! the resistance composition rules, so a value found anywhere in the tree
//! flows up and down the hierarchy.

use std::fmt;

use crate::circuit::ComponentId;
use crate::components::Quantity;

use super::tree::CircuitTree;

/// Index of a series or parallel group within an [`EquationSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// Something that has a voltage, a current and a resistance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Component(ComponentId),
    Group(GroupId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Component(id) => write!(f, "{}", id),
            Target::Group(id) => write!(f, "{}", id),
        }
    }
}

/// One scalar the solver may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unknown {
    pub target: Target,
    pub quantity: Quantity,
}

impl Unknown {
    pub fn new(target: Target, quantity: Quantity) -> Self {
        Self { target, quantity }
    }

    pub fn component(id: ComponentId, quantity: Quantity) -> Self {
        Self::new(Target::Component(id), quantity)
    }
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.target, self.quantity.symbol())
    }
}

/// The six rearrangements of Ohm's law and the power law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// V = I·R
    OhmVoltage,
    /// I = V/R
    OhmCurrent,
    /// R = V/I
    OhmResistance,
    /// P = V·I
    Power,
    /// I = P/V
    PowerCurrent,
    /// V = P/I
    PowerVoltage,
}

impl Relation {
    pub const OHM: [Relation; 3] = [Relation::OhmVoltage, Relation::OhmCurrent, Relation::OhmResistance];
    pub const POWER: [Relation; 3] = [Relation::Power, Relation::PowerCurrent, Relation::PowerVoltage];

    /// Quantities that must be known, in the order [`Relation::evaluate`] takes them.
    pub fn requires(&self) -> [Quantity; 2] {
        use Quantity::*;
        match self {
            Relation::OhmVoltage => [Current, Resistance],
            Relation::OhmCurrent => [Voltage, Resistance],
            Relation::OhmResistance => [Voltage, Current],
            Relation::Power => [Voltage, Current],
            Relation::PowerCurrent => [Power, Voltage],
            Relation::PowerVoltage => [Power, Current],
        }
    }

    pub fn solves(&self) -> Quantity {
        match self {
            Relation::OhmVoltage | Relation::PowerVoltage => Quantity::Voltage,
            Relation::OhmCurrent | Relation::PowerCurrent => Quantity::Current,
            Relation::OhmResistance => Quantity::Resistance,
            Relation::Power => Quantity::Power,
        }
    }

    /// Compute the solved quantity. Division by zero yields `None`.
    pub fn evaluate(&self, a: f64, b: f64) -> Option<f64> {
        let value = match self {
            Relation::OhmVoltage | Relation::Power => a * b,
            Relation::OhmCurrent
            | Relation::OhmResistance
            | Relation::PowerCurrent
            | Relation::PowerVoltage => {
                if b == 0.0 {
                    return None;
                }
                a / b
            }
        };
        value.is_finite().then_some(value)
    }

    pub fn formula(&self) -> &'static str {
        match self {
            Relation::OhmVoltage => "V = I*R",
            Relation::OhmCurrent => "I = V/R",
            Relation::OhmResistance => "R = V/I",
            Relation::Power => "P = V*I",
            Relation::PowerCurrent => "I = P/V",
            Relation::PowerVoltage => "V = P/I",
        }
    }
}

/// One relation applied to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equation {
    pub relation: Relation,
    pub target: Target,
}

impl Equation {
    pub fn requires(&self) -> [Unknown; 2] {
        self.relation
            .requires()
            .map(|quantity| Unknown::new(self.target, quantity))
    }

    pub fn solves(&self) -> Unknown {
        Unknown::new(self.target, self.relation.solves())
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.relation.formula(), self.target)
    }
}

/// Kirchhoff relations between a group and its members.
#[derive(Debug, Clone, PartialEq)]
pub enum KirchhoffRule {
    /// Series KCL: one current through every listed target.
    EqualCurrent(Vec<Target>),
    /// Parallel KVL: one voltage across every listed target.
    EqualVoltage(Vec<Target>),
    /// Series KVL: the total voltage is the sum of the parts.
    VoltageSum { total: Target, parts: Vec<Target> },
    /// Parallel KCL: the total current is the sum of the parts.
    CurrentSum { total: Target, parts: Vec<Target> },
    /// Series resistances add.
    SeriesResistance { total: Target, parts: Vec<Target> },
    /// Parallel conductances add.
    ParallelResistance { total: Target, parts: Vec<Target> },
}

impl KirchhoffRule {
    pub fn name(&self) -> &'static str {
        match self {
            KirchhoffRule::EqualCurrent(_) => "series current",
            KirchhoffRule::EqualVoltage(_) => "parallel voltage",
            KirchhoffRule::VoltageSum { .. } => "series voltage sum",
            KirchhoffRule::CurrentSum { .. } => "parallel current sum",
            KirchhoffRule::SeriesResistance { .. } => "series resistance",
            KirchhoffRule::ParallelResistance { .. } => "parallel resistance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Series,
    Parallel,
}

/// A series or parallel node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub kind: GroupKind,
    pub members: Vec<Target>,
}

/// Everything the solver works from for one tick.
#[derive(Debug, Clone, Default)]
pub struct EquationSet {
    pub source: Option<ComponentId>,
    /// Non-source components in tree order.
    pub components: Vec<ComponentId>,
    pub groups: Vec<Group>,
    pub equations: Vec<Equation>,
    pub rules: Vec<KirchhoffRule>,
    /// The group spanning everything between the source terminals.
    pub body: Option<GroupId>,
}

impl EquationSet {
    /// Generate equations and rules for `tree`, driven by `source`.
    ///
    /// The source takes part through the body rules (its current equals the
    /// body current and its EMF is the body voltage) and the power law. An
    /// empty tree gives an empty set.
    pub fn generate(tree: &CircuitTree, source: ComponentId) -> Self {
        let mut set = EquationSet::default();
        if tree.is_empty() {
            return set;
        }

        let items: Vec<&CircuitTree> = match tree {
            CircuitTree::Series(items) => items
                .iter()
                .filter(|item| **item != CircuitTree::Leaf(source))
                .collect(),
            other => vec![other],
        };

        let body = set.group(GroupKind::Series, &items, source);
        set.source = Some(source);
        set.body = Some(body);
        set.rules.push(KirchhoffRule::EqualCurrent(vec![
            Target::Component(source),
            Target::Group(body),
        ]));
        set.rules.push(KirchhoffRule::EqualVoltage(vec![
            Target::Component(source),
            Target::Group(body),
        ]));
        for relation in Relation::POWER {
            set.equations.push(Equation {
                relation,
                target: Target::Component(source),
            });
        }

        log::debug!(
            "generated {} equations and {} rules over {} components and {} groups",
            set.equations.len(),
            set.rules.len(),
            set.components.len(),
            set.groups.len()
        );
        set
    }

    fn member(&mut self, node: &CircuitTree, source: ComponentId) -> Target {
        match node {
            CircuitTree::Leaf(id) => {
                if *id != source && !self.components.contains(id) {
                    self.components.push(*id);
                    let target = Target::Component(*id);
                    for relation in Relation::OHM.into_iter().chain(Relation::POWER) {
                        self.equations.push(Equation { relation, target });
                    }
                }
                Target::Component(*id)
            }
            CircuitTree::Series(items) => {
                let items: Vec<&CircuitTree> = items.iter().collect();
                Target::Group(self.group(GroupKind::Series, &items, source))
            }
            CircuitTree::Parallel(branches) => {
                let branches: Vec<&CircuitTree> = branches.iter().collect();
                Target::Group(self.group(GroupKind::Parallel, &branches, source))
            }
        }
    }

    fn group(&mut self, kind: GroupKind, items: &[&CircuitTree], source: ComponentId) -> GroupId {
        let members: Vec<Target> = items.iter().map(|item| self.member(item, source)).collect();
        let id = GroupId(self.groups.len());
        let total = Target::Group(id);

        for relation in Relation::OHM {
            self.equations.push(Equation { relation, target: total });
        }

        let mut joined = vec![total];
        joined.extend(members.iter().copied());
        match kind {
            GroupKind::Series => {
                self.rules.push(KirchhoffRule::EqualCurrent(joined));
                self.rules.push(KirchhoffRule::VoltageSum {
                    total,
                    parts: members.clone(),
                });
                self.rules.push(KirchhoffRule::SeriesResistance {
                    total,
                    parts: members.clone(),
                });
            }
            GroupKind::Parallel => {
                self.rules.push(KirchhoffRule::EqualVoltage(joined));
                self.rules.push(KirchhoffRule::CurrentSum {
                    total,
                    parts: members.clone(),
                });
                self.rules.push(KirchhoffRule::ParallelResistance {
                    total,
                    parts: members.clone(),
                });
            }
        }

        self.groups.push(Group { id, kind, members });
        id
    }

    pub fn group_of(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }

    /// Every component the tick resolves: the source first, then the rest.
    pub fn all_components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.source.into_iter().chain(self.components.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn leaf(i: usize) -> CircuitTree {
        CircuitTree::Leaf(ComponentId(i))
    }

    #[test]
    fn test_relations() {
        assert_relative_eq!(Relation::OhmVoltage.evaluate(0.5, 10.0).unwrap(), 5.0);
        assert_relative_eq!(Relation::OhmCurrent.evaluate(9.0, 3.0).unwrap(), 3.0);
        assert_relative_eq!(Relation::PowerCurrent.evaluate(6.0, 3.0).unwrap(), 2.0);
        assert_eq!(Relation::OhmCurrent.evaluate(9.0, 0.0), None);
        assert_eq!(Relation::OhmResistance.solves(), Quantity::Resistance);
        assert_eq!(
            Relation::PowerVoltage.requires(),
            [Quantity::Power, Quantity::Current]
        );
    }

    #[test]
    fn test_empty_tree() {
        let set = EquationSet::generate(&CircuitTree::empty(), ComponentId(0));
        assert!(set.is_empty());
        assert!(set.equations.is_empty());
        assert!(set.rules.is_empty());
    }

    #[test]
    fn test_single_loop() {
        let tree = CircuitTree::Series(vec![leaf(0), leaf(1), leaf(0)]);
        let set = EquationSet::generate(&tree, ComponentId(0));

        assert_eq!(set.components, vec![ComponentId(1)]);
        assert_eq!(set.groups.len(), 1);
        // six per component, three for the body group, power law on the source
        assert_eq!(set.equations.len(), 12);
        let on_source: Vec<Relation> = set
            .equations
            .iter()
            .filter(|eq| eq.target == Target::Component(ComponentId(0)))
            .map(|eq| eq.relation)
            .collect();
        assert_eq!(on_source, Relation::POWER.to_vec());

        let body = Target::Group(GroupId(0));
        assert!(set.rules.contains(&KirchhoffRule::EqualVoltage(vec![
            Target::Component(ComponentId(0)),
            body
        ])));
    }

    #[test]
    fn test_parallel_groups() {
        let tree = CircuitTree::Series(vec![
            leaf(0),
            leaf(3),
            CircuitTree::Parallel(vec![leaf(1), leaf(2)]),
            leaf(0),
        ]);
        let set = EquationSet::generate(&tree, ComponentId(0));

        assert_eq!(set.groups.len(), 2);
        let parallel = &set.groups[0];
        assert_eq!(parallel.kind, GroupKind::Parallel);
        assert_eq!(
            parallel.members,
            vec![Target::Component(ComponentId(1)), Target::Component(ComponentId(2))]
        );
        assert_eq!(set.body, Some(GroupId(1)));
        assert_eq!(
            set.group_of(GroupId(1)).unwrap().members,
            vec![Target::Component(ComponentId(3)), Target::Group(GroupId(0))]
        );
        assert!(set.rules.contains(&KirchhoffRule::CurrentSum {
            total: Target::Group(GroupId(0)),
            parts: vec![Target::Component(ComponentId(1)), Target::Component(ComponentId(2))],
        }));
        assert_eq!(
            set.all_components().collect::<Vec<_>>(),
            vec![ComponentId(0), ComponentId(3), ComponentId(1), ComponentId(2)]
        );
    }
}

//! Series/parallel decomposition of the active loops.
//!
//! Loops are folded by peeling off their common prefix and suffix (series
//! elements shared by every loop). What is left in the middle is grouped into
//! parallel branches: middles that share a component or an internal wire
//! belong to the same branch and are folded recursively. Middles that are all
//! linked but share no prefix or suffix are cut in series at a wire they all
//! pass through; if there is none, the network is a bridge and is rejected.

use std::collections::HashSet;
use std::fmt;

use crate::circuit::{Circuit, ComponentId, WireId};
use crate::error::{LabError, Result};

use super::paths::Path;

/// Hierarchical series/parallel structure of the conducting network.
///
/// The root is a `Series` that starts and ends with the source leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitTree {
    Leaf(ComponentId),
    Series(Vec<CircuitTree>),
    Parallel(Vec<CircuitTree>),
}

impl Default for CircuitTree {
    fn default() -> Self {
        CircuitTree::empty()
    }
}

impl CircuitTree {
    /// The tree of a circuit with no active loops.
    pub fn empty() -> Self {
        CircuitTree::Series(Vec::new())
    }

    /// An empty series: no components at all. Inside a parallel group this
    /// is a short across the group.
    pub fn is_empty(&self) -> bool {
        matches!(self, CircuitTree::Series(items) if items.is_empty())
    }

    /// Every leaf in left-to-right order, repeats included.
    pub fn leaves(&self) -> Vec<ComponentId> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<ComponentId>) {
        match self {
            CircuitTree::Leaf(id) => out.push(*id),
            CircuitTree::Series(items) | CircuitTree::Parallel(items) => {
                for item in items {
                    item.collect_leaves(out);
                }
            }
        }
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        match self {
            CircuitTree::Leaf(leaf) => *leaf == id,
            CircuitTree::Series(items) | CircuitTree::Parallel(items) => {
                items.iter().any(|item| item.contains(id))
            }
        }
    }

    /// Render the tree using component names, e.g. `B1, R1, [R2 | R3], B1`.
    pub fn label(&self, circuit: &Circuit) -> String {
        self.display_with(&|id| circuit.name_of(id))
    }

    fn display_with(&self, name: &dyn Fn(ComponentId) -> String) -> String {
        if self.is_empty() {
            return "(empty)".to_string();
        }
        self.render(name)
    }

    fn render(&self, name: &dyn Fn(ComponentId) -> String) -> String {
        match self {
            CircuitTree::Leaf(id) => name(*id),
            CircuitTree::Series(items) if items.is_empty() => "short".to_string(),
            CircuitTree::Series(items) => items
                .iter()
                .map(|item| item.render(name))
                .collect::<Vec<_>>()
                .join(", "),
            CircuitTree::Parallel(branches) => format!(
                "[{}]",
                branches
                    .iter()
                    .map(|branch| branch.render(name))
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
        }
    }
}

impl fmt::Display for CircuitTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with(&|id| id.to_string()))
    }
}

/// Fold the active loops into a series/parallel tree.
///
/// No loops gives the empty tree.
pub fn build_tree(paths: &[Path]) -> Result<CircuitTree> {
    if paths.is_empty() {
        return Ok(CircuitTree::empty());
    }
    let segments: Vec<Segment<'_>> = paths.iter().map(Segment::of).collect();
    let tree = CircuitTree::Series(fold(&segments)?);
    ensure_unique(&tree)?;
    Ok(tree)
}

/// A run of consecutive components from one loop, with the wires between them.
#[derive(Debug, Clone, Copy)]
struct Segment<'a> {
    components: &'a [ComponentId],
    junctions: &'a [WireId],
}

impl<'a> Segment<'a> {
    fn of(path: &'a Path) -> Self {
        Segment {
            components: path.components(),
            junctions: path.junctions(),
        }
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    /// Components `from..to` and the wires strictly between them.
    fn slice(&self, from: usize, to: usize) -> Segment<'a> {
        let junctions = if to > from {
            &self.junctions[from..to - 1]
        } else {
            &self.junctions[..0]
        };
        Segment {
            components: &self.components[from..to],
            junctions,
        }
    }

    fn touches(&self, other: &Segment<'_>) -> bool {
        self.components.iter().any(|c| other.components.contains(c))
            || self.junctions.iter().any(|w| other.junctions.contains(w))
    }
}

fn leaves(ids: &[ComponentId]) -> Vec<CircuitTree> {
    ids.iter().copied().map(CircuitTree::Leaf).collect()
}

/// Fold segments that all run between the same two points into a series list.
fn fold(segments: &[Segment<'_>]) -> Result<Vec<CircuitTree>> {
    let mut distinct: Vec<Segment<'_>> = Vec::new();
    for segment in segments {
        if !distinct.iter().any(|d| d.components == segment.components) {
            distinct.push(*segment);
        }
    }
    let Some(first) = distinct.first().copied() else {
        return Ok(Vec::new());
    };
    if distinct.len() == 1 {
        return Ok(leaves(first.components));
    }

    let shortest = distinct.iter().map(Segment::len).min().unwrap_or(0);
    let prefix = (0..shortest)
        .take_while(|&i| distinct.iter().all(|s| s.components[i] == first.components[i]))
        .count();
    let suffix = (0..shortest - prefix)
        .take_while(|&i| {
            let expected = first.components[first.len() - 1 - i];
            distinct.iter().all(|s| s.components[s.len() - 1 - i] == expected)
        })
        .count();

    let middles: Vec<Segment<'_>> = distinct
        .iter()
        .map(|s| s.slice(prefix, s.len() - suffix))
        .collect();

    let mut items = leaves(&first.components[..prefix]);
    items.extend(fold_middles(&middles)?);
    items.extend(leaves(&first.components[first.len() - suffix..]));
    Ok(items)
}

/// Fold at least two distinct middles sharing no prefix or suffix.
fn fold_middles(middles: &[Segment<'_>]) -> Result<Vec<CircuitTree>> {
    let clusters = cluster(middles);
    if clusters.len() > 1 {
        let branches = clusters
            .iter()
            .map(|members| branch(members))
            .collect::<Result<Vec<_>>>()?;
        return Ok(vec![CircuitTree::Parallel(branches)]);
    }

    let split = common_junction(middles).ok_or_else(|| {
        LabError::unsupported_topology("interlinked branches with no common junction (bridge network)")
    })?;

    let mut heads = Vec::with_capacity(middles.len());
    let mut tails = Vec::with_capacity(middles.len());
    for middle in middles {
        if let Some(k) = middle.junctions.iter().position(|&w| w == split) {
            heads.push(middle.slice(0, k + 1));
            tails.push(middle.slice(k + 1, middle.len()));
        }
    }

    let mut items = fold(&heads)?;
    items.extend(fold(&tails)?);
    Ok(items)
}

/// One parallel branch: a single element stays bare, several form a series.
fn branch(members: &[Segment<'_>]) -> Result<CircuitTree> {
    let mut items = fold(members)?;
    if items.len() == 1 {
        if let Some(item) = items.pop() {
            return Ok(item);
        }
    }
    Ok(CircuitTree::Series(items))
}

/// Partition middles into groups linked by shared components or wires.
fn cluster<'a>(middles: &[Segment<'a>]) -> Vec<Vec<Segment<'a>>> {
    let mut parent: Vec<usize> = (0..middles.len()).collect();

    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..middles.len() {
        for j in i + 1..middles.len() {
            if middles[i].touches(&middles[j]) {
                let (a, b) = (root(&mut parent, i), root(&mut parent, j));
                if a != b {
                    parent[b.max(a)] = a.min(b);
                }
            }
        }
    }

    let mut order: Vec<usize> = Vec::new();
    let mut groups: Vec<Vec<Segment<'a>>> = Vec::new();
    for (i, middle) in middles.iter().enumerate() {
        let r = root(&mut parent, i);
        match order.iter().position(|&o| o == r) {
            Some(slot) => groups[slot].push(*middle),
            None => {
                order.push(r);
                groups.push(vec![*middle]);
            }
        }
    }
    groups
}

/// The first internal wire of the first middle that every middle passes through.
fn common_junction(middles: &[Segment<'_>]) -> Option<WireId> {
    let (first, rest) = middles.split_first()?;
    first
        .junctions
        .iter()
        .copied()
        .find(|w| rest.iter().all(|m| m.junctions.contains(w)))
}

/// Reject trees in which a component would carry two different currents.
fn ensure_unique(tree: &CircuitTree) -> Result<()> {
    let mut leaves = tree.leaves();
    // The source closes the loop and legitimately appears at both ends
    if leaves.len() >= 2 && leaves.first() == leaves.last() {
        leaves.pop();
    }
    let mut seen = HashSet::new();
    for id in leaves {
        if !seen.insert(id) {
            return Err(LabError::unsupported_topology(format!(
                "component {} lies on more than one branch",
                id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(i: usize) -> ComponentId {
        ComponentId(i)
    }

    fn w(i: usize) -> WireId {
        WireId(i)
    }

    fn leaf(i: usize) -> CircuitTree {
        CircuitTree::Leaf(c(i))
    }

    fn path(components: &[usize], junctions: &[usize]) -> Path {
        Path::new(
            components.iter().copied().map(c).collect(),
            junctions.iter().copied().map(w).collect(),
        )
    }

    #[test]
    fn test_empty() {
        let tree = build_tree(&[]).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), "(empty)");
    }

    #[test]
    fn test_single_loop() {
        let tree = build_tree(&[path(&[0, 1, 2, 0], &[0, 1, 2])]).unwrap();
        assert_eq!(
            tree,
            CircuitTree::Series(vec![leaf(0), leaf(1), leaf(2), leaf(0)])
        );
        assert_eq!(tree.to_string(), "C0, C1, C2, C0");
    }

    #[test]
    fn test_duplicate_loops_collapse() {
        let p = path(&[0, 1, 0], &[0, 1]);
        let tree = build_tree(&[p.clone(), p]).unwrap();
        assert_eq!(tree, CircuitTree::Series(vec![leaf(0), leaf(1), leaf(0)]));
    }

    #[test]
    fn test_parallel_pair() {
        let tree = build_tree(&[path(&[0, 1, 0], &[0, 1]), path(&[0, 2, 0], &[0, 1])]).unwrap();
        assert_eq!(
            tree,
            CircuitTree::Series(vec![
                leaf(0),
                CircuitTree::Parallel(vec![leaf(1), leaf(2)]),
                leaf(0)
            ])
        );
        assert_eq!(tree.to_string(), "C0, [C1 | C2], C0");
    }

    #[test]
    fn test_series_then_parallel() {
        // B -> R0 -> (R1 | R2) -> B
        let tree = build_tree(&[
            path(&[0, 3, 1, 0], &[0, 1, 2]),
            path(&[0, 3, 2, 0], &[0, 1, 2]),
        ])
        .unwrap();
        assert_eq!(tree.to_string(), "C0, C3, [C1 | C2], C0");
    }

    #[test]
    fn test_nested_branch() {
        // B -> [a, (x | y), c | z] -> B
        let tree = build_tree(&[
            path(&[0, 1, 2, 4, 0], &[0, 1, 2, 3]),
            path(&[0, 1, 3, 4, 0], &[0, 1, 2, 3]),
            path(&[0, 5, 0], &[0, 3]),
        ])
        .unwrap();
        assert_eq!(tree.to_string(), "C0, [C1, [C2 | C3], C4 | C5], C0");
    }

    #[test]
    fn test_short_branch() {
        // The second loop has no interior: a bare wire across C1
        let tree = build_tree(&[path(&[0, 1, 0], &[0, 1]), path(&[0, 0], &[0])]).unwrap();
        assert_eq!(tree.to_string(), "C0, [C1 | short], C0");
    }

    #[test]
    fn test_parallel_pairs_in_series() {
        // (a | b) then (c | d), meeting on wire 5
        let tree = build_tree(&[
            path(&[0, 1, 3, 0], &[0, 5, 9]),
            path(&[0, 1, 4, 0], &[0, 5, 9]),
            path(&[0, 2, 3, 0], &[0, 5, 9]),
            path(&[0, 2, 4, 0], &[0, 5, 9]),
        ])
        .unwrap();
        assert_eq!(
            tree,
            CircuitTree::Series(vec![
                leaf(0),
                CircuitTree::Parallel(vec![leaf(1), leaf(2)]),
                CircuitTree::Parallel(vec![leaf(3), leaf(4)]),
                leaf(0)
            ])
        );
    }

    #[test]
    fn test_bridge_is_rejected() {
        // Wheatstone bridge: a/b on top, c/d on the bottom, e across the middle
        let result = build_tree(&[
            path(&[0, 1, 2, 0], &[0, 6, 9]),
            path(&[0, 1, 5, 4, 0], &[0, 6, 7, 9]),
            path(&[0, 3, 4, 0], &[0, 7, 9]),
            path(&[0, 3, 5, 2, 0], &[0, 7, 6, 9]),
        ]);
        assert!(matches!(result, Err(LabError::UnsupportedTopology { .. })));
    }

    #[test]
    fn test_contains_and_leaves() {
        let tree = build_tree(&[path(&[0, 1, 0], &[0, 1]), path(&[0, 2, 0], &[0, 1])]).unwrap();
        assert!(tree.contains(c(2)));
        assert!(!tree.contains(c(7)));
        assert_eq!(tree.leaves(), vec![c(0), c(1), c(2), c(0)]);
    }
}

// 🔗 Merge Engine - transitive union of overlapping equivalence classes
//
// Every class of both inputs is a node; nodes sharing a glyph are unioned.
// Each connected component becomes one class, so a glyph that links three
// or more classes (across either list, or within one) fuses all of them.

use crate::glyph::{EquivalenceClass, Glyph, MergedClassList};
use petgraph::unionfind::UnionFind;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Merges class lists by shared membership.
///
/// Output order: fused components first, ordered by their first node; then
/// untouched classes of the first list; then untouched classes of the second.
/// Members of a fused class are the concatenation of its constituents in node
/// order (repeats are left for the deduplicator).
#[derive(Debug, Default, Clone, Copy)]
pub struct EquivalenceClassMerger;

impl EquivalenceClassMerger {
    pub fn new() -> Self {
        EquivalenceClassMerger
    }

    /// Merge two class lists into their transitive union
    pub fn merge(
        &self,
        first: &[EquivalenceClass],
        second: &[EquivalenceClass],
    ) -> MergedClassList {
        let nodes: Vec<&EquivalenceClass> = first.iter().chain(second.iter()).collect();
        let components = connected_components(&nodes);

        let (fused, untouched): (Vec<Vec<usize>>, Vec<Vec<usize>>) =
            components.into_iter().partition(|c| c.len() > 1);

        let merged: MergedClassList = fused
            .iter()
            .chain(untouched.iter())
            .map(|component| {
                let mut class = EquivalenceClass::default();
                for &node in component {
                    class.extend_from(nodes[node]);
                }
                class
            })
            .collect();

        tracing::debug!(
            first = first.len(),
            second = second.len(),
            fused = fused.len(),
            result = merged.len(),
            "merged class lists"
        );

        merged
    }

    /// Fold any number of lists left to right
    pub fn merge_all(&self, lists: &[&[EquivalenceClass]]) -> MergedClassList {
        lists
            .iter()
            .fold(Vec::new(), |acc, list| self.merge(&acc, list))
    }
}

/// Group node indices into components, each in ascending node order,
/// components ordered by their smallest node.
fn connected_components(nodes: &[&EquivalenceClass]) -> Vec<Vec<usize>> {
    let mut sets: UnionFind<usize> = UnionFind::new(nodes.len());
    let mut owner: HashMap<&Glyph, usize> = HashMap::new();

    for (node, class) in nodes.iter().enumerate() {
        for glyph in class.iter() {
            match owner.entry(glyph) {
                Entry::Occupied(entry) => {
                    sets.union(*entry.get(), node);
                }
                Entry::Vacant(entry) => {
                    entry.insert(node);
                }
            }
        }
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();

    for node in 0..nodes.len() {
        let root = sets.find_mut(node);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(node);
    }

    components
}

// ============================================================================
// TESTS
// ============================================================================

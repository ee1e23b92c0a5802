//! Duplicate-of graph.
//!
//! `duplicateOf` is an identifier back-reference between items of the same
//! period. The graph is rebuilt from a snapshot of items whenever it is
//! needed; it never holds references into the items themselves.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::types::{PraiseId, PraiseItem};

/// Directed graph of duplicate markers (item -> original).
#[derive(Debug, Default, Clone)]
pub struct DuplicateGraph {
    /// Every original referenced by an item's quantifications
    edges: HashMap<PraiseId, BTreeSet<PraiseId>>,
    /// Items whose score derives from a given original
    dependents: HashMap<PraiseId, Vec<PraiseId>>,
}

impl DuplicateGraph {
    /// Build the graph from a period's items.
    pub fn build(items: &[PraiseItem]) -> Self {
        let mut graph = Self::default();
        for item in items {
            let originals: BTreeSet<PraiseId> = item
                .quantifications
                .iter()
                .filter(|q| !q.dismissed)
                .filter_map(|q| q.duplicate_of.clone())
                .collect();
            if !originals.is_empty() {
                graph.edges.insert(item.id.clone(), originals);
            }
            if let Some(original) = item.duplicate_target() {
                graph
                    .dependents
                    .entry(original.clone())
                    .or_default()
                    .push(item.id.clone());
            }
        }
        graph
    }

    /// Whether adding `from -> to` would close a cycle.
    ///
    /// True when `to` is `from` itself or `from` is reachable from `to`.
    pub fn would_create_cycle(&self, from: &PraiseId, to: &PraiseId) -> bool {
        if from == to {
            return true;
        }

        let mut visited: HashSet<&PraiseId> = HashSet::new();
        let mut stack = vec![to];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(originals) = self.edges.get(current) {
                for next in originals {
                    if next == from {
                        return true;
                    }
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Items whose realized score derives from `original`, directly or
    /// through a chain, in an order where every original precedes its
    /// duplicates.
    pub fn dependents_of(&self, original: &PraiseId) -> Vec<PraiseId> {
        let mut ordered = Vec::new();
        let mut seen: HashSet<&PraiseId> = HashSet::new();
        let mut queue: VecDeque<&PraiseId> = VecDeque::from([original]);
        seen.insert(original);

        while let Some(current) = queue.pop_front() {
            if let Some(children) = self.dependents.get(current) {
                for child in children {
                    if seen.insert(child) {
                        ordered.push(child.clone());
                        queue.push_back(child);
                    }
                }
            }
        }
        ordered
    }
}

// zipdiff-compare/src/classify.rs
//! Entry classification
//!
//! An entry is *present* when it exists consistently on both sides of the
//! comparison. Two rules decide this:
//!
//! - **Copy clique.** When an entry has a duplicate in its own archive, its
//!   whole connected component is collected. If every node in the component
//!   references every other node, the component is a set of identical copies
//!   and the entry is present.
//! - **Simple rule.** Otherwise, ignoring duplicates in its own archive, an
//!   entry is present if every entry it references has its name and its
//!   content hash.
//!
//! An entry without references is never present.

use std::collections::{BTreeSet, VecDeque};

use zipdiff_core::EntryId;

use crate::graph::ReferenceGraph;

/// Per-entry classification results, indexed by [`EntryId`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    present: Vec<bool>,
}

impl Classification {
    pub fn is_present(&self, id: EntryId) -> bool {
        self.present.get(id.index()).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.present.iter().filter(|p| **p).count()
    }
}

/// Read-only classifier over a built graph
pub struct Classifier<'g> {
    graph: &'g ReferenceGraph,
}

impl<'g> Classifier<'g> {
    pub fn new(graph: &'g ReferenceGraph) -> Self {
        Self { graph }
    }

    /// Whether `id` is present consistently on both sides
    pub fn classify(&self, id: EntryId) -> bool {
        let Some(entry) = self.graph.get(id) else {
            return false;
        };

        if !entry.has_references() {
            return false;
        }

        if self.has_local_copy(id) && self.copy_clique(id).is_some() {
            return true;
        }

        self.simple_match(id)
    }

    /// Classify every entry in the graph
    pub fn classify_all(&self) -> Classification {
        let present: Vec<bool> = self.graph.iter().map(|(id, _)| self.classify(id)).collect();
        let result = Classification { present };

        tracing::debug!(
            entries = result.len(),
            present = result.present_count(),
            "Classification complete"
        );
        result
    }

    /// The copy clique containing `id`, if its component is one
    ///
    /// The component is the transitive closure of the reference relation
    /// starting from the entry's direct references. It is a clique when each
    /// node together with its references spans the whole component.
    pub fn copy_clique(&self, id: EntryId) -> Option<BTreeSet<EntryId>> {
        let component = self.component(id);
        if component.is_empty() {
            return None;
        }

        let closed = component.iter().all(|n| {
            let refs = self.graph[*n].references();
            refs.len() + 1 == component.len() && refs.iter().all(|r| component.contains(r))
        });

        closed.then_some(component)
    }

    /// Whether any direct reference is a duplicate in the same archive
    fn has_local_copy(&self, id: EntryId) -> bool {
        let entry = &self.graph[id];
        entry
            .references()
            .iter()
            .any(|r| self.graph[*r].is_local_copy_of(entry))
    }

    fn component(&self, id: EntryId) -> BTreeSet<EntryId> {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<EntryId> = self.graph[id].references().iter().copied().collect();

        while let Some(next) = queue.pop_front() {
            if !visited.insert(next) {
                continue;
            }
            queue.extend(
                self.graph[next]
                    .references()
                    .iter()
                    .filter(|r| !visited.contains(*r)),
            );
        }

        visited
    }

    fn simple_match(&self, id: EntryId) -> bool {
        let entry = &self.graph[id];

        entry
            .references()
            .iter()
            .map(|r| &self.graph[*r])
            .filter(|other| !other.is_local_copy_of(entry))
            .all(|other| other.name == entry.name && other.hash == entry.hash)
    }
}

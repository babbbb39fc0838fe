// zipdiff-compare/src/graph.rs
//! Reference graph construction
//!
//! Two entries are linked when they share a name or a content hash. Every
//! unordered pair is examined exactly once, so the build is quadratic in the
//! number of entries.
//!
//! Building consumes the [`EntryRegistry`] and hands back a read-only
//! [`ReferenceGraph`]: once classification can see the graph, it can no
//! longer change.

use std::ops::Index;

use zipdiff_core::EntryId;

use crate::registry::{Entry, EntryRegistry};

/// Counters collected while building the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub entries: usize,
    pub pairs_examined: usize,
    pub name_matches: usize,
    pub hash_matches: usize,
    pub edges: usize,
}

/// Name and content equality of two entries
pub fn related(a: &Entry, b: &Entry) -> (bool, bool) {
    (a.name == b.name, a.hash == b.hash)
}

/// Fully built, immutable reference graph
#[derive(Debug)]
pub struct ReferenceGraph {
    registry: EntryRegistry,
    stats: GraphStats,
}

impl ReferenceGraph {
    /// Link every pair of entries sharing a name or a content hash
    pub fn build(mut registry: EntryRegistry) -> Self {
        let n = registry.len();
        let mut stats = GraphStats {
            entries: n,
            ..GraphStats::default()
        };

        for i in 0..n {
            for j in (i + 1)..n {
                stats.pairs_examined += 1;

                let (same_name, same_hash) = related(&registry.entries()[i], &registry.entries()[j]);
                if same_name {
                    stats.name_matches += 1;
                }
                if same_hash {
                    stats.hash_matches += 1;
                }

                if (same_name || same_hash) && registry.link(EntryId::new(i), EntryId::new(j)) {
                    stats.edges += 1;
                }
            }
        }

        tracing::debug!(
            entries = stats.entries,
            pairs = stats.pairs_examined,
            edges = stats.edges,
            "Reference graph built"
        );

        Self { registry, stats }
    }

    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.registry.get(id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.registry.iter()
    }

    pub fn registry(&self) -> &EntryRegistry {
        &self.registry
    }
}

impl Index<EntryId> for ReferenceGraph {
    type Output = Entry;

    fn index(&self, id: EntryId) -> &Entry {
        &self.registry.entries()[id.index()]
    }
}

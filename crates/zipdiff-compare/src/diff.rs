// zipdiff-compare/src/diff.rs
//! Two-archive comparison driver

use std::path::{Path, PathBuf};

use zipdiff_core::{ArchiveId, Error, ReferenceSide, Result};

use crate::classify::{Classification, Classifier};
use crate::graph::ReferenceGraph;
use crate::registry::{ArchiveReader, EntryRegistry};

/// Outcome of loading one archive
#[derive(Debug)]
pub enum LoadStatus {
    Loaded { entries: usize },
    Failed(Error),
}

/// One of the two compared archives
#[derive(Debug)]
pub struct ArchiveInput {
    pub path: PathBuf,
    pub id: ArchiveId,
    pub status: LoadStatus,
}

impl ArchiveInput {
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded { .. })
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.status {
            LoadStatus::Failed(e) => Some(e),
            LoadStatus::Loaded { .. } => None,
        }
    }
}

/// Result of comparing archive A with archive B
#[derive(Debug)]
pub struct ArchiveDiff {
    inputs: [ArchiveInput; 2],
    graph: ReferenceGraph,
    classification: Classification,
}

impl ArchiveDiff {
    /// Load both archives, build the reference graph and classify every entry
    ///
    /// A failing archive contributes no entries; the comparison still runs
    /// on whatever was loaded.
    pub fn compare(a: &Path, b: &Path, reader: &dyn ArchiveReader) -> Self {
        let mut registry = EntryRegistry::new();
        let inputs = [load(&mut registry, reader, a), load(&mut registry, reader, b)];

        let graph = ReferenceGraph::build(registry);
        let classification = Classifier::new(&graph).classify_all();

        Self {
            inputs,
            graph,
            classification,
        }
    }

    pub fn inputs(&self) -> &[ArchiveInput] {
        &self.inputs
    }

    pub fn input(&self, side: ReferenceSide) -> &ArchiveInput {
        &self.inputs[side.index()]
    }

    pub fn graph(&self) -> &ReferenceGraph {
        &self.graph
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Archives that failed to load, in input order
    pub fn failures(&self) -> impl Iterator<Item = &ArchiveInput> {
        self.inputs.iter().filter(|i| !i.is_loaded())
    }

    pub fn all_failed(&self) -> bool {
        self.inputs.iter().all(|i| !i.is_loaded())
    }

    /// Fail with [`Error::NothingLoaded`] when neither archive could be read
    pub fn ensure_loaded(&self) -> Result<()> {
        if self.all_failed() {
            return Err(Error::NothingLoaded {
                failed: self.inputs.len(),
            });
        }
        Ok(())
    }
}

fn load(registry: &mut EntryRegistry, reader: &dyn ArchiveReader, path: &Path) -> ArchiveInput {
    let status = match registry.load(reader, path) {
        Ok(entries) => LoadStatus::Loaded { entries },
        Err(e) => {
            tracing::error!(archive = %path.display(), error = %e, "Failed to load archive");
            LoadStatus::Failed(e)
        }
    };

    ArchiveInput {
        path: path.to_path_buf(),
        id: ArchiveId::from_path(path),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ZipReader;
    use zipdiff_parsers::zip::ZipFixture;

    #[test]
    fn test_compare_two_archives() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.zip");
        let b = dir.path().join("b.zip");
        ZipFixture::new().stored("x", b"same").stored("gone", b"old").write_to(&a).unwrap();
        ZipFixture::new().deflated("x", b"same").write_to(&b).unwrap();

        let diff = ArchiveDiff::compare(&a, &b, &ZipReader::default());

        assert!(diff.failures().next().is_none());
        assert_eq!(diff.graph().len(), 3);
        assert_eq!(diff.classification().present_count(), 2);
        assert!(matches!(diff.input(ReferenceSide::A).status, LoadStatus::Loaded { entries: 2 }));
        assert!(diff.ensure_loaded().is_ok());
    }

    #[test]
    fn test_one_side_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.zip");
        let b = dir.path().join("b.zip");
        ZipFixture::new().stored("x", b"data").write_to(&a).unwrap();
        std::fs::write(&b, b"not a zip file").unwrap();

        let diff = ArchiveDiff::compare(&a, &b, &ZipReader::default());

        let failed: Vec<_> = diff.failures().map(|i| i.id.as_str()).collect();
        assert_eq!(failed, ["b.zip"]);
        assert!(diff.input(ReferenceSide::B).error().unwrap().is_load_failure());
        assert_eq!(diff.graph().len(), 1);
        assert!(!diff.all_failed());
    }

    #[test]
    fn test_both_sides_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let diff = ArchiveDiff::compare(
            &dir.path().join("missing-a.zip"),
            &dir.path().join("missing-b.zip"),
            &ZipReader::default(),
        );

        assert!(diff.all_failed());
        assert!(diff.graph().is_empty());
        assert!(matches!(diff.ensure_loaded(), Err(Error::NothingLoaded { failed: 2 })));
    }
}

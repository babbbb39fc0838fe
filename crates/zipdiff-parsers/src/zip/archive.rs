// zipdiff-parsers/src/zip/archive.rs
//! ZIP archive table of contents

use std::collections::HashMap;
use super::entry::ZipEntry;

/// Parsed ZIP central directory
#[derive(Debug, Default)]
pub struct ZipArchive {
    /// All entries in central directory order
    pub entries: Vec<ZipEntry>,
    /// Path to entry index mapping; a repeated name maps to its last entry
    pub path_index: HashMap<String, usize>,
}

impl ZipArchive {
    /// Build an archive from entries, indexing them by path
    pub fn from_entries(entries: Vec<ZipEntry>) -> Self {
        let mut path_index = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            path_index.insert(entry.path.clone(), idx);
        }

        Self { entries, path_index }
    }

    /// Get total number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Get number of files (non-directories)
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_directory).count()
    }

    /// Get number of directories
    pub fn directory_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_directory).count()
    }

    /// Get an entry by path
    pub fn get(&self, path: &str) -> Option<&ZipEntry> {
        self.path_index.get(path).map(|idx| &self.entries[*idx])
    }

    /// Check if path exists in archive
    pub fn contains(&self, path: &str) -> bool {
        self.path_index.contains_key(path)
    }

    /// Entries in archive order, optionally skipping directories
    pub fn members(&self, include_directories: bool) -> impl Iterator<Item = &ZipEntry> {
        self.entries
            .iter()
            .filter(move |e| include_directories || !e.is_directory)
    }
}

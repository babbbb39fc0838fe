//! Common types used across zipdiff
//!
//! This module provides shared type definitions used by multiple crates.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Index of an entry inside the entry arena
///
/// Ids are assigned in load order and never change for the lifetime of a
/// comparison run, which makes them safe to store in reference sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub usize);

impl EntryId {
    /// Create a new entry ID
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for EntryId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// Display identifier of a source archive (its base file name)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveId(String);

impl ArchiveId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the identifier from an archive path, keeping only the base name
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArchiveId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Fixed-size digest of a member's uncompressed bytes
///
/// Two members with equal digests are treated as having equal content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; ContentHash::LEN]);

impl ContentHash {
    /// Digest length in bytes
    pub const LEN: usize = 16;

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase hex representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::invalid_data(format!("invalid content hash '{}': {}", s, e)))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which of the two compared archives acts as the reporting baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceSide {
    #[default]
    A,
    B,
}

impl ReferenceSide {
    /// Resolve the `-a` / `-b` flag pair. `A` wins unless only `-b` is set.
    pub fn from_flags(a: bool, b: bool) -> Self {
        if b && !a {
            ReferenceSide::B
        } else {
            ReferenceSide::A
        }
    }

    /// Position of this side in the supplied archive list
    pub fn index(&self) -> usize {
        match self {
            ReferenceSide::A => 0,
            ReferenceSide::B => 1,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            ReferenceSide::A => ReferenceSide::B,
            ReferenceSide::B => ReferenceSide::A,
        }
    }
}

/// Report sections that can be requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportCategory {
    Deleted,
    Added,
    Changed,
    Renamed,
    Same,
}

impl ReportCategory {
    /// Every category, in output order
    pub const ALL: [ReportCategory; 5] = [
        ReportCategory::Deleted,
        ReportCategory::Added,
        ReportCategory::Changed,
        ReportCategory::Renamed,
        ReportCategory::Same,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Deleted => "deleted",
            ReportCategory::Added => "added",
            ReportCategory::Changed => "changed",
            ReportCategory::Renamed => "renamed",
            ReportCategory::Same => "same",
        }
    }

    /// Whether this category produces any output yet
    pub fn is_implemented(&self) -> bool {
        matches!(self, ReportCategory::Deleted | ReportCategory::Same)
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! zipdiff-compare
//!
//! Relationship inference between the members of two archives.
//!
//! The pipeline runs in four steps, each owning its own module:
//!
//! 1. [`registry`]: load every member of both archives as an [`Entry`],
//!    hashing its content on the way in.
//! 2. [`graph`]: link every pair of entries sharing a name or a content hash.
//! 3. [`classify`]: decide for each entry whether it is present
//!    consistently on both sides.
//! 4. [`report`]: filter the classified entries by category and render them.
//!
//! [`ArchiveDiff`] drives the whole pipeline for two paths.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use zipdiff_compare::{ArchiveDiff, ReportConfig, Reporter, ZipReader};
//! use zipdiff_core::{ReferenceSide, ReportCategory};
//!
//! let reader = ZipReader::default();
//! let diff = ArchiveDiff::compare(Path::new("old.zip"), Path::new("new.zip"), &reader);
//!
//! let config = ReportConfig::new(ReferenceSide::A).with_category(ReportCategory::Same);
//! Reporter::new(&diff, &config).write(&mut std::io::stdout())?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod registry;
pub mod graph;
pub mod classify;
pub mod report;
pub mod diff;

pub use registry::{ArchiveReader, Entry, EntryRegistry, LoadOptions, Member, ZipReader};
pub use graph::{GraphStats, ReferenceGraph};
pub use classify::{Classification, Classifier};
pub use report::{EntryReport, OutputFormat, ReportConfig, Reporter};
pub use diff::{ArchiveDiff, ArchiveInput, LoadStatus};

// zipdiff-parsers/src/traits.rs
//! Core traits defining the archive reader interface.
//!
//! This module establishes the reading interface used by the comparison
//! engine:
//! - Consistent error handling for every archive failure
//! - Buffered and memory-mapped file support
//! - Progress reporting for large central directories

use std::io::{Read, Seek};
use std::path::Path;

use thiserror::Error;

use crate::source::ArchiveSource;

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid magic bytes: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: Vec<u8>, found: Vec<u8> },

    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData { offset: u64, message: String },

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("CRC32 mismatch for {path}: expected {expected:08X}, got {actual:08X}")]
    ChecksumMismatch { path: String, expected: u32, actual: u32 },

    #[error("Entry too large: {path} declares {size} bytes (limit {limit})")]
    EntryTooLarge { path: String, size: u64, limit: usize },

    #[error("Nested error in {context}: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Wrap this error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ParseError::Nested {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Progress callback for long-running parse operations
pub type ProgressCallback = Box<dyn Fn(ParseProgress) + Send + Sync>;

/// Progress information during parsing
#[derive(Debug, Clone)]
pub struct ParseProgress {
    /// Current phase of parsing
    pub phase: ParsePhase,
    /// Bytes processed so far
    pub bytes_processed: u64,
    /// Total bytes to process (if known)
    pub total_bytes: Option<u64>,
    /// Current item being processed (e.g., member name)
    pub current_item: Option<String>,
    /// Number of items processed
    pub items_processed: u64,
    /// Total items to process (if known)
    pub total_items: Option<u64>,
}

impl ParseProgress {
    /// Calculate percentage complete (0.0 - 1.0)
    pub fn percentage(&self) -> Option<f32> {
        self.total_bytes.map(|total| {
            if total == 0 {
                1.0
            } else {
                self.bytes_processed as f32 / total as f32
            }
        })
    }
}

/// Phases of the parsing process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    /// Locating the end of central directory record
    ReadingHeader,
    /// Reading central directory entries
    Indexing,
    /// Parsing complete
    Complete,
}

/// Configuration options for parsing
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Verify each member's CRC32 after extraction
    pub verify_crc: bool,
    /// Whether directory members (names ending in `/`) are listed
    pub include_directories: bool,
    /// Memory limit for a single decompressed member (in bytes)
    pub decompression_memory_limit: usize,
    /// Whether to use memory mapping for large files
    pub use_memory_mapping: bool,
    /// Minimum file size to enable memory mapping
    pub memory_mapping_threshold: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            verify_crc: true,
            include_directories: true,
            decompression_memory_limit: 1024 * 1024 * 1024, // 1 GB
            use_memory_mapping: true,
            memory_mapping_threshold: 10 * 1024 * 1024, // 10 MB
        }
    }
}

/// Core trait for archive parsers
///
/// Implementors read the table of contents of one archive format.
pub trait Parser: Send + Sync {
    /// The parsed output type
    type Output: Send + Sync;

    /// Returns a human-readable name for this parser
    fn name(&self) -> &str;

    /// Parse from a reader with default options
    fn parse<R: Read + Seek>(&self, reader: R) -> ParseResult<Self::Output> {
        self.parse_with_options(reader, &ParseOptions::default(), None)
    }

    /// Parse from a reader with custom options and optional progress callback
    fn parse_with_options<R: Read + Seek>(
        &self,
        reader: R,
        options: &ParseOptions,
        progress: Option<ProgressCallback>,
    ) -> ParseResult<Self::Output>;

    /// Parse from a file path
    fn parse_file(&self, path: &Path) -> ParseResult<Self::Output> {
        self.parse_file_with_options(path, &ParseOptions::default(), None)
    }

    /// Parse from a file path with options
    fn parse_file_with_options(
        &self,
        path: &Path,
        options: &ParseOptions,
        progress: Option<ProgressCallback>,
    ) -> ParseResult<Self::Output> {
        let source = ArchiveSource::open(path, options)?;
        self.parse_with_options(source, options, progress)
    }
}

//! zipdiff-parsers
//!
//! Archive reading and content hashing for zipdiff.
//!
//! # Supported Formats
//!
//! | Format | Extension              | Description                                   |
//! |--------|------------------------|-----------------------------------------------|
//! | ZIP    | `.zip`, `.jar`, `.apk` | Store, Deflate, BZIP2, LZMA and Zstd members  |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use zipdiff_parsers::{ZipParser, Parser};
//!
//! let parser = ZipParser::new();
//! let archive = parser.parse_file(Path::new("release.zip"))?;
//!
//! println!("Found {} entries", archive.entry_count());
//! # Ok::<(), zipdiff_parsers::ParseError>(())
//! ```

pub mod traits;
pub mod source;
pub mod hashing;
pub mod logging;
pub mod zip;

// Re-export main types
pub use traits::{
    Parser,
    ParseError, ParseResult, ParseOptions, ParseProgress, ParsePhase,
    ProgressCallback
};

pub use source::ArchiveSource;
pub use hashing::{ContentHasher, Md5Hasher};
pub use zip::{ZipParser, ZipArchive, ZipEntry, ZipCompression, CompressionMethod};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

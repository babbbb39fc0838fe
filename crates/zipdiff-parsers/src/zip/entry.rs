// zipdiff-parsers/src/zip/entry.rs
//! ZIP archive entry structures

use super::CompressionMethod;

/// Represents a single member in a ZIP central directory
#[derive(Debug, Clone)]
pub struct ZipEntry {
    /// Full member name within the archive
    pub path: String,
    /// Compression method used
    pub compression: CompressionMethod,
    /// CRC32 checksum of uncompressed data
    pub crc32: u32,
    /// Size of compressed data
    pub compressed_size: u64,
    /// Size of uncompressed data
    pub uncompressed_size: u64,
    /// Offset to local file header
    pub local_header_offset: u64,
    /// General purpose bit flags
    pub flags: u16,
    /// DOS modification time
    pub mod_time: u16,
    /// DOS modification date
    pub mod_date: u16,
    /// Whether entry is encrypted
    pub is_encrypted: bool,
    /// Whether entry is a directory
    pub is_directory: bool,
}

impl ZipEntry {
    /// Get the filename without path
    pub fn filename(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }

    /// Whether the member has no stored data at all
    pub fn is_empty(&self) -> bool {
        self.compressed_size == 0 && self.uncompressed_size == 0
    }
}

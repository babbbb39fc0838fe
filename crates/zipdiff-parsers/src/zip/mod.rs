// zipdiff-parsers/src/zip/mod.rs
//! ZIP Archive Reader
//!
//! Reads the central directory of a ZIP archive and extracts member bytes
//! on demand. Only what the comparison needs is supported: member names,
//! sizes, CRCs and the Store / Deflate / BZIP2 / LZMA / Zstandard
//! compression methods.
//!
//! # Format Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! |                         ZIP Archive                         |
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │     Local Header + File Data (per member)               ││
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐                    ││
//! │  │  │ File 1  │ │ File 2  │ │ File N  │ ...                ││
//! │  │  └─────────┘ └─────────┘ └─────────┘                    ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │           Central Directory (Entries)                   ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │   [ZIP64 End of Central Directory + Locator]            ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │            End of Central Directory                     ││
//! │  │  - Signature (0x06054B50)                               ││
//! │  │  - Central Directory offset                             ││
//! │  │  - Total entries count                                  ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod archive;
mod entry;
mod compression;
#[cfg(any(test, feature = "fixtures"))]
mod fixture;

pub use archive::ZipArchive;
pub use entry::ZipEntry;
pub use compression::ZipCompression;
#[cfg(any(test, feature = "fixtures"))]
pub use fixture::ZipFixture;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};

use crate::traits::{
    Parser, ParseResult, ParseError,
    ParseOptions, ParseProgress, ParsePhase, ProgressCallback
};

/// End of central directory signature
const EOCD_SIGNATURE: u32 = 0x06054B50;

/// Fixed part of the end of central directory record
const EOCD_LEN: usize = 22;

/// Central directory file header signature
const CD_SIGNATURE: u32 = 0x02014B50;

/// Fixed part of a central directory file header
const CD_HEADER_LEN: usize = 46;

/// Local file header signature
const LOCAL_HEADER_SIGNATURE: u32 = 0x04034B50;

/// ZIP64 end of central directory record signature
const ZIP64_EOCD_SIGNATURE: u32 = 0x06064B50;

/// ZIP64 end of central directory locator signature
const ZIP64_EOCD_LOCATOR_SIGNATURE: u32 = 0x07064B50;

/// Extra field id carrying ZIP64 sizes and offsets
const ZIP64_EXTRA_ID: u16 = 0x0001;

/// Compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Store,
    Deflate,
    Bzip2,
    Lzma,
    Zstd,
    Unknown(u16),
}

impl From<u16> for CompressionMethod {
    fn from(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Store,
            8 => CompressionMethod::Deflate,
            12 => CompressionMethod::Bzip2,
            14 => CompressionMethod::Lzma,
            93 => CompressionMethod::Zstd,
            other => CompressionMethod::Unknown(other),
        }
    }
}

impl From<CompressionMethod> for u16 {
    fn from(value: CompressionMethod) -> Self {
        match value {
            CompressionMethod::Store => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Bzip2 => 12,
            CompressionMethod::Lzma => 14,
            CompressionMethod::Zstd => 93,
            CompressionMethod::Unknown(other) => other,
        }
    }
}

/// ZIP Archive Parser
///
/// Parses the central directory of a ZIP archive and provides random
/// access to individual members.
#[derive(Debug, Default)]
pub struct ZipParser;

impl ZipParser {
    /// Create a new ZIP parser
    pub fn new() -> Self {
        Self
    }

    /// Read and decompress one member's bytes
    pub fn read_entry<R: Read + Seek>(
        &self,
        reader: &mut R,
        entry: &ZipEntry,
        options: &ParseOptions,
    ) -> ParseResult<Vec<u8>> {
        if entry.is_encrypted {
            return Err(ParseError::UnsupportedFeature(
                format!("encrypted member: {}", entry.path)
            ));
        }

        let limit = options.decompression_memory_limit;
        if entry.uncompressed_size > limit as u64 || entry.compressed_size > limit as u64 {
            return Err(ParseError::EntryTooLarge {
                path: entry.path.clone(),
                size: entry.uncompressed_size.max(entry.compressed_size),
                limit,
            });
        }

        if entry.is_empty() {
            return Ok(Vec::new());
        }

        let data = self.extract_data(reader, entry, limit)?;

        if options.verify_crc && !ZipCompression::verify_crc32(&data, entry.crc32) {
            return Err(ParseError::ChecksumMismatch {
                path: entry.path.clone(),
                expected: entry.crc32,
                actual: ZipCompression::crc32(&data),
            });
        }

        Ok(data)
    }

    /// Parse the end of central directory record
    fn parse_eocd<R: Read + Seek>(&self, reader: &mut R) -> ParseResult<EndOfCentralDirectory> {
        // Seek to end and search backwards for EOCD signature
        let file_size = reader.seek(SeekFrom::End(0))?;
        if file_size < EOCD_LEN as u64 {
            return Err(ParseError::CorruptedData {
                offset: 0,
                message: format!("file too small for a ZIP archive ({} bytes)", file_size),
            });
        }

        // EOCD is at least 22 bytes, search within last 65KB for comment
        let search_start = file_size.saturating_sub(65535 + EOCD_LEN as u64);
        reader.seek(SeekFrom::Start(search_start))?;

        let mut buffer = vec![0u8; (file_size - search_start) as usize];
        reader.read_exact(&mut buffer)?;

        // Search for EOCD signature from end, leaving room for the fixed record
        let sig_bytes = EOCD_SIGNATURE.to_le_bytes();
        let searchable = buffer.len() - EOCD_LEN + 4;
        let eocd_offset = buffer[..searchable].windows(4)
            .rposition(|w| w == sig_bytes)
            .ok_or_else(|| ParseError::InvalidMagic {
                expected: sig_bytes.to_vec(),
                found: vec![],
            })?;

        let eocd_abs_offset = search_start + eocd_offset as u64;
        let eocd_data = &buffer[eocd_offset..eocd_offset + EOCD_LEN];

        let total_entries = LittleEndian::read_u16(&eocd_data[10..12]);
        let cd_size       = LittleEndian::read_u32(&eocd_data[12..16]);
        let cd_offset     = LittleEndian::read_u32(&eocd_data[16..20]);

        // Check for ZIP64
        let (cd_offset, cd_size, total_entries) =
            if cd_offset == 0xFFFFFFFF || cd_size == 0xFFFFFFFF || total_entries == 0xFFFF {
                self.parse_zip64_eocd(reader, eocd_abs_offset)?
            } else {
                (cd_offset as u64, cd_size as u64, total_entries as u64)
            };

        if cd_offset.saturating_add(cd_size) > eocd_abs_offset {
            return Err(ParseError::CorruptedData {
                offset: eocd_abs_offset,
                message: format!(
                    "central directory ({} bytes at {}) overlaps end record",
                    cd_size, cd_offset
                ),
            });
        }

        Ok(EndOfCentralDirectory {
            total_entries,
            cd_size,
            cd_offset,
        })
    }

    /// Parse ZIP64 end of central directory
    fn parse_zip64_eocd<R: Read + Seek>(
        &self,
        reader: &mut R,
        eocd_offset: u64
    ) -> ParseResult<(u64, u64, u64)> {
        // Look for ZIP64 EOCD locator before EOCD
        let locator_offset = eocd_offset.checked_sub(20).ok_or_else(|| ParseError::CorruptedData {
            offset: eocd_offset,
            message: "no room for ZIP64 locator".to_string(),
        })?;
        reader.seek(SeekFrom::Start(locator_offset))?;

        let mut locator = [0u8; 20];
        reader.read_exact(&mut locator)?;

        let sig = LittleEndian::read_u32(&locator[0..4]);
        if sig != ZIP64_EOCD_LOCATOR_SIGNATURE {
            return Err(ParseError::InvalidMagic {
                expected: ZIP64_EOCD_LOCATOR_SIGNATURE.to_le_bytes().to_vec(),
                found: sig.to_le_bytes().to_vec(),
            });
        }

        let zip64_eocd_offset = LittleEndian::read_u64(&locator[8..16]);

        // Parse ZIP64 EOCD
        reader.seek(SeekFrom::Start(zip64_eocd_offset))?;

        let mut zip64_eocd = [0u8; 56];
        reader.read_exact(&mut zip64_eocd)?;

        let sig = LittleEndian::read_u32(&zip64_eocd[0..4]);
        if sig != ZIP64_EOCD_SIGNATURE {
            return Err(ParseError::InvalidMagic {
                expected: ZIP64_EOCD_SIGNATURE.to_le_bytes().to_vec(),
                found: sig.to_le_bytes().to_vec(),
            });
        }

        let total_entries = LittleEndian::read_u64(&zip64_eocd[32..40]);
        let cd_size       = LittleEndian::read_u64(&zip64_eocd[40..48]);
        let cd_offset     = LittleEndian::read_u64(&zip64_eocd[48..56]);

        Ok((cd_offset, cd_size, total_entries))
    }

    /// Parse central directory entries
    fn parse_central_directory<R: Read + Seek>(
        &self,
        reader: &mut R,
        eocd: &EndOfCentralDirectory,
        progress: Option<&ProgressCallback>,
    ) -> ParseResult<Vec<ZipEntry>> {
        reader.seek(SeekFrom::Start(eocd.cd_offset))?;

        // A corrupt count must not drive a huge allocation
        let plausible = (eocd.cd_size / CD_HEADER_LEN as u64).min(eocd.total_entries);
        let mut entries = Vec::with_capacity(plausible as usize);

        for i in 0..eocd.total_entries {
            let entry = self.parse_cd_entry(reader)
                .map_err(|e| e.with_context(format!("central directory entry {}", i)))?;
            entries.push(entry);

            if let Some(cb) = progress {
                if i % 1000 == 0 {
                    cb(ParseProgress {
                        phase: ParsePhase::Indexing,
                        bytes_processed: reader.stream_position()?,
                        total_bytes: Some(eocd.cd_offset + eocd.cd_size),
                        current_item: entries.last().map(|e| e.path.clone()),
                        items_processed: i,
                        total_items: Some(eocd.total_entries),
                    });
                }
            }
        }

        Ok(entries)
    }

    /// Parse a single central directory entry
    fn parse_cd_entry<R: Read + Seek>(&self, reader: &mut R) -> ParseResult<ZipEntry> {
        let offset = reader.stream_position()?;
        let mut header = [0u8; CD_HEADER_LEN];
        reader.read_exact(&mut header)?;

        let sig = LittleEndian::read_u32(&header[0..4]);
        if sig != CD_SIGNATURE {
            return Err(ParseError::CorruptedData {
                offset,
                message: format!("bad central directory signature {:08X}", sig),
            });
        }

        let flags               = LittleEndian::read_u16(&header[8..10]);
        let compression         = CompressionMethod::from(LittleEndian::read_u16(&header[10..12]));
        let mod_time            = LittleEndian::read_u16(&header[12..14]);
        let mod_date            = LittleEndian::read_u16(&header[14..16]);
        let crc32               = LittleEndian::read_u32(&header[16..20]);
        let compressed_size     = LittleEndian::read_u32(&header[20..24]);
        let uncompressed_size   = LittleEndian::read_u32(&header[24..28]);
        let name_length         = LittleEndian::read_u16(&header[28..30]) as usize;
        let extra_length        = LittleEndian::read_u16(&header[30..32]) as usize;
        let comment_length      = LittleEndian::read_u16(&header[32..34]) as usize;
        let local_header_offset = LittleEndian::read_u32(&header[42..46]);

        // Read filename
        let mut name_bytes = vec![0u8; name_length];
        reader.read_exact(&mut name_bytes)?;
        let path = String::from_utf8_lossy(&name_bytes).into_owned();

        // Read extra field
        let mut extra = vec![0u8; extra_length];
        reader.read_exact(&mut extra)?;

        // Parse ZIP64 extra field if present
        let (compressed_size, uncompressed_size, local_header_offset) =
            parse_zip64_extra(&extra, compressed_size, uncompressed_size, local_header_offset);

        // Skip comment
        reader.seek(SeekFrom::Current(comment_length as i64))?;

        let is_directory = path.ends_with('/');
        Ok(ZipEntry {
            path,
            compression,
            crc32,
            compressed_size,
            uncompressed_size,
            local_header_offset,
            flags,
            mod_time,
            mod_date,
            is_encrypted: flags & 0x01 != 0,
            is_directory,
        })
    }

    /// Extract file data from local header
    fn extract_data<R: Read + Seek>(
        &self,
        reader: &mut R,
        entry: &ZipEntry,
        limit: usize,
    ) -> ParseResult<Vec<u8>> {
        reader.seek(SeekFrom::Start(entry.local_header_offset))?;

        // Read local header
        let mut local_header = [0u8; 30];
        reader.read_exact(&mut local_header)?;

        let sig = LittleEndian::read_u32(&local_header[0..4]);
        if sig != LOCAL_HEADER_SIGNATURE {
            return Err(ParseError::CorruptedData {
                offset: entry.local_header_offset,
                message: format!("bad local header signature {:08X} for {}", sig, entry.path),
            });
        }

        let name_len = LittleEndian::read_u16(&local_header[26..28]) as i64;
        let extra_len = LittleEndian::read_u16(&local_header[28..30]) as i64;

        // Skip to data
        reader.seek(SeekFrom::Current(name_len + extra_len))?;

        // Read compressed data
        let mut compressed = vec![0u8; entry.compressed_size as usize];
        reader.read_exact(&mut compressed)?;

        // Decompress
        ZipCompression::decompress(
            &compressed,
            entry.compression,
            entry.uncompressed_size as usize,
            limit,
        )
        .map_err(|e| e.with_context(entry.path.clone()))
    }
}

/// Parse ZIP64 extra field
///
/// Only values saturated in the fixed header are present in the extra
/// field, in the order uncompressed, compressed, offset.
fn parse_zip64_extra(
    extra: &[u8],
    compressed_size: u32,
    uncompressed_size: u32,
    local_offset: u32,
) -> (u64, u64, u64) {
    let mut compressed      = compressed_size as u64;
    let mut uncompressed    = uncompressed_size as u64;
    let mut offset          = local_offset as u64;

    let mut pos = 0;
    while pos + 4 <= extra.len() {
        let id = LittleEndian::read_u16(&extra[pos..pos + 2]);
        let size = LittleEndian::read_u16(&extra[pos + 2..pos + 4]) as usize;
        pos += 4;

        if id == ZIP64_EXTRA_ID && pos + size <= extra.len() {
            let field = &extra[pos..pos + size];
            let mut field_pos = 0;

            if uncompressed_size == 0xFFFFFFFF && field_pos + 8 <= size {
                uncompressed = LittleEndian::read_u64(&field[field_pos..field_pos + 8]);
                field_pos += 8;
            }

            if compressed_size == 0xFFFFFFFF && field_pos + 8 <= size {
                compressed = LittleEndian::read_u64(&field[field_pos..field_pos + 8]);
                field_pos += 8;
            }

            if local_offset == 0xFFFFFFFF && field_pos + 8 <= size {
                offset = LittleEndian::read_u64(&field[field_pos..field_pos + 8]);
            }

            break;
        }

        pos += size;
    }

    (compressed, uncompressed, offset)
}

impl Parser for ZipParser {
    type Output = ZipArchive;

    fn name(&self) -> &str {
        "ZIP Archive Parser"
    }

    fn parse_with_options<R: Read + Seek>(
        &self,
        mut reader: R,
        options: &ParseOptions,
        progress: Option<ProgressCallback>,
    ) -> ParseResult<Self::Output> {
        if let Some(ref cb) = progress {
            cb(ParseProgress {
                phase: ParsePhase::ReadingHeader,
                bytes_processed: 0,
                total_bytes: None,
                current_item: None,
                items_processed: 0,
                total_items: None,
            });
        }

        // Parse EOCD
        let eocd = self.parse_eocd(&mut reader)?;

        // Parse central directory
        let mut entries = self.parse_central_directory(&mut reader, &eocd, progress.as_ref())?;
        if !options.include_directories {
            entries.retain(|e| !e.is_directory);
        }

        // Report completion
        if let Some(ref cb) = progress {
            cb(ParseProgress {
                phase: ParsePhase::Complete,
                bytes_processed: reader.stream_position()?,
                total_bytes: None,
                current_item: None,
                items_processed: entries.len() as u64,
                total_items: Some(entries.len() as u64),
            });
        }

        tracing::debug!(entries = entries.len(), cd_offset = eocd.cd_offset, "Parsed central directory");

        Ok(ZipArchive::from_entries(entries))
    }
}

/// End of Central Directory record
#[derive(Debug)]
struct EndOfCentralDirectory {
    total_entries: u64,
    cd_size: u64,
    cd_offset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_method_conversion() {
        assert_eq!(CompressionMethod::from(0), CompressionMethod::Store);
        assert_eq!(CompressionMethod::from(8), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from(12), CompressionMethod::Bzip2);
        assert_eq!(CompressionMethod::from(14), CompressionMethod::Lzma);
        assert_eq!(CompressionMethod::from(93), CompressionMethod::Zstd);
        assert_eq!(CompressionMethod::from(98), CompressionMethod::Unknown(98));
        assert_eq!(u16::from(CompressionMethod::Deflate), 8);
        assert_eq!(u16::from(CompressionMethod::Lzma), 14);
    }

    #[test]
    fn test_zip64_extra_only_overrides_saturated_fields() {
        let mut extra = Vec::new();
        extra.extend_from_slice(&ZIP64_EXTRA_ID.to_le_bytes());
        extra.extend_from_slice(&16u16.to_le_bytes());
        extra.extend_from_slice(&5_000_000_000u64.to_le_bytes());
        extra.extend_from_slice(&4_000_000_000u64.to_le_bytes());

        let (compressed, uncompressed, offset) =
            parse_zip64_extra(&extra, 0xFFFFFFFF, 0xFFFFFFFF, 1234);

        assert_eq!(uncompressed, 5_000_000_000);
        assert_eq!(compressed, 4_000_000_000);
        assert_eq!(offset, 1234);
    }

    #[test]
    fn test_zip64_extra_ignores_other_fields() {
        // Extended timestamp field (0x5455) only
        let extra = [0x55, 0x54, 0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(parse_zip64_extra(&extra, 10, 20, 30), (10, 20, 30));
    }

    #[test]
    fn test_rejects_non_zip() {
        let data = vec![0u8; 128];
        let result = ZipParser::new().parse(std::io::Cursor::new(data));
        assert!(matches!(result, Err(ParseError::InvalidMagic { .. })));
    }

    #[test]
    fn test_rejects_tiny_file() {
        let result = ZipParser::new().parse(std::io::Cursor::new(b"PK".to_vec()));
        assert!(matches!(result, Err(ParseError::CorruptedData { .. })));
    }

    #[test]
    fn test_fixture_roundtrip_through_parser() {
        let bytes = ZipFixture::new()
            .stored("hello.txt", b"hello")
            .deflated("dir/data.bin", &[7u8; 300])
            .directory("dir/")
            .finish()
            .unwrap();

        let parser = ZipParser::new();
        let mut cursor = std::io::Cursor::new(bytes);
        let archive = parser.parse(&mut cursor).unwrap();

        assert_eq!(archive.entry_count(), 3);
        assert_eq!(archive.directory_count(), 1);

        let options = ParseOptions::default();
        let hello = archive.get("hello.txt").unwrap();
        assert_eq!(parser.read_entry(&mut cursor, hello, &options).unwrap(), b"hello");

        let data = archive.get("dir/data.bin").unwrap();
        assert_eq!(data.compression, CompressionMethod::Deflate);
        assert_eq!(parser.read_entry(&mut cursor, data, &options).unwrap(), vec![7u8; 300]);

        let dir = archive.get("dir/").unwrap();
        assert!(parser.read_entry(&mut cursor, dir, &options).unwrap().is_empty());
    }

    #[test]
    fn test_empty_archive() {
        let bytes = ZipFixture::new().finish().unwrap();
        let archive = ZipParser::new().parse(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.entry_count(), 0);
    }

    #[test]
    fn test_crc_mismatch_detected() {
        let mut bytes = ZipFixture::new().stored("a.txt", b"abc").finish().unwrap();
        // Stored data begins right after the 30 byte local header and name
        bytes[30 + "a.txt".len()] = b'x';

        let parser = ZipParser::new();
        let mut cursor = std::io::Cursor::new(bytes);
        let archive = parser.parse(&mut cursor).unwrap();
        let entry = archive.get("a.txt").unwrap();

        let strict = ParseOptions::default();
        assert!(matches!(
            parser.read_entry(&mut cursor, entry, &strict),
            Err(ParseError::ChecksumMismatch { .. })
        ));

        let lenient = ParseOptions { verify_crc: false, ..ParseOptions::default() };
        assert_eq!(parser.read_entry(&mut cursor, entry, &lenient).unwrap(), b"xbc");
    }

    #[test]
    fn test_oversized_entry_rejected() {
        let bytes = ZipFixture::new().stored("big.bin", &[0u8; 64]).finish().unwrap();
        let parser = ZipParser::new();
        let mut cursor = std::io::Cursor::new(bytes);
        let archive = parser.parse(&mut cursor).unwrap();

        let options = ParseOptions { decompression_memory_limit: 16, ..ParseOptions::default() };
        let entry = archive.get("big.bin").unwrap();
        assert!(matches!(
            parser.read_entry(&mut cursor, entry, &options),
            Err(ParseError::EntryTooLarge { size: 64, limit: 16, .. })
        ));
    }
}

//! Seekable byte sources for archive files
//!
//! Small archives are read through a buffered file handle, large ones are
//! memory mapped when [`ParseOptions::use_memory_mapping`] allows it.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use memmap2::Mmap;

use crate::traits::{ParseOptions, ParseResult};

/// An opened archive file
pub enum ArchiveSource {
    Buffered(BufReader<File>),
    Mapped(Cursor<Mmap>),
}

impl ArchiveSource {
    /// Open `path` for reading, mapping it into memory when it is larger
    /// than the configured threshold
    pub fn open(path: &Path, options: &ParseOptions) -> ParseResult<Self> {
        let file = File::open(path)?;

        if options.use_memory_mapping {
            let metadata = file.metadata()?;
            if metadata.len() >= options.memory_mapping_threshold {
                // SAFETY: the mapping is read-only and lives as long as the
                // source. Concurrent truncation by another process surfaces
                // as a read fault, the same risk every mmap reader takes.
                #[allow(unsafe_code)]
                let mmap = unsafe { Mmap::map(&file)? };
                tracing::debug!(path = %path.display(), size = metadata.len(), "Memory mapped archive");
                return Ok(ArchiveSource::Mapped(Cursor::new(mmap)));
            }
        }

        Ok(ArchiveSource::Buffered(BufReader::new(file)))
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, ArchiveSource::Mapped(_))
    }
}

impl Read for ArchiveSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ArchiveSource::Buffered(r) => r.read(buf),
            ArchiveSource::Mapped(r) => r.read(buf),
        }
    }
}

impl Seek for ArchiveSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            ArchiveSource::Buffered(r) => r.seek(pos),
            ArchiveSource::Mapped(r) => r.seek(pos),
        }
    }
}

// zipdiff-compare/src/registry.rs
//! Entry registry
//!
//! Every member of every loaded archive becomes one [`Entry`] in a flat
//! arena. Entries are addressed by [`EntryId`] and never move, so the
//! reference relation can be stored as plain index sets.

use std::collections::BTreeSet;
use std::path::Path;

use zipdiff_core::{ArchiveId, ContentHash, EntryId, Error, Result};
use zipdiff_parsers::logging::instrument;
use zipdiff_parsers::{
    ArchiveSource, ContentHasher, Md5Hasher, ParseOptions, ParseProgress, Parser, ZipParser,
};

/// One archived file instance
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub hash: ContentHash,
    pub archive: ArchiveId,
    references: BTreeSet<EntryId>,
}

impl Entry {
    pub fn new(name: impl Into<String>, hash: ContentHash, archive: ArchiveId) -> Self {
        Self {
            name: name.into(),
            hash,
            archive,
            references: BTreeSet::new(),
        }
    }

    /// Entries linked to this one, in id order
    pub fn references(&self) -> &BTreeSet<EntryId> {
        &self.references
    }

    pub fn has_references(&self) -> bool {
        !self.references.is_empty()
    }

    /// Same archive and same content: a duplicate inside one archive
    pub fn is_local_copy_of(&self, other: &Entry) -> bool {
        self.archive == other.archive && self.hash == other.hash
    }

    pub(crate) fn add_reference(&mut self, id: EntryId) -> bool {
        self.references.insert(id)
    }
}

/// A member read from an archive, already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub hash: ContentHash,
}

/// Source of archive members
///
/// A reader either returns every member of the archive or fails as a whole.
pub trait ArchiveReader {
    fn read_members(&self, path: &Path) -> Result<Vec<Member>>;
}

/// Options controlling how archives are loaded into the registry
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub parse: ParseOptions,
}

impl LoadOptions {
    /// Skip directory members
    pub fn files_only(mut self) -> Self {
        self.parse.include_directories = false;
        self
    }

    pub fn with_crc_verification(mut self, verify: bool) -> Self {
        self.parse.verify_crc = verify;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
        }
    }
}

/// [`ArchiveReader`] for ZIP files
pub struct ZipReader<H: ContentHasher = Md5Hasher> {
    parser: ZipParser,
    hasher: H,
    options: LoadOptions,
}

impl Default for ZipReader {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}

impl ZipReader {
    pub fn new(options: LoadOptions) -> Self {
        Self::with_hasher(options, Md5Hasher)
    }
}

impl<H: ContentHasher> ZipReader<H> {
    pub fn with_hasher(options: LoadOptions, hasher: H) -> Self {
        Self {
            parser: ZipParser::new(),
            hasher,
            options,
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    fn read_zip(&self, path: &Path) -> zipdiff_parsers::ParseResult<Vec<Member>> {
        let options = &self.options.parse;
        let mut source = ArchiveSource::open(path, options)?;

        let progress = |p: ParseProgress| {
            tracing::trace!(phase = ?p.phase, items = p.items_processed, total = ?p.total_items, "Reading archive");
        };
        let archive = self.parser.parse_with_options(&mut source, options, Some(Box::new(progress)))?;

        let mut members = Vec::with_capacity(archive.entry_count());
        for entry in &archive.entries {
            // Member errors already name the member
            let data = self.parser.read_entry(&mut source, entry, options)?;

            members.push(Member {
                name: entry.path.clone(),
                hash: self.hasher.digest(&data),
            });
        }

        tracing::debug!(
            path = %path.display(),
            members = members.len(),
            algorithm = self.hasher.algorithm(),
            parser = self.parser.name(),
            "Hashed archive members"
        );
        Ok(members)
    }
}

impl<H: ContentHasher> ArchiveReader for ZipReader<H> {
    fn read_members(&self, path: &Path) -> Result<Vec<Member>> {
        if !path.exists() {
            return Err(Error::load_failure(path, Error::FileNotFound(path.to_path_buf())));
        }

        self.read_zip(path).map_err(|e| Error::load_failure(path, e))
    }
}

/// Arena of all entries loaded for one comparison run
#[derive(Debug, Default)]
pub struct EntryRegistry {
    entries: Vec<Entry>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every member of `path`, appending one entry per member
    ///
    /// Returns the number of entries added. On failure nothing is appended
    /// and the error is always a [`Error::LoadFailure`].
    pub fn load(&mut self, reader: &dyn ArchiveReader, path: &Path) -> Result<usize> {
        let archive = ArchiveId::from_path(path);

        let members = instrument("load_archive", || reader.read_members(path)).map_err(|e| {
            if e.is_load_failure() {
                e
            } else {
                Error::load_failure(path, e)
            }
        })?;

        let count = members.len();
        self.entries.reserve(count);
        for member in members {
            self.push(Entry::new(member.name, member.hash, archive.clone()));
        }

        tracing::info!(archive = %archive, entries = count, "Loaded archive");
        Ok(count)
    }

    /// Append a single entry
    pub fn push(&mut self, entry: Entry) -> EntryId {
        let id = EntryId::new(self.entries.len());
        self.entries.push(entry);
        id
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.entries.iter().enumerate().map(|(i, e)| (EntryId::new(i), e))
    }

    /// Number of entries that came from `archive`
    pub fn count_in(&self, archive: &ArchiveId) -> usize {
        self.entries.iter().filter(|e| &e.archive == archive).count()
    }

    /// Link two entries in both directions
    ///
    /// Returns `true` if the edge is new. Linking an entry to itself is a
    /// no-op.
    pub fn link(&mut self, a: EntryId, b: EntryId) -> bool {
        if a == b || a.index() >= self.entries.len() || b.index() >= self.entries.len() {
            return false;
        }

        let forward = self.entries[a.index()].add_reference(b);
        let backward = self.entries[b.index()].add_reference(a);
        debug_assert_eq!(forward, backward);
        forward
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

//! Archive records and the two-phase extraction contract.
//!
//! ```no_run
//! use vnunpack::archive::ArchiveDecoder;
//! use vnunpack::file::InputFile;
//! use vnunpack::formats::leaf_lac::LacArchiveDecoder;
//!
//! let decoder = LacArchiveDecoder;
//! let mut input = InputFile::open("data.lac")?;
//! let meta = decoder.read_meta(&mut input)?;
//! for entry in &meta.entries {
//!     let file = decoder.read_file(&mut input, &meta, entry)?;
//!     println!("{} ({} bytes)", file.path, file.content.len());
//! }
//! # Ok::<(), vnunpack::Error>(())
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::decoder::BaseDecoder;
use crate::error::{Error, Result};
use crate::file::{File, InputFile};
use crate::file_saver::FileSaver;

// ── ArchiveEntry ──────────────────────────────────────────────────────────────

/// One member file as described by the archive directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub path:   String,
    /// Absolute offset of the stored payload.
    pub offset: u64,
    /// Stored payload size.
    pub size:   u64,
    /// Format-specific numeric attributes (keys, flags, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra:  BTreeMap<String, u64>,
}

impl ArchiveEntry {
    pub fn new(path: impl Into<String>, offset: u64, size: u64) -> Self {
        Self { path: path.into(), offset, size, extra: BTreeMap::new() }
    }

    pub fn with_extra(mut self, key: &str, value: u64) -> Self {
        self.extra.insert(key.to_owned(), value);
        self
    }

    pub fn extra(&self, key: &str) -> Option<u64> {
        self.extra.get(key).copied()
    }
}

// ── ArchiveMeta ───────────────────────────────────────────────────────────────

/// All entries of one archive in on-disk order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveMeta {
    pub entries: Vec<ArchiveEntry>,
}

impl ArchiveMeta {
    pub fn new(entries: Vec<ArchiveEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Fail with `MalformedData` if any entry reaches past `size`.
    pub fn check_bounds(&self, size: u64) -> Result<()> {
        for entry in &self.entries {
            let end = entry.offset.checked_add(entry.size);
            if end.map_or(true, |end| end > size) {
                return Err(Error::malformed(format!(
                    "entry {} ({} bytes at {}) exceeds archive size {size}",
                    entry.path, entry.size, entry.offset
                )));
            }
        }
        Ok(())
    }
}

// ── ArchiveDecoder ────────────────────────────────────────────────────────────

pub trait ArchiveDecoder: BaseDecoder {
    /// Parse headers/directory only; no payload is read.
    fn read_meta(&self, input: &mut InputFile) -> Result<ArchiveMeta>;

    /// Runs once between `read_meta` and the first `read_file`.  May adjust
    /// `meta` or hand auxiliary files to `saver`.  An error aborts the whole
    /// archive.
    fn preprocess(
        &self,
        _input: &mut InputFile,
        _meta:  &mut ArchiveMeta,
        _saver: &mut dyn FileSaver,
    ) -> Result<()> {
        Ok(())
    }

    /// Extract one entry.  Independent of every other entry.
    fn read_file(
        &self,
        input: &mut InputFile,
        meta:  &ArchiveMeta,
        entry: &ArchiveEntry,
    ) -> Result<File>;
}

//! Archive reading: entry enumeration, metadata filtering, root detection.
//!
//! First stage of an import. Opens the uploaded zip, drops platform metadata,
//! works out whether every entry lives under one wrapper directory, and splits
//! the remaining files into HTML documents and assets.
//!
//! ## Metadata entries
//!
//! Archives built on macOS carry resource forks and Finder files that are not
//! part of the site. These are removed before anything else looks at the
//! entry list, so they never influence root detection:
//!
//! ```text
//! __MACOSX/...          resource fork tree
//! any/dir/._photo.jpg   AppleDouble sidecar
//! any/dir/.DS_Store     Finder index
//! ```
//!
//! ## Root prefix
//!
//! Zipping a folder usually produces `my-site/index.html`, `my-site/css/...`.
//! The wrapper directory is detected from the first file entry and adopted only
//! when every retained entry shares it. All lookup keys are root-stripped.
//!
//! ## Reading entries
//!
//! [`SiteArchive`] only holds the raw bytes and the entry list. Decompression
//! goes through an [`EntryReader`], which owns its own view of the archive so
//! separate workers can read different entries at the same time.

use crate::resolve::normalize_path;
use std::io::{Cursor, Read};
use thiserror::Error;
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("entry is larger than {max} bytes")]
    TooLarge { max: u64 },
}

/// Upper bound on the buffer reserved up front from an entry's declared size.
/// Larger entries grow the buffer as they are read.
const PREALLOC_LIMIT: u64 = 1 << 20;

/// Whether an entry is a page or something pages reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Html,
    Asset,
}

/// A retained file entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the zip central directory.
    pub index: usize,
    /// Name as stored in the archive, root prefix included.
    pub name: String,
    /// Canonical root-stripped path, used as the lookup key. Never starts
    /// with `/` and never contains `.` or `..` segments.
    pub path: String,
    pub kind: EntryKind,
}

/// An opened archive: filtered entries plus the detected root prefix.
#[derive(Debug)]
pub struct SiteArchive<'a> {
    bytes: &'a [u8],
    entries: Vec<ArchiveEntry>,
    root_prefix: String,
}

impl<'a> SiteArchive<'a> {
    /// Parse the central directory and build the filtered entry list.
    ///
    /// Fails only when the bytes are not a readable zip archive.
    pub fn open(bytes: &'a [u8]) -> Result<Self, ArchiveError> {
        let zip = ZipArchive::new(Cursor::new(bytes))?;

        // (index, name, canonical name, is_dir) for everything that is not
        // platform metadata
        let mut retained: Vec<(usize, String, String, bool)> = Vec::new();
        for index in 0..zip.len() {
            let Some(name) = zip.name_for_index(index) else {
                continue;
            };
            if is_metadata_entry(name) {
                continue;
            }
            let is_dir = name.ends_with('/');
            // `/tmp/x.html` and `site/../../x.css` stay inside the root
            let mut canonical = normalize_path(name);
            if canonical.is_empty() {
                continue;
            }
            if is_dir {
                canonical.push('/');
            }
            retained.push((index, name.to_string(), canonical, is_dir));
        }

        let root_prefix = detect_root_prefix(
            retained
                .iter()
                .map(|(_, _, canonical, is_dir)| (canonical.as_str(), *is_dir)),
        );

        let entries = retained
            .into_iter()
            .filter(|(_, _, _, is_dir)| !is_dir)
            .filter_map(|(index, name, canonical, _)| {
                let path = strip_root(&canonical, &root_prefix).to_string();
                if path.is_empty() {
                    return None;
                }
                let kind = if is_html_path(&path) {
                    EntryKind::Html
                } else {
                    EntryKind::Asset
                };
                Some(ArchiveEntry {
                    index,
                    name,
                    path,
                    kind,
                })
            })
            .collect();

        Ok(Self {
            bytes,
            entries,
            root_prefix,
        })
    }

    /// All retained file entries, in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Shared wrapper directory (with trailing `/`), or empty.
    pub fn root_prefix(&self) -> &str {
        &self.root_prefix
    }

    pub fn html_entries(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Html)
    }

    pub fn asset_entries(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Asset)
    }

    /// Open an independent reader over the same bytes.
    pub fn reader(&self) -> Result<EntryReader<'a>, ArchiveError> {
        Ok(EntryReader {
            zip: ZipArchive::new(Cursor::new(self.bytes))?,
        })
    }
}

/// Decompresses entries of a [`SiteArchive`].
pub struct EntryReader<'a> {
    zip: ZipArchive<Cursor<&'a [u8]>>,
}

impl EntryReader<'_> {
    /// Read and decompress one entry.
    ///
    /// With a `limit`, entries whose declared size exceeds it are rejected
    /// without decompressing, and at most `limit + 1` bytes are ever inflated
    /// in case the declared size is wrong.
    pub fn read(
        &mut self,
        entry: &ArchiveEntry,
        limit: Option<u64>,
    ) -> Result<Vec<u8>, ArchiveError> {
        let mut file = self.zip.by_index(entry.index)?;
        let declared = file.size();
        if let Some(max) = limit
            && declared > max
        {
            return Err(ArchiveError::TooLarge { max });
        }

        let mut contents = Vec::with_capacity(declared.min(PREALLOC_LIMIT) as usize);
        match limit {
            Some(max) => {
                file.by_ref().take(max.saturating_add(1)).read_to_end(&mut contents)?;
                if contents.len() as u64 > max {
                    return Err(ArchiveError::TooLarge { max });
                }
            }
            None => {
                file.read_to_end(&mut contents)?;
            }
        }
        Ok(contents)
    }
}

/// Read an entry through a possibly failed reader, flattening both failure
/// modes into a message. Used by the parallel stages, where one bad entry
/// must not stop the others.
pub fn read_entry(
    reader: &mut Result<EntryReader<'_>, ArchiveError>,
    entry: &ArchiveEntry,
    limit: Option<u64>,
) -> Result<Vec<u8>, String> {
    match reader {
        Ok(reader) => reader.read(entry, limit).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Resource forks, AppleDouble sidecars and Finder index files.
pub fn is_metadata_entry(name: &str) -> bool {
    if name == "__MACOSX" || name.starts_with("__MACOSX/") {
        return true;
    }
    let base = name
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    base.starts_with("._") || base == ".DS_Store"
}

/// Find the wrapper directory shared by every entry.
///
/// The candidate comes from the first file entry (or the first entry of any
/// kind when there are no files): everything up to and including its first
/// `/`. It is adopted only if every entry starts with it.
pub fn detect_root_prefix<'n>(
    entries: impl Iterator<Item = (&'n str, bool)> + Clone,
) -> String {
    let first = entries
        .clone()
        .find(|(_, is_dir)| !is_dir)
        .or_else(|| entries.clone().next())
        .map(|(name, _)| name);

    let Some(first) = first else {
        return String::new();
    };
    let Some(slash) = first.find('/') else {
        return String::new();
    };
    let prefix = &first[..=slash];

    if entries.clone().all(|(name, _)| name.starts_with(prefix)) {
        prefix.to_string()
    } else {
        String::new()
    }
}

/// Strip the root prefix from an archive name.
pub fn strip_root<'n>(name: &'n str, root_prefix: &str) -> &'n str {
    name.strip_prefix(root_prefix).unwrap_or(name)
}

/// `.htm` / `.html`, any case.
pub fn is_html_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

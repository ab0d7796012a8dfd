//! Import pipeline: archive → assets → pages.
//!
//! Turns an uploaded site archive into a [`ZipImportResult`]: one
//! self-contained page per HTML file, with stylesheets, scripts, images and
//! fonts inlined.
//!
//! ## Stages
//!
//! ```text
//! 1. Open      bytes          →  SiteArchive   (metadata dropped, root stripped)
//! 2. Load      asset entries  →  AssetMaps     (parallel, all entries finish first)
//! 3. Inline    HTML entries   →  ImportedPage  (parallel, read-only lookups)
//! 4. Assemble  pages          →  result        (main page first)
//! ```
//!
//! Stage 3 never starts before stage 2 has collected every asset, so a page
//! never sees a partially populated map.
//!
//! ## Failure policy
//!
//! Only an unreadable archive fails the import. A single asset or page that
//! cannot be decompressed is reported (log + [`ImportEvent`]) and skipped;
//! references to a skipped asset stay as written.

use crate::archive::{ArchiveEntry, ArchiveError, EntryReader, SiteArchive, read_entry};
use crate::assets::{AssetMaps, decode_text, load_assets};
use crate::blocks::split_blocks;
use crate::config::ImportConfig;
use crate::inline::inline_page;
use crate::naming::{derive_slug, derive_title, is_main_page, main_first, site_name};
use crate::types::{AssetKind, ImportedPage, ZipImportResult};
use rayon::prelude::*;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Mime types browsers report for zip uploads.
const ZIP_MIME_TYPES: &[&str] = &["application/zip", "application/x-zip-compressed"];

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Not a zip archive: {0}")]
    InvalidFile(String),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Progress events emitted during an import.
///
/// Sent through an optional channel so the CLI can print progress while the
/// library stays free of I/O. Formatting lives in [`crate::output`].
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    ArchiveOpened {
        entries: usize,
        html_files: usize,
        asset_files: usize,
        root_prefix: String,
    },
    AssetLoaded {
        path: String,
        kind: AssetKind,
        size: u64,
    },
    AssetSkipped {
        path: String,
        reason: String,
    },
    /// `index` is the page's position in the final, main-first order.
    PageImported {
        index: usize,
        title: String,
        file_name: String,
        is_main: bool,
    },
    PageSkipped {
        path: String,
        reason: String,
    },
}

/// Whether an upload looks like a zip archive.
///
/// Accepts either a zip mime type or a `.zip` file name (any case).
pub fn is_valid_zip_file(file_name: &str, mime_type: Option<&str>) -> bool {
    mime_type.is_some_and(|mime| ZIP_MIME_TYPES.contains(&mime))
        || file_name.to_ascii_lowercase().ends_with(".zip")
}

/// Import an archive from disk.
pub fn import_file(
    path: &Path,
    config: &ImportConfig,
    events: Option<Sender<ImportEvent>>,
) -> Result<ZipImportResult, ImportError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !is_valid_zip_file(&file_name, None) {
        return Err(ImportError::InvalidFile(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    import_zip(&file_name, &bytes, config, events)
}

/// Import an archive already held in memory.
///
/// `file_name` only provides the site name; the bytes are not required to
/// come from a file of that name.
pub fn import_zip(
    file_name: &str,
    bytes: &[u8],
    config: &ImportConfig,
    events: Option<Sender<ImportEvent>>,
) -> Result<ZipImportResult, ImportError> {
    let archive = SiteArchive::open(bytes)?;
    let html_entries: Vec<&ArchiveEntry> = archive.html_entries().collect();
    log::debug!(
        "opened {file_name}: {} entries, root prefix {:?}",
        archive.entries().len(),
        archive.root_prefix()
    );
    emit(
        &events,
        ImportEvent::ArchiveOpened {
            entries: archive.entries().len(),
            html_files: html_entries.len(),
            asset_files: archive.entries().len() - html_entries.len(),
            root_prefix: archive.root_prefix().to_string(),
        },
    );

    // Barrier: every asset is loaded before any page is inlined.
    let load = load_assets(&archive, config.assets.max_inline_bytes, events.as_ref());

    let blocks_enabled = config.blocks.enabled;
    let outcomes: Vec<Result<ImportedPage, (String, String)>> = html_entries
        .par_iter()
        .map_init(
            || archive.reader(),
            |reader, entry| build_page(reader, entry, &load.maps, blocks_enabled),
        )
        .collect();

    let mut pages = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(page) => pages.push(page),
            Err((path, reason)) => {
                log::warn!("page {path} skipped: {reason}");
                emit(&events, ImportEvent::PageSkipped { path, reason });
            }
        }
    }
    main_first(&mut pages, |p| p.is_main);

    for (index, page) in pages.iter().enumerate() {
        emit(
            &events,
            ImportEvent::PageImported {
                index,
                title: page.title.clone(),
                file_name: page.file_name.clone(),
                is_main: page.is_main,
            },
        );
    }

    Ok(ZipImportResult {
        site_name: site_name(file_name),
        pages,
        assets: load.inventory,
    })
}

fn build_page(
    reader: &mut Result<EntryReader<'_>, ArchiveError>,
    entry: &ArchiveEntry,
    maps: &AssetMaps,
    blocks_enabled: bool,
) -> Result<ImportedPage, (String, String)> {
    let bytes =
        read_entry(reader, entry, None).map_err(|reason| (entry.path.clone(), reason))?;
    let html = decode_text(&bytes);

    let title = derive_title(&entry.path, &html);
    let slug = derive_slug(&entry.path);
    let html_content = inline_page(&html, &entry.path, maps);
    let blocks = if blocks_enabled {
        split_blocks(&html_content, &slug)
    } else {
        Vec::new()
    };

    Ok(ImportedPage {
        file_name: entry.path.clone(),
        title,
        is_main: is_main_page(&entry.path),
        slug,
        html_content,
        blocks,
    })
}

fn emit(events: &Option<Sender<ImportEvent>>, event: ImportEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

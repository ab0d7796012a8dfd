//! Asset classification and loading.
//!
//! Every non-HTML entry is read exactly once and turned into two
//! representations, keyed by its root-stripped path:
//!
//! - a `data:<mime>;base64,...` URI, for every asset, used wherever an
//!   attribute or CSS `url()` points at it;
//! - the decoded text, for stylesheets and scripts only, used when a
//!   `<link rel="stylesheet">` or `<script src>` is replaced by an inline
//!   element.
//!
//! A stylesheet can be referenced both ways in the same site (a `<link>` in
//! one page, a plain `href` download link in another), hence both maps.
//!
//! ## Concurrency
//!
//! Entries are independent, so they are decompressed and encoded in parallel
//! with rayon. Each worker opens its own reader over the archive bytes. The
//! maps are only built once every entry has finished; pages are inlined
//! against the completed [`AssetMaps`].
//!
//! ## Failures
//!
//! An entry that cannot be decompressed, or that exceeds the configured size
//! ceiling, is simply missing from both maps. References to it stay as they
//! were in the source HTML.

use crate::archive::{ArchiveEntry, ArchiveError, EntryReader, SiteArchive, read_entry};
use crate::import::ImportEvent;
use crate::types::{AssetKind, ImportedAsset};
use base64::Engine;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::mpsc::Sender;

/// Mime type for anything not in [`MIME_TYPES`].
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension → mime type.
const MIME_TYPES: &[(&str, &str)] = &[
    // Images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("ico", "image/x-icon"),
    ("bmp", "image/bmp"),
    // Styles and scripts
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    // Fonts
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("eot", "application/vnd.ms-fontobject"),
    // Data
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("pdf", "application/pdf"),
    // Media
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("wav", "audio/wav"),
];

/// Extensions loaded as text in addition to their data URI.
const TEXT_EXTENSIONS: &[&str] = &["css", "js", "mjs"];

/// Lowercased extension of the last path segment, or empty.
pub fn extension(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() => name[pos + 1..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

pub fn mime_for_path(path: &str) -> &'static str {
    let ext = extension(path);
    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(OCTET_STREAM)
}

/// Whether the asset also gets a text representation for inlining.
pub fn is_text_asset(path: &str) -> bool {
    TEXT_EXTENSIONS.contains(&extension(path).as_str())
}

pub fn classify(path: &str) -> AssetKind {
    match extension(path).as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "svg" | "webp" | "ico" | "bmp" | "avif" => {
            AssetKind::Image
        }
        "css" | "scss" | "less" => AssetKind::Style,
        "js" | "mjs" | "ts" => AssetKind::Script,
        "woff" | "woff2" | "ttf" | "otf" | "eot" => AssetKind::Font,
        _ => AssetKind::Other,
    }
}

/// Build a base64 data URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded_len = base64::encoded_len(bytes.len(), true).unwrap_or(0);
    let mut uri = String::with_capacity(encoded_len + mime.len() + 13);
    uri.push_str("data:");
    uri.push_str(mime);
    uri.push_str(";base64,");
    base64::engine::general_purpose::STANDARD.encode_string(bytes, &mut uri);
    uri
}

/// Decode entry bytes as text: UTF-8 BOM stripped, invalid sequences replaced.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Lookup tables consumed by the inliner.
#[derive(Debug, Default, Clone)]
pub struct AssetMaps {
    /// Stylesheet and script text by path.
    pub text: HashMap<String, String>,
    /// Data URI by path, for every loaded asset.
    pub data_urls: HashMap<String, String>,
}

/// Both representations of one asset, from a single read.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub path: String,
    pub kind: AssetKind,
    pub mime: &'static str,
    pub size: u64,
    pub text: Option<String>,
    pub data_uri: String,
}

impl LoadedAsset {
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Self {
        let mime = mime_for_path(path);
        Self {
            path: path.to_string(),
            kind: classify(path),
            mime,
            size: bytes.len() as u64,
            text: is_text_asset(path).then(|| decode_text(bytes)),
            data_uri: data_uri(mime, bytes),
        }
    }
}

/// An asset left out of the maps.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of the load phase.
#[derive(Debug, Default)]
pub struct AssetLoad {
    pub maps: AssetMaps,
    /// Loaded assets in archive order.
    pub inventory: Vec<ImportedAsset>,
    pub failures: Vec<AssetFailure>,
}

/// Load every asset entry of the archive.
///
/// Runs on the current rayon pool and returns only when all entries are done.
pub fn load_assets(
    archive: &SiteArchive<'_>,
    max_inline_bytes: Option<u64>,
    events: Option<&Sender<ImportEvent>>,
) -> AssetLoad {
    let entries: Vec<&ArchiveEntry> = archive.asset_entries().collect();

    let outcomes: Vec<Result<LoadedAsset, AssetFailure>> = entries
        .par_iter()
        .map_init(
            || archive.reader(),
            |reader, entry| load_entry(reader, entry, max_inline_bytes),
        )
        .collect();

    let mut load = AssetLoad::default();
    for outcome in outcomes {
        match outcome {
            Ok(asset) => {
                if let Some(tx) = events {
                    tx.send(ImportEvent::AssetLoaded {
                        path: asset.path.clone(),
                        kind: asset.kind,
                        size: asset.size,
                    })
                    .ok();
                }
                load.add(asset);
            }
            Err(failure) => {
                log::warn!("asset {} unavailable: {}", failure.path, failure.reason);
                if let Some(tx) = events {
                    tx.send(ImportEvent::AssetSkipped {
                        path: failure.path.clone(),
                        reason: failure.reason.clone(),
                    })
                    .ok();
                }
                load.failures.push(failure);
            }
        }
    }
    load
}

fn load_entry(
    reader: &mut Result<EntryReader<'_>, ArchiveError>,
    entry: &ArchiveEntry,
    max_inline_bytes: Option<u64>,
) -> Result<LoadedAsset, AssetFailure> {
    let failure = |reason: String| AssetFailure {
        path: entry.path.clone(),
        reason,
    };

    let bytes = read_entry(reader, entry, max_inline_bytes).map_err(failure)?;
    Ok(LoadedAsset::from_bytes(&entry.path, &bytes))
}

impl AssetLoad {
    /// Record a loaded asset in both maps and the inventory.
    pub fn add(&mut self, asset: LoadedAsset) {
        self.inventory.push(ImportedAsset {
            path: asset.path.clone(),
            kind: asset.kind,
            mime_type: asset.mime.to_string(),
            size: asset.size,
        });
        if let Some(text) = asset.text {
            self.maps.text.insert(asset.path.clone(), text);
        }
        self.maps.data_urls.insert(asset.path, asset.data_uri);
    }
}

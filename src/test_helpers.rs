//! Shared test utilities for the site-import test suite.
//!
//! Provides an in-memory archive builder and lookup helpers that work with
//! import results (`ZipImportResult`, `ImportedPage`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = build_zip(&[
//!     ("site/index.html", b"<title>Home</title>"),
//!     ("site/logo.png", PNG_BYTES),
//! ]);
//! let result = import_zip("site.zip", &bytes, &ImportConfig::default(), None).unwrap();
//!
//! let home = find_page(&result, "");
//! assert_eq!(home.title, "Home");
//! assert_eq!(page_file_names(&result), vec!["index.html"]);
//! ```

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::types::{ImportedPage, ZipImportResult};

// =========================================================================
// Fixtures
// =========================================================================

/// A 1x1 transparent PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Build a stored (uncompressed) zip in memory.
///
/// Names ending in `/` become directory entries; their contents are ignored.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Flip the first byte of a stored entry's payload so reading that entry
/// fails its CRC check. `contents` must appear exactly once in `bytes`.
pub fn corrupt_payload(bytes: &mut [u8], contents: &[u8]) {
    let start = bytes
        .windows(contents.len())
        .position(|w| w == contents)
        .expect("payload not found in archive");
    bytes[start] ^= 0xFF;
}

/// Overwrite the declared uncompressed size of every entry, in both the
/// local headers and the central directory.
pub fn set_declared_size(bytes: &mut [u8], size: u32) {
    patch_u32(bytes, b"PK\x03\x04", 22, size);
    patch_u32(bytes, b"PK\x01\x02", 24, size);
}

fn patch_u32(bytes: &mut [u8], signature: &[u8; 4], offset: usize, value: u32) {
    let starts: Vec<usize> = (0..bytes.len().saturating_sub(3))
        .filter(|&i| &bytes[i..i + 4] == signature)
        .collect();
    for start in starts {
        bytes[start + offset..start + offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

// =========================================================================
// Result lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by slug. Panics if not found.
pub fn find_page<'a>(result: &'a ZipImportResult, slug: &str) -> &'a ImportedPage {
    result
        .pages
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = result.pages.iter().map(|p| p.slug.as_str()).collect();
            panic!("page '{slug}' not found. Available: {slugs:?}")
        })
}

/// All page file names in result order.
pub fn page_file_names(result: &ZipImportResult) -> Vec<&str> {
    result.pages.iter().map(|p| p.file_name.as_str()).collect()
}

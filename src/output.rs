//! CLI output formatting for imports.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each page leads with
//! its positional index and title; the archive path it came from is shown as
//! an indented `Source:` line. Assets are listed by kind and path with a
//! human-readable size.
//!
//! # Output Format
//!
//! ## Import progress
//!
//! ```text
//! Archive: 4 entries (2 pages, 2 assets)
//!     Root: my-site/
//!     style css/site.css (1.2 KB)
//!     image img/logo.png (14.0 KB)
//! 001 Home (main)
//!     Source: index.html
//! 002 About
//!     Source: about.html
//! ```
//!
//! ## Written files
//!
//! ```text
//! 001 Home → index.html
//! 002 About → about.html
//! Result → import.json
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::import::ImportEvent;
use crate::types::{ImportedPage, ZipImportResult};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Page header: positional index + title, flagged when it is the main page.
///
/// ```text
/// 001 Home (main)
/// 002 About
/// ```
fn page_header(index: usize, title: &str, is_main: bool) -> String {
    if is_main {
        format!("{} {} (main)", format_index(index), title)
    } else {
        format!("{} {}", format_index(index), title)
    }
}

/// `1 page`, `2 pages`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Human-readable byte count, base 1024, one decimal place.
///
/// - `0` → `"0 B"`
/// - `512` → `"512.0 B"`
/// - `1536` → `"1.5 KB"`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// File the CLI writes a page to, relative to the output directory.
///
/// The site root (empty slug) is written as `index.html`.
pub fn page_output_name(slug: &str) -> String {
    if slug.is_empty() {
        "index.html".to_string()
    } else {
        format!("{slug}.html")
    }
}

// ============================================================================
// Import progress
// ============================================================================

/// Format a single import progress event as display lines.
pub fn format_import_event(event: &ImportEvent) -> Vec<String> {
    match event {
        ImportEvent::ArchiveOpened {
            entries,
            html_files,
            asset_files,
            root_prefix,
        } => {
            let mut lines = vec![format!(
                "Archive: {} ({}, {})",
                count(*entries, "entry", "entries"),
                count(*html_files, "page", "pages"),
                count(*asset_files, "asset", "assets")
            )];
            if !root_prefix.is_empty() {
                lines.push(format!("{}Root: {}", indent(1), root_prefix));
            }
            lines
        }
        ImportEvent::AssetLoaded { path, kind, size } => vec![format!(
            "{}{} {} ({})",
            indent(1),
            kind.label(),
            path,
            format_file_size(*size)
        )],
        ImportEvent::AssetSkipped { path, reason } => {
            vec![format!("{}skipped {}: {}", indent(1), path, reason)]
        }
        ImportEvent::PageImported {
            index,
            title,
            file_name,
            is_main,
        } => vec![
            page_header(index + 1, title, *is_main),
            format!("{}Source: {}", indent(1), file_name),
        ],
        ImportEvent::PageSkipped { path, reason } => {
            vec![format!("Skipped page {}: {}", path, reason)]
        }
    }
}

/// One-line totals for a finished import.
pub fn format_import_summary(result: &ZipImportResult) -> Vec<String> {
    let total: u64 = result.assets.iter().map(|a| a.size).sum();
    vec![format!(
        "Imported {}: {}, {} inlined ({})",
        result.site_name,
        count(result.pages.len(), "page", "pages"),
        count(result.assets.len(), "asset", "assets"),
        format_file_size(total)
    )]
}

// ============================================================================
// Check: inventory without writing
// ============================================================================

/// Full inventory of an import result: pages with slug and block count, then
/// assets.
pub fn format_check_output(result: &ZipImportResult) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    if result.pages.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, page) in result.pages.iter().enumerate() {
        lines.extend(page_inventory(i + 1, page));
    }

    lines.push(String::new());
    lines.push("Assets".to_string());
    if result.assets.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for asset in &result.assets {
        lines.push(format!(
            "{}{} {} ({}, {})",
            indent(1),
            asset.kind.label(),
            asset.path,
            asset.mime_type,
            format_file_size(asset.size)
        ));
    }

    lines.push(String::new());
    lines.extend(format_import_summary(result));
    lines
}

fn page_inventory(index: usize, page: &ImportedPage) -> Vec<String> {
    let mut lines = vec![
        page_header(index, &page.title, page.is_main),
        format!("{}Source: {}", indent(1), page.file_name),
        format!("{}Slug: /{}", indent(1), page.slug),
    ];
    if !page.blocks.is_empty() {
        lines.push(format!("{}Blocks: {}", indent(1), page.blocks.len()));
    }
    lines
}

// ============================================================================
// Written files
// ============================================================================

/// Pages with the files they were written to, then the result manifest.
pub fn format_written_output(result: &ZipImportResult, manifest_name: &str) -> Vec<String> {
    let mut lines: Vec<String> = result
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            format!(
                "{} {} \u{2192} {}",
                format_index(i + 1),
                page.title,
                page_output_name(&page.slug)
            )
        })
        .collect();
    lines.push(format!("Result \u{2192} {manifest_name}"));
    lines
}

// ============================================================================
// Printers
// ============================================================================

pub fn print_import_summary(result: &ZipImportResult) {
    for line in format_import_summary(result) {
        println!("{}", line);
    }
}

pub fn print_check_output(result: &ZipImportResult) {
    for line in format_check_output(result) {
        println!("{}", line);
    }
}

pub fn print_written_output(result: &ZipImportResult, manifest_name: &str) {
    for line in format_written_output(result, manifest_name) {
        println!("{}", line);
    }
}

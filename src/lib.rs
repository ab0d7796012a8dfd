//! # Site Import
//!
//! Turns a zipped static website into self-contained pages. Each HTML file in
//! the archive becomes an [`ImportedPage`](types::ImportedPage) whose
//! stylesheets, scripts, images and fonts are inlined, so the page renders
//! with no access to the archive it came from.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! ```text
//! 1. Open      zip bytes      →  SiteArchive   (metadata dropped, root prefix stripped)
//! 2. Load      asset entries  →  AssetMaps     (text + data URI per asset)
//! 3. Inline    HTML entries   →  pages         (stylesheets, scripts, attributes, url())
//! 4. Assemble  pages          →  ZipImportResult (titles, slugs, main page first)
//! ```
//!
//! Stages 2 and 3 run entries in parallel with rayon. Stage 3 only starts once
//! stage 2 has finished, so inlining is a plain lookup against complete maps.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`import`] | Pipeline entry points, progress events, upload validation |
//! | [`archive`] | Opens the zip, filters metadata, detects the wrapper directory |
//! | [`assets`] | Mime table, asset kinds, data URIs, parallel loading |
//! | [`resolve`] | Canonical lookup keys for relative, rooted and encoded references |
//! | [`inline`] | The four rewrite passes over a page |
//! | [`naming`] | Titles, slugs, main-page detection and ordering |
//! | [`blocks`] | Best-effort split of a page body into editor blocks |
//! | [`config`] | TOML config loading, validation and merging |
//! | [`types`] | Serialized result types handed to the persistence layer |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Text Rewriting Over DOM Serialization
//!
//! Pages are rewritten with targeted patterns rather than parsed and
//! re-serialized. Markup the importer does not touch stays byte-for-byte as the
//! author wrote it, including whitespace, attribute quoting and comments.
//! Only [`blocks`] parses HTML, and it never feeds back into the page content.
//!
//! ## Best-Effort Resolution
//!
//! A reference that cannot be resolved (missing file, external URL, asset that
//! failed to decompress) is left exactly as written. Only an unreadable archive
//! fails an import.

pub mod archive;
pub mod assets;
pub mod blocks;
pub mod config;
pub mod import;
pub mod inline;
pub mod naming;
pub mod output;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

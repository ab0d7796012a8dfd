//! Reference resolution against archive paths.
//!
//! HTML and CSS inside an archive refer to each other with relative paths
//! (`../img/logo.png`), root-relative paths (`/css/site.css`), and sometimes
//! URL-encoded names (`My%20Photo.jpg`). Asset lookups are keyed by the
//! root-stripped archive path, so every reference is brought into that same
//! canonical form before lookup:
//!
//! ```text
//! base dir    reference                  key
//! ""          style.css?v=3              style.css
//! pages/      ../img/My%20Photo.jpg      img/My Photo.jpg
//! css/        /fonts/a.woff2#iefix       fonts/a.woff2
//! ```
//!
//! References that point outside the archive (see [`is_external`]) must never
//! reach [`resolve`]; callers leave them untouched.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Prefixes of references that point outside the archive.
const EXTERNAL_PREFIXES: &[&str] = &[
    "http://",
    "https://",
    "//",
    "data:",
    "#",
    "mailto:",
    "tel:",
    "javascript:",
];

/// Whether a reference points outside the archive and must be left as-is.
///
/// Blank references are treated as external: there is nothing to resolve.
pub fn is_external(reference: &str) -> bool {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return true;
    }
    EXTERNAL_PREFIXES.iter().any(|prefix| {
        trimmed
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Resolve `reference` against `base_dir` into a canonical archive key.
///
/// `base_dir` is a directory prefix with a trailing `/` (or empty for the
/// archive root), as returned by [`dir_of`].
pub fn resolve(base_dir: &str, reference: &str) -> String {
    let reference = reference.trim();
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    let decoded = decode_reference(&reference[..end]);

    match decoded.strip_prefix('/') {
        Some(rooted) => normalize_path(rooted),
        None => normalize_path(&format!("{base_dir}{decoded}")),
    }
}

/// Directory portion of an archive path, including the trailing `/`.
///
/// - `index.html` → `""`
/// - `pages/about.html` → `"pages/"`
pub fn dir_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..=pos],
        None => "",
    }
}

/// Percent-decode a reference, falling back to the raw text when the
/// encoding is malformed (stray `%`, bad hex, or invalid UTF-8).
fn decode_reference(raw: &str) -> Cow<'_, str> {
    if has_malformed_escape(raw) {
        return Cow::Borrowed(raw);
    }
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

fn has_malformed_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return true;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    false
}

/// Collapse `.`, `..` and empty segments. `..` above the root is dropped,
/// as is any leading `/`.
pub fn normalize_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

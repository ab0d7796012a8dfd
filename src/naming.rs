//! Page naming: titles, slugs and the main page.
//!
//! Every page identity is derived from two inputs, its root-stripped archive
//! path and its HTML. The rules are:
//!
//! - **Title**: text of the first `<title>` element, trimmed. When there is
//!   none (or it is blank) the path without its extension is used instead.
//! - **Slug**: the path without extension, lowercased, with anything outside
//!   `[a-z0-9-/]` replaced by `-`. A slug of exactly `index` becomes `""`,
//!   the site root.
//! - **Main page**: the page whose path is `index.html` or `index.htm`,
//!   case-insensitively. Only a top-level index counts; `blog/index.html`
//!   is an ordinary page with slug `blog/index`.
//!
//! Examples:
//! - `index.html` → title from HTML, slug `""`, main
//! - `About Us.html` → slug `about-us`
//! - `blog/Post_1.htm` → slug `blog/post-1`

use regex::Regex;
use std::sync::LazyLock;

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("TITLE: hardcoded regex is valid")
});

static MAIN_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^index\.html?$").expect("MAIN_PAGE: hardcoded regex is valid")
});

/// Path with the final extension removed.
///
/// - `"about.html"` → `"about"`
/// - `"blog/post.htm"` → `"blog/post"`
/// - `"v1.2/notes"` → `"v1.2/notes"` (dot in a directory is not an extension)
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Trimmed text of the first `<title>`, if non-empty.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Page title, falling back to the extensionless path.
pub fn derive_title(path: &str, html: &str) -> String {
    extract_title(html).unwrap_or_else(|| strip_extension(path).to_string())
}

/// URL slug for a page path.
pub fn derive_slug(path: &str) -> String {
    let slug: String = strip_extension(path)
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '/' => c,
            _ => '-',
        })
        .collect();
    if slug == "index" { String::new() } else { slug }
}

pub fn is_main_page(path: &str) -> bool {
    MAIN_PAGE.is_match(path)
}

/// Move the first main page to the front, keeping everything else in order.
pub fn main_first<T>(pages: &mut Vec<T>, is_main: impl Fn(&T) -> bool) {
    if let Some(pos) = pages.iter().position(is_main)
        && pos > 0
    {
        let main = pages.remove(pos);
        pages.insert(0, main);
    }
}

/// Site name from an archive file name: a trailing `.zip` (any case) removed.
///
/// - `"portfolio.zip"` → `"portfolio"`
/// - `"Site.ZIP"` → `"Site"`
/// - `"notes"` → `"notes"`
pub fn site_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.len().checked_sub(4) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".zip") => {
            base[..cut].to_string()
        }
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_extension_cases() {
        assert_eq!(strip_extension("about.html"), "about");
        assert_eq!(strip_extension("blog/post.htm"), "blog/post");
        assert_eq!(strip_extension("v1.2/notes"), "v1.2/notes");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("a.b.html"), "a.b");
    }

    #[test]
    fn title_from_title_element() {
        let html = "<html><head><title>  Welcome Home \n</title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Welcome Home"));
    }

    #[test]
    fn title_first_element_wins() {
        let html = "<TITLE lang=en>One</TITLE><svg><title>Two</title></svg>";
        assert_eq!(extract_title(html).as_deref(), Some("One"));
    }

    #[test]
    fn missing_title_falls_back_to_path() {
        assert_eq!(derive_title("about.html", "<p>no title</p>"), "about");
        assert_eq!(derive_title("blog/post.htm", ""), "blog/post");
    }

    #[test]
    fn blank_title_falls_back_to_path() {
        assert_eq!(derive_title("contact.html", "<title>   </title>"), "contact");
    }

    #[test]
    fn slug_index_is_site_root() {
        assert_eq!(derive_slug("index.html"), "");
        assert_eq!(derive_slug("INDEX.HTM"), "");
    }

    #[test]
    fn slug_nested_index_is_kept() {
        assert_eq!(derive_slug("blog/index.html"), "blog/index");
    }

    #[test]
    fn slug_replaces_disallowed_characters() {
        assert_eq!(derive_slug("About Us.html"), "about-us");
        assert_eq!(derive_slug("blog/Post_1.htm"), "blog/post-1");
        assert_eq!(derive_slug("café.html"), "caf-");
    }

    #[test]
    fn main_page_matching() {
        assert!(is_main_page("index.html"));
        assert!(is_main_page("Index.HTM"));
        assert!(!is_main_page("blog/index.html"));
        assert!(!is_main_page("index.html.bak"));
        assert!(!is_main_page("myindex.html"));
    }

    #[test]
    fn main_first_moves_main_and_keeps_order() {
        let mut pages = vec!["about", "index", "contact", "index"];
        main_first(&mut pages, |p| *p == "index");
        assert_eq!(pages, vec!["index", "about", "contact", "index"]);
    }

    #[test]
    fn main_first_without_main_is_noop() {
        let mut pages = vec!["b", "a"];
        main_first(&mut pages, |p| *p == "index");
        assert_eq!(pages, vec!["b", "a"]);
    }

    #[test]
    fn site_name_strips_zip_suffix() {
        assert_eq!(site_name("portfolio.zip"), "portfolio");
        assert_eq!(site_name("Site.ZIP"), "Site");
        assert_eq!(site_name("notes"), "notes");
        assert_eq!(site_name("/tmp/uploads/shop.zip"), "shop");
        assert_eq!(site_name(".zip"), "");
    }
}

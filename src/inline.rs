//! Reference inlining for imported pages.
//!
//! Rewrites a page so it renders with no access to the archive. HTML is
//! treated as text and rewritten with targeted patterns rather than a parsed
//! DOM, which keeps untouched markup byte-for-byte identical. Four passes run
//! in order, each over the output of the previous one:
//!
//! 1. `<link>` to a known stylesheet → `<style>` with the stylesheet text.
//!    The stylesheet's own `url()`s are resolved against *its* directory
//!    first, since `css/site.css` writes `url(../img/bg.png)`.
//! 2. `<script src>` to a known script → inline `<script>` with the same
//!    attributes minus `src` and `onerror`.
//! 3. Asset-bearing attributes (`src`, `href`, lazy-load variants) → data URI.
//! 4. Remaining CSS `url(...)` (inline styles, `<style>` blocks) → data URI.
//!
//! Anything that does not resolve to a loaded asset is left exactly as found.

use crate::assets::AssetMaps;
use crate::resolve::{dir_of, is_external, resolve};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Attributes whose value may name an asset file.
const ASSET_ATTRIBUTES: &[&str] = &[
    "src",
    "href",
    "poster",
    "data-src",
    "data-original",
    "data-lazy-src",
    "data-bg",
    "data-background",
];

static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<link\b[^>]*>").expect("LINK_TAG: hardcoded regex is valid")
});

static SCRIPT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>")
        .expect("SCRIPT_ELEMENT: hardcoded regex is valid")
});

/// A whole `<script>`/`<style>` element, or any other start tag. Raw-text
/// element bodies are matched as one unit so pass 3 never looks inside them.
static TAG_OR_RAW_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<[a-z][^>]*>")
        .expect("TAG_OR_RAW_TEXT: hardcoded regex is valid")
});

/// One attribute: name, then optionally `=` and a double-quoted,
/// single-quoted or bare value.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:(\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("ATTRIBUTE: hardcoded regex is valid")
});

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#)
        .expect("CSS_URL: hardcoded regex is valid")
});

static SCRIPT_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(script)").expect("SCRIPT_CLOSE: hardcoded regex is valid")
});

/// Inline every resolvable reference of the page at `html_path`.
pub fn inline_page(html: &str, html_path: &str, maps: &AssetMaps) -> String {
    let base_dir = dir_of(html_path);
    let html = inline_stylesheets(html, base_dir, maps);
    let html = inline_scripts(&html, base_dir, maps);
    let html = rewrite_asset_attributes(&html, base_dir, &maps.data_urls);
    rewrite_css_urls(&html, base_dir, &maps.data_urls).into_owned()
}

/// Pass 1: stylesheet links become `<style>` blocks.
pub fn inline_stylesheets<'h>(html: &'h str, base_dir: &str, maps: &AssetMaps) -> Cow<'h, str> {
    LINK_TAG.replace_all(html, |caps: &Captures| {
        let tag = &caps[0];
        let attrs = parse_attributes(tag_attributes(tag));
        let Some(href) = attribute(&attrs, "href") else {
            return tag.to_string();
        };
        if is_external(href) {
            return tag.to_string();
        }

        let key = resolve(base_dir, href);
        let is_stylesheet = attribute(&attrs, "rel").is_some_and(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        });
        let has_css_extension = key.to_ascii_lowercase().ends_with(".css");
        if !is_stylesheet && !has_css_extension {
            return tag.to_string();
        }

        match maps.text.get(&key) {
            Some(css) => {
                log::debug!("inlined stylesheet {href} ({key})");
                let css = rewrite_css_urls(css, dir_of(&key), &maps.data_urls);
                match attribute(&attrs, "media").filter(|m| !m.eq_ignore_ascii_case("all")) {
                    Some(media) => format!("<style media=\"{media}\">\n{css}\n</style>"),
                    None => format!("<style>\n{css}\n</style>"),
                }
            }
            None => tag.to_string(),
        }
    })
}

/// Pass 2: external scripts become inline scripts.
pub fn inline_scripts<'h>(html: &'h str, base_dir: &str, maps: &AssetMaps) -> Cow<'h, str> {
    SCRIPT_ELEMENT.replace_all(html, |caps: &Captures| {
        let element = &caps[0];
        let attrs = parse_attributes(&caps[1]);
        let Some(src) = attribute(&attrs, "src") else {
            return element.to_string();
        };
        if is_external(src) {
            return element.to_string();
        }

        let key = resolve(base_dir, src);
        let Some(script) = maps.text.get(&key) else {
            return element.to_string();
        };
        log::debug!("inlined script {src} ({key})");

        let kept: String = attrs
            .iter()
            .filter(|a| {
                !a.name.eq_ignore_ascii_case("src") && !a.name.eq_ignore_ascii_case("onerror")
            })
            .map(|a| format!(" {}", a.raw))
            .collect();
        let body = SCRIPT_CLOSE.replace_all(script, "<\\/$1");
        format!("<script{kept}>{body}</script>")
    })
}

/// Pass 3: asset-bearing attributes that resolve to a loaded asset get its
/// data URI.
pub fn rewrite_asset_attributes<'h>(
    html: &'h str,
    base_dir: &str,
    data_urls: &HashMap<String, String>,
) -> Cow<'h, str> {
    TAG_OR_RAW_TEXT.replace_all(html, |caps: &Captures| {
        let matched = &caps[0];
        // Only the start tag of a raw-text element is rewritten; its body is kept.
        let tag_end = matched.find('>').map(|i| i + 1).unwrap_or(matched.len());
        let (tag, rest) = matched.split_at(tag_end);
        format!("{}{rest}", rewrite_tag(tag, base_dir, data_urls))
    })
}

/// Pass 4: CSS `url()` references get the data URI, always double-quoted.
pub fn rewrite_css_urls<'c>(
    css: &'c str,
    base_dir: &str,
    data_urls: &HashMap<String, String>,
) -> Cow<'c, str> {
    CSS_URL.replace_all(css, |caps: &Captures| {
        let reference = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if is_external(reference) {
            return caps[0].to_string();
        }
        let key = resolve(base_dir, reference);
        match data_urls.get(&key) {
            Some(uri) => {
                log::debug!("inlined url({reference}) ({key})");
                format!("url(\"{uri}\")")
            }
            None => caps[0].to_string(),
        }
    })
}

fn rewrite_tag<'t>(
    tag: &'t str,
    base_dir: &str,
    data_urls: &HashMap<String, String>,
) -> Cow<'t, str> {
    let name_end = tag[1..]
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .map(|i| i + 1)
        .unwrap_or(tag.len());
    let (head, rest) = tag.split_at(name_end);

    let rewritten = ATTRIBUTE.replace_all(rest, |caps: &Captures| {
        let original = caps[0].to_string();
        let name = &caps[1];
        if !ASSET_ATTRIBUTES.iter().any(|a| a.eq_ignore_ascii_case(name)) {
            return original;
        }
        let (Some(separator), Some(value)) = (
            caps.get(2),
            caps.get(3).or_else(|| caps.get(4)).or_else(|| caps.get(5)),
        ) else {
            return original;
        };
        if is_external(value.as_str()) {
            return original;
        }

        let key = resolve(base_dir, value.as_str());
        match data_urls.get(&key) {
            Some(uri) => {
                log::debug!("inlined {name}={} ({key})", value.as_str());
                let quote = if caps.get(4).is_some() { '\'' } else { '"' };
                format!("{name}{}{quote}{uri}{quote}", separator.as_str())
            }
            None => original,
        }
    });

    match rewritten {
        Cow::Borrowed(_) => Cow::Borrowed(tag),
        Cow::Owned(rest) => Cow::Owned(format!("{head}{rest}")),
    }
}

/// A parsed attribute, with its original source text.
#[derive(Debug, Clone, PartialEq)]
struct Attribute<'a> {
    name: &'a str,
    value: Option<&'a str>,
    raw: &'a str,
}

/// Text between the tag name and the closing `>`.
fn tag_attributes(tag: &str) -> &str {
    let inner = tag.strip_suffix('>').unwrap_or(tag);
    let name_end = inner[1..]
        .find(|c: char| c.is_whitespace() || c == '/')
        .map(|i| i + 1)
        .unwrap_or(inner.len());
    &inner[name_end..]
}

fn parse_attributes(text: &str) -> Vec<Attribute<'_>> {
    ATTRIBUTE
        .captures_iter(text)
        .map(|caps| Attribute {
            name: caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
            value: caps
                .get(3)
                .or_else(|| caps.get(4))
                .or_else(|| caps.get(5))
                .map(|m| m.as_str()),
            raw: caps.get(0).map(|m| m.as_str()).unwrap_or_default(),
        })
        .collect()
}

fn attribute<'a>(attrs: &[Attribute<'a>], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .and_then(|a| a.value)
}

//! Best-effort block breakdown of an imported page.
//!
//! The block editor works on ordered sections rather than one HTML blob. Each
//! top-level element of the page body becomes one block, classified by tag
//! name and class words:
//!
//! | Match | Block type | Category |
//! |-------|------------|----------|
//! | `<nav>`, or class `nav`/`menu`/`header`/`navbar` | `MenuBlock01` | menu |
//! | `<footer>`, or class `footer` | `FooterBlock01` | footer |
//! | class `hero`/`cover`/`banner`/`jumbotron` | `CoverBlock01` | cover |
//! | anything else | `ZeroBlock` | zeroblock |
//!
//! Classification is advisory: the page's `html_content` is never altered, and
//! anything unrecognized lands in a raw-HTML `ZeroBlock`.
//!
//! Block ids are content hashes, so importing the same archive twice yields
//! identical output.

use crate::types::{Block, BlockCategory, BlockContent, BlockSettings};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("BODY: hardcoded selector is valid"));
static H1: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("H1: hardcoded selector is valid"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("PARAGRAPH: hardcoded selector is valid"));

static MENU_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(nav|menu|header|navbar)\b").expect("MENU_CLASS: hardcoded regex is valid")
});
static FOOTER_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfooter\b").expect("FOOTER_CLASS: hardcoded regex is valid")
});
static COVER_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(hero|cover|banner|jumbotron)\b")
        .expect("COVER_CLASS: hardcoded regex is valid")
});

const ZERO_BLOCK: &str = "ZeroBlock";

/// Split a page into ordered blocks.
pub fn split_blocks(html: &str, slug: &str) -> Vec<Block> {
    // The parser always synthesizes a <body>, even for fragments
    let document = Html::parse_document(html);
    let blocks: Vec<Block> = document
        .select(&BODY)
        .flat_map(|body| body.children().filter_map(ElementRef::wrap))
        .enumerate()
        .map(|(order, element)| classify_element(slug, order as u32, element))
        .collect();

    if blocks.is_empty() {
        let text: String = document.select(&BODY).map(|body| body.inner_html()).collect();
        return vec![raw_block(slug, 0, text)];
    }
    blocks
}

fn classify_element(slug: &str, order: u32, element: ElementRef<'_>) -> Block {
    let tag = element.value().name();
    let class = element.value().attr("class").unwrap_or_default();
    let html = element.html();

    if tag.eq_ignore_ascii_case("nav") || MENU_CLASS.is_match(class) {
        typed_block(slug, order, "MenuBlock01", BlockCategory::Menu, plain(html))
    } else if tag.eq_ignore_ascii_case("footer") || FOOTER_CLASS.is_match(class) {
        typed_block(slug, order, "FooterBlock01", BlockCategory::Footer, plain(html))
    } else if COVER_CLASS.is_match(class) {
        let content = BlockContent {
            title: Some(first_text(element, &H1).unwrap_or_else(|| "Cover".to_string())),
            subtitle: Some(first_text(element, &PARAGRAPH).unwrap_or_default()),
            html,
        };
        typed_block(slug, order, "CoverBlock01", BlockCategory::Cover, content)
    } else {
        raw_block(slug, order, html)
    }
}

fn plain(html: String) -> BlockContent {
    BlockContent {
        html,
        title: None,
        subtitle: None,
    }
}

/// Trimmed text of the first descendant matching `selector`, if non-empty.
fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn typed_block(
    slug: &str,
    order: u32,
    block_type: &str,
    category: BlockCategory,
    content: BlockContent,
) -> Block {
    Block {
        id: block_id(slug, order, &content.html),
        block_type: block_type.to_string(),
        category,
        content,
        settings: BlockSettings::default(),
        order,
    }
}

fn raw_block(slug: &str, order: u32, html: String) -> Block {
    Block {
        id: block_id(slug, order, &html),
        block_type: ZERO_BLOCK.to_string(),
        category: BlockCategory::ZeroBlock,
        content: plain(html),
        settings: BlockSettings::flush(),
        order,
    }
}

/// First 32 hex characters of SHA-256 over slug, order and html.
pub fn block_id(slug: &str, order: u32, html: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(slug.as_bytes());
    hasher.update([0u8]);
    hasher.update(order.to_le_bytes());
    hasher.update(html.as_bytes());
    let mut id = format!("{:x}", hasher.finalize());
    id.truncate(32);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.block_type.as_str()).collect()
    }

    #[test]
    fn classifies_top_level_sections() {
        let html = r#"<html><body>
            <nav><a href="/">Home</a></nav>
            <section class="hero"><h1>Welcome</h1><p>Tagline</p></section>
            <div class="content"><p>Body</p></div>
            <footer>© 2024</footer>
        </body></html>"#;
        let blocks = split_blocks(html, "");
        assert_eq!(
            types(&blocks),
            vec!["MenuBlock01", "CoverBlock01", "ZeroBlock", "FooterBlock01"]
        );
        let orders: Vec<_> = blocks.iter().map(|b| b.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn class_words_drive_classification() {
        let html = r#"<body>
            <div class="site-header sticky">Logo</div>
            <div class="page-footer">Bye</div>
            <div class="Jumbotron">Big</div>
            <div class="navigation">Not a nav word</div>
        </body>"#;
        let blocks = split_blocks(html, "");
        assert_eq!(
            types(&blocks),
            vec!["MenuBlock01", "FooterBlock01", "CoverBlock01", "ZeroBlock"]
        );
    }

    #[test]
    fn cover_extracts_title_and_subtitle() {
        let html = r#"<body><header class="banner"><h1> Big Sale </h1><p>Today only</p></header></body>"#;
        let blocks = split_blocks(html, "shop");
        // <header> only counts as a menu through its class words
        assert_eq!(blocks[0].category, BlockCategory::Cover);
        assert_eq!(blocks[0].content.title.as_deref(), Some("Big Sale"));
        assert_eq!(blocks[0].content.subtitle.as_deref(), Some("Today only"));
    }

    #[test]
    fn cover_fallback_title() {
        let blocks = split_blocks(r#"<body><div class="hero"><img src="x.png"></div></body>"#, "");
        assert_eq!(blocks[0].content.title.as_deref(), Some("Cover"));
        assert_eq!(blocks[0].content.subtitle.as_deref(), Some(""));
    }

    #[test]
    fn settings_by_block_kind() {
        let blocks = split_blocks("<body><nav>n</nav><p>text</p></body>", "");
        assert_eq!(blocks[0].settings, BlockSettings::default());
        assert_eq!(blocks[1].settings.padding_top, "0px");
        assert_eq!(blocks[1].settings.padding_bottom, "0px");
    }

    #[test]
    fn fragment_without_body_still_splits() {
        let blocks = split_blocks(r#"<nav>n</nav><div class="footer">f</div>"#, "");
        assert_eq!(types(&blocks), vec!["MenuBlock01", "FooterBlock01"]);
    }

    #[test]
    fn text_only_body_is_one_zero_block() {
        let blocks = split_blocks("<html><body>Just text</body></html>", "");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].category, BlockCategory::ZeroBlock);
        assert_eq!(blocks[0].content.html, "Just text");
    }

    #[test]
    fn block_html_is_outer_html() {
        let blocks = split_blocks(r#"<body><footer id="f">x</footer></body>"#, "");
        assert_eq!(blocks[0].content.html, r#"<footer id="f">x</footer>"#);
    }

    #[test]
    fn ids_are_deterministic_and_distinct() {
        let html = "<body><div>a</div><div>a</div></body>";
        let first = split_blocks(html, "p");
        let second = split_blocks(html, "p");
        assert_eq!(first, second);
        assert_ne!(first[0].id, first[1].id);
        assert_eq!(first[0].id.len(), 32);
        assert!(first[0].id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ids_depend_on_slug() {
        assert_ne!(block_id("a", 0, "<p>x</p>"), block_id("b", 0, "<p>x</p>"));
    }
}

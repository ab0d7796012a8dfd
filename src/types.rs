//! Shared types produced by an import.
//!
//! These types are serialized to JSON and handed to the site/page persistence
//! layer, which expects camelCase keys. Nothing here carries behaviour beyond
//! small conveniences; the pipeline stages live in their own modules.

use serde::{Deserialize, Serialize};

/// Result of importing one archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipImportResult {
    /// Archive file name with the `.zip` suffix removed.
    pub site_name: String,
    /// Imported pages, main page first, otherwise in archive order.
    pub pages: Vec<ImportedPage>,
    /// Every asset that loaded, in archive order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<ImportedAsset>,
}

impl ZipImportResult {
    /// The page flagged as the site root, if the archive had one.
    pub fn main_page(&self) -> Option<&ImportedPage> {
        self.pages.first().filter(|p| p.is_main)
    }
}

/// A single HTML document from the archive, with its references inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedPage {
    /// Root-stripped archive path (`about/team.html`).
    pub file_name: String,
    /// `<title>` text, or the file name without extension.
    pub title: String,
    /// URL slug; empty for the site root.
    pub slug: String,
    /// Final HTML with every resolvable reference replaced.
    pub html_content: String,
    pub is_main: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

/// Coarse asset category, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Style,
    Script,
    Font,
    Other,
}

impl AssetKind {
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Style => "style",
            AssetKind::Script => "script",
            AssetKind::Font => "font",
            AssetKind::Other => "other",
        }
    }
}

/// Inventory entry for a loaded asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedAsset {
    pub path: String,
    pub kind: AssetKind,
    pub mime_type: String,
    /// Uncompressed size in bytes.
    pub size: u64,
}

/// Editor block category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    Cover,
    Menu,
    Footer,
    #[serde(rename = "zeroblock")]
    ZeroBlock,
}

/// A top-level section of an imported page, classified for the block editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub category: BlockCategory,
    pub content: BlockContent,
    pub settings: BlockSettings,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockContent {
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

/// Layout settings the editor applies around a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSettings {
    pub padding_top: String,
    pub padding_bottom: String,
    pub background_color: String,
    pub align: String,
    pub full_width: bool,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            padding_top: "60px".to_string(),
            padding_bottom: "60px".to_string(),
            background_color: "#ffffff".to_string(),
            align: "center".to_string(),
            full_width: false,
        }
    }
}

impl BlockSettings {
    /// Raw-HTML blocks sit flush against their neighbours.
    pub fn flush() -> Self {
        Self {
            padding_top: "0px".to_string(),
            padding_bottom: "0px".to_string(),
            ..Self::default()
        }
    }
}

//! Portable text blocks for rich-text fields.

use serde::{Deserialize, Serialize};

use super::document::{new_key, Reference};

/// One element of a rich-text array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum PortableBlock {
    /// A text block (paragraph, heading, quote or list item).
    #[serde(rename = "block")]
    Text(TextBlock),
    /// An image stored as a dataset asset.
    #[serde(rename = "image")]
    Image(ImageBlock),
    /// An image still pointing at its original URL.
    #[serde(rename = "externalImage")]
    ExternalImage(ExternalImage),
}

impl PortableBlock {
    /// The block key, if assigned.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Text(b) => b.key.as_deref(),
            Self::Image(b) => b.key.as_deref(),
            Self::ExternalImage(b) => b.key.as_deref(),
        }
    }

    /// Assigns a fresh key if the block has none.
    pub fn ensure_key(&mut self) {
        let slot = match self {
            Self::Text(b) => &mut b.key,
            Self::Image(b) => &mut b.key,
            Self::ExternalImage(b) => &mut b.key,
        };
        if slot.is_none() {
            *slot = Some(new_key());
        }
    }

    /// True for text blocks whose spans hold nothing but whitespace.
    #[must_use]
    pub fn is_blank_text(&self) -> bool {
        match self {
            Self::Text(b) => b.children.iter().all(|s| s.text.trim().is_empty()),
            _ => false,
        }
    }
}

/// A text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Block key.
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Block style (`normal`, `h1`..`h6`, `blockquote`).
    pub style: String,
    /// Inline spans.
    pub children: Vec<Span>,
    /// Annotation definitions referenced from span marks.
    #[serde(rename = "markDefs", default)]
    pub mark_defs: Vec<LinkMark>,
    /// List type (`bullet` or `number`) for list items.
    #[serde(rename = "listItem", default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<String>,
    /// List nesting level, starting at 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl TextBlock {
    /// An empty block of the given style.
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            key: Some(new_key()),
            style: style.into(),
            children: Vec::new(),
            mark_defs: Vec::new(),
            list_item: None,
            level: None,
        }
    }

    /// Concatenated span text.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }
}

/// An inline run of text sharing the same marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "span")]
pub struct Span {
    /// Span key.
    #[serde(rename = "_key")]
    pub key: String,
    /// Text content.
    pub text: String,
    /// Decorators (`strong`, `em`, ...) and annotation keys.
    #[serde(default)]
    pub marks: Vec<String>,
}

impl Span {
    /// A span with a fresh key.
    pub fn new(text: impl Into<String>, marks: Vec<String>) -> Self {
        Self {
            key: new_key(),
            text: text.into(),
            marks,
        }
    }
}

/// A link annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "link")]
pub struct LinkMark {
    /// Key referenced from span marks.
    #[serde(rename = "_key")]
    pub key: String,
    /// Link target.
    pub href: String,
}

/// An image block backed by a dataset asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Block key.
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Asset reference.
    pub asset: Reference,
}

impl ImageBlock {
    /// An image block pointing at `asset_id`.
    pub fn from_asset(key: Option<String>, asset_id: impl Into<String>) -> Self {
        Self {
            key,
            asset: Reference::to(asset_id),
        }
    }
}

/// An unresolved image placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalImage {
    /// Block key.
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Original image URL.
    pub url: String,
}

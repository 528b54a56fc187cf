//! Records returned by the WordPress REST API (`wp/v2`).
//!
//! Only the fields the migration reads are modelled; everything else in the
//! response is ignored. All fields but `id` are optional so partial records
//! still deserialize.

use serde::{Deserialize, Serialize};

/// A `{ "rendered": "..." }` wrapper used for titles, content and captions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    /// Rendered HTML.
    #[serde(default)]
    pub rendered: String,
}

/// A post or page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WpPost {
    /// WordPress id.
    pub id: u64,
    /// Title.
    pub title: Option<Rendered>,
    /// Body HTML.
    pub content: Option<Rendered>,
    /// URL slug.
    pub slug: Option<String>,
    /// Author user id (0 when unset).
    pub author: Option<u64>,
    /// Category ids, in API order.
    #[serde(default)]
    pub categories: Vec<u64>,
    /// Tag ids, in API order.
    #[serde(default)]
    pub tags: Vec<u64>,
    /// Publish date (site-local ISO 8601).
    pub date: Option<String>,
    /// Last modification date.
    pub modified: Option<String>,
    /// Publication status.
    pub status: Option<String>,
    /// Sticky flag, kept raw so only a literal `true` counts.
    #[serde(default)]
    pub sticky: Option<serde_json::Value>,
}

/// A category or tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WpTerm {
    /// WordPress id.
    pub id: u64,
    /// Display name.
    pub name: Option<String>,
    /// URL slug.
    pub slug: Option<String>,
}

/// A user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WpUser {
    /// WordPress id.
    pub id: u64,
    /// Display name.
    pub name: Option<String>,
    /// URL slug.
    pub slug: Option<String>,
    /// Website URL.
    pub url: Option<String>,
    /// Biographical info.
    pub description: Option<String>,
}

/// A media library item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WpMedia {
    /// WordPress id.
    pub id: u64,
    /// Slug, usually the uploaded filename without extension.
    pub slug: Option<String>,
    /// Title.
    pub title: Option<Rendered>,
    /// Alternative text.
    pub alt_text: Option<String>,
    /// Caption HTML.
    pub caption: Option<Rendered>,
    /// Full-size file URL.
    pub source_url: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
}

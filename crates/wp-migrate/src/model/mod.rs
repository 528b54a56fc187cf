//! Source records, destination documents and the collection types that link them.

pub mod document;
pub mod portable_text;
pub mod wordpress;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub use document::{
    AuthorDocument, CategoryDocument, PageDocument, PostDocument, Reference, Slug,
    StagedDocument, TagDocument,
};
pub use portable_text::{ExternalImage, ImageBlock, LinkMark, PortableBlock, Span, TextBlock};
pub use wordpress::{Rendered, WpMedia, WpPost, WpTerm, WpUser};

/// A WordPress collection that can be migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// Blog posts (`/posts`).
    #[default]
    Posts,
    /// Static pages (`/pages`).
    Pages,
    /// Category terms (`/categories`).
    Categories,
    /// Tag terms (`/tags`).
    Tags,
    /// Users, migrated as authors (`/users`).
    Users,
}

impl CollectionType {
    /// Every supported collection.
    pub const ALL: [CollectionType; 5] = [
        Self::Posts,
        Self::Pages,
        Self::Categories,
        Self::Tags,
        Self::Users,
    ];

    /// REST path segment for the collection.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Pages => "pages",
            Self::Categories => "categories",
            Self::Tags => "tags",
            Self::Users => "users",
        }
    }

    /// Destination `_type`, also used as the id prefix.
    #[must_use]
    pub const fn doc_type(self) -> &'static str {
        match self {
            Self::Posts => "post",
            Self::Pages => "page",
            Self::Categories => "category",
            Self::Tags => "tag",
            Self::Users => "author",
        }
    }

    /// Deterministic destination id for a source record id.
    #[must_use]
    pub fn document_id(self, source_id: u64) -> String {
        document_id(self.doc_type(), source_id)
    }

    /// Whether the REST endpoint accepts an `author` query filter.
    #[must_use]
    pub const fn supports_author_filter(self) -> bool {
        matches!(self, Self::Posts | Self::Pages)
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedCollection(s.to_string()))
    }
}

/// Builds `<prefix>-<id>`.
#[must_use]
pub fn document_id(prefix: &str, source_id: u64) -> String {
    format!("{}-{}", prefix, source_id)
}

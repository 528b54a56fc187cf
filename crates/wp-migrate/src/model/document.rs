//! Documents staged for the destination dataset.
//!
//! Staged types never carry `_createdAt`, `_updatedAt` or `_rev`; those are
//! owned by the store. Optional fields are omitted from the JSON rather than
//! written as `null`.

use serde::{Deserialize, Serialize};

use super::portable_text::PortableBlock;

/// Generates a fresh key for array items.
#[must_use]
pub fn new_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A slug value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "slug")]
pub struct Slug {
    /// Slug text.
    pub current: String,
}

impl Slug {
    /// Wraps a slug string.
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }
}

/// A reference to another document by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "reference")]
pub struct Reference {
    /// Array item key; only set for references stored in arrays.
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Target document id.
    #[serde(rename = "_ref")]
    pub target: String,
}

impl Reference {
    /// A plain (non-array) reference.
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            key: None,
            target: target.into(),
        }
    }

    /// A reference for use inside an array, with a fresh key.
    pub fn keyed(target: impl Into<String>) -> Self {
        Self {
            key: Some(new_key()),
            target: target.into(),
        }
    }
}

/// An `author` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "author")]
pub struct AuthorDocument {
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    /// Website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A `category` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "category")]
pub struct CategoryDocument {
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
}

/// A `tag` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "tag")]
pub struct TagDocument {
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
}

/// A `page` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "page")]
pub struct PageDocument {
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Title.
    pub title: String,
    /// Slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    /// Author reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Reference>,
    /// Publish date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Last modification date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Publication status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A `post` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "post")]
pub struct PostDocument {
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Title.
    pub title: String,
    /// Slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    /// Author reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Reference>,
    /// Category references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Reference>>,
    /// Tag references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Reference>>,
    /// Publish date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Last modification date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Publication status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Pinned to the front page.
    pub sticky: bool,
    /// Body as portable text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<PortableBlock>>,
}

/// Any document produced by a transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StagedDocument {
    /// `author`
    Author(AuthorDocument),
    /// `category`
    Category(CategoryDocument),
    /// `tag`
    Tag(TagDocument),
    /// `page`
    Page(PageDocument),
    /// `post`
    Post(PostDocument),
}

impl StagedDocument {
    /// Document id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Author(d) => &d.id,
            Self::Category(d) => &d.id,
            Self::Tag(d) => &d.id,
            Self::Page(d) => &d.id,
            Self::Post(d) => &d.id,
        }
    }

    /// Document `_type`.
    #[must_use]
    pub const fn doc_type(&self) -> &'static str {
        match self {
            Self::Author(_) => "author",
            Self::Category(_) => "category",
            Self::Tag(_) => "tag",
            Self::Page(_) => "page",
            Self::Post(_) => "post",
        }
    }

    /// Serializes the document for a mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

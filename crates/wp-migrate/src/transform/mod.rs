//! Record transformers: one raw WordPress record in, one staged document out.
//!
//! Dispatch goes through a table keyed by [`CollectionType`]; adding a
//! collection means adding one transformer and one table entry.

mod author;
mod page;
mod post;
mod taxonomy;
pub mod text;

pub use author::AuthorTransformer;
pub use page::PageTransformer;
pub use post::PostTransformer;
pub use taxonomy::{CategoryTransformer, TagTransformer};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::media::MediaResolver;
use crate::model::{CollectionType, Reference, StagedDocument};
use crate::richtext::DEFAULT_IMAGE_CONCURRENCY;

/// Run-scoped collaborators available to every transform.
#[derive(Clone)]
pub struct TransformContext {
    /// Resolves images embedded in post bodies.
    pub media: MediaResolver,
    /// Images resolved at once per document.
    pub image_concurrency: usize,
}

impl TransformContext {
    /// Creates a context with the default image concurrency.
    #[must_use]
    pub fn new(media: MediaResolver) -> Self {
        Self {
            media,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
        }
    }

    /// Sets the per-document image concurrency.
    #[must_use]
    pub fn with_image_concurrency(mut self, image_concurrency: usize) -> Self {
        self.image_concurrency = image_concurrency.max(1);
        self
    }
}

/// Maps raw records of one collection into destination documents.
#[async_trait]
pub trait RecordTransformer: Send + Sync {
    /// The collection this transformer handles.
    fn collection(&self) -> CollectionType;

    /// Transforms one raw record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transform`] if the record cannot be decoded, or any
    /// error raised while converting embedded content.
    async fn transform(
        &self,
        record: serde_json::Value,
        ctx: &TransformContext,
    ) -> Result<StagedDocument>;
}

static TRANSFORMERS: &[&dyn RecordTransformer] = &[
    &PostTransformer,
    &PageTransformer,
    &CategoryTransformer,
    &TagTransformer,
    &AuthorTransformer,
];

/// Looks up the transformer for a collection.
///
/// # Errors
///
/// Returns [`Error::UnsupportedCollection`] if no transformer is registered.
pub fn transformer_for(collection: CollectionType) -> Result<&'static dyn RecordTransformer> {
    TRANSFORMERS
        .iter()
        .copied()
        .find(|t| t.collection() == collection)
        .ok_or_else(|| Error::UnsupportedCollection(collection.to_string()))
}

/// Deserializes a raw record, tagging failures with the record id.
fn decode<T: DeserializeOwned>(record: serde_json::Value) -> Result<T> {
    let id = record
        .get("id")
        .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
    serde_json::from_value(record).map_err(|e| Error::transform(id, e.to_string()))
}

/// Reference to a user's author document; user id 0 means none.
fn author_reference(author: Option<u64>) -> Option<Reference> {
    author
        .filter(|&id| id != 0)
        .map(|id| Reference::to(CollectionType::Users.document_id(id)))
}

use async_trait::async_trait;

use super::text::{clean_optional, non_empty};
use super::{decode, RecordTransformer, TransformContext};
use crate::error::Result;
use crate::model::{AuthorDocument, CollectionType, Slug, StagedDocument, WpUser};

/// WordPress users to `author` documents.
pub struct AuthorTransformer;

impl AuthorTransformer {
    /// Maps a decoded user.
    #[must_use]
    pub fn map(user: WpUser) -> AuthorDocument {
        AuthorDocument {
            id: CollectionType::Users.document_id(user.id),
            name: clean_optional(user.name.as_deref()),
            slug: non_empty(user.slug.as_deref()).map(Slug::new),
            url: non_empty(user.url.as_deref()),
            description: clean_optional(user.description.as_deref()),
        }
    }
}

#[async_trait]
impl RecordTransformer for AuthorTransformer {
    fn collection(&self) -> CollectionType {
        CollectionType::Users
    }

    async fn transform(
        &self,
        record: serde_json::Value,
        _ctx: &TransformContext,
    ) -> Result<StagedDocument> {
        Ok(StagedDocument::Author(Self::map(decode(record)?)))
    }
}

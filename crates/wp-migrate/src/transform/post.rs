use async_trait::async_trait;

use super::text::{clean_text, non_empty};
use super::{author_reference, decode, RecordTransformer, TransformContext};
use crate::error::Result;
use crate::model::{CollectionType, PostDocument, Reference, Slug, StagedDocument, WpPost};
use crate::richtext;

/// Posts to `post` documents, body included.
pub struct PostTransformer;

/// Keyed references into `collection`, or `None` for an empty list.
fn references(collection: CollectionType, ids: &[u64]) -> Option<Vec<Reference>> {
    (!ids.is_empty()).then(|| {
        ids.iter()
            .map(|&id| Reference::keyed(collection.document_id(id)))
            .collect()
    })
}

/// Only the JSON literal `true` makes a post sticky.
fn is_sticky(raw: Option<&serde_json::Value>) -> bool {
    matches!(raw, Some(serde_json::Value::Bool(true)))
}

impl PostTransformer {
    /// Maps every field except the body.
    #[must_use]
    pub fn map(post: &WpPost) -> PostDocument {
        PostDocument {
            id: CollectionType::Posts.document_id(post.id),
            title: post
                .title
                .as_ref()
                .map(|t| clean_text(&t.rendered))
                .unwrap_or_default(),
            slug: non_empty(post.slug.as_deref()).map(Slug::new),
            author: author_reference(post.author),
            categories: references(CollectionType::Categories, &post.categories),
            tags: references(CollectionType::Tags, &post.tags),
            date: non_empty(post.date.as_deref()),
            modified: non_empty(post.modified.as_deref()),
            status: non_empty(post.status.as_deref()),
            sticky: is_sticky(post.sticky.as_ref()),
            content: None,
        }
    }
}

#[async_trait]
impl RecordTransformer for PostTransformer {
    fn collection(&self) -> CollectionType {
        CollectionType::Posts
    }

    async fn transform(
        &self,
        record: serde_json::Value,
        ctx: &TransformContext,
    ) -> Result<StagedDocument> {
        let post: WpPost = decode(record)?;
        let mut doc = Self::map(&post);

        if let Some(html) = post
            .content
            .as_ref()
            .map(|c| c.rendered.as_str())
            .filter(|html| !html.trim().is_empty())
        {
            let blocks = richtext::convert(html, &ctx.media, ctx.image_concurrency).await?;
            doc.content = (!blocks.is_empty()).then_some(blocks);
        }

        Ok(StagedDocument::Post(doc))
    }
}

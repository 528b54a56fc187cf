use async_trait::async_trait;

use super::text::{clean_text, non_empty};
use super::{author_reference, decode, RecordTransformer, TransformContext};
use crate::error::Result;
use crate::model::{CollectionType, PageDocument, Slug, StagedDocument, WpPost};

/// Pages to `page` documents.
pub struct PageTransformer;

impl PageTransformer {
    /// Maps a decoded page. The title is always present, empty if WordPress
    /// sent none.
    #[must_use]
    pub fn map(page: WpPost) -> PageDocument {
        PageDocument {
            id: CollectionType::Pages.document_id(page.id),
            title: page
                .title
                .as_ref()
                .map(|t| clean_text(&t.rendered))
                .unwrap_or_default(),
            slug: non_empty(page.slug.as_deref()).map(Slug::new),
            author: author_reference(page.author),
            date: non_empty(page.date.as_deref()),
            modified: non_empty(page.modified.as_deref()),
            status: non_empty(page.status.as_deref()),
        }
    }
}

#[async_trait]
impl RecordTransformer for PageTransformer {
    fn collection(&self) -> CollectionType {
        CollectionType::Pages
    }

    async fn transform(
        &self,
        record: serde_json::Value,
        _ctx: &TransformContext,
    ) -> Result<StagedDocument> {
        Ok(StagedDocument::Page(Self::map(decode(record)?)))
    }
}

//! Categories and tags share the term shape and differ only in document type.

use async_trait::async_trait;

use super::text::{clean_optional, non_empty};
use super::{decode, RecordTransformer, TransformContext};
use crate::error::Result;
use crate::model::{CategoryDocument, CollectionType, Slug, StagedDocument, TagDocument, WpTerm};

fn name_and_slug(term: &WpTerm) -> (Option<String>, Option<Slug>) {
    (
        clean_optional(term.name.as_deref()),
        non_empty(term.slug.as_deref()).map(Slug::new),
    )
}

/// Categories to `category` documents.
pub struct CategoryTransformer;

impl CategoryTransformer {
    /// Maps a decoded category.
    #[must_use]
    pub fn map(term: WpTerm) -> CategoryDocument {
        let (name, slug) = name_and_slug(&term);
        CategoryDocument {
            id: CollectionType::Categories.document_id(term.id),
            name,
            slug,
        }
    }
}

#[async_trait]
impl RecordTransformer for CategoryTransformer {
    fn collection(&self) -> CollectionType {
        CollectionType::Categories
    }

    async fn transform(
        &self,
        record: serde_json::Value,
        _ctx: &TransformContext,
    ) -> Result<StagedDocument> {
        Ok(StagedDocument::Category(Self::map(decode(record)?)))
    }
}

/// Tags to `tag` documents.
pub struct TagTransformer;

impl TagTransformer {
    /// Maps a decoded tag.
    #[must_use]
    pub fn map(term: WpTerm) -> TagDocument {
        let (name, slug) = name_and_slug(&term);
        TagDocument {
            id: CollectionType::Tags.document_id(term.id),
            name,
            slug,
        }
    }
}

#[async_trait]
impl RecordTransformer for TagTransformer {
    fn collection(&self) -> CollectionType {
        CollectionType::Tags
    }

    async fn transform(
        &self,
        record: serde_json::Value,
        _ctx: &TransformContext,
    ) -> Result<StagedDocument> {
        Ok(StagedDocument::Tag(Self::map(decode(record)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(json: serde_json::Value) -> WpTerm {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_category() {
        let doc = CategoryTransformer::map(term(serde_json::json!({
            "id": 7, "name": "Markets &amp; Stocks", "slug": "markets-stocks", "count": 12
        })));
        assert_eq!(doc.id, "category-7");
        assert_eq!(doc.name.as_deref(), Some("Markets & Stocks"));
        assert_eq!(doc.slug.unwrap().current, "markets-stocks");
    }

    #[test]
    fn test_tag_with_missing_fields() {
        let doc = TagTransformer::map(term(serde_json::json!({"id": 3, "name": ""})));
        assert_eq!(
            serde_json::to_value(doc).unwrap(),
            serde_json::json!({"_id": "tag-3", "_type": "tag"})
        );
    }
}

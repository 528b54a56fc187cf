//! Connectors for the WordPress source and the document-store destination.

pub mod common;
pub mod memory;
pub mod sanity;
pub mod wordpress;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::model::{CollectionType, WpMedia, WpUser};

/// Read access to a WordPress site.
///
/// Every lookup returns `Ok(None)` when the API answers with a non-success
/// status and `Err` when the request itself fails. Implementations never
/// retry.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Get the source type name.
    fn source_type(&self) -> &'static str;

    /// Fetch one page of raw records.
    ///
    /// # Arguments
    ///
    /// * `collection` - Collection to read
    /// * `page` - 1-based page number
    /// * `author` - Optional author filter, honoured for posts and pages
    async fn fetch_page(
        &self,
        collection: CollectionType,
        page: u32,
        author: Option<u64>,
    ) -> Result<Option<Vec<serde_json::Value>>>;

    /// List users in API order.
    async fn list_users(&self, per_page: usize) -> Result<Option<Vec<WpUser>>>;

    /// Look up a single user.
    async fn fetch_user(&self, id: u64) -> Result<Option<WpUser>>;

    /// Find media items whose slug equals `slug`.
    async fn find_media_by_slug(&self, slug: &str) -> Result<Option<Vec<WpMedia>>>;

    /// Fetch full metadata for a media item.
    async fn fetch_media(&self, id: u64) -> Result<Option<WpMedia>>;
}

/// One write in a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    /// Create the document, or replace it wholesale if the id exists.
    #[serde(rename = "createOrReplace")]
    CreateOrReplace(serde_json::Value),
}

impl Mutation {
    /// Id of the document the mutation targets.
    #[must_use]
    pub fn document_id(&self) -> Option<&str> {
        match self {
            Self::CreateOrReplace(doc) => doc.get("_id").and_then(|v| v.as_str()),
        }
    }
}

/// An image asset already present in the destination, tagged with the
/// WordPress media id it was uploaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingAsset {
    /// Destination asset document id.
    pub asset_id: String,
    /// Originating WordPress media id.
    pub source_id: u64,
}

/// Write and asset access to the destination store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get the store type name.
    fn store_type(&self) -> &'static str;

    /// Apply a batch of mutations as one transaction.
    async fn commit(&self, mutations: Vec<Mutation>) -> Result<()>;

    /// Upload the image at `media.source_url`, returning the asset document id.
    async fn upload_image(&self, media: &WpMedia) -> Result<String>;

    /// List image assets previously uploaded from WordPress.
    async fn existing_assets(&self) -> Result<Vec<ExistingAsset>>;
}

/// Create the WordPress source from configuration.
pub fn create_source(config: &MigrationConfig) -> Result<Box<dyn ContentSource>> {
    Ok(Box::new(wordpress::WordPressConnector::new(
        config.source.clone(),
    )?))
}

/// Create the destination store from configuration.
///
/// Dry runs stage everything in memory.
pub fn create_store(config: &MigrationConfig) -> Result<Box<dyn DocumentStore>> {
    if config.options.dry_run {
        return Ok(Box::new(memory::MemoryStore::new()));
    }
    Ok(Box::new(sanity::SanityStore::new(
        config.destination.clone(),
    )?))
}

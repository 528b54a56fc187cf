//! Media resolution: WordPress image URLs to destination asset ids.
//!
//! The [`MediaCache`] lives for one run and is shared by every concurrent
//! transform. Each media id gets a single slot that is filled at most once,
//! so concurrent documents embedding the same image wait on one upload
//! instead of racing to upload it twice.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::connectors::{ContentSource, DocumentStore, ExistingAsset};
use crate::error::{Error, Result};

/// WordPress appends `-<width>x<height>` to resized image filenames.
static SIZE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+x\d+$").expect("size suffix pattern is valid"));

/// Derives the media-library slug from an image URL.
///
/// Takes the last path segment up to the first `.`, strips a trailing size
/// suffix and lowercases the result. Returns `None` when nothing is left.
#[must_use]
pub fn slug_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let filename = path.trim_end_matches('/').rsplit('/').next()?;
    let stem = filename.split('.').next().unwrap_or(filename);
    let slug = SIZE_SUFFIX.replace(stem, "").to_lowercase();
    (!slug.is_empty()).then_some(slug)
}

type Slot = Arc<OnceCell<String>>;

/// Run-scoped map from WordPress media id to destination asset id.
///
/// Entries are only ever added. Once a slot holds an asset id it is never
/// overwritten or removed.
#[derive(Debug, Default)]
pub struct MediaCache {
    slots: RwLock<HashMap<u64, Slot>>,
}

impl MediaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache seeded with assets already in the destination.
    #[must_use]
    pub fn preseeded(assets: impl IntoIterator<Item = ExistingAsset>) -> Self {
        let cache = Self::new();
        cache.preseed(assets);
        cache
    }

    /// Adds existing assets, keeping any entry already present.
    pub fn preseed(&self, assets: impl IntoIterator<Item = ExistingAsset>) {
        for asset in assets {
            self.insert_if_absent(asset.source_id, asset.asset_id);
        }
    }

    /// Asset id cached for `media_id`.
    #[must_use]
    pub fn get(&self, media_id: u64) -> Option<String> {
        self.read_slot(media_id)
            .and_then(|slot| slot.get().cloned())
    }

    /// Records `asset_id` unless the media id already has one, and returns
    /// the asset id that ends up stored.
    pub fn insert_if_absent(&self, media_id: u64, asset_id: String) -> String {
        let slot = self.slot(media_id);
        match slot.set(asset_id.clone()) {
            Ok(()) => asset_id,
            // Someone else filled it first; theirs stays.
            Err(_) => slot.get().cloned().unwrap_or(asset_id),
        }
    }

    /// Number of resolved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// True when no entry is resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_slot(&self, media_id: u64) -> Option<Slot> {
        self.slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&media_id)
            .cloned()
    }

    fn slot(&self, media_id: u64) -> Slot {
        if let Some(slot) = self.read_slot(media_id) {
            return slot;
        }
        self.slots
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(media_id)
            .or_default()
            .clone()
    }
}

/// Why an upload left the cache slot empty.
enum UploadMiss {
    NoMetadata,
    Failed(Error),
}

/// Resolves embedded image URLs through the WordPress media library.
#[derive(Clone)]
pub struct MediaResolver {
    source: Arc<dyn ContentSource>,
    store: Arc<dyn DocumentStore>,
    cache: Arc<MediaCache>,
}

impl MediaResolver {
    /// Creates a resolver sharing `cache` with every other resolver of the run.
    pub fn new(
        source: Arc<dyn ContentSource>,
        store: Arc<dyn DocumentStore>,
        cache: Arc<MediaCache>,
    ) -> Self {
        Self {
            source,
            store,
            cache,
        }
    }

    /// The shared cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<MediaCache> {
        &self.cache
    }

    /// Resolves an image URL to a destination asset id.
    ///
    /// `Ok(None)` means the image could not be matched or uploaded and the
    /// caller should keep its placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if a WordPress media lookup fails at the transport
    /// level.
    pub async fn resolve(&self, url: &str) -> Result<Option<String>> {
        let Some(slug) = slug_from_url(url) else {
            debug!("No media slug in image URL {}", url);
            return Ok(None);
        };

        let matches = self.source.find_media_by_slug(&slug).await?.unwrap_or_default();
        if matches.len() > 1 {
            debug!(
                "Slug '{}' matches {} media items, using id {}",
                slug,
                matches.len(),
                matches[0].id
            );
        }
        let Some(media_id) = matches.first().map(|m| m.id) else {
            debug!("No media item for slug '{}'", slug);
            return Ok(None);
        };

        if let Some(asset_id) = self.cache.get(media_id) {
            debug!("Media {} cached as {}", media_id, asset_id);
            return Ok(Some(asset_id));
        }

        let slot = self.cache.slot(media_id);
        let uploaded = slot
            .get_or_try_init(|| async {
                let media = match self.source.fetch_media(media_id).await {
                    Ok(Some(media)) => media,
                    Ok(None) => return Err(UploadMiss::NoMetadata),
                    Err(e) => return Err(UploadMiss::Failed(e)),
                };
                let asset_id = self
                    .store
                    .upload_image(&media)
                    .await
                    .map_err(UploadMiss::Failed)?;
                debug!("Uploaded media {} as {}", media_id, asset_id);
                Ok(asset_id)
            })
            .await;

        match uploaded {
            Ok(asset_id) => Ok(Some(asset_id.clone())),
            Err(UploadMiss::NoMetadata) => {
                warn!("Media {} has no metadata, keeping {}", media_id, url);
                Ok(None)
            }
            Err(UploadMiss::Failed(e)) => {
                warn!("Upload of media {} failed, keeping {}: {}", media_id, url, e);
                Ok(None)
            }
        }
    }
}

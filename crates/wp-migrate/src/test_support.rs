//! In-memory WordPress source for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::connectors::ContentSource;
use crate::error::{Error, Result};
use crate::model::{CollectionType, WpMedia, WpUser};

/// A recorded `fetch_page` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCall {
    pub collection: CollectionType,
    pub page: u32,
    pub author: Option<u64>,
}

#[derive(Default)]
pub struct StubSource {
    pages: HashMap<CollectionType, Vec<Vec<serde_json::Value>>>,
    users: Vec<WpUser>,
    media: Vec<WpMedia>,
    fail_page: Option<u32>,
    fail_media_lookup: bool,
    lookup_delay: Option<Duration>,
    page_calls: Mutex<Vec<PageCall>>,
    media_fetches: Mutex<Vec<u64>>,
    lookups_in_flight: AtomicUsize,
    peak_lookups: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, collection: CollectionType, pages: Vec<Vec<serde_json::Value>>) -> Self {
        self.pages.insert(collection, pages);
        self
    }

    pub fn with_users(mut self, users: Vec<WpUser>) -> Self {
        self.users = users;
        self
    }

    pub fn with_media(mut self, media: Vec<WpMedia>) -> Self {
        self.media = media;
        self
    }

    /// Makes `fetch_page` fail with a transport error on `page`.
    pub fn failing_on_page(mut self, page: u32) -> Self {
        self.fail_page = Some(page);
        self
    }

    /// Makes slug lookups fail with a transport error.
    pub fn failing_media_lookup(mut self) -> Self {
        self.fail_media_lookup = true;
        self
    }

    /// Makes every slug lookup take `delay`, so overlapping lookups show up
    /// in [`Self::peak_lookups`].
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    /// Most slug lookups seen in flight at once.
    pub fn peak_lookups(&self) -> usize {
        self.peak_lookups.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> Vec<PageCall> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn media_fetches(&self) -> Vec<u64> {
        self.media_fetches.lock().unwrap().clone()
    }
}

/// A media item whose slug and file name match.
pub fn media(id: u64, slug: &str) -> WpMedia {
    WpMedia {
        id,
        slug: Some(slug.to_string()),
        source_url: Some(format!("https://example.com/wp-content/uploads/{}.jpg", slug)),
        mime_type: Some("image/jpeg".to_string()),
        ..Default::default()
    }
}

/// HTML for a WordPress image block.
pub fn figure(file: &str) -> String {
    format!(
        r#"<figure class="wp-block-image"><img src="https://example.com/wp-content/uploads/{}" alt=""/></figure>"#,
        file
    )
}

#[async_trait]
impl ContentSource for StubSource {
    fn source_type(&self) -> &'static str {
        "stub"
    }

    async fn fetch_page(
        &self,
        collection: CollectionType,
        page: u32,
        author: Option<u64>,
    ) -> Result<Option<Vec<serde_json::Value>>> {
        self.page_calls.lock().unwrap().push(PageCall {
            collection,
            page,
            author,
        });
        if self.fail_page == Some(page) {
            return Err(Error::SourceConnection(format!("page {} unreachable", page)));
        }
        let index = page.saturating_sub(1) as usize;
        Ok(self
            .pages
            .get(&collection)
            .and_then(|pages| pages.get(index))
            .cloned()
            .or(Some(Vec::new())))
    }

    async fn list_users(&self, per_page: usize) -> Result<Option<Vec<WpUser>>> {
        Ok(Some(self.users.iter().take(per_page).cloned().collect()))
    }

    async fn fetch_user(&self, id: u64) -> Result<Option<WpUser>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_media_by_slug(&self, slug: &str) -> Result<Option<Vec<WpMedia>>> {
        let running = self.lookups_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_lookups.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        self.lookups_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_media_lookup {
            return Err(Error::SourceConnection("media lookup failed".to_string()));
        }
        Ok(Some(
            self.media
                .iter()
                .filter(|m| m.slug.as_deref() == Some(slug))
                .cloned()
                .collect(),
        ))
    }

    async fn fetch_media(&self, id: u64) -> Result<Option<WpMedia>> {
        self.media_fetches.lock().unwrap().push(id);
        Ok(self.media.iter().find(|m| m.id == id).cloned())
    }
}

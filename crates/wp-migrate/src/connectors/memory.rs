//! In-memory document store.
//!
//! Backs `--dry-run` and the test suites. Commits apply create-or-replace
//! semantics to a map keyed by `_id`, so re-running a migration against the
//! same store replaces documents instead of duplicating them.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::connectors::{DocumentStore, ExistingAsset, Mutation};
use crate::error::{Error, Result};
use crate::model::WpMedia;

#[derive(Debug, Default)]
struct MemoryState {
    documents: BTreeMap<String, serde_json::Value>,
    batches: Vec<Vec<Mutation>>,
    uploads: Vec<u64>,
    assets: Vec<ExistingAsset>,
}

/// Document store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_uploads: AtomicBool,
    fail_commits: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds the given assets.
    #[must_use]
    pub fn with_assets(assets: Vec<ExistingAsset>) -> Self {
        let store = Self::default();
        store.lock().assets = assets;
        store
    }

    /// Makes every subsequent upload fail.
    #[cfg(test)]
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent commit fail.
    #[cfg(test)]
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of stored documents, ordered by id.
    #[must_use]
    pub fn documents(&self) -> BTreeMap<String, serde_json::Value> {
        self.lock().documents.clone()
    }

    /// A stored document by id.
    #[must_use]
    pub fn document(&self, id: &str) -> Option<serde_json::Value> {
        self.lock().documents.get(id).cloned()
    }

    /// Committed batches, in commit order.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<Mutation>> {
        self.lock().batches.clone()
    }

    /// WordPress media ids uploaded so far, in upload order.
    #[must_use]
    pub fn uploads(&self) -> Vec<u64> {
        self.lock().uploads.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // Poisoned only if a caller panicked mid-write.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn store_type(&self) -> &'static str {
        "memory"
    }

    async fn commit(&self, mutations: Vec<Mutation>) -> Result<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(Error::Destination("commit rejected".to_string()));
        }

        let mut state = self.lock();
        for mutation in &mutations {
            let Mutation::CreateOrReplace(doc) = mutation;
            let id = mutation
                .document_id()
                .ok_or_else(|| Error::Destination("mutation without _id".to_string()))?
                .to_string();
            state.documents.insert(id, doc.clone());
        }
        state.batches.push(mutations);
        Ok(())
    }

    async fn upload_image(&self, media: &WpMedia) -> Result<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::Destination(format!(
                "upload of media {} rejected",
                media.id
            )));
        }
        if media.source_url.is_none() {
            return Err(Error::Destination(format!(
                "Media {} has no source_url",
                media.id
            )));
        }

        let mut state = self.lock();
        state.uploads.push(media.id);
        let asset_id = format!("image-memory{}-wp{}", state.uploads.len(), media.id);
        state.assets.push(ExistingAsset {
            asset_id: asset_id.clone(),
            source_id: media.id,
        });
        Ok(asset_id)
    }

    async fn existing_assets(&self) -> Result<Vec<ExistingAsset>> {
        Ok(self.lock().assets.clone())
    }
}

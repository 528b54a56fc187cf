//! Migration pipeline orchestration.
//!
//! Pages are processed strictly in order. Each page fans its records out to
//! the collection's transformer with a bounded number in flight, waits for
//! all of them, then commits one create-or-replace batch. Any failure stops
//! the run at that page; earlier batches stay committed.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::author::AuthorResolver;
use crate::concurrency::{first_failure, run_bounded};
use crate::config::MigrationConfig;
use crate::connectors::{create_source, create_store, ContentSource, DocumentStore, Mutation};
use crate::error::Result;
use crate::media::{MediaCache, MediaResolver};
use crate::model::CollectionType;
use crate::transform::{transformer_for, RecordTransformer, TransformContext};

/// How a run ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Every page was processed up to the first empty one.
    #[default]
    Completed,
    /// The author filter matched nobody; nothing was fetched.
    AuthorNotFound,
    /// Processing stopped at `page`.
    Aborted {
        /// Page that failed.
        page: u32,
        /// Error message.
        reason: String,
    },
}

/// Which authors a run fetches.
enum AuthorScope {
    All,
    Only(u64),
    /// A filter was configured but matched nobody.
    Unmatched,
}

/// Migration statistics.
#[derive(Debug, Default, Clone)]
pub struct MigrationStats {
    /// Page fetches issued, including the terminating one.
    pub fetch_calls: u64,
    /// Pages whose batch was committed.
    pub pages: u64,
    /// Batches committed.
    pub batches: u64,
    /// Documents written.
    pub documents: u64,
    /// Media cache entries at the end of the run.
    pub cached_media: usize,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// How the run ended.
    pub outcome: MigrationOutcome,
}

impl MigrationStats {
    /// Calculate throughput (documents per second).
    #[must_use]
    pub fn throughput(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.documents as f64 / self.duration_secs
        } else {
            0.0
        }
    }

    /// Whether the run ended without an error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, MigrationOutcome::Aborted { .. })
    }
}

/// Migration pipeline.
pub struct Pipeline {
    config: MigrationConfig,
    source: Arc<dyn ContentSource>,
    store: Arc<dyn DocumentStore>,
    cache: Arc<MediaCache>,
}

impl Pipeline {
    /// Create a new migration pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a connector
    /// cannot be created.
    pub fn new(config: MigrationConfig) -> Result<Self> {
        config.validate()?;
        let source: Arc<dyn ContentSource> = Arc::from(create_source(&config)?);
        let store: Arc<dyn DocumentStore> = Arc::from(create_store(&config)?);
        Ok(Self::with_connectors(config, source, store))
    }

    /// Create a pipeline around existing connectors.
    pub fn with_connectors(
        config: MigrationConfig,
        source: Arc<dyn ContentSource>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            config,
            source,
            store,
            cache: Arc::new(MediaCache::new()),
        }
    }

    /// Use `cache` instead of a fresh, empty one.
    #[must_use]
    pub fn with_media_cache(mut self, cache: Arc<MediaCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The run's media cache.
    #[must_use]
    pub fn media_cache(&self) -> &Arc<MediaCache> {
        &self.cache
    }

    /// The destination store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Run the migration pipeline.
    ///
    /// Page-level failures end the run and are reported through
    /// [`MigrationStats::outcome`].
    ///
    /// # Errors
    ///
    /// Returns an error if no transformer exists for the configured
    /// collection.
    pub async fn run(&self) -> Result<MigrationStats> {
        let start = std::time::Instant::now();
        let mut stats = MigrationStats::default();
        let options = &self.config.options;
        let collection = options.collection;
        let transformer = transformer_for(collection)?;

        info!(
            "Starting migration of {} from {} into {}",
            collection,
            self.source.source_type(),
            self.store.store_type()
        );

        let author = match self.resolve_author(collection).await {
            AuthorScope::All => None,
            AuthorScope::Only(id) => Some(id),
            AuthorScope::Unmatched => {
                info!("No matching author, nothing to migrate");
                stats.outcome = MigrationOutcome::AuthorNotFound;
                stats.duration_secs = start.elapsed().as_secs_f64();
                return Ok(stats);
            }
        };

        if collection == CollectionType::Posts && options.preseed_media_cache {
            self.preseed_media_cache().await;
        }

        let ctx = Arc::new(
            TransformContext::new(MediaResolver::new(
                self.source.clone(),
                self.store.clone(),
                self.cache.clone(),
            ))
            .with_image_concurrency(options.image_concurrency),
        );
        let progress = create_progress_bar(options.progress);

        let mut page: u32 = 1;
        loop {
            stats.fetch_calls += 1;
            debug!("Fetching {} page {}", collection, page);

            let records = match self.source.fetch_page(collection, page, author).await {
                Ok(Some(records)) if !records.is_empty() => records,
                Ok(_) => {
                    debug!("Page {} is empty, done", page);
                    break;
                }
                Err(e) => {
                    stats.outcome = abort(page, &e.to_string());
                    break;
                }
            };

            match self.process_page(transformer, &ctx, records).await {
                Ok(written) => {
                    stats.pages += 1;
                    stats.batches += 1;
                    stats.documents += written;
                    progress.inc(written);
                    info!("Page {}: committed {} documents", page, written);
                }
                Err(e) => {
                    stats.outcome = abort(page, &e.to_string());
                    break;
                }
            }

            page += 1;
        }

        progress.finish_and_clear();

        stats.cached_media = self.cache.len();
        stats.duration_secs = start.elapsed().as_secs_f64();

        info!(
            "Migration finished: {} documents in {} batches over {} fetches in {:.2}s ({:.0} docs/sec)",
            stats.documents,
            stats.batches,
            stats.fetch_calls,
            stats.duration_secs,
            stats.throughput()
        );

        Ok(stats)
    }

    async fn resolve_author(&self, collection: CollectionType) -> AuthorScope {
        if collection != CollectionType::Posts {
            return AuthorScope::All;
        }
        let Some(filter) = self.config.options.author.as_ref().filter(|f| !f.is_empty()) else {
            return AuthorScope::All;
        };

        match AuthorResolver::new(self.source.clone()).resolve(filter).await {
            Some(id) => AuthorScope::Only(id),
            None => AuthorScope::Unmatched,
        }
    }

    async fn preseed_media_cache(&self) {
        match self.store.existing_assets().await {
            Ok(assets) => {
                let count = assets.len();
                self.cache.preseed(assets);
                info!("Media cache seeded with {} existing assets", count);
            }
            Err(e) => warn!("Could not list existing assets, starting with an empty cache: {}", e),
        }
    }

    /// Transforms every record of one page and commits the batch.
    async fn process_page(
        &self,
        transformer: &'static dyn RecordTransformer,
        ctx: &Arc<TransformContext>,
        records: Vec<serde_json::Value>,
    ) -> Result<u64> {
        let tasks: Vec<_> = records
            .into_iter()
            .map(|record| {
                let ctx = ctx.clone();
                async move { transformer.transform(record, &ctx).await }
            })
            .collect();

        let documents = first_failure(run_bounded(self.config.options.workers, tasks).await)?;
        let mutations = documents
            .iter()
            .map(|doc| Ok(Mutation::CreateOrReplace(doc.to_json()?)))
            .collect::<Result<Vec<_>>>()?;

        let written = mutations.len() as u64;
        self.store.commit(mutations).await?;
        Ok(written)
    }
}

fn abort(page: u32, reason: &str) -> MigrationOutcome {
    error!("Migration stopped at page {}: {}", page, reason);
    MigrationOutcome::Aborted {
        page,
        reason: reason.to_string(),
    }
}

fn create_progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} documents {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

//! Tests for the migration pipeline.

use super::*;
use crate::config::{AuthorFilter, DestinationConfig, MigrationOptions, SourceConfig};
use crate::connectors::memory::MemoryStore;
use crate::connectors::ExistingAsset;
use crate::model::WpUser;
use crate::test_support::{figure, media, PageCall, StubSource};

fn config(collection: CollectionType) -> MigrationConfig {
    MigrationConfig {
        source: SourceConfig {
            base_url: "https://example.com/wp-json/wp/v2".to_string(),
            per_page: 2,
        },
        destination: DestinationConfig::default(),
        options: MigrationOptions {
            collection,
            dry_run: true,
            progress: false,
            ..MigrationOptions::default()
        },
    }
}

fn tag(id: u64) -> serde_json::Value {
    serde_json::json!({"id": id, "name": format!("Tag {}", id), "slug": format!("tag-{}", id)})
}

fn post(id: u64, body: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": {"rendered": format!("Post {}", id)},
        "content": {"rendered": body},
        "author": 3,
        "categories": [7],
        "tags": [3],
        "sticky": false
    })
}

fn pipeline(
    config: MigrationConfig,
    source: StubSource,
) -> (Pipeline, Arc<StubSource>, Arc<MemoryStore>) {
    let source = Arc::new(source);
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::with_connectors(config, source.clone(), store.clone());
    (pipeline, source, store)
}

#[test]
fn test_migration_stats_throughput() {
    let stats = MigrationStats {
        documents: 1000,
        duration_secs: 2.0,
        ..MigrationStats::default()
    };

    assert!((stats.throughput() - 500.0).abs() < 0.001);
    assert!(stats.is_success());
}

#[test]
fn test_pipeline_new_dry_run_uses_memory_store() {
    let pipeline = Pipeline::new(config(CollectionType::Tags)).unwrap();
    assert_eq!(pipeline.store().store_type(), "memory");
}

#[test]
fn test_pipeline_new_rejects_invalid_config() {
    let mut config = config(CollectionType::Tags);
    config.options.workers = 0;
    assert!(Pipeline::new(config).is_err());
}

#[tokio::test]
async fn test_pagination_stops_at_first_empty_page() {
    let source = StubSource::new().with_pages(
        CollectionType::Tags,
        vec![vec![tag(1), tag(2)], vec![tag(3), tag(4)], vec![tag(5)]],
    );
    let (pipeline, source, store) = pipeline(config(CollectionType::Tags), source);

    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.outcome, MigrationOutcome::Completed);
    assert_eq!(stats.fetch_calls, 4);
    assert_eq!(source.page_calls().len(), 4);
    assert_eq!(stats.batches, 3);
    assert_eq!(store.batches().len(), 3);
    assert_eq!(stats.documents, 5);
    assert_eq!(
        source.page_calls().iter().map(|c| c.page).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[tokio::test]
async fn test_batches_preserve_page_and_record_order() {
    let source = StubSource::new().with_pages(
        CollectionType::Tags,
        vec![vec![tag(10), tag(11), tag(12)], vec![tag(1)]],
    );
    let (pipeline, _, store) = pipeline(config(CollectionType::Tags), source);

    pipeline.run().await.unwrap();

    let ids: Vec<Vec<String>> = store
        .batches()
        .iter()
        .map(|batch| {
            batch
                .iter()
                .map(|m| m.document_id().unwrap().to_string())
                .collect()
        })
        .collect();
    assert_eq!(
        ids,
        vec![
            vec!["tag-10".to_string(), "tag-11".to_string(), "tag-12".to_string()],
            vec!["tag-1".to_string()],
        ]
    );
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let pages = vec![vec![tag(1), tag(2)]];
    let store = Arc::new(MemoryStore::new());

    for _ in 0..2 {
        let source = Arc::new(StubSource::new().with_pages(CollectionType::Tags, pages.clone()));
        Pipeline::with_connectors(config(CollectionType::Tags), source, store.clone())
            .run()
            .await
            .unwrap();
    }
    let after_second = store.documents();

    assert_eq!(after_second.len(), 2);
    assert_eq!(
        after_second["tag-1"],
        serde_json::json!({
            "_id": "tag-1",
            "_type": "tag",
            "name": "Tag 1",
            "slug": {"_type": "slug", "current": "tag-1"}
        })
    );
    assert_eq!(store.batches().len(), 2);
}

#[tokio::test]
async fn test_fetch_error_aborts_after_committed_pages() {
    let source = StubSource::new()
        .with_pages(CollectionType::Tags, vec![vec![tag(1)], vec![tag(2)], vec![tag(3)]])
        .failing_on_page(2);
    let (pipeline, source, store) = pipeline(config(CollectionType::Tags), source);

    let stats = pipeline.run().await.unwrap();

    assert!(matches!(stats.outcome, MigrationOutcome::Aborted { page: 2, .. }));
    assert!(!stats.is_success());
    assert_eq!(source.page_calls().len(), 2);
    assert_eq!(store.batches().len(), 1);
    assert!(store.document("tag-1").is_some());
}

#[tokio::test]
async fn test_transform_error_fails_whole_page() {
    let source = StubSource::new().with_pages(
        CollectionType::Tags,
        vec![vec![tag(1)], vec![tag(2), serde_json::json!({"id": "bad"}), tag(4)]],
    );
    let (pipeline, source, store) = pipeline(config(CollectionType::Tags), source);

    let stats = pipeline.run().await.unwrap();

    match stats.outcome {
        MigrationOutcome::Aborted { page, reason } => {
            assert_eq!(page, 2);
            assert!(reason.contains("bad"));
        }
        other => panic!("expected abort, got {:?}", other),
    }
    assert_eq!(source.page_calls().len(), 2);
    assert!(store.document("tag-2").is_none());
    assert!(store.document("tag-4").is_none());
    assert_eq!(store.batches().len(), 1);
}

#[tokio::test]
async fn test_commit_error_aborts() {
    let source = StubSource::new().with_pages(CollectionType::Tags, vec![vec![tag(1)]]);
    let (pipeline, source, store) = pipeline(config(CollectionType::Tags), source);
    store.fail_commits(true);

    let stats = pipeline.run().await.unwrap();

    assert!(matches!(stats.outcome, MigrationOutcome::Aborted { page: 1, .. }));
    assert_eq!(source.page_calls().len(), 1);
}

#[tokio::test]
async fn test_author_no_match_fetches_nothing() {
    let mut config = config(CollectionType::Posts);
    config.options.author = Some(AuthorFilter {
        id: None,
        names: vec!["Nobody".to_string()],
    });
    let source = StubSource::new()
        .with_users(vec![WpUser {
            id: 3,
            name: Some("Jane".to_string()),
            ..Default::default()
        }])
        .with_pages(CollectionType::Posts, vec![vec![post(1, "<p>x</p>")]]);
    let (pipeline, source, store) = pipeline(config, source);

    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.outcome, MigrationOutcome::AuthorNotFound);
    assert_eq!(stats.fetch_calls, 0);
    assert!(source.page_calls().is_empty());
    assert!(store.batches().is_empty());
}

#[tokio::test]
async fn test_resolved_author_filters_posts_only() {
    let mut config = config(CollectionType::Posts);
    config.options.author = Some(AuthorFilter {
        id: None,
        names: vec!["jane".to_string()],
    });
    let source = StubSource::new()
        .with_users(vec![WpUser {
            id: 3,
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        }])
        .with_pages(CollectionType::Posts, vec![vec![post(1, "<p>x</p>")]]);
    let (pipeline, source, _) = pipeline(config, source);

    pipeline.run().await.unwrap();

    assert_eq!(
        source.page_calls()[0],
        PageCall {
            collection: CollectionType::Posts,
            page: 1,
            author: Some(3),
        }
    );
}

#[tokio::test]
async fn test_author_filter_ignored_for_other_collections() {
    let mut config = config(CollectionType::Categories);
    config.options.author = Some(AuthorFilter {
        id: None,
        names: vec!["Nobody".to_string()],
    });
    let source = StubSource::new().with_pages(CollectionType::Categories, vec![vec![tag(7)]]);
    let (pipeline, source, store) = pipeline(config, source);

    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.outcome, MigrationOutcome::Completed);
    assert!(source.page_calls().iter().all(|c| c.author.is_none()));
    assert!(store.document("category-7").is_some());
}

#[tokio::test]
async fn test_shared_image_uploaded_once_across_posts() {
    let body = format!("<p>Chart below</p>{}", figure("chart-1024x768.png"));
    let source = StubSource::new()
        .with_media(vec![media(50, "chart")])
        .with_pages(
            CollectionType::Posts,
            vec![vec![post(1, &body), post(2, &body)], vec![post(3, &body)]],
        );
    let (pipeline, source, store) = pipeline(config(CollectionType::Posts), source);

    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.documents, 3);
    assert_eq!(store.uploads(), vec![50]);
    assert_eq!(source.media_fetches(), vec![50]);

    let asset_of = |id: &str| {
        store.document(id).unwrap()["content"][1]["asset"]["_ref"]
            .as_str()
            .unwrap()
            .to_string()
    };
    assert_eq!(asset_of("post-1"), asset_of("post-2"));
    assert_eq!(asset_of("post-1"), asset_of("post-3"));
}

#[tokio::test]
async fn test_preseeded_assets_are_not_uploaded_again() {
    let body = figure("chart.png");
    let source = Arc::new(
        StubSource::new()
            .with_media(vec![media(50, "chart")])
            .with_pages(CollectionType::Posts, vec![vec![post(1, &body)]]),
    );
    let store = Arc::new(MemoryStore::with_assets(vec![ExistingAsset {
        asset_id: "image-old-10x10-png".to_string(),
        source_id: 50,
    }]));
    let pipeline = Pipeline::with_connectors(config(CollectionType::Posts), source, store.clone());

    pipeline.run().await.unwrap();

    assert!(store.uploads().is_empty());
    assert_eq!(
        store.document("post-1").unwrap()["content"][0]["asset"]["_ref"],
        "image-old-10x10-png"
    );
    assert_eq!(pipeline.media_cache().len(), 1);
}

#[tokio::test]
async fn test_post_documents_carry_references() {
    let source = StubSource::new()
        .with_pages(CollectionType::Posts, vec![vec![post(123, "<p>Hello</p>")]]);
    let (pipeline, _, store) = pipeline(config(CollectionType::Posts), source);

    pipeline.run().await.unwrap();

    let doc = store.document("post-123").unwrap();
    assert_eq!(doc["_type"], "post");
    assert_eq!(doc["author"]["_ref"], "author-3");
    assert_eq!(doc["categories"][0]["_ref"], "category-7");
    assert_eq!(doc["tags"][0]["_ref"], "tag-3");
    assert!(doc["categories"][0]["_key"].is_string());
    assert_eq!(doc["sticky"], false);
    assert!(doc.get("_createdAt").is_none());
}

#[tokio::test]
async fn test_page_transforms_respect_worker_bound() {
    let mut config = config(CollectionType::Posts);
    config.options.workers = 3;
    let items: Vec<_> = (1..=8).map(|i| media(i, &format!("photo{}", i))).collect();
    let records: Vec<_> = (1..=8)
        .map(|i| post(i, &figure(&format!("photo{}.jpg", i))))
        .collect();
    let source = StubSource::new()
        .with_media(items)
        .with_lookup_delay(Duration::from_millis(20))
        .with_pages(CollectionType::Posts, vec![records]);
    let (pipeline, source, store) = pipeline(config, source);

    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.documents, 8);
    assert_eq!(store.uploads().len(), 8);
    // One image per post, so overlapping lookups count overlapping transforms.
    assert_eq!(source.peak_lookups(), 3);
}

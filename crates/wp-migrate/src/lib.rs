// Migration tool - pedantic lints relaxed for CLI ergonomics
#![allow(clippy::pedantic)]

//! # WordPress to Sanity Migration Tool
//!
//! `wp-migrate` is a CLI tool and library for moving WordPress content into
//! a Sanity dataset, one collection at a time.
//!
//! ## Supported Collections
//!
//! | Collection | Document type | Notes |
//! |------------|---------------|-------|
//! | `posts` | `post` | Body converted to portable text, images uploaded |
//! | `pages` | `page` | |
//! | `categories` | `category` | |
//! | `tags` | `tag` | |
//! | `users` | `author` | |
//!
//! Document ids are `<type>-<wordpress id>`, so re-running a migration
//! replaces documents instead of duplicating them, and references resolve
//! whatever order collections are migrated in.
//!
//! ## Quick Start
//!
//! ```bash
//! # Migrate categories, then posts
//! wp-migrate run --config migration.yaml --collection categories
//! wp-migrate run --config migration.yaml --collection posts
//!
//! # Dry run (stage in memory only)
//! wp-migrate --config migration.yaml --dry-run
//! ```
//!
//! ## Configuration Example
//!
//! ```yaml
//! source:
//!   base_url: https://example.com/wp-json/wp/v2
//!
//! destination:
//!   project_id: abc123
//!   dataset: production
//!
//! options:
//!   collection: posts
//!   workers: 5
//!   author:
//!     names: [Editorial]
//! ```

#![warn(missing_docs)]

pub mod author;
pub mod concurrency;
pub mod config;
pub mod connectors;
pub mod error;
pub mod media;
pub mod model;
pub mod pipeline;
pub mod richtext;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use author::AuthorResolver;
pub use config::{AuthorFilter, MigrationConfig, MigrationOptions, SourceConfig};
pub use connectors::{ContentSource, DocumentStore, Mutation};
pub use error::{Error, Result};
pub use media::{MediaCache, MediaResolver};
pub use model::{CollectionType, PortableBlock, StagedDocument};
pub use pipeline::{MigrationOutcome, MigrationStats, Pipeline};
pub use transform::{transformer_for, RecordTransformer, TransformContext};

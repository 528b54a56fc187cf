//! Configuration types for wp-migrate.

use serde::{Deserialize, Serialize};

use crate::connectors::common::validate_url;
use crate::error::{Error, Result};
use crate::model::CollectionType;

/// Largest page size the WordPress REST API accepts.
pub const MAX_PER_PAGE: usize = 100;

/// Main migration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// WordPress source configuration.
    pub source: SourceConfig,
    /// Sanity destination configuration.
    pub destination: DestinationConfig,
    /// Migration options.
    #[serde(default)]
    pub options: MigrationOptions,
}

/// WordPress REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the REST namespace (e.g. `https://example.com/wp-json/wp/v2`).
    pub base_url: String,
    /// Records requested per page.
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

/// Sanity destination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Sanity project id.
    #[serde(default)]
    pub project_id: String,
    /// Dataset name.
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// API token with write access.
    pub token: Option<String>,
    /// API version, without the leading `v`.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Override for the API host (defaults to `https://<project_id>.api.sanity.io`).
    pub api_host: Option<String>,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: default_dataset(),
            token: None,
            api_version: default_api_version(),
            api_host: None,
        }
    }
}

impl DestinationConfig {
    /// Returns the API host, derived from the project id unless overridden.
    #[must_use]
    pub fn host(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }
}

/// Author filter applied to the `posts` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorFilter {
    /// Known WordPress user id; tried before the name search.
    pub id: Option<u64>,
    /// Name variants matched against user name, slug and description.
    #[serde(default)]
    pub names: Vec<String>,
}

impl AuthorFilter {
    /// Whether the filter names anything to look up.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.names.iter().all(|n| n.trim().is_empty())
    }
}

/// Migration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Collection type to migrate.
    #[serde(default)]
    pub collection: CollectionType,
    /// Concurrent record transforms per page.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Concurrent image resolutions per document body.
    #[serde(default = "default_image_concurrency")]
    pub image_concurrency: usize,
    /// Seed the media cache from assets already in the dataset.
    #[serde(default = "default_true")]
    pub preseed_media_cache: bool,
    /// Dry run mode (stage documents in memory only).
    #[serde(default)]
    pub dry_run: bool,
    /// Show a progress spinner.
    #[serde(default = "default_true")]
    pub progress: bool,
    /// Restrict posts to a single author.
    pub author: Option<AuthorFilter>,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            collection: CollectionType::default(),
            workers: default_workers(),
            image_concurrency: default_image_concurrency(),
            preseed_media_cache: true,
            dry_run: false,
            progress: true,
            author: None,
        }
    }
}

fn default_per_page() -> usize {
    MAX_PER_PAGE
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "2021-06-07".to_string()
}

fn default_workers() -> usize {
    5
}

fn default_image_concurrency() -> usize {
    2
}

fn default_true() -> bool {
    true
}

impl MigrationConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.source.base_url)?;

        if self.source.per_page == 0 || self.source.per_page > MAX_PER_PAGE {
            return Err(Error::Config(format!(
                "per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }
        if self.options.workers == 0 {
            return Err(Error::Config("workers must be greater than 0".to_string()));
        }
        if self.options.image_concurrency == 0 {
            return Err(Error::Config(
                "image_concurrency must be greater than 0".to_string(),
            ));
        }

        if !self.options.dry_run {
            if let Some(host) = &self.destination.api_host {
                validate_url(host)?;
            } else if self.destination.project_id.is_empty() {
                return Err(Error::Config("project_id cannot be empty".to_string()));
            }
            if self.destination.dataset.is_empty() {
                return Err(Error::Config("dataset cannot be empty".to_string()));
            }
            if self.destination.token.as_deref().unwrap_or("").is_empty() {
                return Err(Error::Config(
                    "a destination token is required unless dry_run is set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

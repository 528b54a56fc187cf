//! WordPress REST API (`wp/v2`) connector.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::connectors::common::{create_http_client, json_type_name, validate_url};
use crate::connectors::ContentSource;
use crate::error::{Error, Result};
use crate::model::{CollectionType, WpMedia, WpUser};

/// WordPress REST connector.
pub struct WordPressConnector {
    config: SourceConfig,
    client: Client,
}

impl WordPressConnector {
    /// Creates a new WordPress connector with configured HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not a valid http(s) URL.
    pub fn new(config: SourceConfig) -> Result<Self> {
        validate_url(&config.base_url)?;
        Ok(Self {
            config,
            client: create_http_client(),
        })
    }

    /// Builds an endpoint URL below the configured base.
    fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let raw = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        url.map_err(|e| Error::Config(format!("Invalid WordPress URL '{}': {}", raw, e)))
    }

    /// Builds the page URL for a collection.
    fn build_page_url(
        &self,
        collection: CollectionType,
        page: u32,
        author: Option<u64>,
    ) -> Result<Url> {
        let mut params = vec![
            ("page", page.to_string()),
            ("per_page", self.config.per_page.to_string()),
        ];
        if let Some(author) = author.filter(|_| collection.supports_author_filter()) {
            params.push(("author", author.to_string()));
        }
        self.build_url(collection.as_str(), &params)
    }

    /// GETs `url` and decodes the body; `None` on a non-success status.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::SourceConnection(format!("WordPress request failed: {}", e)))?;

        if !response.status().is_success() {
            debug!("WordPress answered {} for {}", response.status(), url);
            return Ok(None);
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| Error::Extraction(format!("Failed to parse response from {}: {}", url, e)))?;

        Ok(Some(body))
    }
}

#[async_trait]
impl ContentSource for WordPressConnector {
    fn source_type(&self) -> &'static str {
        "wordpress"
    }

    async fn fetch_page(
        &self,
        collection: CollectionType,
        page: u32,
        author: Option<u64>,
    ) -> Result<Option<Vec<serde_json::Value>>> {
        let url = self.build_page_url(collection, page, author)?;

        match self.get_json::<serde_json::Value>(url).await? {
            Some(serde_json::Value::Array(records)) => Ok(Some(records)),
            Some(other) => {
                warn!(
                    "Expected an array for {} page {}, got {}",
                    collection,
                    page,
                    json_type_name(&other)
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn list_users(&self, per_page: usize) -> Result<Option<Vec<WpUser>>> {
        let url = self.build_url("users", &[("per_page", per_page.to_string())])?;
        self.get_json(url).await
    }

    async fn fetch_user(&self, id: u64) -> Result<Option<WpUser>> {
        let url = self.build_url(&format!("users/{}", id), &[])?;
        self.get_json(url).await
    }

    async fn find_media_by_slug(&self, slug: &str) -> Result<Option<Vec<WpMedia>>> {
        let url = self.build_url("media", &[("slug", slug.to_string())])?;
        self.get_json(url).await
    }

    async fn fetch_media(&self, id: u64) -> Result<Option<WpMedia>> {
        let url = self.build_url(&format!("media/{}", id), &[])?;
        self.get_json(url).await
    }
}

#[cfg(test)]
#[path = "wordpress_tests.rs"]
mod tests;

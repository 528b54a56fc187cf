//! Sanity HTTP API connector.
//!
//! Uses three endpoints: `data/mutate` for document batches, `assets/images`
//! for uploads and `data/query` to list assets uploaded by earlier runs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::DestinationConfig;
use crate::connectors::common::{create_http_client, error_body, handle_http_error};
use crate::connectors::{DocumentStore, ExistingAsset, Mutation};
use crate::error::{Error, Result};
use crate::model::WpMedia;

/// `source.name` recorded on every uploaded asset.
pub const ASSET_SOURCE_NAME: &str = "wordpress";

/// GROQ query listing assets uploaded from WordPress.
const EXISTING_ASSETS_QUERY: &str = r#"*[_type == "sanity.imageAsset" && source.name == "wordpress" && defined(source.id)]{_id, "sourceId": source.id}"#;

#[derive(Debug, Serialize)]
struct MutateRequest<'a> {
    mutations: &'a [Mutation],
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    document: AssetDocument,
}

#[derive(Debug, Deserialize)]
struct AssetDocument {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Vec<AssetRow>,
}

#[derive(Debug, Deserialize)]
struct AssetRow {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "sourceId")]
    source_id: Option<serde_json::Value>,
}

/// Sanity dataset store.
pub struct SanityStore {
    config: DestinationConfig,
    client: Client,
}

impl SanityStore {
    /// Creates a new Sanity store with configured HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is empty.
    pub fn new(config: DestinationConfig) -> Result<Self> {
        if config.dataset.is_empty() {
            return Err(Error::Config("dataset cannot be empty".to_string()));
        }
        Ok(Self {
            config,
            client: create_http_client(),
        })
    }

    /// Builds a versioned API URL.
    fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let raw = format!(
            "{}/v{}/{}/{}",
            self.config.host(),
            self.config.api_version,
            path,
            self.config.dataset
        );
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        url.map_err(|e| Error::Config(format!("Invalid Sanity URL '{}': {}", raw, e)))
    }

    /// Attaches the bearer token, if any.
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Query parameters describing an upload.
    fn upload_params(media: &WpMedia, source_url: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sourceName", ASSET_SOURCE_NAME.to_string()),
            ("sourceId", media.id.to_string()),
            ("sourceUrl", source_url.to_string()),
        ];
        if let Some(filename) = source_url
            .rsplit('/')
            .next()
            .map(|name| name.split('?').next().unwrap_or(name))
            .filter(|name| !name.is_empty())
        {
            params.push(("filename", filename.to_string()));
        }
        if let Some(title) = media
            .title
            .as_ref()
            .map(|t| crate::transform::text::clean_text(&t.rendered))
            .filter(|t| !t.is_empty())
        {
            params.push(("title", title));
        }
        if let Some(alt) = media.alt_text.as_deref().filter(|a| !a.trim().is_empty()) {
            params.push(("description", alt.trim().to_string()));
        }
        params
    }
}

#[async_trait]
impl DocumentStore for SanityStore {
    fn store_type(&self) -> &'static str {
        "sanity"
    }

    async fn commit(&self, mutations: Vec<Mutation>) -> Result<()> {
        if mutations.is_empty() {
            return Ok(());
        }

        let url = self.build_url("data/mutate", &[])?;
        debug!("Committing {} mutations to {}", mutations.len(), url);

        let response = self
            .authorize(self.client.post(url))
            .json(&MutateRequest {
                mutations: &mutations,
            })
            .send()
            .await
            .map_err(|e| Error::Destination(format!("Sanity mutate request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = error_body(response).await;
            return Err(handle_http_error(status, &body, "Sanity", Error::Destination));
        }

        Ok(())
    }

    async fn upload_image(&self, media: &WpMedia) -> Result<String> {
        let source_url = media.source_url.as_deref().ok_or_else(|| {
            Error::Destination(format!("Media {} has no source_url", media.id))
        })?;

        let download = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(|e| Error::Destination(format!("Image download failed: {}", e)))?;

        if !download.status().is_success() {
            return Err(Error::Destination(format!(
                "Image download from {} answered {}",
                source_url,
                download.status()
            )));
        }

        let content_type = download
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| media.mime_type.clone())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let length = download.content_length();

        let url = self.build_url("assets/images", &Self::upload_params(media, source_url))?;
        debug!("Streaming media {} ({:?} bytes) to {}", media.id, length, url);

        let mut request = self
            .authorize(self.client.post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type);
        if let Some(length) = length {
            request = request.header(reqwest::header::CONTENT_LENGTH, length);
        }
        let response = request
            .body(reqwest::Body::wrap_stream(download.bytes_stream()))
            .send()
            .await
            .map_err(|e| Error::Destination(format!("Sanity upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = error_body(response).await;
            return Err(handle_http_error(status, &body, "Sanity", Error::Destination));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Destination(format!("Failed to parse upload response: {}", e)))?;

        Ok(uploaded.document.id)
    }

    async fn existing_assets(&self) -> Result<Vec<ExistingAsset>> {
        let url = self.build_url(
            "data/query",
            &[("query", EXISTING_ASSETS_QUERY.to_string())],
        )?;

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| Error::Destination(format!("Sanity query request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = error_body(response).await;
            return Err(handle_http_error(status, &body, "Sanity", Error::Destination));
        }

        let query: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::Destination(format!("Failed to parse query response: {}", e)))?;

        Ok(query
            .result
            .into_iter()
            .filter_map(|row| {
                let source_id = match row.source_id? {
                    serde_json::Value::Number(n) => n.as_u64()?,
                    serde_json::Value::String(s) => s.parse().ok()?,
                    _ => return None,
                };
                Some(ExistingAsset {
                    asset_id: row.id,
                    source_id,
                })
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "sanity_tests.rs"]
mod tests;

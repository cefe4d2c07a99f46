//! HTTP client for a PaperHive-compatible annotation API
//!
//! Endpoints are configured as URL templates in which `%s` marks the
//! position of the document (or document item) id, e.g.
//! `https://paperhive.org/api/documents/%s/discussions`.
//!
//! # Examples
//!
//! ```no_run
//! use docharvest_client::{ApiConfig, PaperhiveClient};
//! use docharvest_domain::traits::DocumentClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PaperhiveClient::new(ApiConfig::paperhive())?;
//! let threads = client.fetch_discussions("Bk0JXbqb").await?;
//! println!("{} threads", threads.len());
//! # Ok(())
//! # }
//! ```

use crate::wire::{DiscussionsResponse, DocumentItem, DocumentItemsResponse};
use async_trait::async_trait;
use docharvest_domain::traits::DocumentClient;
use docharvest_domain::{DiscussionThread, DocumentMetadata, FetchError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Default timeout for API requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Placeholder for ids in endpoint templates
pub const ID_PLACEHOLDER: &str = "%s";

/// Endpoint templates of the remote API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Items of a document by document id
    pub document_link_by_id: String,

    /// A single document item by item id
    pub document_link_by_item_id: String,

    /// Discussions of a document by document id
    pub discussions_link: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ApiConfig {
    /// Endpoints of the public paperhive.org instance
    pub fn paperhive() -> Self {
        Self {
            document_link_by_id: "https://paperhive.org/api/documents/%s/items".to_string(),
            document_link_by_item_id: "https://paperhive.org/api/documents/items/%s".to_string(),
            discussions_link: "https://paperhive.org/api/documents/%s/discussions".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Names of template fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("document_link_by_id", &self.document_link_by_id),
            ("document_link_by_item_id", &self.document_link_by_item_id),
            ("discussions_link", &self.discussions_link),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fill the first `%s` of a URL template with `id`
///
/// # Examples
///
/// ```
/// use docharvest_client::fill_template;
///
/// assert_eq!(
///     fill_template("https://example.org/documents/%s/discussions", "abc"),
///     "https://example.org/documents/abc/discussions"
/// );
/// ```
pub fn fill_template(template: &str, id: &str) -> String {
    template.replacen(ID_PLACEHOLDER, id, 1)
}

/// Remote document client backed by reqwest
///
/// Stateless apart from the connection pool, so a single instance is shared
/// by all concurrent scans. No retries and no caching.
pub struct PaperhiveClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl PaperhiveClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built
    /// (e.g. TLS backend initialization fails).
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// The configured endpoints
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// GET a URL and decode its JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(format!("Failed to parse response from {}: {}", url, e)))
    }
}

#[async_trait]
impl DocumentClient for PaperhiveClient {
    async fn fetch_document(&self, document_id: &str) -> Result<DocumentMetadata, FetchError> {
        let url = fill_template(&self.config.document_link_by_id, document_id);
        let response: DocumentItemsResponse = self.get_json(&url).await?;

        // The first item stands for the document
        response
            .document_items
            .into_iter()
            .next()
            .map(DocumentMetadata::from)
            .ok_or_else(|| FetchError::NotFound(format!("document {} has no items", document_id)))
    }

    async fn fetch_document_item(&self, item_id: &str) -> Result<DocumentMetadata, FetchError> {
        let url = fill_template(&self.config.document_link_by_item_id, item_id);
        let item: DocumentItem = self.get_json(&url).await?;
        Ok(item.into())
    }

    async fn fetch_discussions(
        &self,
        document_id: &str,
    ) -> Result<Vec<DiscussionThread>, FetchError> {
        let url = fill_template(&self.config.discussions_link, document_id);
        let response: DiscussionsResponse = self.get_json(&url).await?;
        Ok(response.discussions.into_iter().map(Into::into).collect())
    }
}

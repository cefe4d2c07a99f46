//! Binding to one remote annotation service instance

use docharvest_domain::traits::DocumentClient;
use docharvest_domain::SourceConfig;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Default adapter id
pub const DEFAULT_ADAPTER_ID: &str = "paperhive";

/// Static settings of an adapter
///
/// Loaded from the `[adapter]` section of the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterSettings {
    /// Adapter id; every source identifier created here carries it
    #[serde(default = "default_adapter_id")]
    pub id: String,

    /// Display name of the remote service, copied into every event
    pub name: String,

    /// Home page of the remote service, copied into every event
    pub home: String,

    /// Client URL of a document, `%s` marking the document id
    pub content_link: String,

    /// Default for [`SourceConfig::include_past_annotations`]
    #[serde(default = "default_include_past")]
    pub include_past_annotations: bool,
}

fn default_adapter_id() -> String {
    DEFAULT_ADAPTER_ID.to_string()
}

fn default_include_past() -> bool {
    true
}

impl AdapterSettings {
    /// Settings for the public paperhive.org instance
    pub fn paperhive() -> Self {
        Self {
            id: default_adapter_id(),
            name: "PaperHive".to_string(),
            home: "https://paperhive.org".to_string(),
            content_link: "https://paperhive.org/documents/%s".to_string(),
            include_past_annotations: true,
        }
    }

    /// Names of mandatory fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("id", &self.id),
            ("name", &self.name),
            ("home", &self.home),
            ("content_link", &self.content_link),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Source configuration applied to newly resolved sources
    pub fn default_source_config(&self) -> SourceConfig {
        SourceConfig {
            include_past_annotations: self.include_past_annotations,
        }
    }
}

/// Settings plus the injected remote client
///
/// Shared (behind an `Arc`) by every tracked source of this adapter.
pub struct Adapter {
    settings: AdapterSettings,
    client: Arc<dyn DocumentClient>,
}

impl Adapter {
    /// Bind settings to a client
    pub fn new(settings: AdapterSettings, client: Arc<dyn DocumentClient>) -> Self {
        Self { settings, client }
    }

    /// Adapter id
    pub fn id(&self) -> &str {
        &self.settings.id
    }

    /// Static settings
    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    /// Remote client
    pub fn client(&self) -> &dyn DocumentClient {
        self.client.as_ref()
    }

    /// Client URL of a document
    pub fn content_link(&self, document_id: &str) -> String {
        self.settings.content_link.replacen("%s", document_id, 1)
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

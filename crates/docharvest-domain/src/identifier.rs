//! Identity of tracked sources and their persisted form

use crate::{Decoration, Watermark};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store key of a tracked source
///
/// New keys are UUIDv7 strings, so they sort by creation time. Keys coming
/// back from a store are taken as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Generate a fresh UUIDv7-based key
    ///
    /// # Examples
    ///
    /// ```
    /// use docharvest_domain::SourceId;
    ///
    /// let a = SourceId::new();
    /// let b = SourceId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing key
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Borrow the key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque key of a document in the remote system
///
/// Immutable once a source is created. Construction-time checks (adapter
/// match, non-empty document id) are enforced by the source layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceIdentifier {
    /// Id of the adapter that owns this source
    pub adapter_id: String,

    /// Remote document id
    pub document_id: String,
}

impl SourceIdentifier {
    /// Create a new identifier
    pub fn new(adapter_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            document_id: document_id.into(),
        }
    }
}

/// Per-source override of the adapter's defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Emit everything already on the document on the first scan
    ///
    /// When false, the first scan only establishes a watermark and nothing
    /// that existed before it is reported.
    pub include_past_annotations: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            include_past_annotations: true,
        }
    }
}

/// Persisted state of one tracked source
///
/// This is what a [`crate::traits::SourceStore`] keeps; the source layer turns
/// it back into a live tracked source bound to an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Store key
    pub id: SourceId,

    /// Remote identity
    pub identifier: SourceIdentifier,

    /// Display metadata
    pub decoration: Decoration,

    /// Last successful scan
    #[serde(default)]
    pub watermark: Watermark,

    /// Per-source configuration
    #[serde(default)]
    pub config: SourceConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_display() {
        let id = SourceId::from_string("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn test_new_source_ids_are_uuids() {
        let id = SourceId::new();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_default_config_includes_past() {
        assert!(SourceConfig::default().include_past_annotations);
    }

    #[test]
    fn test_record_defaults_when_fields_missing() {
        let json = r#"{
            "id": "src-1",
            "identifier": { "adapter_id": "paperhive", "document_id": "doc-1" },
            "decoration": { "title": "T", "details": "D", "image": null }
        }"#;

        let record: SourceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.watermark, Watermark::Unset);
        assert!(record.config.include_past_annotations);
        assert_eq!(record.identifier.document_id, "doc-1");
    }
}

//! Tracked source: one remote document under observation

use crate::decoration::document_to_decoration;
use crate::scan::{collect_new_items, EventContext, ScanOutcome};
use crate::{Adapter, Scannable, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docharvest_domain::{
    effective_watermark, Decoration, DocumentMetadata, SourceConfig, SourceId, SourceIdentifier,
    SourceRecord, SourceRef, Watermark,
};
use std::sync::Arc;

/// A remote document bound to its adapter, with watermark and decoration
///
/// Scanning mutates the watermark in place, so scans of one source are
/// serialized by taking `&mut self`. Callers that share a source across
/// tasks must guard it (the coordinator keeps one lock per source).
#[derive(Debug, Clone)]
pub struct TrackedSource {
    adapter: Arc<Adapter>,
    id: SourceId,
    identifier: SourceIdentifier,
    decoration: Decoration,
    watermark: Watermark,
    config: SourceConfig,
}

impl TrackedSource {
    /// Rehydrate a source from its persisted record
    ///
    /// # Errors
    ///
    /// - [`SourceError::MalformedIdentifier`] if the document id is empty
    /// - [`SourceError::AdapterMismatch`] if the record belongs to another adapter
    pub fn from_record(adapter: Arc<Adapter>, record: SourceRecord) -> Result<Self, SourceError> {
        if record.identifier.document_id.trim().is_empty() {
            return Err(SourceError::MalformedIdentifier(format!(
                "source {} has no document id",
                record.id
            )));
        }
        if record.identifier.adapter_id != adapter.id() {
            return Err(SourceError::AdapterMismatch {
                expected: adapter.id().to_string(),
                found: record.identifier.adapter_id,
            });
        }

        Ok(Self {
            adapter,
            id: record.id,
            identifier: record.identifier,
            decoration: record.decoration,
            watermark: record.watermark,
            config: record.config,
        })
    }

    /// Create a fresh, never scanned source for a fetched document
    ///
    /// Uses the adapter's default source configuration.
    pub fn from_document(
        adapter: Arc<Adapter>,
        document: &DocumentMetadata,
    ) -> Result<Self, SourceError> {
        let record = SourceRecord {
            id: SourceId::new(),
            identifier: SourceIdentifier::new(adapter.id(), document.document_id.clone()),
            decoration: document_to_decoration(Some(document)),
            watermark: Watermark::Unset,
            config: adapter.settings().default_source_config(),
        };
        Self::from_record(adapter, record)
    }

    /// Store key
    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Remote identity
    pub fn identifier(&self) -> &SourceIdentifier {
        &self.identifier
    }

    /// Current decoration
    pub fn decoration(&self) -> &Decoration {
        &self.decoration
    }

    /// Last committed watermark
    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    /// Per-source configuration
    pub fn config(&self) -> SourceConfig {
        self.config
    }

    /// Public identity used as event attribution
    pub fn source_ref(&self) -> SourceRef {
        SourceRef {
            id: self.id.clone(),
            identifier: self.identifier.clone(),
            decoration: self.decoration.clone(),
        }
    }

    /// Persistable snapshot
    pub fn to_record(&self) -> SourceRecord {
        SourceRecord {
            id: self.id.clone(),
            identifier: self.identifier.clone(),
            decoration: self.decoration.clone(),
            watermark: self.watermark,
            config: self.config,
        }
    }

    fn event_context(&self) -> EventContext {
        let settings = self.adapter.settings();
        EventContext {
            source_name: settings.name.clone(),
            source_home: settings.home.clone(),
            content_link: settings.content_link.clone(),
            source: self.source_ref(),
        }
    }

    /// Fetch the discussion tree and report everything new since the last scan
    ///
    /// The next watermark is the time the scan *started*, so an edit landing
    /// while the fetch is in flight is looked at again next time. It is
    /// committed only after the tree was processed; a failed or dropped scan
    /// leaves the watermark as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Fetch`] if the discussions cannot be read.
    pub async fn scan(&mut self) -> Result<ScanOutcome, SourceError> {
        self.scan_at(Utc::now()).await
    }

    /// [`TrackedSource::scan`] with an explicit scan start time
    pub async fn scan_at(&mut self, now: DateTime<Utc>) -> Result<ScanOutcome, SourceError> {
        let effective = effective_watermark(
            self.watermark,
            self.config.include_past_annotations,
            now,
        );

        let threads = self
            .adapter
            .client()
            .fetch_discussions(&self.identifier.document_id)
            .await?;

        let events = collect_new_items(&threads, effective, &self.event_context());
        let replies_seen = threads.iter().map(|t| t.replies.len()).sum();

        self.watermark = self.watermark.advance(now);

        tracing::debug!(
            source_id = %self.id,
            document_id = %self.identifier.document_id,
            threads = threads.len(),
            replies = replies_seen,
            new_items = events.len(),
            "Scan classified discussion tree"
        );

        Ok(ScanOutcome {
            events,
            watermark: self.watermark,
            threads_seen: threads.len(),
            replies_seen,
        })
    }

    /// Check that the document's discussions are readable
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Validation`] wrapping the fetch failure.
    pub async fn validate(&self) -> Result<(), SourceError> {
        self.adapter
            .client()
            .fetch_discussions(&self.identifier.document_id)
            .await
            .map(|_| ())
            .map_err(|cause| SourceError::Validation {
                document_id: self.identifier.document_id.clone(),
                cause,
            })
    }

    /// Re-fetch the document and recompute the decoration
    ///
    /// Best effort: an unreachable document degrades the decoration to
    /// [`Decoration::broken`] instead of failing.
    pub async fn refresh_decoration(&mut self) -> &Decoration {
        let document = match self
            .adapter
            .client()
            .fetch_document(&self.identifier.document_id)
            .await
        {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(
                    source_id = %self.id,
                    document_id = %self.identifier.document_id,
                    "Decoration refresh failed: {}",
                    e
                );
                None
            }
        };

        self.decoration = document_to_decoration(document.as_ref());
        &self.decoration
    }
}

#[async_trait]
impl Scannable for TrackedSource {
    async fn scan(&mut self) -> Result<ScanOutcome, SourceError> {
        TrackedSource::scan(self).await
    }

    async fn validate(&self) -> Result<(), SourceError> {
        TrackedSource::validate(self).await
    }
}

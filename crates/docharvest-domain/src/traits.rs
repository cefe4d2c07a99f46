//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the harvesting engine and
//! infrastructure. Implementations live in other crates or in the host.

use crate::{
    Decoration, DiscussionThread, DocumentMetadata, FetchError, HarvestEvent, SourceId,
    SourceRecord, Watermark,
};
use async_trait::async_trait;

/// Read access to the remote annotation service
///
/// Stateless request/response. Implementations must not cache, so that
/// staleness is bounded by the caller's poll interval only.
///
/// Implemented by the client layer (docharvest-client)
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Fetch a document's metadata by document id
    async fn fetch_document(&self, document_id: &str) -> Result<DocumentMetadata, FetchError>;

    /// Fetch a document's metadata by the id of one of its items
    async fn fetch_document_item(&self, item_id: &str) -> Result<DocumentMetadata, FetchError>;

    /// Fetch all discussion threads (with replies) of a document
    async fn fetch_discussions(&self, document_id: &str)
        -> Result<Vec<DiscussionThread>, FetchError>;
}

/// Persistence of tracked sources
///
/// Each call must be atomic for a single source. Nothing here needs to be
/// transactional across sources.
///
/// Implemented by the host (an in-memory store ships with docharvest-coordinator)
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Error type for store operations
    type Error: std::fmt::Display + Send;

    /// All stored sources
    async fn load_all(&self) -> Result<Vec<SourceRecord>, Self::Error>;

    /// One source by key
    async fn load_one(&self, id: &SourceId) -> Result<Option<SourceRecord>, Self::Error>;

    /// Register a new source
    async fn insert(&self, record: SourceRecord) -> Result<(), Self::Error>;

    /// Current watermark of a source
    async fn get_watermark(&self, id: &SourceId) -> Result<Watermark, Self::Error>;

    /// Persist a watermark after a successful scan
    async fn set_watermark(&self, id: &SourceId, watermark: Watermark) -> Result<(), Self::Error>;

    /// Persist a refreshed decoration
    async fn set_decoration(&self, id: &SourceId, decoration: Decoration)
        -> Result<(), Self::Error>;
}

/// Consumer of harvested events
///
/// Delivery is synchronous from the scan's point of view: an event handed
/// to `deliver` counts as emitted.
pub trait EventSink: Send + Sync {
    /// Hand one event to the consumer
    fn deliver(&self, event: HarvestEvent);
}

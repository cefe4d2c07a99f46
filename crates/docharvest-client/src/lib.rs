//! Docharvest Remote Document Client
//!
//! Implementations of the `DocumentClient` trait from `docharvest-domain`.
//!
//! # Clients
//!
//! - `PaperhiveClient`: HTTP client for a PaperHive-compatible API
//! - `MockClient`: Deterministic in-memory client for testing
//!
//! # Examples
//!
//! ```
//! use docharvest_client::MockClient;
//! use docharvest_domain::DocumentMetadata;
//!
//! let client = MockClient::new();
//! client.add_document(DocumentMetadata {
//!     document_id: "doc-1".to_string(),
//!     item_id: Some("item-1".to_string()),
//!     ..Default::default()
//! });
//! assert_eq!(client.document_count(), 1);
//! ```

#![warn(missing_docs)]

pub mod paperhive;
mod wire;

use async_trait::async_trait;
use docharvest_domain::traits::DocumentClient;
use docharvest_domain::{DiscussionThread, DocumentMetadata, FetchError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

pub use paperhive::{fill_template, ApiConfig, PaperhiveClient};

#[derive(Debug, Default)]
struct MockState {
    documents: HashMap<String, DocumentMetadata>,
    discussions: HashMap<String, Vec<DiscussionThread>>,
    failing: HashSet<String>,
    calls: usize,
}

/// In-memory document client for deterministic testing
///
/// Documents are looked up by document id or item id. Discussions default to
/// an empty list for known documents. Any id marked with [`MockClient::fail`]
/// answers with a transport error. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a document (reachable by document id and by item id)
    pub fn add_document(&self, document: DocumentMetadata) {
        let mut state = self.state();
        state
            .discussions
            .entry(document.document_id.clone())
            .or_default();
        state.documents.insert(document.document_id.clone(), document);
    }

    /// Replace the discussion tree of a document
    pub fn set_discussions(&self, document_id: impl Into<String>, threads: Vec<DiscussionThread>) {
        self.state().discussions.insert(document_id.into(), threads);
    }

    /// Make every request for `id` (document or item id) fail
    pub fn fail(&self, id: impl Into<String>) {
        self.state().failing.insert(id.into());
    }

    /// Undo [`MockClient::fail`]
    pub fn recover(&self, id: &str) {
        self.state().failing.remove(id);
    }

    /// Number of requests served (including failed ones)
    pub fn call_count(&self) -> usize {
        self.state().calls
    }

    /// Reset the request counter
    pub fn reset_call_count(&self) {
        self.state().calls = 0;
    }

    /// Number of registered documents
    pub fn document_count(&self) -> usize {
        self.state().documents.len()
    }

    fn begin(&self, id: &str) -> Result<MutexGuard<'_, MockState>, FetchError> {
        let mut state = self.state();
        state.calls += 1;
        if state.failing.contains(id) {
            return Err(FetchError::Transport(format!("mock failure for {}", id)));
        }
        Ok(state)
    }
}

#[async_trait]
impl DocumentClient for MockClient {
    async fn fetch_document(&self, document_id: &str) -> Result<DocumentMetadata, FetchError> {
        self.begin(document_id)?
            .documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: format!("mock://documents/{}", document_id),
            })
    }

    async fn fetch_document_item(&self, item_id: &str) -> Result<DocumentMetadata, FetchError> {
        self.begin(item_id)?
            .documents
            .values()
            .find(|d| d.item_id.as_deref() == Some(item_id))
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: format!("mock://documents/items/{}", item_id),
            })
    }

    async fn fetch_discussions(
        &self,
        document_id: &str,
    ) -> Result<Vec<DiscussionThread>, FetchError> {
        self.begin(document_id)?
            .discussions
            .get(document_id)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: format!("mock://documents/{}/discussions", document_id),
            })
    }
}

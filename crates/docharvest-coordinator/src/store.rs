//! In-memory source store
//!
//! Keeps records for the lifetime of the process. Hosts with real
//! persistence implement [`SourceStore`] themselves.

use async_trait::async_trait;
use docharvest_domain::traits::SourceStore;
use docharvest_domain::{Decoration, SourceId, SourceRecord, Watermark};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors of the in-memory store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryStoreError {
    /// No record under this key
    #[error("Unknown source: {0}")]
    UnknownSource(SourceId),

    /// A record with this key already exists
    #[error("Source already stored: {0}")]
    Duplicate(SourceId),
}

/// Source store backed by a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<SourceId, SourceRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sources
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Remove a source (tracking removed)
    pub async fn remove(&self, id: &SourceId) -> Option<SourceRecord> {
        self.records.write().await.remove(id)
    }
}

#[async_trait]
impl SourceStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn load_all(&self) -> Result<Vec<SourceRecord>, Self::Error> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn load_one(&self, id: &SourceId) -> Result<Option<SourceRecord>, Self::Error> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn insert(&self, record: SourceRecord) -> Result<(), Self::Error> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(MemoryStoreError::Duplicate(record.id));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_watermark(&self, id: &SourceId) -> Result<Watermark, Self::Error> {
        self.records
            .read()
            .await
            .get(id)
            .map(|r| r.watermark)
            .ok_or_else(|| MemoryStoreError::UnknownSource(id.clone()))
    }

    async fn set_watermark(&self, id: &SourceId, watermark: Watermark) -> Result<(), Self::Error> {
        self.records
            .write()
            .await
            .get_mut(id)
            .map(|r| r.watermark = watermark)
            .ok_or_else(|| MemoryStoreError::UnknownSource(id.clone()))
    }

    async fn set_decoration(
        &self,
        id: &SourceId,
        decoration: Decoration,
    ) -> Result<(), Self::Error> {
        self.records
            .write()
            .await
            .get_mut(id)
            .map(|r| r.decoration = decoration)
            .ok_or_else(|| MemoryStoreError::UnknownSource(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docharvest_domain::{SourceConfig, SourceIdentifier};

    fn record(id: &str) -> SourceRecord {
        SourceRecord {
            id: SourceId::from_string(id),
            identifier: SourceIdentifier::new("paperhive", format!("doc-{}", id)),
            decoration: Decoration::unknown(),
            watermark: Watermark::Unset,
            config: SourceConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let store = MemoryStore::new();
        store.insert(record("b")).await.unwrap();
        store.insert(record("a")).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id.as_str(), "a");

        let one = store.load_one(&SourceId::from_string("b")).await.unwrap();
        assert_eq!(one.unwrap().identifier.document_id, "doc-b");
        assert!(store
            .load_one(&SourceId::from_string("zzz"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert() {
        let store = MemoryStore::new();
        store.insert(record("a")).await.unwrap();
        assert_eq!(
            store.insert(record("a")).await,
            Err(MemoryStoreError::Duplicate(SourceId::from_string("a")))
        );
    }

    #[tokio::test]
    async fn test_watermark_roundtrip() {
        let store = MemoryStore::new();
        let id = SourceId::from_string("a");
        store.insert(record("a")).await.unwrap();
        assert_eq!(store.get_watermark(&id).await.unwrap(), Watermark::Unset);

        let mark = Watermark::At(chrono::Utc::now());
        store.set_watermark(&id, mark).await.unwrap();
        assert_eq!(store.get_watermark(&id).await.unwrap(), mark);
    }

    #[tokio::test]
    async fn test_unknown_source() {
        let store = MemoryStore::new();
        let id = SourceId::from_string("ghost");
        assert!(store.get_watermark(&id).await.is_err());
        assert!(store.set_watermark(&id, Watermark::Unset).await.is_err());
        assert!(store
            .set_decoration(&id, Decoration::broken())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryStore::new();
        store.insert(record("a")).await.unwrap();
        assert!(store.remove(&SourceId::from_string("a")).await.is_some());
        assert!(store.is_empty().await);
    }
}

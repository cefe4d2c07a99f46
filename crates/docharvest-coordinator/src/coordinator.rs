//! Harvest coordinator: drives scans of every tracked source
//!
//! Owns no per-source state besides the scan locks. Each scan loads the
//! source from the store after taking that source's lock, so a queued scan
//! always starts from the watermark committed by the one before it.

use crate::guards::ScanGuards;
use crate::lifecycle::TrackingRelation;
use crate::{CoordinatorConfig, CoordinatorError, HarvestMetrics};
use docharvest_domain::traits::{EventSink, SourceStore};
use docharvest_domain::{SourceId, SourceRecord, Watermark};
use docharvest_source::{guess, Adapter, Scannable, TrackedSource};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::task::{JoinHandle, JoinSet};

/// Result of one successful source scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Scanned source
    pub source_id: SourceId,

    /// Annotation events delivered
    pub annotations: usize,

    /// Reply events delivered
    pub replies: usize,

    /// Watermark persisted after the scan
    pub watermark: Watermark,
}

/// Result of one pass over all sources
#[derive(Debug, Default)]
pub struct PassReport {
    /// Sources scanned successfully
    pub scanned: Vec<ScanReport>,

    /// Sources whose scan failed, with the reason
    pub failed: Vec<(SourceId, CoordinatorError)>,
}

impl PassReport {
    /// Events delivered during the pass
    pub fn total_events(&self) -> usize {
        self.scanned.iter().map(|r| r.annotations + r.replies).sum()
    }

    /// Whether every source was scanned
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

struct Inner<S> {
    adapter: Arc<Adapter>,
    store: S,
    sink: Arc<dyn EventSink>,
    guards: ScanGuards,
    config: CoordinatorConfig,
    metrics: Mutex<HarvestMetrics>,
}

/// Scheduler-facing entry point of the harvesting engine
///
/// Cheap to clone; clones share store, sink, locks and metrics.
///
/// # Examples
///
/// ```no_run
/// use docharvest_client::{ApiConfig, PaperhiveClient};
/// use docharvest_coordinator::{CollectingSink, Coordinator, CoordinatorConfig, MemoryStore};
/// use docharvest_source::{Adapter, AdapterSettings};
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PaperhiveClient::new(ApiConfig::paperhive())?;
/// let adapter = Arc::new(Adapter::new(AdapterSettings::paperhive(), Arc::new(client)));
/// let coordinator = Coordinator::new(
///     adapter,
///     MemoryStore::new(),
///     Arc::new(CollectingSink::new()),
///     CoordinatorConfig::default(),
/// );
///
/// coordinator.track(&"Bk0JXbqb".into()).await?;
/// let report = coordinator.on_schedule().await?;
/// println!("{} events", report.total_events());
/// # Ok(())
/// # }
/// ```
pub struct Coordinator<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Coordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Coordinator<S>
where
    S: SourceStore + 'static,
{
    /// Create a coordinator
    pub fn new(
        adapter: Arc<Adapter>,
        store: S,
        sink: Arc<dyn EventSink>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                adapter,
                store,
                sink,
                guards: ScanGuards::new(),
                config,
                metrics: Mutex::new(HarvestMetrics::new()),
            }),
        }
    }

    /// The adapter all sources belong to
    pub fn adapter(&self) -> &Arc<Adapter> {
        &self.inner.adapter
    }

    /// The source store
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// The configuration
    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    fn metrics_mut(&self) -> MutexGuard<'_, HarvestMetrics> {
        self.inner
            .metrics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the metrics
    pub fn metrics(&self) -> HarvestMetrics {
        self.metrics_mut().clone()
    }

    /// Reset the metrics counters
    pub fn reset_metrics(&self) {
        self.metrics_mut().reset();
    }

    /// Resolve user input into a new source and store it
    ///
    /// The source is validated before it is stored; on any error nothing
    /// is stored. The first scan is left to the host's "tracking
    /// established" signal.
    pub async fn track(&self, input: &Value) -> Result<SourceRecord, CoordinatorError> {
        let source = guess(&self.inner.adapter, input).await?;
        let record = source.to_record();

        self.inner
            .store
            .insert(record.clone())
            .await
            .map_err(CoordinatorError::store)?;

        Ok(record)
    }

    /// Scan the relation's source once, in the background
    ///
    /// Returns `None` for relations whose source belongs to another adapter.
    /// The returned handle may be dropped; the scan runs regardless.
    pub fn on_tracking_established(
        &self,
        relation: &TrackingRelation,
    ) -> Option<JoinHandle<Result<ScanReport, CoordinatorError>>> {
        if relation.source.adapter != self.inner.adapter.id() {
            tracing::debug!(
                relation_id = %relation.id,
                adapter = %relation.source.adapter,
                "Ignoring relation of another adapter"
            );
            return None;
        }

        tracing::info!(
            relation_id = %relation.id,
            source_id = %relation.source.id,
            "Tracking established, scheduling first scan"
        );

        let this = self.clone();
        let source_id = relation.source.id.clone();
        Some(tokio::spawn(async move { this.scan_source(&source_id).await }))
    }

    /// Release resources of a source that is no longer tracked
    pub fn on_tracking_removed(&self, relation: &TrackingRelation) {
        if relation.source.adapter != self.inner.adapter.id() {
            return;
        }
        self.inner.guards.forget(&relation.source.id);
        tracing::info!(
            relation_id = %relation.id,
            source_id = %relation.source.id,
            "Tracking removed"
        );
    }

    /// Scheduled pass over every stored source
    pub async fn on_schedule(&self) -> Result<PassReport, CoordinatorError> {
        self.scan_all().await
    }

    /// Scan every stored source concurrently
    ///
    /// Failures are isolated: a failing source is reported in the
    /// [`PassReport`] and does not stop the others.
    ///
    /// # Errors
    ///
    /// Fails only if the list of sources cannot be loaded. A scan task that
    /// panics is reported as a failure of its source.
    pub async fn scan_all(&self) -> Result<PassReport, CoordinatorError> {
        let start = Instant::now();
        let records = self
            .inner
            .store
            .load_all()
            .await
            .map_err(CoordinatorError::store)?;

        tracing::info!(sources = records.len(), "Starting harvest pass");

        let mut tasks = JoinSet::new();
        let mut task_sources = HashMap::new();
        for record in records {
            let this = self.clone();
            let source_id = record.id.clone();
            let handle = tasks.spawn(async move {
                let result = this.scan_source(&record.id).await;
                (record.id, result)
            });
            task_sources.insert(handle.id(), source_id);
        }

        let mut report = PassReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(scan))) => report.scanned.push(scan),
                Ok((source_id, Err(e))) => report.failed.push((source_id, e)),
                Err(e) => {
                    // A panicking scan counts as that source's failure only
                    let Some(source_id) = task_sources.remove(&e.id()) else {
                        tracing::error!("Unknown scan task failed: {}", e);
                        continue;
                    };
                    tracing::error!(source_id = %source_id, "Scan task panicked: {}", e);
                    self.metrics_mut().record_failure(&source_id);
                    report
                        .failed
                        .push((source_id, CoordinatorError::Worker(e.to_string())));
                }
            }
        }

        self.metrics_mut().record_pass(start.elapsed().as_millis());

        tracing::info!(
            scanned = report.scanned.len(),
            failed = report.failed.len(),
            events = report.total_events(),
            "Harvest pass completed"
        );

        Ok(report)
    }

    /// Scan one source and deliver its new items
    ///
    /// Waits for any in-flight scan of the same source. The watermark is
    /// persisted only after every event was handed to the sink.
    pub async fn scan_source(&self, source_id: &SourceId) -> Result<ScanReport, CoordinatorError> {
        let result = self.scan_locked(source_id).await;

        match &result {
            Ok(report) => {
                self.metrics_mut().record_scan(report.annotations, report.replies);
                tracing::info!(
                    source_id = %source_id,
                    annotations = report.annotations,
                    replies = report.replies,
                    "Scan completed"
                );
            }
            Err(e) => {
                self.metrics_mut().record_failure(source_id);
                tracing::error!(source_id = %source_id, "Scan failed: {}", e);
            }
        }

        result
    }

    async fn scan_locked(&self, source_id: &SourceId) -> Result<ScanReport, CoordinatorError> {
        let _guard = self.inner.guards.acquire(source_id).await;
        let mut source = self.load_source(source_id).await?;

        let timeout = self.inner.config.scan_timeout();
        let outcome = tokio::time::timeout(timeout, Scannable::scan(&mut source))
            .await
            .map_err(|_| CoordinatorError::Timeout {
                source_id: source_id.clone(),
                secs: timeout.as_secs(),
            })??;

        let annotations = outcome.annotation_count();
        let replies = outcome.reply_count();
        for event in outcome.events {
            self.inner.sink.deliver(event);
        }

        self.inner
            .store
            .set_watermark(source_id, outcome.watermark)
            .await
            .map_err(CoordinatorError::store)?;

        Ok(ScanReport {
            source_id: source_id.clone(),
            annotations,
            replies,
            watermark: outcome.watermark,
        })
    }

    async fn load_source(&self, source_id: &SourceId) -> Result<TrackedSource, CoordinatorError> {
        let record = self
            .inner
            .store
            .load_one(source_id)
            .await
            .map_err(CoordinatorError::store)?
            .ok_or_else(|| CoordinatorError::SourceNotFound(source_id.clone()))?;

        Ok(TrackedSource::from_record(
            Arc::clone(&self.inner.adapter),
            record,
        )?)
    }

    /// Refresh and persist the decoration of every stored source
    ///
    /// Returns the number of decorations stored. Unreachable documents end up
    /// with the degraded decoration. A decoration that cannot be stored is
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails only if the list of sources cannot be loaded.
    pub async fn refresh_decorations(&self) -> Result<usize, CoordinatorError> {
        let records = self
            .inner
            .store
            .load_all()
            .await
            .map_err(CoordinatorError::store)?;

        let mut refreshed = 0;
        for record in records {
            let adapter = Arc::clone(&self.inner.adapter);
            let mut source = match TrackedSource::from_record(adapter, record) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Skipping unusable source record: {}", e);
                    continue;
                }
            };

            let decoration = source.refresh_decoration().await.clone();
            if let Err(e) = self.inner.store.set_decoration(source.id(), decoration).await {
                tracing::warn!(source_id = %source.id(), "Failed to store decoration: {}", e);
                continue;
            }
            refreshed += 1;
        }

        tracing::debug!(refreshed, "Decorations refreshed");
        Ok(refreshed)
    }
}

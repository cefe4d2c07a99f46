//! Docharvest Coordinator
//!
//! Scheduling and delivery around the tracked-source engine.
//!
//! # Overview
//!
//! The coordinator is responsible for:
//! - **Tracking**: resolving user input into stored sources
//! - **Scheduled passes**: scanning every stored source, one scan at a time per source
//! - **Delivery**: handing new annotations and replies to an [`EventSink`]
//! - **Watermarks**: persisting a source's watermark only after its events were delivered
//! - **Lifecycle**: scanning a source as soon as the host establishes tracking
//!
//! # Guarantees
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | Scan fails or times out | No events, stored watermark unchanged |
//! | Two scans of one source overlap | The second waits and starts from the first's watermark |
//! | One source fails during a pass | Other sources are scanned normally |
//! | Document unreachable during refresh | Decoration becomes "document broken" |
//!
//! # Usage
//!
//! ## One-time Pass
//!
//! ```no_run
//! use docharvest_coordinator::{Coordinator, CollectingSink, HarvestConfig, MemoryStore};
//! use docharvest_client::PaperhiveClient;
//! use docharvest_source::Adapter;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HarvestConfig::from_file("docharvest.toml")?;
//! let client = PaperhiveClient::new(config.api.clone())?;
//! let adapter = Arc::new(Adapter::new(config.adapter.clone(), Arc::new(client)));
//! let sink = Arc::new(CollectingSink::new());
//!
//! let coordinator = Coordinator::new(adapter, MemoryStore::new(), sink.clone(), config.coordinator);
//! coordinator.track(&"https://paperhive.org/documents/items/Bk0JXbqb".into()).await?;
//! coordinator.on_schedule().await?;
//! println!("{} events", sink.events().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Presets
//!
//! ```
//! use docharvest_coordinator::CoordinatorConfig;
//!
//! // Default: every 6 hours
//! let config = CoordinatorConfig::default();
//!
//! // Frequent: every 15 minutes, no decoration refresh
//! let config = CoordinatorConfig::frequent();
//!
//! // Relaxed: once a day
//! let config = CoordinatorConfig::relaxed();
//! ```
//!
//! [`EventSink`]: docharvest_domain::traits::EventSink

#![warn(missing_docs)]

mod config;
mod coordinator;
mod error;
mod guards;
mod lifecycle;
mod metrics;
mod sink;
mod store;
mod worker;

pub use config::{ConfigError, CoordinatorConfig, HarvestConfig};
pub use coordinator::{Coordinator, PassReport, ScanReport};
pub use error::CoordinatorError;
pub use guards::ScanGuards;
pub use lifecycle::{EndpointRef, LifecycleEvent, TrackingRelation};
pub use metrics::HarvestMetrics;
pub use sink::{ChannelSink, CollectingSink};
pub use store::{MemoryStore, MemoryStoreError};
pub use worker::HarvestWorker;

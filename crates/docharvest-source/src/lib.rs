//! Docharvest Tracked Sources
//!
//! The incremental change-detection engine: tracked sources, the scan
//! engine that classifies a discussion tree against a watermark, identity
//! resolution from user input, and decoration mapping.
//!
//! # Overview
//!
//! - **Resolve**: [`guess`] turns a URL or bare id into a validated [`TrackedSource`]
//! - **Scan**: [`TrackedSource::scan`] fetches the discussion tree and returns
//!   every thread and reply updated since the last successful scan
//! - **Refresh**: [`TrackedSource::refresh_decoration`] keeps display metadata
//!   in sync, degrading instead of failing
//!
//! # Watermark protocol
//!
//! | Watermark | `include_past_annotations` | Items reported |
//! |-----------|----------------------------|----------------|
//! | unset | true | everything |
//! | unset | false | nothing that existed before the scan |
//! | set | either | updated at or after the watermark |
//!
//! After a successful scan the watermark becomes the scan's start time.
//!
//! # Usage
//!
//! ```no_run
//! use docharvest_client::{ApiConfig, PaperhiveClient};
//! use docharvest_source::{guess_str, Adapter, AdapterSettings};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PaperhiveClient::new(ApiConfig::paperhive())?;
//! let adapter = Arc::new(Adapter::new(AdapterSettings::paperhive(), Arc::new(client)));
//!
//! let mut source = guess_str(&adapter, "https://paperhive.org/documents/items/Bk0JXbqb").await?;
//! let outcome = source.scan().await?;
//! println!("{} new items", outcome.events.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod adapter;
mod decoration;
mod error;
mod resolver;
mod scan;
mod source;

use async_trait::async_trait;

pub use adapter::{Adapter, AdapterSettings, DEFAULT_ADAPTER_ID};
pub use decoration::document_to_decoration;
pub use error::SourceError;
pub use resolver::{extract_identifier, guess, guess_str};
pub use scan::{collect_new_items, EventContext, ScanOutcome};
pub use source::TrackedSource;

/// Capability the host's registry invokes on a tracked endpoint
#[async_trait]
pub trait Scannable: Send + Sync {
    /// Report everything new since the last successful scan
    async fn scan(&mut self) -> Result<ScanOutcome, SourceError>;

    /// Check that the endpoint can currently be scanned
    async fn validate(&self) -> Result<(), SourceError>;
}

//! Docharvest Domain Layer
//!
//! Core data model and collaborator boundaries for harvesting discussion
//! threads and replies from a remote annotation service.
//!
//! ## Key Concepts
//!
//! - **Tracked Source**: a remote document paired with its watermark and decoration
//! - **Watermark**: the timestamp below which remote items count as already seen
//! - **Discussion Thread**: a top-level annotation on a document, with nested replies
//! - **Harvest Event**: the normalized annotation or reply handed to the consumer
//!
//! ## Architecture
//!
//! This crate holds no I/O. The remote API, the persistence layer and the event
//! consumer are expressed as traits in [`traits`]; their implementations live
//! in other crates (or in the host).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoration;
pub mod document;
pub mod error;
pub mod event;
pub mod identifier;
pub mod traits;
pub mod watermark;

// Re-exports for convenience
pub use decoration::Decoration;
pub use document::{Author, DiscussionThread, DocumentMetadata, Reply};
pub use error::FetchError;
pub use event::{Annotation, HarvestEvent, ReplyRecord, SourceRef};
pub use identifier::{SourceConfig, SourceId, SourceIdentifier, SourceRecord};
pub use watermark::{effective_watermark, Watermark};

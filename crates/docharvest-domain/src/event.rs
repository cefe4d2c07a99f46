//! Normalized events handed to the downstream consumer

use crate::{Decoration, SourceId, SourceIdentifier};
use serde::{Deserialize, Serialize};

/// Public identity of the tracked source an event came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Store key
    pub id: SourceId,

    /// Remote identity
    pub identifier: SourceIdentifier,

    /// Display metadata at the time of the scan
    pub decoration: Decoration,
}

/// A discussion thread, normalized for the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Remote thread id
    pub id: String,

    /// Display name of the remote service
    pub source_name: String,

    /// Home page of the remote service
    pub source_home: String,

    /// Thread title
    pub title: String,

    /// Author display name
    pub author: String,

    /// Text body
    pub body: String,

    /// Quoted passage the thread refers to
    pub respective_content: Option<String>,

    /// Link to the annotated content in the remote service
    pub original: String,
}

/// A reply, normalized for the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRecord {
    /// Remote reply id
    pub id: String,

    /// Remote id of the thread replied to
    pub parent_id: String,

    /// Display name of the remote service
    pub source_name: String,

    /// Home page of the remote service
    pub source_home: String,

    /// Author display name
    pub author: String,

    /// Text body
    pub body: String,

    /// Link to the annotated content in the remote service
    pub original: String,
}

/// One new item found by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HarvestEvent {
    /// A new or modified discussion thread
    Annotation {
        /// The thread
        annotation: Annotation,
        /// Where it came from
        source: SourceRef,
    },

    /// A new or modified reply
    Reply {
        /// The reply
        reply: ReplyRecord,
        /// Where it came from
        source: SourceRef,
    },
}

impl HarvestEvent {
    /// Remote id of the annotated item
    pub fn item_id(&self) -> &str {
        match self {
            HarvestEvent::Annotation { annotation, .. } => &annotation.id,
            HarvestEvent::Reply { reply, .. } => &reply.id,
        }
    }

    /// The source the item came from
    pub fn source(&self) -> &SourceRef {
        match self {
            HarvestEvent::Annotation { source, .. } | HarvestEvent::Reply { source, .. } => source,
        }
    }

    /// Whether this is an annotation event
    pub fn is_annotation(&self) -> bool {
        matches!(self, HarvestEvent::Annotation { .. })
    }
}

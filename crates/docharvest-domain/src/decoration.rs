//! Display metadata for tracked sources

use serde::{Deserialize, Serialize};

/// What a human sees about a tracked source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    /// Headline, usually the document title
    pub title: String,

    /// Secondary line, usually the first author or the publisher
    pub details: String,

    /// Optional image URL
    #[serde(default)]
    pub image: Option<String>,
}

impl Decoration {
    /// Create a decoration without an image
    pub fn new(title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            details: details.into(),
            image: None,
        }
    }

    /// Placeholder for a source whose document has not been looked at yet
    pub fn unknown() -> Self {
        Self::new("Unknown document", "unknown")
    }

    /// Degraded decoration for a document that could not be fetched
    pub fn broken() -> Self {
        Self::new("document broken", "something went wrong")
    }
}

impl Default for Decoration {
    fn default() -> Self {
        Self::unknown()
    }
}

//! Remote documents and their discussion trees
//!
//! These are transient: fetched on every scan and never stored.

use chrono::{DateTime, Utc};

/// An author as listed in the document metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Display name
    pub name: String,
}

/// Metadata of a remote document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentMetadata {
    /// Remote document id (the id discussions hang off)
    pub document_id: String,

    /// Id of the concrete document item (a revision or file of the document)
    pub item_id: Option<String>,

    /// Title, if the remote system knows one
    pub title: Option<String>,

    /// Authors in listed order
    pub authors: Vec<Author>,

    /// Publisher, if known
    pub publisher: Option<String>,
}

impl DocumentMetadata {
    /// Display name of the first author, if there is a non-empty one
    pub fn first_author_name(&self) -> Option<&str> {
        self.authors
            .first()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// A top-level discussion on a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionThread {
    /// Remote id
    pub id: String,

    /// Thread title
    pub title: String,

    /// Author display name
    pub author: String,

    /// Text body
    pub body: String,

    /// Last modification time
    pub updated_at: DateTime<Utc>,

    /// Quoted passage of the document the thread refers to
    pub target_quote: Option<String>,

    /// Document the thread is attached to
    pub root_document_id: String,

    /// Replies in API order
    pub replies: Vec<Reply>,
}

/// A reply nested under a discussion thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Remote id
    pub id: String,

    /// Id of the thread this reply belongs to
    pub parent_thread_id: String,

    /// Author display name
    pub author: String,

    /// Text body
    pub body: String,

    /// Last modification time
    pub updated_at: DateTime<Utc>,

    /// Document the reply is attached to
    pub document_id: String,
}

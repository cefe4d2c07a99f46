//! JSON shapes of the remote annotation API
//!
//! Deserialized leniently: optional display fields fall back to empty
//! values, while ids and timestamps are required.

use chrono::{DateTime, Utc};
use docharvest_domain::{Author, DiscussionThread, DocumentMetadata, Reply};
use serde::Deserialize;

/// `GET documents/{id}/items` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentItemsResponse {
    #[serde(default)]
    pub document_items: Vec<DocumentItem>,
}

/// One document item; also the body of `GET documents/items/{item_id}`
#[derive(Debug, Deserialize)]
pub(crate) struct DocumentItem {
    #[serde(default)]
    pub id: Option<String>,
    pub document: String,
    #[serde(default)]
    pub metadata: Option<DocumentItemMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DocumentItemMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<WireAuthor>,
    #[serde(default)]
    pub publisher: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAuthor {
    #[serde(default)]
    pub name: String,
}

/// `GET documents/{id}/discussions` response
#[derive(Debug, Deserialize)]
pub(crate) struct DiscussionsResponse {
    #[serde(default)]
    pub discussions: Vec<WireDiscussion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePerson {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireDiscussion {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: WirePerson,
    #[serde(default)]
    pub body: String,
    pub updated_at: DateTime<Utc>,
    pub target: WireTarget,
    #[serde(default)]
    pub replies: Vec<WireReply>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTarget {
    pub document: String,
    #[serde(default)]
    pub selectors: WireSelectors,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSelectors {
    #[serde(default)]
    pub text_quote: Option<WireTextQuote>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTextQuote {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireReply {
    pub id: String,
    #[serde(default)]
    pub discussion: Option<String>,
    #[serde(default)]
    pub author: WirePerson,
    #[serde(default)]
    pub body: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub document: Option<String>,
}

impl From<DocumentItem> for DocumentMetadata {
    fn from(item: DocumentItem) -> Self {
        let metadata = item.metadata.unwrap_or_default();
        DocumentMetadata {
            document_id: item.document,
            item_id: item.id,
            title: metadata.title,
            authors: metadata
                .authors
                .into_iter()
                .map(|a| Author { name: a.name })
                .collect(),
            publisher: metadata.publisher,
        }
    }
}

impl From<WireDiscussion> for DiscussionThread {
    fn from(d: WireDiscussion) -> Self {
        let thread_id = d.id;
        let root_document_id = d.target.document;

        // Replies without their own back-references inherit the thread's
        let replies = d
            .replies
            .into_iter()
            .map(|r| Reply {
                id: r.id,
                parent_thread_id: r.discussion.unwrap_or_else(|| thread_id.clone()),
                author: r.author.display_name,
                body: r.body,
                updated_at: r.updated_at,
                document_id: r.document.unwrap_or_else(|| root_document_id.clone()),
            })
            .collect();

        DiscussionThread {
            id: thread_id,
            title: d.title,
            author: d.author.display_name,
            body: d.body,
            updated_at: d.updated_at,
            target_quote: d.target.selectors.text_quote.map(|q| q.content),
            root_document_id,
            replies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discussions_parsing() {
        let json = r#"{
            "discussions": [
                {
                    "id": "t1",
                    "title": "Typo",
                    "author": { "displayName": "Ada" },
                    "body": "second paragraph",
                    "updatedAt": "2024-03-01T12:00:00.000Z",
                    "target": {
                        "document": "doc-1",
                        "selectors": { "textQuote": { "content": "teh" } }
                    },
                    "replies": [
                        {
                            "id": "r1",
                            "discussion": "t1",
                            "author": { "displayName": "Grace" },
                            "body": "fixed",
                            "updatedAt": "2024-03-02T08:30:00Z",
                            "document": "doc-1"
                        },
                        {
                            "id": "r2",
                            "body": "thanks",
                            "updatedAt": "2024-03-03T08:30:00Z"
                        }
                    ]
                }
            ]
        }"#;

        let response: DiscussionsResponse = serde_json::from_str(json).unwrap();
        let threads: Vec<DiscussionThread> =
            response.discussions.into_iter().map(Into::into).collect();

        assert_eq!(threads.len(), 1);
        let thread = &threads[0];
        assert_eq!(thread.author, "Ada");
        assert_eq!(thread.target_quote.as_deref(), Some("teh"));
        assert_eq!(thread.root_document_id, "doc-1");
        assert_eq!(thread.replies.len(), 2);
        assert_eq!(thread.replies[0].author, "Grace");
        assert_eq!(thread.replies[1].parent_thread_id, "t1");
        assert_eq!(thread.replies[1].document_id, "doc-1");
        assert_eq!(thread.replies[1].author, "");
    }

    #[test]
    fn test_thread_without_quote_or_replies() {
        let json = r#"{
            "id": "t2",
            "updatedAt": "2024-03-01T12:00:00Z",
            "target": { "document": "doc-2" }
        }"#;

        let thread: DiscussionThread = serde_json::from_str::<WireDiscussion>(json).unwrap().into();
        assert_eq!(thread.target_quote, None);
        assert!(thread.replies.is_empty());
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let json = r#"{
            "id": "t3",
            "updatedAt": "yesterday",
            "target": { "document": "doc-3" }
        }"#;

        assert!(serde_json::from_str::<WireDiscussion>(json).is_err());
    }

    #[test]
    fn test_document_item_parsing() {
        let json = r#"{
            "documentItems": [
                {
                    "id": "item-1",
                    "document": "doc-1",
                    "metadata": {
                        "title": "On Computable Numbers",
                        "authors": [{ "name": "A. M. Turing" }],
                        "publisher": "LMS"
                    }
                }
            ]
        }"#;

        let response: DocumentItemsResponse = serde_json::from_str(json).unwrap();
        let doc: DocumentMetadata = response.document_items.into_iter().next().unwrap().into();

        assert_eq!(doc.document_id, "doc-1");
        assert_eq!(doc.item_id.as_deref(), Some("item-1"));
        assert_eq!(doc.title.as_deref(), Some("On Computable Numbers"));
        assert_eq!(doc.first_author_name(), Some("A. M. Turing"));
        assert_eq!(doc.publisher.as_deref(), Some("LMS"));
    }

    #[test]
    fn test_document_item_without_metadata() {
        let item: DocumentItem = serde_json::from_str(r#"{ "document": "doc-9" }"#).unwrap();
        let doc: DocumentMetadata = item.into();
        assert_eq!(doc.document_id, "doc-9");
        assert!(doc.authors.is_empty());
        assert_eq!(doc.title, None);
    }
}

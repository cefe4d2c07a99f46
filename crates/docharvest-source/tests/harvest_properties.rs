//! Integration tests for docharvest-source
//!
//! These tests drive a source from user input through several scans against
//! a discussion tree that changes between scans.

use chrono::{DateTime, TimeZone, Utc};
use docharvest_client::MockClient;
use docharvest_domain::{DiscussionThread, DocumentMetadata, HarvestEvent, Reply, Watermark};
use docharvest_source::{guess_str, Adapter, AdapterSettings, Scannable, SourceError};
use std::sync::Arc;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn thread(id: &str, updated: i64, replies: Vec<Reply>) -> DiscussionThread {
    DiscussionThread {
        id: id.to_string(),
        title: format!("On {}", id),
        author: "Ada".to_string(),
        body: "Interesting".to_string(),
        updated_at: at(updated),
        target_quote: Some("quoted text".to_string()),
        root_document_id: "doc-1".to_string(),
        replies,
    }
}

fn reply(id: &str, parent: &str, updated: i64) -> Reply {
    Reply {
        id: id.to_string(),
        parent_thread_id: parent.to_string(),
        author: "Grace".to_string(),
        body: "Agreed".to_string(),
        updated_at: at(updated),
        document_id: "doc-1".to_string(),
    }
}

fn setup(include_past_annotations: bool) -> (MockClient, Arc<Adapter>) {
    let client = MockClient::new();
    client.add_document(DocumentMetadata {
        document_id: "doc-1".to_string(),
        item_id: Some("item-1".to_string()),
        title: Some("On Computable Numbers".to_string()),
        ..Default::default()
    });

    let settings = AdapterSettings {
        include_past_annotations,
        ..AdapterSettings::paperhive()
    };
    let adapter = Arc::new(Adapter::new(settings, Arc::new(client.clone())));
    (client, adapter)
}

fn ids(events: &[HarvestEvent]) -> Vec<&str> {
    events.iter().map(|e| e.item_id()).collect()
}

#[tokio::test]
async fn test_incremental_harvest_over_time() {
    let (client, adapter) = setup(true);
    client.set_discussions("doc-1", vec![thread("t1", 100, vec![reply("r1", "t1", 150)])]);

    let mut source = guess_str(&adapter, "https://paperhive.org/documents/items/item-1")
        .await
        .unwrap();
    assert_eq!(source.decoration().title, "On Computable Numbers");

    // Everything existing is reported on the first scan
    let first = source.scan_at(at(1_000)).await.unwrap();
    assert_eq!(ids(&first.events), vec!["t1", "r1"]);
    assert_eq!(source.watermark(), Watermark::At(at(1_000)));

    // A reply arrives under the old thread
    client.set_discussions(
        "doc-1",
        vec![thread(
            "t1",
            100,
            vec![reply("r1", "t1", 150), reply("r2", "t1", 1_500)],
        )],
    );
    let second = source.scan_at(at(2_000)).await.unwrap();
    assert_eq!(ids(&second.events), vec!["r2"]);

    // The thread is edited and a new one is opened
    client.set_discussions(
        "doc-1",
        vec![
            thread("t1", 2_500, vec![reply("r1", "t1", 150), reply("r2", "t1", 1_500)]),
            thread("t2", 2_600, vec![]),
        ],
    );
    let third = source.scan_at(at(3_000)).await.unwrap();
    assert_eq!(ids(&third.events), vec!["t1", "t2"]);

    // Nothing changed
    let fourth = source.scan_at(at(4_000)).await.unwrap();
    assert!(fourth.events.is_empty());
    assert_eq!(source.watermark(), Watermark::At(at(4_000)));
}

#[tokio::test]
async fn test_history_skipped_without_past_annotations() {
    let (client, adapter) = setup(false);
    client.set_discussions("doc-1", vec![thread("old", 100, vec![reply("old-r", "old", 200)])]);

    let mut source = guess_str(&adapter, "item-1").await.unwrap();
    assert!(!source.config().include_past_annotations);

    let first = source.scan_at(at(1_000)).await.unwrap();
    assert!(first.events.is_empty());

    client.set_discussions(
        "doc-1",
        vec![thread("old", 100, vec![reply("old-r", "old", 200), reply("new-r", "old", 1_200)])],
    );
    let second = source.scan_at(at(2_000)).await.unwrap();
    assert_eq!(ids(&second.events), vec!["new-r"]);
}

#[tokio::test]
async fn test_events_carry_source_and_links() {
    let (client, adapter) = setup(true);
    client.set_discussions("doc-1", vec![thread("t1", 100, vec![reply("r1", "t1", 100)])]);

    let mut source = guess_str(&adapter, "item-1").await.unwrap();
    let outcome = source.scan_at(at(1_000)).await.unwrap();

    match &outcome.events[0] {
        HarvestEvent::Annotation { annotation, source: src } => {
            assert_eq!(annotation.source_name, "PaperHive");
            assert_eq!(annotation.respective_content.as_deref(), Some("quoted text"));
            assert!(annotation.original.ends_with("doc-1"));
            assert_eq!(&src.id, source.id());
        }
        other => panic!("expected annotation, got {:?}", other),
    }
    match &outcome.events[1] {
        HarvestEvent::Reply { reply, .. } => assert_eq!(reply.parent_id, "t1"),
        other => panic!("expected reply, got {:?}", other),
    }
}

#[tokio::test]
async fn test_outage_between_scans() {
    let (client, adapter) = setup(true);
    client.set_discussions("doc-1", vec![thread("t1", 100, vec![])]);

    let mut source = guess_str(&adapter, "item-1").await.unwrap();
    source.scan_at(at(1_000)).await.unwrap();

    client.set_discussions("doc-1", vec![thread("t1", 100, vec![]), thread("t2", 1_500, vec![])]);
    client.fail("doc-1");
    let err = source.scan_at(at(2_000)).await.unwrap_err();
    assert!(matches!(err, SourceError::Fetch(_)));
    assert!(Scannable::validate(&source).await.is_err());

    // Nothing is lost once the API is back
    client.recover("doc-1");
    let after = source.scan_at(at(3_000)).await.unwrap();
    assert_eq!(ids(&after.events), vec!["t2"]);
}

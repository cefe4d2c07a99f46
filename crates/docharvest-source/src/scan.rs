//! Scan engine: classify a fetched discussion tree against a watermark
//!
//! Everything here is pure. [`crate::TrackedSource::scan`] wraps it with the
//! fetch and the watermark commit.

use chrono::{DateTime, Utc};
use docharvest_domain::{
    Annotation, DiscussionThread, HarvestEvent, Reply, ReplyRecord, SourceRef, Watermark,
};

/// What a scan produced
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    /// New items, threads before their replies, in API order
    pub events: Vec<HarvestEvent>,

    /// Watermark committed by the scan
    pub watermark: Watermark,

    /// Threads in the fetched tree
    pub threads_seen: usize,

    /// Replies in the fetched tree
    pub replies_seen: usize,
}

impl ScanOutcome {
    /// Number of annotation events
    pub fn annotation_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_annotation()).count()
    }

    /// Number of reply events
    pub fn reply_count(&self) -> usize {
        self.events.len() - self.annotation_count()
    }
}

/// Attribution stamped onto every event of one scan
#[derive(Debug, Clone)]
pub struct EventContext {
    /// Display name of the remote service
    pub source_name: String,

    /// Home page of the remote service
    pub source_home: String,

    /// Client URL template, `%s` marking the document id
    pub content_link: String,

    /// Public identity of the scanned source
    pub source: SourceRef,
}

impl EventContext {
    fn original(&self, document_id: &str) -> String {
        self.content_link.replacen("%s", document_id, 1)
    }

    /// Normalize a thread
    pub fn annotation(&self, thread: &DiscussionThread) -> Annotation {
        Annotation {
            id: thread.id.clone(),
            source_name: self.source_name.clone(),
            source_home: self.source_home.clone(),
            title: thread.title.clone(),
            author: thread.author.clone(),
            body: thread.body.clone(),
            respective_content: thread.target_quote.clone(),
            original: self.original(&thread.root_document_id),
        }
    }

    /// Normalize a reply
    pub fn reply(&self, reply: &Reply) -> ReplyRecord {
        ReplyRecord {
            id: reply.id.clone(),
            parent_id: reply.parent_thread_id.clone(),
            source_name: self.source_name.clone(),
            source_home: self.source_home.clone(),
            author: reply.author.clone(),
            body: reply.body.clone(),
            original: self.original(&reply.document_id),
        }
    }
}

/// Collect events for every node updated at or after `effective`
///
/// Threads and replies are judged independently: a reply can be new under
/// an old thread and the other way round.
pub fn collect_new_items(
    threads: &[DiscussionThread],
    effective: DateTime<Utc>,
    ctx: &EventContext,
) -> Vec<HarvestEvent> {
    let mut events = Vec::new();

    for thread in threads {
        if thread.updated_at >= effective {
            events.push(HarvestEvent::Annotation {
                annotation: ctx.annotation(thread),
                source: ctx.source.clone(),
            });
        }

        for reply in thread.replies.iter().filter(|r| r.updated_at >= effective) {
            events.push(HarvestEvent::Reply {
                reply: ctx.reply(reply),
                source: ctx.source.clone(),
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use docharvest_domain::{effective_watermark, Decoration, SourceId, SourceIdentifier};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn ctx() -> EventContext {
        EventContext {
            source_name: "PaperHive".to_string(),
            source_home: "https://paperhive.org".to_string(),
            content_link: "https://paperhive.org/documents/%s".to_string(),
            source: SourceRef {
                id: SourceId::from_string("s1"),
                identifier: SourceIdentifier::new("paperhive", "doc"),
                decoration: Decoration::unknown(),
            },
        }
    }

    fn reply(id: &str, thread: &str, updated: i64) -> Reply {
        Reply {
            id: id.to_string(),
            parent_thread_id: thread.to_string(),
            author: "Grace".to_string(),
            body: "reply".to_string(),
            updated_at: at(updated),
            document_id: "doc".to_string(),
        }
    }

    fn thread(id: &str, updated: i64, replies: Vec<Reply>) -> DiscussionThread {
        DiscussionThread {
            id: id.to_string(),
            title: "title".to_string(),
            author: "Ada".to_string(),
            body: "body".to_string(),
            updated_at: at(updated),
            target_quote: Some("quote".to_string()),
            root_document_id: "doc".to_string(),
            replies,
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let threads = vec![thread("t1", 100, vec![]), thread("t2", 99, vec![])];
        let events = collect_new_items(&threads, at(100), &ctx());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].item_id(), "t1");
    }

    #[test]
    fn test_new_reply_under_old_thread() {
        let threads = vec![thread("t1", 50, vec![reply("r1", "t1", 150)])];
        let events = collect_new_items(&threads, at(100), &ctx());

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], HarvestEvent::Reply { reply, .. } if reply.parent_id == "t1"));
    }

    #[test]
    fn test_new_thread_with_old_reply() {
        let threads = vec![thread("t1", 150, vec![reply("r1", "t1", 50)])];
        let events = collect_new_items(&threads, at(100), &ctx());

        assert_eq!(events.len(), 1);
        assert!(events[0].is_annotation());
    }

    #[test]
    fn test_order_is_threads_then_their_replies() {
        let threads = vec![
            thread("t1", 200, vec![reply("r1", "t1", 200), reply("r2", "t1", 200)]),
            thread("t2", 200, vec![]),
        ];
        let ids: Vec<_> = collect_new_items(&threads, at(0), &ctx())
            .iter()
            .map(|e| e.item_id().to_string())
            .collect();
        assert_eq!(ids, vec!["t1", "r1", "r2", "t2"]);
    }

    #[test]
    fn test_normalized_fields() {
        let threads = vec![thread("t1", 200, vec![reply("r1", "t1", 200)])];
        let events = collect_new_items(&threads, at(0), &ctx());

        match &events[0] {
            HarvestEvent::Annotation { annotation, source } => {
                assert_eq!(annotation.source_name, "PaperHive");
                assert_eq!(annotation.respective_content.as_deref(), Some("quote"));
                assert_eq!(annotation.original, "https://paperhive.org/documents/doc");
                assert_eq!(source.identifier.document_id, "doc");
            }
            other => panic!("expected annotation, got {:?}", other),
        }
        match &events[1] {
            HarvestEvent::Reply { reply, .. } => {
                assert_eq!(reply.author, "Grace");
                assert_eq!(reply.source_home, "https://paperhive.org");
            }
            other => panic!("expected reply, got {:?}", other),
        }
    }

    #[test]
    fn test_outcome_counts() {
        let threads = vec![thread("t1", 200, vec![reply("r1", "t1", 200)])];
        let outcome = ScanOutcome {
            events: collect_new_items(&threads, at(0), &ctx()),
            watermark: Watermark::At(at(300)),
            threads_seen: 1,
            replies_seen: 1,
        };
        assert_eq!(outcome.annotation_count(), 1);
        assert_eq!(outcome.reply_count(), 1);
    }

    // Items appear on the remote side at their update time; each scan sees
    // everything updated strictly before it started. With non-regressing
    // update times no id may be emitted twice.
    proptest! {
        #[test]
        fn prop_no_duplicates_across_scans(
            thread_times in proptest::collection::vec(0i64..1_000, 1..15),
            reply_times in proptest::collection::vec((0usize..15, 0i64..1_000), 0..30),
            scan_times in proptest::collection::vec(0i64..1_100, 1..10),
        ) {
            let mut scan_times = scan_times;
            scan_times.sort_unstable();
            scan_times.dedup();
            let base = 1_700_000_000i64;

            let all: Vec<DiscussionThread> = thread_times
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let replies = reply_times
                        .iter()
                        .enumerate()
                        .filter(|(_, (owner, _))| *owner == i)
                        .map(|(j, (_, rt))| reply(&format!("r{}", j), &format!("t{}", i), base + (*t).max(*rt)))
                        .collect();
                    thread(&format!("t{}", i), base + t, replies)
                })
                .collect();

            let mut mark = Watermark::Unset;
            let mut seen = HashSet::new();

            for scan in scan_times {
                let now = at(base + scan);
                let visible: Vec<DiscussionThread> = all
                    .iter()
                    .filter(|t| t.updated_at < now)
                    .map(|t| DiscussionThread {
                        replies: t.replies.iter().filter(|r| r.updated_at < now).cloned().collect(),
                        ..t.clone()
                    })
                    .collect();

                let effective = effective_watermark(mark, true, now);
                for event in collect_new_items(&visible, effective, &ctx()) {
                    prop_assert!(seen.insert(event.item_id().to_string()), "duplicate {}", event.item_id());
                }
                mark = mark.advance(now);
            }
        }
    }

    #[test]
    fn test_effective_window_shrinks_after_scan() {
        let threads = vec![thread("t1", 100, vec![])];
        let first = effective_watermark(Watermark::Unset, true, at(150));
        assert_eq!(collect_new_items(&threads, first, &ctx()).len(), 1);

        let mark = Watermark::Unset.advance(at(150));
        let second = effective_watermark(mark, true, at(150) + Duration::seconds(60));
        assert!(collect_new_items(&threads, second, &ctx()).is_empty());
    }
}

//! Event sinks

use docharvest_domain::traits::EventSink;
use docharvest_domain::HarvestEvent;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Forwards events into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<HarvestEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HarvestEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn deliver(&self, event: HarvestEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(item_id = %e.0.item_id(), "Event consumer is gone, dropping event");
        }
    }
}

/// Keeps every delivered event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<HarvestEvent>>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of delivered events
    pub fn events(&self) -> Vec<HarvestEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Ids of delivered items, in delivery order
    pub fn item_ids(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|e| e.item_id().to_string())
            .collect()
    }

    /// Remove and return everything delivered so far
    pub fn take(&self) -> Vec<HarvestEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl EventSink for CollectingSink {
    fn deliver(&self, event: HarvestEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

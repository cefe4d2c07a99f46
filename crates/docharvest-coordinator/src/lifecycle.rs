//! Tracking lifecycle signals from the host

use docharvest_domain::SourceId;
use serde::{Deserialize, Serialize};

/// One side of a tracking relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRef {
    /// Adapter the endpoint belongs to
    pub adapter: String,

    /// Store key of the endpoint
    pub id: SourceId,
}

/// A link between a tracked source and a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRelation {
    /// Relation id (host-assigned)
    pub id: String,

    /// Source side
    pub source: EndpointRef,
}

/// Notification from the host's link machinery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A new relation exists; its source should be scanned right away
    TrackingEstablished(TrackingRelation),

    /// A relation was removed
    TrackingRemoved(TrackingRelation),
}

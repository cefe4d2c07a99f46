//! Metrics collection for harvesting passes

use docharvest_domain::SourceId;
use std::collections::HashMap;

/// Counters collected across scans and passes
#[derive(Debug, Clone, Default)]
pub struct HarvestMetrics {
    /// Scheduled passes completed
    pub pass_count: usize,

    /// Source scans that completed
    pub scans_completed: usize,

    /// Source scans that failed
    pub scans_failed: usize,

    /// Annotation events delivered
    pub annotations_emitted: usize,

    /// Reply events delivered
    pub replies_emitted: usize,

    /// Failed scans per source
    pub failures: HashMap<SourceId, usize>,

    /// Total pass runtime in milliseconds
    pub total_runtime_ms: u128,
}

impl HarvestMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed scan
    pub fn record_scan(&mut self, annotations: usize, replies: usize) {
        self.scans_completed += 1;
        self.annotations_emitted += annotations;
        self.replies_emitted += replies;
    }

    /// Record a failed scan
    pub fn record_failure(&mut self, source_id: &SourceId) {
        self.scans_failed += 1;
        *self.failures.entry(source_id.clone()).or_insert(0) += 1;
    }

    /// Record a pass completion
    pub fn record_pass(&mut self, runtime_ms: u128) {
        self.pass_count += 1;
        self.total_runtime_ms += runtime_ms;
    }

    /// Get total events delivered
    pub fn total_emitted(&self) -> usize {
        self.annotations_emitted + self.replies_emitted
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Harvest Metrics Summary".to_string(),
            "=======================".to_string(),
            format!("Passes: {}", self.pass_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!(
                "Scans: {} completed, {} failed",
                self.scans_completed, self.scans_failed
            ),
            format!(
                "Events: {} annotations, {} replies",
                self.annotations_emitted, self.replies_emitted
            ),
        ];

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failures by source:".to_string());
            let mut failures: Vec<_> = self.failures.iter().collect();
            failures.sort();
            for (source_id, count) in failures {
                lines.push(format!("  {}: {}", source_id, count));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = HarvestMetrics::new();
        assert_eq!(metrics.total_emitted(), 0);
        assert_eq!(metrics.pass_count, 0);
        assert!(metrics.failures.is_empty());
    }

    #[test]
    fn test_record_scan() {
        let mut metrics = HarvestMetrics::new();
        metrics.record_scan(3, 4);
        metrics.record_scan(0, 1);

        assert_eq!(metrics.scans_completed, 2);
        assert_eq!(metrics.annotations_emitted, 3);
        assert_eq!(metrics.replies_emitted, 5);
        assert_eq!(metrics.total_emitted(), 8);
    }

    #[test]
    fn test_record_failure() {
        let mut metrics = HarvestMetrics::new();
        let id = SourceId::from_string("s1");
        metrics.record_failure(&id);
        metrics.record_failure(&id);

        assert_eq!(metrics.scans_failed, 2);
        assert_eq!(metrics.failures.get(&id), Some(&2));
    }

    #[test]
    fn test_reset() {
        let mut metrics = HarvestMetrics::new();
        metrics.record_scan(1, 1);
        metrics.record_failure(&SourceId::from_string("s1"));
        metrics.record_pass(10);

        metrics.reset();

        assert_eq!(metrics.total_emitted(), 0);
        assert_eq!(metrics.pass_count, 0);
        assert!(metrics.failures.is_empty());
    }

    #[test]
    fn test_summary() {
        let mut metrics = HarvestMetrics::new();
        metrics.record_scan(2, 3);
        metrics.record_failure(&SourceId::from_string("broken"));
        metrics.record_pass(120);

        let summary = metrics.summary();
        assert!(summary.contains("Passes: 1"));
        assert!(summary.contains("Total runtime: 120ms"));
        assert!(summary.contains("1 completed, 1 failed"));
        assert!(summary.contains("2 annotations, 3 replies"));
        assert!(summary.contains("broken: 1"));
    }
}

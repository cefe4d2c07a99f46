//! Background worker for continuous harvesting

use crate::lifecycle::LifecycleEvent;
use crate::{
    Coordinator, CoordinatorConfig, CoordinatorError, HarvestMetrics, PassReport, ScanReport,
};
use docharvest_domain::traits::SourceStore;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Background worker that runs harvest passes on a schedule
///
/// Besides the periodic pass it listens for lifecycle events from the host,
/// scanning newly tracked sources right away.
///
/// # Examples
///
/// ```no_run
/// use docharvest_coordinator::{Coordinator, HarvestWorker, MemoryStore};
///
/// # async fn run(coordinator: Coordinator<MemoryStore>) -> Result<(), Box<dyn std::error::Error>> {
/// let config = coordinator.config().clone();
/// let mut worker = HarvestWorker::new(coordinator, &config);
///
/// let (_events, lifecycle) = tokio::sync::mpsc::unbounded_channel();
/// // Runs until Ctrl+C
/// worker.run(lifecycle).await?;
/// # Ok(())
/// # }
/// ```
pub struct HarvestWorker<S> {
    coordinator: Coordinator<S>,
    interval: Duration,
    refresh_decorations: bool,
    pass: Option<JoinHandle<()>>,
    in_flight: Vec<JoinHandle<Result<ScanReport, CoordinatorError>>>,
}

impl<S> HarvestWorker<S>
where
    S: SourceStore + 'static,
{
    /// Create a worker driving `coordinator`
    pub fn new(coordinator: Coordinator<S>, config: &CoordinatorConfig) -> Self {
        Self {
            coordinator,
            interval: config.scanning_interval(),
            refresh_decorations: config.refresh_decorations,
            pass: None,
            in_flight: Vec::new(),
        }
    }

    /// Run until Ctrl+C
    ///
    /// # Errors
    ///
    /// Failing passes are logged, not returned; this only fails if the
    /// in-flight scans cannot be joined on shutdown.
    pub async fn run(
        &mut self,
        lifecycle: mpsc::UnboundedReceiver<LifecycleEvent>,
    ) -> Result<(), CoordinatorError> {
        self.run_until(lifecycle, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
    }

    /// Run until `shutdown` completes
    ///
    /// The first pass starts immediately. Passes run in the background, so
    /// lifecycle events and shutdown are handled while a pass is in
    /// progress; a tick that arrives while the previous pass is still
    /// running is skipped. A closed lifecycle channel is not fatal; the
    /// schedule keeps running. The running pass and scans started by
    /// lifecycle events are awaited before returning.
    pub async fn run_until<F>(
        &mut self,
        mut lifecycle: mpsc::UnboundedReceiver<LifecycleEvent>,
        shutdown: F,
    ) -> Result<(), CoordinatorError>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut listening = true;
        tokio::pin!(shutdown);

        tracing::info!("Harvest worker started (interval: {:?})", self.interval);

        loop {
            self.in_flight.retain(|handle| !handle.is_finished());

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping harvest worker");
                    break;
                }
                event = lifecycle.recv(), if listening => match event {
                    Some(event) => self.handle_lifecycle(event),
                    None => {
                        tracing::warn!("Lifecycle channel closed, continuing on schedule only");
                        listening = false;
                    }
                },
                _ = ticker.tick() => self.start_pass(),
            }
        }

        self.drain().await?;

        let metrics = self.coordinator.metrics();
        tracing::info!("Harvest worker stopped. Final metrics:\n{}", metrics.summary());

        Ok(())
    }

    /// Run a fixed number of scheduled passes
    ///
    /// # Errors
    ///
    /// Stops at the first pass that fails as a whole.
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<(), CoordinatorError> {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Harvest worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting harvest cycle {}/{}", cycle + 1, cycles);

            if let Err(e) = run_pass(&self.coordinator, self.refresh_decorations).await {
                tracing::error!("Harvest cycle {}/{} failed: {}", cycle + 1, cycles, e);
                return Err(e);
            }
        }

        let metrics = self.coordinator.metrics();
        tracing::info!(
            "Harvest worker finished {} cycles. Final metrics:\n{}",
            cycles,
            metrics.summary()
        );

        Ok(())
    }

    fn start_pass(&mut self) {
        if self.pass.as_ref().is_some_and(|pass| !pass.is_finished()) {
            tracing::warn!("Previous harvest pass still running, skipping this one");
            return;
        }

        let coordinator = self.coordinator.clone();
        let refresh_decorations = self.refresh_decorations;
        self.pass = Some(tokio::spawn(async move {
            if let Err(e) = run_pass(&coordinator, refresh_decorations).await {
                tracing::error!("Harvest pass failed: {}", e);
            }
        }));
    }

    fn handle_lifecycle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::TrackingEstablished(relation) => {
                if let Some(handle) = self.coordinator.on_tracking_established(&relation) {
                    self.in_flight.push(handle);
                }
            }
            LifecycleEvent::TrackingRemoved(relation) => {
                self.coordinator.on_tracking_removed(&relation);
            }
        }
    }

    async fn drain(&mut self) -> Result<(), CoordinatorError> {
        if let Some(pass) = self.pass.take() {
            pass.await.map_err(|e| CoordinatorError::Worker(e.to_string()))?;
        }
        for handle in self.in_flight.drain(..) {
            // Scan failures were already logged by the coordinator
            if let Err(e) = handle.await {
                return Err(CoordinatorError::Worker(e.to_string()));
            }
        }
        Ok(())
    }

    /// The coordinator this worker drives
    pub fn coordinator(&self) -> &Coordinator<S> {
        &self.coordinator
    }

    /// Snapshot of the coordinator's metrics
    pub fn metrics(&self) -> HarvestMetrics {
        self.coordinator.metrics()
    }

    /// Reset the coordinator's metrics counters
    pub fn reset_metrics(&self) {
        self.coordinator.reset_metrics();
    }
}

/// One scheduled pass: best-effort decoration refresh, then the scan pass
async fn run_pass<S>(
    coordinator: &Coordinator<S>,
    refresh_decorations: bool,
) -> Result<PassReport, CoordinatorError>
where
    S: SourceStore + 'static,
{
    if refresh_decorations {
        if let Err(e) = coordinator.refresh_decorations().await {
            tracing::warn!("Decoration refresh failed, scanning anyway: {}", e);
        }
    }
    coordinator.on_schedule().await
}

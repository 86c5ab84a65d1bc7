use crate::location::structs::{AuthorizationStatus, EngineState, LocationConfig, LocationSample};
use crate::location::tracker::{BestEffortTracker, SampleVerdict};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Platform positioning service.
#[async_trait]
pub trait LocationProvider: Send + Sync + 'static {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompts the user and resolves with their answer.
    async fn request_authorization(&self) -> AuthorizationStatus;

    /// Turns the sensor on. Samples arrive on the returned channel in the order they
    /// were produced.
    fn start_updates(&self) -> mpsc::Receiver<LocationSample>;

    fn stop_updates(&self);
}

/// Receives the result of an acquisition cycle.
pub trait LocationDelegate: Send + Sync {
    fn best_effort_location_found(&self, sample: &LocationSample);
}

/// Forwards found locations into a channel, for consumers that prefer to await them.
pub struct ChannelDelegate {
    sender: mpsc::UnboundedSender<LocationSample>,
}

impl ChannelDelegate {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<LocationSample>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }
}

impl LocationDelegate for ChannelDelegate {
    fn best_effort_location_found(&self, sample: &LocationSample) {
        if self.sender.send(*sample).is_err() {
            debug!("Location receiver dropped; discarding fix");
        }
    }
}

enum Cycle {
    Converged(LocationSample),
    TimedOut,
    Shutdown,
}

/// Acquires one "best effort" location, switching the sensor off between attempts.
///
/// The engine only holds a weak reference to its delegate: once the consumer is gone,
/// results are dropped silently.
pub struct LocationAcquisitionEngine<P> {
    provider: Arc<P>,
    config: LocationConfig,
    delegate: Weak<dyn LocationDelegate>,
}

impl<P: LocationProvider> LocationAcquisitionEngine<P> {
    pub fn new(
        provider: Arc<P>,
        config: LocationConfig,
        delegate: Weak<dyn LocationDelegate>,
    ) -> Self {
        Self {
            provider,
            config,
            delegate,
        }
    }

    /// Spawns the acquisition task on the current tokio runtime.
    pub fn start(self) -> LocationHandle {
        let (state_tx, state_rx) = watch::channel(EngineState::Idle);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(state_tx, shutdown_rx));
        LocationHandle {
            state: state_rx,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(self, state: watch::Sender<EngineState>, mut shutdown: watch::Receiver<bool>) {
        let status = match self.provider.authorization_status() {
            AuthorizationStatus::NotDetermined => {
                info!("Requesting location authorization");
                state.send_replace(EngineState::AwaitingPermission);
                tokio::select! {
                    status = self.provider.request_authorization() => status,
                    _ = shutdown.changed() => {
                        state.send_replace(EngineState::Idle);
                        return;
                    }
                }
            }
            status => status,
        };

        if !status.is_authorized() {
            warn!(?status, "Location services not available");
            state.send_replace(EngineState::Unavailable);
            return;
        }

        let mut tracker = BestEffortTracker::new(&self.config);
        loop {
            tracker.reset();
            let mut samples = self.provider.start_updates();
            state.send_replace(EngineState::Updating);
            debug!("Updating location");

            let outcome = self
                .sample_until_done(&mut tracker, &mut samples, &mut shutdown)
                .await;
            self.provider.stop_updates();

            match outcome {
                Cycle::Converged(best) => {
                    info!(
                        latitude = best.coordinate.latitude(),
                        longitude = best.coordinate.longitude(),
                        accuracy_m = best.horizontal_accuracy_m,
                        "Best effort location found"
                    );
                    self.notify(&best);
                    break;
                }
                Cycle::Shutdown => break,
                Cycle::TimedOut => {
                    info!(
                        restart_in = ?self.config.restart_after,
                        "No accurate fix in time; suspending location updates"
                    );
                    state.send_replace(EngineState::Suspended);
                    tokio::select! {
                        () = tokio::time::sleep(self.config.restart_after) => {}
                        _ = shutdown.changed() => break,
                    }
                }
            }
        }
        state.send_replace(EngineState::Idle);
    }

    async fn sample_until_done(
        &self,
        tracker: &mut BestEffortTracker,
        samples: &mut mpsc::Receiver<LocationSample>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Cycle {
        let timeout = tokio::time::sleep(self.config.timeout);
        tokio::pin!(timeout);
        let mut stream_open = true;

        loop {
            tokio::select! {
                () = &mut timeout => return Cycle::TimedOut,
                _ = shutdown.changed() => return Cycle::Shutdown,
                sample = samples.recv(), if stream_open => match sample {
                    Some(sample) => match tracker.offer(sample, Utc::now()) {
                        SampleVerdict::Converged(best) => return Cycle::Converged(best),
                        verdict => trace!(?verdict, "Location sample evaluated"),
                    },
                    None => {
                        debug!("Location stream ended; waiting for timeout");
                        stream_open = false;
                    }
                },
            }
        }
    }

    fn notify(&self, sample: &LocationSample) {
        match self.delegate.upgrade() {
            Some(delegate) => delegate.best_effort_location_found(sample),
            None => debug!("Location delegate is gone; discarding fix"),
        }
    }
}

/// Owner side of a running engine. Dropping it tears the engine down.
pub struct LocationHandle {
    state: watch::Receiver<EngineState>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl LocationHandle {
    pub fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    /// Waits until the engine reaches a state matching `predicate`, or until the engine
    /// task has ended. Returns the state observed last.
    pub async fn wait_for_state(
        &mut self,
        mut predicate: impl FnMut(EngineState) -> bool,
    ) -> EngineState {
        let observed = self.state.wait_for(|s| predicate(*s)).await.map(|s| *s);
        observed.unwrap_or_else(|_| *self.state.borrow())
    }

    /// Stops sampling and cancels pending timers. Safe to call more than once.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Shuts down and waits for the engine task to finish.
    pub async fn join(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!("Location task ended abnormally: {e}");
        }
    }
}

impl Drop for LocationHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Channel-driven session runner.
//!
//! Location events arrive on a bounded channel and are handled by a single
//! consumer task, so a sample is fully filtered and evaluated before the
//! next one is looked at. Updates flow out on a second bounded channel and
//! the latest [`SessionSnapshot`] is published behind a lock for readers on
//! other threads.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{LocationEvent, SessionConfig, SessionSnapshot, SessionUpdate, TourSession};
use crate::geofence::GeofenceRadius;
use crate::poi::PoiCatalog;

/// Errors from interacting with a running session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session has stopped")]
    Closed,

    #[error("Session input channel is full")]
    Full,

    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

/// Handle to a session running on the tokio runtime.
///
/// Dropping the handle closes the input channel; the task drains what is
/// queued and exits.
#[derive(Debug)]
pub struct SessionHandle {
    events_tx: mpsc::Sender<LocationEvent>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    radius: GeofenceRadius,
    cancellation_token: CancellationToken,
    task: JoinHandle<SessionSnapshot>,
}

/// Start a session task.
///
/// Returns the handle and the receiver for per-event updates. The update
/// channel is bounded by `config.channel_capacity`; a consumer that stops
/// reading applies backpressure to the session.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session(
    catalog: Arc<PoiCatalog>,
    config: SessionConfig,
    radius: GeofenceRadius,
) -> (SessionHandle, mpsc::Receiver<SessionUpdate>) {
    let capacity = config.channel_capacity.max(1);
    let (events_tx, events_rx) = mpsc::channel(capacity);
    let (updates_tx, updates_rx) = mpsc::channel(capacity);

    let session = TourSession::new(catalog, &config, radius.clone());
    let snapshot = Arc::new(RwLock::new(session.snapshot()));
    let cancellation_token = CancellationToken::new();

    let task = tokio::spawn(run(
        session,
        events_rx,
        updates_tx,
        Arc::clone(&snapshot),
        cancellation_token.clone(),
    ));

    let handle = SessionHandle {
        events_tx,
        snapshot,
        radius,
        cancellation_token,
        task,
    };

    (handle, updates_rx)
}

async fn run(
    mut session: TourSession,
    mut events_rx: mpsc::Receiver<LocationEvent>,
    updates_tx: mpsc::Sender<SessionUpdate>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    cancellation_token: CancellationToken,
) -> SessionSnapshot {
    let mut updates_open = true;

    loop {
        tokio::select! {
            biased;

            _ = cancellation_token.cancelled() => break,

            event_opt = events_rx.recv() => {
                let Some(event) = event_opt else { break };

                let update = session.handle(event);
                *snapshot.write() = session.snapshot();

                if !updates_open {
                    continue;
                }

                tokio::select! {
                    biased;

                    _ = cancellation_token.cancelled() => break,

                    sent = updates_tx.send(update) => {
                        if sent.is_err() {
                            tracing::debug!("Update receiver dropped, continuing without updates");
                            updates_open = false;
                        }
                    }
                }
            }
        }
    }

    let final_snapshot = session.snapshot();
    tracing::info!(
        accepted = final_snapshot.stats.accepted,
        rejected = final_snapshot.stats.rejected,
        "Tracking session stopped"
    );
    final_snapshot
}

impl SessionHandle {
    /// Queue an event, waiting for space if the channel is full.
    pub async fn push(&self, event: LocationEvent) -> Result<(), SessionError> {
        self.events_tx
            .send(event)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Queue an event without waiting.
    pub fn try_push(&self, event: LocationEvent) -> Result<(), SessionError> {
        self.events_tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SessionError::Full,
            mpsc::error::TrySendError::Closed(_) => SessionError::Closed,
        })
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().clone()
    }

    /// The radius knob shared with the session.
    pub fn radius(&self) -> &GeofenceRadius {
        &self.radius
    }

    /// Set the radius override; applies from the next processed sample.
    pub fn set_radius(&self, meters: u32) {
        self.radius.set(meters);
    }

    /// Close the input, let queued events drain and wait for the task.
    pub async fn finish(self) -> Result<SessionSnapshot, SessionError> {
        let Self { events_tx, task, .. } = self;
        drop(events_tx);
        task.await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))
    }

    /// Stop immediately, discarding queued events and session state.
    pub async fn stop(self) -> Result<SessionSnapshot, SessionError> {
        self.cancellation_token.cancel();
        self.finish().await
    }
}

//! Viewer streaming session.
//!
//! One session per connected viewer. On open it subscribes to the PLC I/O bus
//! and sends the current snapshot, so a new viewer never starts from a blank
//! state. It then waits on either a bus wake-up or teardown; each wake-up
//! re-reads the snapshot and sends it.
//!
//! The listener is released on every exit path (it unregisters on drop).
//! Sessions never notify the bus and never mutate shared state.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use arena_core::PlcState;
use arena_notify::{Listener, Notifier};
use arena_telemetry::Metrics;

use crate::error::SessionError;
use crate::types::FieldMessage;

/// Upper bound on sending the close frame after a session ends.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Sending to the viewer failed.
    Disconnected,
    /// The teardown token was cancelled (transport closed or server shutdown).
    TornDown,
    /// The I/O bus was closed.
    BusClosed,
}

impl SessionEnd {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::TornDown => "torn_down",
            Self::BusClosed => "bus_closed",
        }
    }
}

/// Long-lived delivery of PLC snapshots to one viewer.
///
/// Generic over the outgoing transport: any `Sink<String>` of text frames.
pub struct StreamSession<S> {
    viewer: String,
    plc: Arc<PlcState>,
    listener: Listener,
    sink: S,
    teardown: CancellationToken,
}

impl<S> StreamSession<S>
where
    S: Sink<String> + Unpin,
    S::Error: std::fmt::Display,
{
    /// Subscribe to `bus` and send the initial snapshot.
    ///
    /// Subscribing first means a change racing with the initial send still
    /// produces a follow-up message.
    pub async fn open(
        viewer: impl Into<String>,
        plc: Arc<PlcState>,
        bus: &Notifier,
        sink: S,
        teardown: CancellationToken,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            viewer: viewer.into(),
            plc,
            listener: bus.subscribe(),
            sink,
            teardown,
        };

        session.send_snapshot().await?;
        Metrics::snapshot_sent("initial");
        debug!(viewer = %session.viewer, "Initial snapshot sent");

        Ok(session)
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    /// Forward every change until the viewer leaves or the session is torn down.
    pub async fn run(mut self) -> SessionEnd {
        let teardown = self.teardown.clone();
        let end = loop {
            tokio::select! {
                () = teardown.cancelled() => break SessionEnd::TornDown,
                wake = self.listener.recv() => {
                    if wake.is_none() {
                        break SessionEnd::BusClosed;
                    }
                    // A stuck write still yields to teardown.
                    let sent = tokio::select! {
                        () = teardown.cancelled() => break SessionEnd::TornDown,
                        sent = self.send_snapshot() => sent,
                    };
                    if let Err(e) = sent {
                        debug!(viewer = %self.viewer, error = %e, "Viewer send failed");
                        break SessionEnd::Disconnected;
                    }
                    Metrics::snapshot_sent("change");
                    trace!(viewer = %self.viewer, "Change snapshot sent");
                }
            }
        };

        self.listener.close();
        if end != SessionEnd::Disconnected {
            // Best-effort close frame; the viewer may already be gone.
            let _ = tokio::time::timeout(CLOSE_TIMEOUT, self.sink.close()).await;
        }

        debug!(viewer = %self.viewer, end = end.as_str(), "Viewer session ended");
        end
    }

    async fn send_snapshot(&mut self) -> Result<(), SessionError> {
        let msg = FieldMessage::PlcIoChange(self.plc.snapshot());
        let json = serde_json::to_string(&msg)?;
        self.sink
            .send(json)
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))
    }
}

//! Notifier and Listener.
//!
//! Each listener owns the receiving half of a bounded channel of `()` with
//! room for `LISTENER_BUFFER` pending wake-ups. `notify()` uses `try_send`, so
//! it never waits on a slow listener: a full buffer means a wake-up is already
//! pending and the listener will re-read the latest state anyway.
//!
//! A closed bus is permanently empty: `notify()` is a no-op and `subscribe()`
//! hands back a listener that is already closed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace};

use arena_telemetry::Metrics;

/// Pending wake-ups a listener can hold before further notifies coalesce.
pub const LISTENER_BUFFER: usize = 1;

struct NotifierInner {
    name: &'static str,
    listeners: Mutex<HashMap<u64, mpsc::Sender<()>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl NotifierInner {
    fn remove(&self, id: u64) -> bool {
        self.listeners.lock().remove(&id).is_some()
    }
}

/// Payload-free publish/subscribe bus.
///
/// Cheap to clone; clones share the same listener set.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Notifier {
    /// Create an empty bus. `name` labels logs and metrics.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                name,
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Register a new listener. Never fails.
    pub fn subscribe(&self) -> Listener {
        let (tx, rx) = mpsc::channel(LISTENER_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        {
            let mut listeners = self.inner.listeners.lock();
            // Checked under the lock so close() cannot race past us.
            if self.inner.closed.load(Ordering::Acquire) {
                debug!(bus = self.inner.name, "Subscribe on closed bus");
                drop(tx);
            } else {
                listeners.insert(id, tx);
            }
        }

        trace!(bus = self.inner.name, listener_id = id, "Listener registered");
        Listener {
            id,
            rx,
            bus: Arc::downgrade(&self.inner),
            closed: false,
        }
    }

    /// Wake every registered listener once.
    ///
    /// Non-blocking; listeners that were dropped without closing are pruned.
    pub fn notify(&self) {
        if self.inner.closed.load(Ordering::Acquire) {
            return;
        }

        let mut listeners = self.inner.listeners.lock();
        listeners.retain(|id, tx| match tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                trace!(bus = self.inner.name, listener_id = id, "Wake-up already pending");
                true
            }
            Err(TrySendError::Closed(())) => {
                trace!(bus = self.inner.name, listener_id = id, "Pruning dropped listener");
                false
            }
        });
        let count = listeners.len();
        drop(listeners);

        Metrics::notification(self.inner.name);
        trace!(bus = self.inner.name, listeners = count, "Notified");
    }

    /// Remove a listener. Idempotent; same as `listener.close()`.
    pub fn unsubscribe(&self, listener: &mut Listener) {
        listener.close();
    }

    /// Tear the bus down: every live listener observes end-of-stream.
    pub fn close(&self) {
        let mut listeners = self.inner.listeners.lock();
        self.inner.closed.store(true, Ordering::Release);
        let dropped = listeners.len();
        listeners.clear();
        debug!(bus = self.inner.name, dropped, "Notifier closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Listeners currently registered.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("name", &self.inner.name)
            .field("listeners", &self.listener_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Subscription handle bound to one `Notifier`.
///
/// Dropping the listener unregisters it.
pub struct Listener {
    id: u64,
    rx: mpsc::Receiver<()>,
    bus: Weak<NotifierInner>,
    closed: bool,
}

impl Listener {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next wake-up.
    ///
    /// Returns `None` once the listener or its bus is closed.
    pub async fn recv(&mut self) -> Option<()> {
        if self.closed {
            return None;
        }
        self.rx.recv().await
    }

    /// Stop receiving wake-ups and release the bus-side entry.
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.rx.close();
        if let Some(bus) = self.bus.upgrade() {
            if bus.remove(self.id) {
                trace!(bus = bus.name, listener_id = self.id, "Listener unregistered");
            }
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("closed", &self.closed)
            .finish()
    }
}

/// The arena's notification buses.
#[derive(Debug, Clone)]
pub struct ArenaNotifiers {
    /// PLC inputs, registers or coils changed.
    pub plc_io_change: Notifier,
    /// Team/station assignments changed; displays should reload teams.
    pub match_load_teams: Notifier,
    /// Every connected display should reload itself.
    pub reload_displays: Notifier,
}

impl Default for ArenaNotifiers {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaNotifiers {
    #[must_use]
    pub fn new() -> Self {
        Self {
            plc_io_change: Notifier::new("plc_io_change"),
            match_load_teams: Notifier::new("match_load_teams"),
            reload_displays: Notifier::new("reload_displays"),
        }
    }

    /// Close every bus (server shutdown).
    pub fn close_all(&self) {
        self.plc_io_change.close();
        self.match_load_teams.close();
        self.reload_displays.close();
    }
}

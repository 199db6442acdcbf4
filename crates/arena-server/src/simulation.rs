//! Simulated PLC driver.
//!
//! Stands in for the hardware driver on a bench without a PLC: every tick it
//! toggles the heartbeat coil, bumps the first register and announces the
//! change on the I/O bus, exactly as a real read cycle would.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use arena_core::PlcState;
use arena_notify::Notifier;

const HEARTBEAT_COIL: &str = "heartbeat";

pub struct PlcSimulator {
    plc: Arc<PlcState>,
    bus: Notifier,
    heartbeat: Option<usize>,
}

impl PlcSimulator {
    pub fn new(plc: Arc<PlcState>, bus: Notifier) -> Self {
        let coils = &plc.topology().coil_names;
        // Fall back to the first coil when none is named "heartbeat".
        let heartbeat = coils
            .iter()
            .position(|name| name == HEARTBEAT_COIL)
            .or_else(|| (!coils.is_empty()).then_some(0));
        Self {
            plc,
            bus,
            heartbeat,
        }
    }

    /// One simulated read cycle.
    pub fn tick(&self) {
        let heartbeat = self.heartbeat;
        self.plc.update(|io| {
            if let Some(i) = heartbeat {
                io.coils[i] = !io.coils[i];
            }
            if let Some(first) = io.registers.first_mut() {
                *first = first.wrapping_add(1);
            }
        });
        self.bus.notify();
    }

    /// Tick every `interval` until `shutdown` fires.
    pub async fn run(self, interval: Duration, shutdown: CancellationToken) {
        info!(interval_ms = interval.as_millis() as u64, "Simulated PLC driver started");
        let mut ticker = tokio::time::interval(interval);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick();
                    ticks += 1;
                }
            }
        }

        debug!(ticks, "Simulated PLC driver stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::PlcTopology;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_tick_toggles_heartbeat_and_notifies() {
        let plc = Arc::new(PlcState::new(PlcTopology::default()));
        let bus = Notifier::new("plc_io_change");
        let mut listener = bus.subscribe();
        let sim = PlcSimulator::new(plc.clone(), bus);

        sim.tick();
        let snapshot = plc.snapshot();
        assert!(snapshot.coils[0]);
        assert_eq!(snapshot.registers[0], 1);
        assert_eq!(
            timeout(Duration::from_millis(200), listener.recv()).await,
            Ok(Some(()))
        );

        sim.tick();
        assert!(!plc.snapshot().coils[0]);
        assert_eq!(plc.snapshot().registers[0], 2);
    }

    #[test]
    fn test_empty_topology_still_ticks() {
        let plc = Arc::new(PlcState::new(PlcTopology::with_counts(1, 0, 0)));
        let sim = PlcSimulator::new(plc.clone(), Notifier::new("plc_io_change"));
        sim.tick();
        assert_eq!(plc.snapshot().inputs, vec![false]);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let plc = Arc::new(PlcState::new(PlcTopology::with_counts(0, 1, 1)));
        let sim = PlcSimulator::new(plc.clone(), Notifier::new("plc_io_change"));
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(sim.run(Duration::from_millis(5), shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown.cancel();

        timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        assert!(plc.snapshot().registers[0] > 0);
    }
}

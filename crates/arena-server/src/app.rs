//! Application wiring and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use arena_core::{PhaseTracker, PlcState};
use arena_dashboard::FieldState;
use arena_notify::ArenaNotifiers;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::simulation::PlcSimulator;

/// Owns the shared field state and the background tasks around it.
pub struct Application {
    config: AppConfig,
    field: FieldState,
    shutdown: CancellationToken,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        let plc = Arc::new(PlcState::new(config.plc.clone()));
        let phase = Arc::new(PhaseTracker::new(config.initial_phase));
        let field = FieldState::new(plc, phase, ArenaNotifiers::new());

        info!(
            inputs = config.plc.input_names.len(),
            registers = config.plc.register_names.len(),
            coils = config.plc.coil_names.len(),
            phase = %config.initial_phase,
            "Field state initialized"
        );

        Self {
            config,
            field,
            shutdown: CancellationToken::new(),
        }
    }

    /// Shared field state, for embedding a real driver.
    pub fn field(&self) -> &FieldState {
        &self.field
    }

    /// Token that stops the application when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until Ctrl-C or the shutdown token fires.
    pub async fn run(self) -> AppResult<()> {
        let simulator = self.config.simulation.enabled.then(|| {
            let sim = PlcSimulator::new(
                self.field.plc().clone(),
                self.field.notifiers().plc_io_change.clone(),
            );
            let interval = Duration::from_millis(self.config.simulation.interval_ms);
            tokio::spawn(sim.run(interval, self.shutdown.clone()))
        });

        let mut server = tokio::spawn(arena_dashboard::run_server(
            self.field.clone(),
            self.config.dashboard.clone(),
            self.shutdown.clone(),
        ));

        let early_exit = tokio::select! {
            result = &mut server => Some(result),
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                None
            }
            () = self.shutdown.cancelled() => None,
        };

        info!(
            viewers = self.field.notifiers().plc_io_change.listener_count(),
            "Shutting down"
        );
        self.shutdown.cancel();
        self.field.notifiers().close_all();

        if let Some(sim) = simulator {
            sim.await?;
        }

        let result = match early_exit {
            Some(result) => result,
            None => server.await,
        };
        if let Ok(Err(ref e)) = result {
            error!(error = %e, "Field setup server failed");
        }
        result??;

        info!("Shutdown complete");
        Ok(())
    }
}

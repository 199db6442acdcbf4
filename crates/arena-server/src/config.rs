//! Application configuration.

use arena_core::{MatchPhase, PlcTopology};
use arena_dashboard::DashboardConfig;
use arena_telemetry::{resolve_filter, DEFAULT_LOG_FILTER};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Simulated PLC driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Run the simulated driver. Off when real hardware feeds `PlcState`.
    #[serde(default)]
    pub enabled: bool,
    /// Tick interval (ms). Default: 1,000.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    1_000
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Phase the arena starts in.
    #[serde(default)]
    pub initial_phase: MatchPhase,
    /// `tracing` filter directives; `RUST_LOG` overrides them.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// PLC input/register/coil names.
    #[serde(default)]
    pub plc: PlcTopology,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_phase: MatchPhase::default(),
            log_filter: default_log_filter(),
            dashboard: DashboardConfig::default(),
            plc: PlcTopology::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::parse(&content)
    }

    /// Parse and validate a TOML document.
    pub fn parse(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.simulation.enabled && self.simulation.interval_ms == 0 {
            return Err(AppError::Config(
                "simulation.interval_ms must be positive".to_string(),
            ));
        }
        resolve_filter(None, &self.log_filter)
            .map_err(|e| AppError::Config(e.to_string()))?;
        if self.dashboard.max_connections == 0 {
            return Err(AppError::Config(
                "dashboard.max_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

//! Arena field monitor process.
//!
//! Wires the shared field state to the field setup server:
//! - TOML configuration (topology, dashboard, simulation)
//! - Field state construction and notification buses
//! - Optional simulated PLC driver
//! - Ctrl-C shutdown that tears down every viewer session

pub mod app;
pub mod config;
pub mod error;
pub mod simulation;

pub use app::Application;
pub use config::{AppConfig, SimulationConfig};
pub use error::{AppError, AppResult};
pub use simulation::PlcSimulator;

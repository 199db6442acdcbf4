//! arena-dashboard - Field setup endpoints and live PLC streaming.
//!
//! This crate serves the administrator-only field setup surface:
//!
//! - JSON status of the field (PLC values, LED modes, display assignments)
//! - Form endpoints for display assignment, display reload and LED test modes
//! - WebSocket stream of PLC snapshots, pushed on every I/O change
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        arena-server process                     │
//! │                                                                 │
//! │  ┌────────────────┐  ┌───────────────┐  ┌─────────────────┐    │
//! │  │   PlcState     │  │ PhaseTracker  │  │  ArenaNotifiers │    │
//! │  │   (Arc<>)      │  │   (Arc<>)     │  │ (plc_io_change) │    │
//! │  └───────┬────────┘  └───────┬───────┘  └────────┬────────┘    │
//! │          └───────────────────┼────────────────────┘             │
//! │                              ▼                                  │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │     FieldState (ModeController, DisplayRegistry)          │  │
//! │  └──────────────────────────┬────────────────────────────────┘  │
//! │                             │                                   │
//! │  ┌──────────────────────────┼────────────────────────────────┐  │
//! │  │       axum HTTP Server (basic auth)                       │  │
//! │  │  GET  /setup/field            → JSON status               │  │
//! │  │  POST /setup/field            → assign display            │  │
//! │  │  POST /setup/field/test       → LED test modes            │  │
//! │  │  GET  /setup/field/websocket  → StreamSession per viewer  │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use arena_dashboard::{run_server, DashboardConfig, FieldState};
//!
//! let field = FieldState::new(plc.clone(), phase.clone(), notifiers.clone());
//! let shutdown = CancellationToken::new();
//! tokio::spawn(async move {
//!     if let Err(e) = run_server(field, DashboardConfig::default(), shutdown).await {
//!         tracing::error!(error = %e, "Field setup server failed");
//!     }
//! });
//! ```

mod auth;
mod config;
mod error;
mod server;
mod session;
mod state;
mod types;

pub use config::DashboardConfig;
pub use error::{ApiError, SessionError};
pub use server::{create_router, run_server, serve, AppState, ConnectionGuard, ConnectionLimiter};
pub use session::{SessionEnd, StreamSession};
pub use state::FieldState;
pub use types::{FieldMessage, FieldStatus, ModeName};

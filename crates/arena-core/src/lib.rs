//! Core field types for the arena status layer.
//!
//! This crate provides the state shared by every other arena crate:
//! - `PlcState` / `PlcSnapshot`: discrete inputs, holding registers and coils
//! - `LedMode`, `VaultLedMode`: integer-coded illumination patterns
//! - `MatchPhase`, `PhaseTracker`: the arena lifecycle phase

pub mod error;
pub mod led;
pub mod phase;
pub mod plc;

pub use error::{CoreError, Result};
pub use led::{LedMode, LedPair, VaultLedMode};
pub use phase::{MatchPhase, PhaseTracker};
pub use plc::{PlcIoMut, PlcSnapshot, PlcState, PlcTopology};

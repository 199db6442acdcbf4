//! Field device state mutated by operators.
//!
//! - `ModeController`: phase-gated LED mode assignment for the paired
//!   (scale/switch) and uniform (vault) strip groups
//! - `DisplayRegistry`: display id to alliance station mapping, raising the
//!   team-loading notification on every assignment

pub mod displays;
pub mod error;
pub mod leds;
pub mod mode_controller;

pub use displays::DisplayRegistry;
pub use error::{FieldError, FieldResult};
pub use leds::{Alliance, PairedModes, UniformModes, VaultColumnModes, VaultLeds};
pub use mode_controller::ModeController;

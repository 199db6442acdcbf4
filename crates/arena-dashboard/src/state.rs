//! Field state shared by every handler and viewer session.
//!
//! FieldState bundles the owned state objects of the arena. Handlers and
//! sessions receive it at construction; nothing is reached through globals.

use std::sync::Arc;

use arena_core::{PhaseTracker, PlcSnapshot, PlcState};
use arena_field::{DisplayRegistry, ModeController};
use arena_notify::ArenaNotifiers;

use crate::types::FieldStatus;

/// Shared field state.
#[derive(Clone)]
pub struct FieldState {
    /// PLC values (written by the hardware driver).
    plc: Arc<PlcState>,
    /// Match phase (written by the arena loop).
    phase: Arc<PhaseTracker>,
    /// Notification buses.
    notifiers: ArenaNotifiers,
    /// LED mode assignment.
    modes: Arc<ModeController>,
    /// Display to station assignments.
    displays: Arc<DisplayRegistry>,
}

impl FieldState {
    pub fn new(plc: Arc<PlcState>, phase: Arc<PhaseTracker>, notifiers: ArenaNotifiers) -> Self {
        let modes = Arc::new(ModeController::new(phase.clone()));
        let displays = Arc::new(DisplayRegistry::new(notifiers.match_load_teams.clone()));
        Self {
            plc,
            phase,
            notifiers,
            modes,
            displays,
        }
    }

    pub fn plc(&self) -> &Arc<PlcState> {
        &self.plc
    }

    pub fn phase(&self) -> &Arc<PhaseTracker> {
        &self.phase
    }

    pub fn notifiers(&self) -> &ArenaNotifiers {
        &self.notifiers
    }

    pub fn modes(&self) -> &Arc<ModeController> {
        &self.modes
    }

    pub fn displays(&self) -> &Arc<DisplayRegistry> {
        &self.displays
    }

    /// Current PLC values.
    pub fn snapshot(&self) -> PlcSnapshot {
        self.plc.snapshot()
    }

    /// Collect the point-in-time status served to the setup page.
    pub fn collect_status(&self) -> FieldStatus {
        let topology = self.plc.topology();
        FieldStatus {
            alliance_station_displays: self.displays.all(),
            input_names: topology.input_names.clone(),
            register_names: topology.register_names.clone(),
            coil_names: topology.coil_names.clone(),
            plc: self.plc.snapshot(),
            current_led_mode: self.modes.current_paired_mode(),
            paired_modes: self.modes.paired_modes(),
            led_mode_names: FieldStatus::led_mode_names(),
            current_vault_led_mode: self.modes.current_uniform_mode(),
            vault_modes: self.modes.uniform_modes(),
            vault_led_mode_names: FieldStatus::vault_led_mode_names(),
            match_phase: self.phase.current(),
        }
    }
}

impl std::fmt::Debug for FieldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldState")
            .field("phase", &self.phase.current())
            .field(
                "viewers",
                &self.notifiers.plc_io_change.listener_count(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{LedMode, MatchPhase, PlcTopology, VaultLedMode};

    fn field() -> FieldState {
        FieldState::new(
            Arc::new(PlcState::new(PlcTopology::with_counts(3, 2, 1))),
            Arc::new(PhaseTracker::new(MatchPhase::PreMatch)),
            ArenaNotifiers::new(),
        )
    }

    #[test]
    fn test_status_reflects_modes_and_displays() {
        let field = field();
        field
            .modes()
            .apply_test_modes(LedMode::Purple, VaultLedMode::OneCube)
            .unwrap();
        field.displays().assign("display1", "red2");

        let status = field.collect_status();
        assert_eq!(status.input_names.len(), 3);
        assert_eq!(status.register_names.len(), 2);
        assert_eq!(status.coil_names, vec!["coil0".to_string()]);
        assert_eq!(status.current_led_mode.near, LedMode::Purple);
        assert_eq!(status.current_vault_led_mode, Some(VaultLedMode::OneCube));
        assert_eq!(
            status.alliance_station_displays.get("display1").map(String::as_str),
            Some("red2")
        );
        assert_eq!(status.match_phase, MatchPhase::PreMatch);
    }

    #[test]
    fn test_status_serializes() {
        let json = serde_json::to_value(field().collect_status()).unwrap();
        assert_eq!(json["match_phase"], "pre_match");
        assert_eq!(json["current_led_mode"]["near"], 0);
        assert!(json["current_vault_led_mode"].is_null());
        assert_eq!(json["plc"]["Registers"], serde_json::json!([0, 0]));
    }
}

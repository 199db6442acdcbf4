//! Dashboard API types.
//!
//! These types are used for JSON serialization in the status and WebSocket APIs.

use std::collections::HashMap;

use serde::Serialize;

use arena_core::{LedMode, LedPair, MatchPhase, PlcSnapshot, VaultLedMode};
use arena_field::{PairedModes, UniformModes};

/// WebSocket message, sent as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum FieldMessage {
    /// Current PLC values (sent on connect and after every change).
    #[serde(rename = "plcIoChange")]
    PlcIoChange(PlcSnapshot),
}

/// Integer code and display name of one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeName {
    pub code: u8,
    pub name: &'static str,
}

fn mode_names(list: Vec<(u8, &'static str)>) -> Vec<ModeName> {
    list.into_iter()
        .map(|(code, name)| ModeName { code, name })
        .collect()
}

/// Point-in-time field status for the setup page.
#[derive(Debug, Clone, Serialize)]
pub struct FieldStatus {
    /// Display id to alliance station.
    pub alliance_station_displays: HashMap<String, String>,
    pub input_names: Vec<String>,
    pub register_names: Vec<String>,
    pub coil_names: Vec<String>,
    /// Current PLC values.
    pub plc: PlcSnapshot,
    /// Paired mode shown on the scale.
    pub current_led_mode: LedPair,
    pub paired_modes: PairedModes,
    pub led_mode_names: Vec<ModeName>,
    /// Vault override, if any.
    pub current_vault_led_mode: Option<VaultLedMode>,
    pub vault_modes: UniformModes,
    pub vault_led_mode_names: Vec<ModeName>,
    pub match_phase: MatchPhase,
}

impl FieldStatus {
    pub(crate) fn led_mode_names() -> Vec<ModeName> {
        mode_names(LedMode::all_names())
    }

    pub(crate) fn vault_led_mode_names() -> Vec<ModeName> {
        mode_names(VaultLedMode::all_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plc_io_change_wire_format() {
        let msg = FieldMessage::PlcIoChange(PlcSnapshot {
            inputs: vec![true, false, true],
            registers: vec![10, 20],
            coils: vec![false],
        });

        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"plcIoChange","data":{"Inputs":[true,false,true],"Registers":[10,20],"Coils":[false]}}"#
        );
    }

    #[test]
    fn test_mode_names_cover_every_mode() {
        let names = FieldStatus::led_mode_names();
        assert_eq!(names.len(), LedMode::ALL.len());
        assert_eq!(names[1], ModeName { code: 1, name: "Red" });
        assert_eq!(
            FieldStatus::vault_led_mode_names().len(),
            VaultLedMode::ALL.len()
        );
    }
}

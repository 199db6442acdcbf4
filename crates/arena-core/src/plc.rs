//! PLC I/O state and snapshots.
//!
//! `PlcState` is the single owned copy of the field hardware values. The
//! hardware driver writes into it and then notifies the I/O change bus;
//! viewers only ever read it through `snapshot()`.
//!
//! Lengths of the three sequences are fixed by the `PlcTopology` at
//! construction and never change.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Point-in-time copy of every PLC value.
///
/// Serialized with the field names viewers expect (`Inputs`, `Registers`, `Coils`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlcSnapshot {
    pub inputs: Vec<bool>,
    pub registers: Vec<u16>,
    pub coils: Vec<bool>,
}

/// Names of every input, register and coil; defines sequence lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlcTopology {
    #[serde(default = "default_input_names")]
    pub input_names: Vec<String>,
    #[serde(default = "default_register_names")]
    pub register_names: Vec<String>,
    #[serde(default = "default_coil_names")]
    pub coil_names: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn default_input_names() -> Vec<String> {
    names(&[
        "fieldEstop",
        "redEstop1",
        "redEstop2",
        "redEstop3",
        "blueEstop1",
        "blueEstop2",
        "blueEstop3",
        "redConnected1",
        "redConnected2",
        "redConnected3",
        "blueConnected1",
        "blueConnected2",
        "blueConnected3",
        "scaleNear",
        "scaleFar",
        "redSwitchNear",
        "redSwitchFar",
        "blueSwitchNear",
        "blueSwitchFar",
        "redForceActivate",
        "redLevitateActivate",
        "redBoostActivate",
        "blueForceActivate",
        "blueLevitateActivate",
        "blueBoostActivate",
    ])
}

fn default_register_names() -> Vec<String> {
    names(&[
        "fieldIoConnection",
        "redForceDistance",
        "redLevitateDistance",
        "redBoostDistance",
        "blueForceDistance",
        "blueLevitateDistance",
        "blueBoostDistance",
    ])
}

fn default_coil_names() -> Vec<String> {
    names(&[
        "heartbeat",
        "matchReset",
        "stackLightGreen",
        "stackLightOrange",
        "stackLightRed",
        "stackLightBlue",
    ])
}

impl Default for PlcTopology {
    fn default() -> Self {
        Self {
            input_names: default_input_names(),
            register_names: default_register_names(),
            coil_names: default_coil_names(),
        }
    }
}

impl PlcTopology {
    /// Topology with placeholder names, mostly for tests.
    #[must_use]
    pub fn with_counts(inputs: usize, registers: usize, coils: usize) -> Self {
        Self {
            input_names: (0..inputs).map(|i| format!("input{i}")).collect(),
            register_names: (0..registers).map(|i| format!("register{i}")).collect(),
            coil_names: (0..coils).map(|i| format!("coil{i}")).collect(),
        }
    }

    fn zeroed(&self) -> PlcSnapshot {
        PlcSnapshot {
            inputs: vec![false; self.input_names.len()],
            registers: vec![0; self.register_names.len()],
            coils: vec![false; self.coil_names.len()],
        }
    }
}

/// Mutable view of the PLC values handed to `PlcState::update`.
///
/// Slices, so the closure can change values but never lengths.
pub struct PlcIoMut<'a> {
    pub inputs: &'a mut [bool],
    pub registers: &'a mut [u16],
    pub coils: &'a mut [bool],
}

/// Shared PLC I/O state.
///
/// Thread-safe: share via `Arc<PlcState>`. All three sequences sit behind one
/// lock, so a snapshot never mixes values from before and after an update.
#[derive(Debug)]
pub struct PlcState {
    topology: PlcTopology,
    io: RwLock<PlcSnapshot>,
}

impl PlcState {
    /// Create a state with every value cleared.
    #[must_use]
    pub fn new(topology: PlcTopology) -> Self {
        let io = RwLock::new(topology.zeroed());
        Self { topology, io }
    }

    #[must_use]
    pub fn topology(&self) -> &PlcTopology {
        &self.topology
    }

    /// Copy out the current values.
    #[must_use]
    pub fn snapshot(&self) -> PlcSnapshot {
        self.io.read().clone()
    }

    /// Replace every value at once (one driver read cycle).
    pub fn apply(&self, snapshot: PlcSnapshot) -> Result<()> {
        check_len("inputs", self.topology.input_names.len(), snapshot.inputs.len())?;
        check_len(
            "registers",
            self.topology.register_names.len(),
            snapshot.registers.len(),
        )?;
        check_len("coils", self.topology.coil_names.len(), snapshot.coils.len())?;

        *self.io.write() = snapshot;
        Ok(())
    }

    /// Mutate values in place under a single write lock.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(PlcIoMut<'_>) -> R,
    {
        let mut io = self.io.write();
        let PlcSnapshot {
            inputs,
            registers,
            coils,
        } = &mut *io;
        f(PlcIoMut {
            inputs,
            registers,
            coils,
        })
    }

    pub fn set_input(&self, index: usize, value: bool) -> Result<()> {
        self.update(|io| set_at("input", io.inputs, index, value))
    }

    pub fn set_register(&self, index: usize, value: u16) -> Result<()> {
        self.update(|io| set_at("register", io.registers, index, value))
    }

    pub fn set_coil(&self, index: usize, value: bool) -> Result<()> {
        self.update(|io| set_at("coil", io.coils, index, value))
    }
}

fn check_len(kind: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(CoreError::LengthMismatch {
            kind,
            expected,
            actual,
        })
    }
}

fn set_at<T>(kind: &'static str, slice: &mut [T], index: usize, value: T) -> Result<()> {
    let len = slice.len();
    match slice.get_mut(index) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(CoreError::IndexOutOfRange { kind, index, len }),
    }
}

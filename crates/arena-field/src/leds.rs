//! LED strip group state.
//!
//! Paired group: scale, red switch and blue switch strips, each with a
//! near/far `LedPair`.
//!
//! Uniform group: red and blue vaults, each with force/levitate/boost columns.
//! Game logic drives the automatic column modes; an operator override replaces
//! all three until cleared.

use serde::Serialize;

use arena_core::{LedPair, VaultLedMode};

/// Alliance owning a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Red,
    Blue,
}

impl std::fmt::Display for Alliance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// Current assignment of every paired strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PairedModes {
    pub scale: LedPair,
    pub red_switch: LedPair,
    pub blue_switch: LedPair,
}

impl PairedModes {
    pub(crate) fn set_all(&mut self, pair: LedPair) {
        self.scale = pair;
        self.red_switch = pair;
        self.blue_switch = pair;
    }
}

/// Modes of the three columns of one vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VaultColumnModes {
    pub force: VaultLedMode,
    pub levitate: VaultLedMode,
    pub boost: VaultLedMode,
}

impl VaultColumnModes {
    #[must_use]
    pub fn uniform(mode: VaultLedMode) -> Self {
        Self {
            force: mode,
            levitate: mode,
            boost: mode,
        }
    }

    /// Whether every column shows `mode`.
    #[must_use]
    pub fn all(&self, mode: VaultLedMode) -> bool {
        self.force == mode && self.levitate == mode && self.boost == mode
    }
}

/// One vault's LED state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VaultLeds {
    automatic: VaultColumnModes,
    forced: Option<VaultLedMode>,
}

impl VaultLeds {
    /// Modes the strip actually shows.
    #[must_use]
    pub fn effective(&self) -> VaultColumnModes {
        match self.forced {
            Some(mode) => VaultColumnModes::uniform(mode),
            None => self.automatic,
        }
    }

    /// Operator override, if any.
    #[must_use]
    pub fn forced(&self) -> Option<VaultLedMode> {
        self.forced
    }

    #[must_use]
    pub fn automatic(&self) -> VaultColumnModes {
        self.automatic
    }

    pub(crate) fn force_all(&mut self, mode: VaultLedMode) {
        self.forced = Some(mode);
    }

    pub(crate) fn clear_force(&mut self) {
        self.forced = None;
    }

    pub(crate) fn set_automatic(&mut self, modes: VaultColumnModes) {
        self.automatic = modes;
    }
}

/// Effective modes of both vaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UniformModes {
    pub red: VaultColumnModes,
    pub blue: VaultColumnModes,
}

impl UniformModes {
    /// Whether every column of every vault shows `mode`.
    #[must_use]
    pub fn all(&self, mode: VaultLedMode) -> bool {
        self.red.all(mode) && self.blue.all(mode)
    }
}

#[derive(Debug, Default)]
pub(crate) struct UniformGroup {
    pub(crate) red: VaultLeds,
    pub(crate) blue: VaultLeds,
}

impl UniformGroup {
    pub(crate) fn vault_mut(&mut self, alliance: Alliance) -> &mut VaultLeds {
        match alliance {
            Alliance::Red => &mut self.red,
            Alliance::Blue => &mut self.blue,
        }
    }

    pub(crate) fn effective(&self) -> UniformModes {
        UniformModes {
            red: self.red.effective(),
            blue: self.blue.effective(),
        }
    }
}

//! Illumination modes for the field LED strips.
//!
//! Two families exist:
//! - `LedMode`: scale and switch strips, assigned as a near/far `LedPair`
//! - `VaultLedMode`: vault column strips, assigned uniformly as an override
//!
//! Both are integer coded on the wire (form posts and status JSON).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreError;

/// Pattern shown on a scale or switch LED strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LedMode {
    #[default]
    Off,
    Red,
    Green,
    Blue,
    White,
    Purple,
    Chase,
    Warmup,
    Warmup2,
    Warmup3,
    Warmup4,
    FadeRedBlue,
    FadeSingle,
    Colorful,
    Blink,
    RedSides,
    BlueSides,
    Random,
}

impl LedMode {
    /// Every mode in code order.
    pub const ALL: [LedMode; 18] = [
        Self::Off,
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::White,
        Self::Purple,
        Self::Chase,
        Self::Warmup,
        Self::Warmup2,
        Self::Warmup3,
        Self::Warmup4,
        Self::FadeRedBlue,
        Self::FadeSingle,
        Self::Colorful,
        Self::Blink,
        Self::RedSides,
        Self::BlueSides,
        Self::Random,
    ];

    /// Integer code of this mode.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::White => "White",
            Self::Purple => "Purple",
            Self::Chase => "Chase",
            Self::Warmup => "Warmup",
            Self::Warmup2 => "Warmup Purple",
            Self::Warmup3 => "Warmup Sneaky",
            Self::Warmup4 => "Warmup Gradient",
            Self::FadeRedBlue => "Fade Red/Blue",
            Self::FadeSingle => "Fade Single",
            Self::Colorful => "Colorful",
            Self::Blink => "Blink",
            Self::RedSides => "Red Sides",
            Self::BlueSides => "Blue Sides",
            Self::Random => "Random",
        }
    }

    /// `(code, name)` for every mode, for status display.
    #[must_use]
    pub fn all_names() -> Vec<(u8, &'static str)> {
        Self::ALL.iter().map(|m| (m.code(), m.name())).collect()
    }

    /// Map an integer code, falling back to `Off` when out of range.
    #[must_use]
    pub fn from_code_lenient(code: i64) -> Self {
        Self::try_from(code).unwrap_or_else(|_| {
            warn!(code, "Out-of-range LED mode code, using Off");
            Self::Off
        })
    }

    /// Parse a form value, falling back to `Off` when it is not a valid code.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(code) => Self::from_code_lenient(code),
            Err(_) => {
                if !value.is_empty() {
                    warn!(value, "Non-numeric LED mode, using Off");
                }
                Self::Off
            }
        }
    }
}

impl TryFrom<i64> for LedMode {
    type Error = CoreError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(CoreError::InvalidLedMode(code))
    }
}

impl TryFrom<u8> for LedMode {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(code))
    }
}

impl From<LedMode> for u8 {
    fn from(mode: LedMode) -> Self {
        mode.code()
    }
}

impl std::fmt::Display for LedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Near/far assignment of one paired strip (primary and secondary mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedPair {
    pub near: LedMode,
    pub far: LedMode,
}

impl LedPair {
    #[must_use]
    pub fn new(near: LedMode, far: LedMode) -> Self {
        Self { near, far }
    }

    /// Both sides set to the same mode.
    #[must_use]
    pub fn uniform(mode: LedMode) -> Self {
        Self::new(mode, mode)
    }
}

/// Pattern shown on a vault column strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum VaultLedMode {
    #[default]
    Off,
    OneCube,
    TwoCubes,
    ThreeCubes,
    RedPlayed,
    BluePlayed,
}

impl VaultLedMode {
    /// Every mode in code order.
    pub const ALL: [VaultLedMode; 6] = [
        Self::Off,
        Self::OneCube,
        Self::TwoCubes,
        Self::ThreeCubes,
        Self::RedPlayed,
        Self::BluePlayed,
    ];

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::OneCube => "One Cube",
            Self::TwoCubes => "Two Cubes",
            Self::ThreeCubes => "Three Cubes",
            Self::RedPlayed => "Red Played",
            Self::BluePlayed => "Blue Played",
        }
    }

    #[must_use]
    pub fn all_names() -> Vec<(u8, &'static str)> {
        Self::ALL.iter().map(|m| (m.code(), m.name())).collect()
    }

    /// Map an integer code, falling back to `Off` when out of range.
    #[must_use]
    pub fn from_code_lenient(code: i64) -> Self {
        Self::try_from(code).unwrap_or_else(|_| {
            warn!(code, "Out-of-range vault LED mode code, using Off");
            Self::Off
        })
    }

    /// Parse a form value, falling back to `Off` when it is not a valid code.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(code) => Self::from_code_lenient(code),
            Err(_) => {
                if !value.is_empty() {
                    warn!(value, "Non-numeric vault LED mode, using Off");
                }
                Self::Off
            }
        }
    }
}

impl TryFrom<i64> for VaultLedMode {
    type Error = CoreError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(CoreError::InvalidVaultLedMode(code))
    }
}

impl TryFrom<u8> for VaultLedMode {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(code))
    }
}

impl From<VaultLedMode> for u8 {
    fn from(mode: VaultLedMode) -> Self {
        mode.code()
    }
}

impl std::fmt::Display for VaultLedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

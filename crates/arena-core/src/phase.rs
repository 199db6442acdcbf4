//! Arena match lifecycle phase.
//!
//! The phase is owned by the arena loop; everything else only reads it.
//! Mode assignment is permitted only in `PreMatch`.

use std::str::FromStr;

use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CoreError;

/// Arena lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Field idle between matches; the only phase that permits mode changes.
    #[default]
    PreMatch,
    StartMatch,
    WarmupPeriod,
    AutoPeriod,
    PausePeriod,
    TeleopPeriod,
    PostMatch,
    TimeoutActive,
    PostTimeout,
}

impl MatchPhase {
    /// Whether LED mode assignment is allowed in this phase.
    #[must_use]
    pub fn permits_mode_changes(self) -> bool {
        self == Self::PreMatch
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreMatch => write!(f, "pre_match"),
            Self::StartMatch => write!(f, "start_match"),
            Self::WarmupPeriod => write!(f, "warmup_period"),
            Self::AutoPeriod => write!(f, "auto_period"),
            Self::PausePeriod => write!(f, "pause_period"),
            Self::TeleopPeriod => write!(f, "teleop_period"),
            Self::PostMatch => write!(f, "post_match"),
            Self::TimeoutActive => write!(f, "timeout_active"),
            Self::PostTimeout => write!(f, "post_timeout"),
        }
    }
}

impl FromStr for MatchPhase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre_match" => Ok(Self::PreMatch),
            "start_match" => Ok(Self::StartMatch),
            "warmup_period" => Ok(Self::WarmupPeriod),
            "auto_period" => Ok(Self::AutoPeriod),
            "pause_period" => Ok(Self::PausePeriod),
            "teleop_period" => Ok(Self::TeleopPeriod),
            "post_match" => Ok(Self::PostMatch),
            "timeout_active" => Ok(Self::TimeoutActive),
            "post_timeout" => Ok(Self::PostTimeout),
            other => Err(CoreError::InvalidPhase(other.to_string())),
        }
    }
}

/// Shared holder of the current match phase.
///
/// Thread-safe: share via `Arc<PhaseTracker>`.
#[derive(Debug, Default)]
pub struct PhaseTracker {
    phase: RwLock<MatchPhase>,
}

impl PhaseTracker {
    #[must_use]
    pub fn new(initial: MatchPhase) -> Self {
        Self {
            phase: RwLock::new(initial),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn current(&self) -> MatchPhase {
        *self.phase.read()
    }

    /// Transition to a new phase (arena loop only).
    pub fn set(&self, phase: MatchPhase) {
        let old = std::mem::replace(&mut *self.phase.write(), phase);
        if old != phase {
            info!(from = %old, to = %phase, "Match phase changed");
        }
    }

    /// Hold the phase steady while the guard lives.
    ///
    /// Used to check-then-mutate without a phase change in between.
    pub fn lock(&self) -> RwLockReadGuard<'_, MatchPhase> {
        self.phase.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pre_match_permits_mode_changes() {
        assert!(MatchPhase::PreMatch.permits_mode_changes());
        for phase in [
            MatchPhase::StartMatch,
            MatchPhase::WarmupPeriod,
            MatchPhase::AutoPeriod,
            MatchPhase::PausePeriod,
            MatchPhase::TeleopPeriod,
            MatchPhase::PostMatch,
            MatchPhase::TimeoutActive,
            MatchPhase::PostTimeout,
        ] {
            assert!(!phase.permits_mode_changes(), "{phase} must not permit");
        }
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        let phase: MatchPhase = "teleop_period".parse().unwrap();
        assert_eq!(phase, MatchPhase::TeleopPeriod);
        assert_eq!(phase.to_string(), "teleop_period");
        assert!("halftime".parse::<MatchPhase>().is_err());
    }

    #[test]
    fn test_tracker_set_and_read() {
        let tracker = PhaseTracker::default();
        assert_eq!(tracker.current(), MatchPhase::PreMatch);

        tracker.set(MatchPhase::AutoPeriod);
        assert_eq!(tracker.current(), MatchPhase::AutoPeriod);
        assert_eq!(*tracker.lock(), MatchPhase::AutoPeriod);
    }
}

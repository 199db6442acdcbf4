//! Phase-gated LED mode assignment.
//!
//! Two independent state slots:
//! - paired group (scale + switches): `set_paired_mode(primary, secondary)`
//! - uniform group (vaults): `set_uniform_mode(mode)`, a forced override
//!
//! Every mutation requires `MatchPhase::PreMatch`. The phase read guard is held
//! across check and write, so the arena loop cannot leave pre-match halfway
//! through an assignment. Reads are allowed in every phase.
//!
//! Mode changes do not notify the PLC I/O bus.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use arena_core::{LedMode, LedPair, MatchPhase, PhaseTracker, VaultLedMode};
use arena_telemetry::Metrics;

use crate::error::{FieldError, FieldResult};
use crate::leds::{Alliance, PairedModes, UniformGroup, UniformModes, VaultColumnModes};

const PAIRED: &str = "paired";
const UNIFORM: &str = "uniform";

/// LED mode state machine for the field strips.
///
/// Thread-safe: share via `Arc<ModeController>`.
#[derive(Debug)]
pub struct ModeController {
    phase: Arc<PhaseTracker>,
    paired: RwLock<PairedModes>,
    uniform: RwLock<UniformGroup>,
}

impl ModeController {
    /// Create a controller with every strip off and no override.
    #[must_use]
    pub fn new(phase: Arc<PhaseTracker>) -> Self {
        Self {
            phase,
            paired: RwLock::new(PairedModes::default()),
            uniform: RwLock::new(UniformGroup::default()),
        }
    }

    /// Current match phase.
    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        self.phase.current()
    }

    /// Assign `primary`/`secondary` to the near/far side of every paired strip.
    ///
    /// Fails with `PhaseViolation` outside pre-match, leaving state untouched.
    pub fn set_paired_mode(&self, primary: LedMode, secondary: LedMode) -> FieldResult<()> {
        let phase = self.phase.lock();
        check_phase(*phase, PAIRED)?;
        self.write_paired(LedPair::new(primary, secondary));
        Ok(())
    }

    /// Force `mode` on every column of both vaults.
    ///
    /// The override persists until cleared or reassigned.
    pub fn set_uniform_mode(&self, mode: VaultLedMode) -> FieldResult<()> {
        let phase = self.phase.lock();
        check_phase(*phase, UNIFORM)?;
        self.write_uniform(mode);
        Ok(())
    }

    /// Apply both test assignments under a single phase check.
    ///
    /// The paired group gets `led` on both sides.
    pub fn apply_test_modes(&self, led: LedMode, vault: VaultLedMode) -> FieldResult<()> {
        let phase = self.phase.lock();
        // One request per group either way: check_phase counts the paired
        // rejection, the uniform one is counted here. Success counts both
        // through write_paired and write_uniform.
        if let Err(e) = check_phase(*phase, PAIRED) {
            Metrics::mode_rejected(UNIFORM);
            return Err(e);
        }
        self.write_paired(LedPair::uniform(led));
        self.write_uniform(vault);
        Ok(())
    }

    /// Drop the vault override, returning to automatic column modes.
    pub fn clear_uniform_override(&self) -> FieldResult<()> {
        let phase = self.phase.lock();
        check_phase(*phase, UNIFORM)?;
        let mut uniform = self.uniform.write();
        uniform.red.clear_force();
        uniform.blue.clear_force();
        info!("Vault LED override cleared");
        Ok(())
    }

    /// Game-logic update of one vault's automatic column modes.
    ///
    /// Not phase-gated; hidden while an override is active.
    pub fn set_vault_automatic(&self, alliance: Alliance, modes: VaultColumnModes) {
        let mut uniform = self.uniform.write();
        let vault = uniform.vault_mut(alliance);
        vault.set_automatic(modes);
        if vault.forced().is_some() {
            debug!(%alliance, "Vault automatic modes updated under override");
        }
    }

    /// Paired mode shown on the scale strip.
    #[must_use]
    pub fn current_paired_mode(&self) -> LedPair {
        self.paired.read().scale
    }

    /// Every paired strip.
    #[must_use]
    pub fn paired_modes(&self) -> PairedModes {
        *self.paired.read()
    }

    /// Active vault override, if any.
    #[must_use]
    pub fn current_uniform_mode(&self) -> Option<VaultLedMode> {
        self.uniform.read().red.forced()
    }

    /// Effective column modes of both vaults.
    #[must_use]
    pub fn uniform_modes(&self) -> UniformModes {
        self.uniform.read().effective()
    }

    fn write_paired(&self, pair: LedPair) {
        self.paired.write().set_all(pair);
        Metrics::mode_applied(PAIRED);
        info!(near = %pair.near, far = %pair.far, "Paired LED mode set");
    }

    fn write_uniform(&self, mode: VaultLedMode) {
        {
            let mut uniform = self.uniform.write();
            uniform.red.force_all(mode);
            uniform.blue.force_all(mode);
        }
        Metrics::mode_applied(UNIFORM);
        info!(mode = %mode, "Vault LED override set");
    }
}

fn check_phase(phase: MatchPhase, group: &str) -> FieldResult<()> {
    if phase.permits_mode_changes() {
        Ok(())
    } else {
        Metrics::mode_rejected(group);
        warn!(%phase, group, "Mode change rejected outside pre-match");
        Err(FieldError::PhaseViolation { phase })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_telemetry::metrics::MODE_REQUESTS_TOTAL;
    use tokio_test::{assert_err, assert_ok};

    fn mode_requests(group: &str, outcome: &str) -> u64 {
        MODE_REQUESTS_TOTAL
            .with_label_values(&[group, outcome])
            .get()
    }

    fn controller(phase: MatchPhase) -> (Arc<PhaseTracker>, ModeController) {
        let tracker = Arc::new(PhaseTracker::new(phase));
        let controller = ModeController::new(tracker.clone());
        (tracker, controller)
    }

    #[test]
    fn test_paired_mode_applies_in_pre_match() {
        let (_, ctl) = controller(MatchPhase::PreMatch);
        ctl.set_paired_mode(LedMode::Red, LedMode::Blue).unwrap();

        let modes = ctl.paired_modes();
        let expected = LedPair::new(LedMode::Red, LedMode::Blue);
        assert_eq!(modes.scale, expected);
        assert_eq!(modes.red_switch, expected);
        assert_eq!(modes.blue_switch, expected);
        assert_eq!(ctl.current_paired_mode(), expected);
    }

    #[test]
    fn test_paired_mode_same_value_both_sides_is_idempotent() {
        let (_, ctl) = controller(MatchPhase::PreMatch);
        ctl.set_paired_mode(LedMode::Chase, LedMode::Chase).unwrap();
        let first = ctl.paired_modes();

        ctl.set_paired_mode(LedMode::Chase, LedMode::Chase).unwrap();
        assert_eq!(ctl.paired_modes(), first);
    }

    #[test]
    fn test_paired_mode_rejected_outside_pre_match() {
        let (tracker, ctl) = controller(MatchPhase::PreMatch);
        ctl.set_paired_mode(LedMode::Green, LedMode::Green).unwrap();
        let before = ctl.paired_modes();

        tracker.set(MatchPhase::TeleopPeriod);
        let err = ctl.set_paired_mode(LedMode::Red, LedMode::Red).unwrap_err();
        assert_eq!(
            err,
            FieldError::PhaseViolation {
                phase: MatchPhase::TeleopPeriod
            }
        );
        assert_eq!(ctl.paired_modes(), before);
    }

    #[test]
    fn test_uniform_mode_applies_to_every_member() {
        let (_, ctl) = controller(MatchPhase::PreMatch);
        let mode = VaultLedMode::try_from(2i64).unwrap();
        ctl.set_uniform_mode(mode).unwrap();

        assert_eq!(ctl.current_uniform_mode(), Some(VaultLedMode::TwoCubes));
        assert!(ctl.uniform_modes().all(VaultLedMode::TwoCubes));
    }

    #[test]
    fn test_uniform_mode_rejected_while_running() {
        let (_, ctl) = controller(MatchPhase::AutoPeriod);
        let before = ctl.uniform_modes();

        let err = ctl.set_uniform_mode(VaultLedMode::TwoCubes).unwrap_err();
        assert!(matches!(err, FieldError::PhaseViolation { .. }));
        assert_eq!(ctl.uniform_modes(), before);
        assert_eq!(ctl.current_uniform_mode(), None);
    }

    #[test]
    fn test_override_persists_over_automatic_until_cleared() {
        let (tracker, ctl) = controller(MatchPhase::PreMatch);
        ctl.set_uniform_mode(VaultLedMode::BluePlayed).unwrap();

        tracker.set(MatchPhase::TeleopPeriod);
        ctl.set_vault_automatic(Alliance::Red, VaultColumnModes::uniform(VaultLedMode::OneCube));
        assert!(ctl.uniform_modes().all(VaultLedMode::BluePlayed));

        // Clearing is itself phase-gated.
        assert_err!(ctl.clear_uniform_override());

        tracker.set(MatchPhase::PreMatch);
        assert_ok!(ctl.clear_uniform_override());
        let modes = ctl.uniform_modes();
        assert!(modes.red.all(VaultLedMode::OneCube));
        assert!(modes.blue.all(VaultLedMode::Off));
    }

    #[test]
    fn test_apply_test_modes() {
        let (tracker, ctl) = controller(MatchPhase::PreMatch);
        assert_ok!(ctl.apply_test_modes(LedMode::Warmup, VaultLedMode::ThreeCubes));
        assert_eq!(ctl.current_paired_mode(), LedPair::uniform(LedMode::Warmup));
        assert!(ctl.uniform_modes().all(VaultLedMode::ThreeCubes));

        tracker.set(MatchPhase::PostMatch);
        assert_err!(ctl.apply_test_modes(LedMode::Off, VaultLedMode::Off));
        assert_eq!(ctl.current_paired_mode(), LedPair::uniform(LedMode::Warmup));
        assert_eq!(ctl.current_uniform_mode(), Some(VaultLedMode::ThreeCubes));
    }

    #[test]
    fn test_reads_available_in_every_phase() {
        let (_, ctl) = controller(MatchPhase::TimeoutActive);
        assert_eq!(ctl.current_paired_mode(), LedPair::default());
        assert_eq!(ctl.uniform_modes(), UniformModes::default());
        assert_eq!(ctl.phase(), MatchPhase::TimeoutActive);
    }

    #[test]
    fn test_concurrent_phase_change_never_splits_assignment() {
        let (tracker, ctl) = controller(MatchPhase::PreMatch);
        let ctl = Arc::new(ctl);

        let flipper = {
            let tracker = tracker.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    tracker.set(if i % 2 == 0 {
                        MatchPhase::AutoPeriod
                    } else {
                        MatchPhase::PreMatch
                    });
                }
            })
        };

        for _ in 0..500 {
            match ctl.apply_test_modes(LedMode::Blink, VaultLedMode::OneCube) {
                Ok(()) | Err(FieldError::PhaseViolation { .. }) => {}
            }
        }
        flipper.join().unwrap();

        // Either both assignments landed or neither did.
        let paired_set = ctl.current_paired_mode() == LedPair::uniform(LedMode::Blink);
        let uniform_set = ctl.current_uniform_mode() == Some(VaultLedMode::OneCube);
        assert_eq!(paired_set, uniform_set);
    }

    #[test]
    fn test_apply_test_modes_counts_both_groups() {
        let (tracker, ctl) = controller(MatchPhase::PreMatch);

        // Other tests touch the same counters concurrently, so only lower
        // bounds are stable.
        let paired_applied = mode_requests(PAIRED, "applied");
        let uniform_applied = mode_requests(UNIFORM, "applied");
        assert_ok!(ctl.apply_test_modes(LedMode::Blue, VaultLedMode::OneCube));
        assert!(mode_requests(PAIRED, "applied") > paired_applied);
        assert!(mode_requests(UNIFORM, "applied") > uniform_applied);

        tracker.set(MatchPhase::AutoPeriod);
        let paired_rejected = mode_requests(PAIRED, "rejected");
        let uniform_rejected = mode_requests(UNIFORM, "rejected");
        assert_err!(ctl.apply_test_modes(LedMode::Red, VaultLedMode::Off));
        assert!(mode_requests(PAIRED, "rejected") > paired_rejected);
        assert!(mode_requests(UNIFORM, "rejected") > uniform_rejected);
    }
}

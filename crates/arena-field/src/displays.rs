//! Display to alliance-station assignments.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::info;

use arena_notify::Notifier;

/// Mapping of display id to the alliance station it shows.
///
/// Keys are not pre-declared; the last assignment wins. Every `assign`
/// raises the team-loading notification, whether or not the value changed.
#[derive(Debug)]
pub struct DisplayRegistry {
    displays: RwLock<HashMap<String, String>>,
    match_load_teams: Notifier,
}

impl DisplayRegistry {
    #[must_use]
    pub fn new(match_load_teams: Notifier) -> Self {
        Self {
            displays: RwLock::new(HashMap::new()),
            match_load_teams,
        }
    }

    /// Upsert an assignment and raise the team-loading notification.
    pub fn assign(&self, display_id: impl Into<String>, station: impl Into<String>) {
        let display_id = display_id.into();
        let station = station.into();

        let previous = self
            .displays
            .write()
            .insert(display_id.clone(), station.clone());
        info!(
            display_id = %display_id,
            station = %station,
            previous = ?previous,
            "Display station assigned"
        );

        self.match_load_teams.notify();
    }

    #[must_use]
    pub fn get(&self, display_id: &str) -> Option<String> {
        self.displays.read().get(display_id).cloned()
    }

    /// Copy of every assignment.
    #[must_use]
    pub fn all(&self) -> HashMap<String, String> {
        self.displays.read().clone()
    }
}

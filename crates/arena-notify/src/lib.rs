//! Signal-only notification buses.
//!
//! A `Notifier` carries no payload: producers announce "state changed" and
//! every live `Listener` wakes up and re-reads whatever state it watches.
//!
//! ```text
//! driver ──notify()──► Notifier ──wake──► Listener (session 1)
//!                         │      ──wake──► Listener (session 2)
//!                         └────  ──wake──► Listener (session N)
//! ```

mod notifier;

pub use notifier::{ArenaNotifiers, Listener, Notifier, LISTENER_BUFFER};

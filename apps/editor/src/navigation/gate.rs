//! Per-step state machine behind the wizard's advance and retreat buttons.
//!
//! ```text
//!  Ready ──edit──▶ Dirty ──save──▶ Saving ──ok──▶ Ready
//!    ▲                ▲               │
//!    │                └─edit── Error ◀┘ failed
//!    └──────────── force_ready (any state but Saving)
//! ```
//!
//! The host is told `false` on the first edit since the last Ready, and `true` only
//! when the save cycle that follows completes, whichever way it ends.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

/// Host-UI side of a wizard step.
pub trait StepHost: Send + Sync {
    fn set_next_enabled(&self, enabled: bool);
    fn set_prev_enabled(&self, enabled: bool);
}

/// Host for controllers that are not mounted in a wizard step.
pub struct DetachedHost;

impl StepHost for DetachedHost {
    fn set_next_enabled(&self, _enabled: bool) {}
    fn set_prev_enabled(&self, _enabled: bool) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Ready,
    Dirty,
    Saving,
    Error,
}

impl GateState {
    /// Whether the host may offer advance/retreat in this state.
    pub fn affordances_enabled(self) -> bool {
        matches!(self, GateState::Ready | GateState::Error)
    }
}

/// Cloneable handle; clones share the same state machine.
#[derive(Clone)]
pub struct NavigationGate {
    label: &'static str,
    state: Arc<Mutex<GateState>>,
    host: Arc<dyn StepHost>,
}

impl NavigationGate {
    pub fn new(label: &'static str, host: Arc<dyn StepHost>) -> Self {
        Self {
            label,
            state: Arc::new(Mutex::new(GateState::Ready)),
            host,
        }
    }

    pub fn state(&self) -> GateState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn can_navigate(&self) -> bool {
        self.state().affordances_enabled()
    }

    /// Any field edit.
    pub fn on_edit(&self) {
        self.transition("edit", |s| match s {
            GateState::Ready | GateState::Error | GateState::Dirty => GateState::Dirty,
            GateState::Saving => GateState::Saving,
        });
    }

    /// Returns `false` (and changes nothing) when a save is already running.
    pub fn begin_save(&self) -> bool {
        let mut started = false;
        self.transition("save", |s| match s {
            GateState::Saving => GateState::Saving,
            _ => {
                started = true;
                GateState::Saving
            }
        });
        started
    }

    pub fn save_succeeded(&self) {
        self.finish_save("save succeeded", GateState::Ready);
    }

    pub fn save_failed(&self) {
        self.finish_save("save failed", GateState::Error);
    }

    /// Entering a step with nothing unsaved. Re-announces the enabled affordances to
    /// the host even when the state does not change.
    pub fn force_ready(&self) {
        let state = {
            let mut state = self.lock();
            if *state == GateState::Saving {
                warn!("[{}] force_ready ignored while a save is running", self.label);
                return;
            }
            *state = GateState::Ready;
            *state
        };
        debug!("[{}] forced ready", self.label);
        self.announce(state);
    }

    /// Pushes the current affordances to the host without changing state.
    pub fn announce_current(&self) {
        self.announce(self.state());
    }

    fn finish_save(&self, event: &str, to: GateState) {
        let mut unexpected = None;
        self.transition(event, |s| match s {
            GateState::Saving => to,
            other => {
                unexpected = Some(other);
                other
            }
        });
        if let Some(state) = unexpected {
            warn!("[{}] '{event}' arrived in state {state:?}; ignored", self.label);
        }
    }

    fn transition<F>(&self, event: &str, f: F)
    where
        F: FnOnce(GateState) -> GateState,
    {
        let (from, to) = {
            let mut state = self.lock();
            let from = *state;
            *state = f(from);
            (from, *state)
        };
        if from != to {
            debug!("[{}] {event}: {from:?} -> {to:?}", self.label);
        }
        // Host calls happen outside the lock and only when the affordances flip.
        if from.affordances_enabled() != to.affordances_enabled() {
            self.announce(to);
        }
    }

    fn announce(&self, state: GateState) {
        let enabled = state.affordances_enabled();
        self.host.set_next_enabled(enabled);
        self.host.set_prev_enabled(enabled);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingHost;

    fn gate() -> (NavigationGate, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        (NavigationGate::new("test", host.clone()), host)
    }

    #[test]
    fn test_edit_from_ready_disables_once() {
        let (gate, host) = gate();
        gate.on_edit();
        gate.on_edit();
        assert_eq!(gate.state(), GateState::Dirty);
        assert_eq!(host.next_calls(), vec![false]);
        assert_eq!(host.prev_calls(), vec![false]);
    }

    #[test]
    fn test_successful_cycle_returns_to_ready() {
        let (gate, host) = gate();
        gate.on_edit();
        assert!(gate.begin_save());
        assert_eq!(gate.state(), GateState::Saving);
        assert!(!gate.can_navigate());

        gate.save_succeeded();
        assert_eq!(gate.state(), GateState::Ready);
        assert_eq!(host.next_calls(), vec![false, true]);
    }

    #[test]
    fn test_failed_cycle_goes_to_error_and_releases() {
        let (gate, host) = gate();
        gate.on_edit();
        gate.begin_save();
        gate.save_failed();

        assert_eq!(gate.state(), GateState::Error);
        assert!(gate.can_navigate());
        assert_eq!(host.prev_calls(), vec![false, true]);

        gate.on_edit();
        assert_eq!(gate.state(), GateState::Dirty);
        assert_eq!(host.prev_calls(), vec![false, true, false]);
    }

    #[test]
    fn test_second_save_while_saving_is_refused() {
        let (gate, _host) = gate();
        gate.on_edit();
        assert!(gate.begin_save());
        assert!(!gate.begin_save());
        assert_eq!(gate.state(), GateState::Saving);
    }

    #[test]
    fn test_edit_while_saving_keeps_saving() {
        let (gate, _host) = gate();
        gate.begin_save();
        gate.on_edit();
        assert_eq!(gate.state(), GateState::Saving);
    }

    #[test]
    fn test_stray_completion_is_ignored() {
        let (gate, host) = gate();
        gate.save_succeeded();
        gate.save_failed();
        assert_eq!(gate.state(), GateState::Ready);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_force_ready_announces_and_clears_error() {
        let (gate, host) = gate();
        gate.force_ready();
        assert_eq!(host.next_calls(), vec![true]);

        gate.begin_save();
        gate.force_ready();
        assert_eq!(gate.state(), GateState::Saving);

        gate.save_failed();
        gate.force_ready();
        assert_eq!(gate.state(), GateState::Ready);
    }
}

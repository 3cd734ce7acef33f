//! Save lifecycle shared by every section controller.
//!
//! At most one save per controller is in flight. A second attempt is turned away
//! with `EditorError::Busy` before anything changes. Completion always releases the
//! navigation gate, and never touches the local buffer. Once the owning controller
//! is dropped the cycle is detached: a late completion only clears the in-flight
//! flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::errors::EditorError;
use crate::gateway::ResumeGateway;
use crate::models::resume::{ResumeId, SectionKey, SectionPayload};
use crate::navigation::NavigationGate;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
    Succeeded,
    Failed(String),
}

/// What a successful save hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub section: SectionKey,
    /// Fields the backend reports as stored.
    pub accepted: Value,
}

pub(crate) struct SaveCycle {
    section: SectionKey,
    state: Mutex<SaveState>,
    in_flight: AtomicBool,
    detached: AtomicBool,
    gate: Option<NavigationGate>,
}

impl SaveCycle {
    pub(crate) fn new(section: SectionKey, gate: Option<NavigationGate>) -> Arc<Self> {
        Arc::new(Self {
            section,
            state: Mutex::new(SaveState::Idle),
            in_flight: AtomicBool::new(false),
            detached: AtomicBool::new(false),
            gate,
        })
    }

    pub(crate) fn state(&self) -> SaveState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn gate(&self) -> Option<&NavigationGate> {
        self.gate.as_ref()
    }

    pub(crate) fn note_edit(&self) {
        if let Some(gate) = &self.gate {
            gate.on_edit();
        }
    }

    /// Cheap pre-check so validation errors are not reported while a save runs.
    pub(crate) fn ensure_idle(&self) -> Result<(), EditorError> {
        if self.in_flight.load(Ordering::Acquire) {
            warn!("Save of '{}' rejected: previous save still in flight", self.section);
            return Err(EditorError::Busy(self.section));
        }
        Ok(())
    }

    pub(crate) fn begin(self: &Arc<Self>) -> Result<SaveTicket, EditorError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Save of '{}' rejected: previous save still in flight", self.section);
            return Err(EditorError::Busy(self.section));
        }

        self.set_state(SaveState::Saving);
        if let Some(gate) = &self.gate {
            gate.begin_save();
        }
        Ok(SaveTicket {
            cycle: Arc::clone(self),
            settled: false,
        })
    }

    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    fn set_state(&self, state: SaveState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// Proof that this caller owns the in-flight slot. Settles exactly once; dropping
/// it unsettled counts as a failure so the gate is never left in `Saving`.
pub(crate) struct SaveTicket {
    cycle: Arc<SaveCycle>,
    settled: bool,
}

impl SaveTicket {
    pub(crate) async fn persist(
        mut self,
        gateway: Arc<dyn ResumeGateway>,
        id: ResumeId,
        payload: SectionPayload,
    ) -> Result<SaveReport, EditorError> {
        let section = payload.key();
        info!("Saving section '{section}' of resume {id}");

        match gateway.update(&id, &payload).await {
            Ok(accepted) => {
                info!("Saved section '{section}' of resume {id}");
                self.settle(SaveState::Succeeded);
                Ok(SaveReport { section, accepted })
            }
            Err(e) => {
                error!("Saving section '{section}' of resume {id} failed: {e}");
                self.settle(SaveState::Failed(e.to_string()));
                Err(EditorError::Gateway(e))
            }
        }
    }

    fn settle(&mut self, outcome: SaveState) {
        self.settled = true;
        let cycle = &self.cycle;

        if cycle.detached.load(Ordering::Acquire) {
            debug!(
                "Section '{}' was torn down mid-save; completion ignored",
                cycle.section
            );
            cycle.in_flight.store(false, Ordering::Release);
            return;
        }

        let succeeded = outcome == SaveState::Succeeded;
        cycle.set_state(outcome);
        cycle.in_flight.store(false, Ordering::Release);
        if let Some(gate) = &cycle.gate {
            if succeeded {
                gate.save_succeeded();
            } else {
                gate.save_failed();
            }
        }
    }
}

impl Drop for SaveTicket {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Save of '{}' abandoned before completion", self.cycle.section);
            self.settle(SaveState::Failed(
                "save was abandoned before it completed".to_string(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::GateState;
    use crate::test_support::RecordingHost;

    fn cycle_with_gate() -> (Arc<SaveCycle>, NavigationGate) {
        let gate = NavigationGate::new("education", Arc::new(RecordingHost::default()));
        (SaveCycle::new(SectionKey::Education, Some(gate.clone())), gate)
    }

    #[test]
    fn test_second_begin_is_busy_and_changes_nothing() {
        let (cycle, gate) = cycle_with_gate();
        let _ticket = cycle.begin().unwrap();

        let err = cycle.begin().err().unwrap();
        assert!(matches!(err, EditorError::Busy(SectionKey::Education)));
        assert_eq!(cycle.state(), SaveState::Saving);
        assert_eq!(gate.state(), GateState::Saving);
    }

    #[test]
    fn test_dropped_ticket_releases_gate() {
        let (cycle, gate) = cycle_with_gate();
        gate.on_edit();
        drop(cycle.begin().unwrap());

        assert!(matches!(cycle.state(), SaveState::Failed(_)));
        assert_eq!(gate.state(), GateState::Error);
        assert!(cycle.ensure_idle().is_ok());
    }

    #[test]
    fn test_detached_cycle_ignores_completion() {
        let (cycle, gate) = cycle_with_gate();
        let ticket = cycle.begin().unwrap();
        cycle.detach();
        drop(ticket);

        assert_eq!(cycle.state(), SaveState::Saving);
        assert_eq!(gate.state(), GateState::Saving);
        assert!(cycle.ensure_idle().is_ok());
    }
}

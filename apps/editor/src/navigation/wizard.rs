use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::navigation::gate::StepHost;

/// Wizard steps in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Personal,
    Education,
    Experience,
    Projects,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Personal,
        WizardStep::Education,
        WizardStep::Experience,
        WizardStep::Projects,
    ];

    pub fn next(self) -> Option<WizardStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|p| Self::ALL[p])
    }

    /// Position in [`WizardStep::ALL`].
    pub fn index(self) -> usize {
        match self {
            WizardStep::Personal => 0,
            WizardStep::Education => 1,
            WizardStep::Experience => 2,
            WizardStep::Projects => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Personal => "personal",
            WizardStep::Education => "education",
            WizardStep::Experience => "experience",
            WizardStep::Projects => "projects",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forwards a step's affordance changes to the real host only while that step is
/// the one on screen. Every step of a session shares the same `current` cell.
pub struct ActiveStepHost {
    step: WizardStep,
    current: Arc<Mutex<WizardStep>>,
    host: Arc<dyn StepHost>,
}

impl ActiveStepHost {
    pub fn new(step: WizardStep, current: Arc<Mutex<WizardStep>>, host: Arc<dyn StepHost>) -> Self {
        Self { step, current, host }
    }

    fn is_active(&self) -> bool {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) == self.step
    }
}

impl StepHost for ActiveStepHost {
    fn set_next_enabled(&self, enabled: bool) {
        if self.is_active() {
            self.host.set_next_enabled(enabled);
        }
    }

    fn set_prev_enabled(&self, enabled: bool) {
        if self.is_active() {
            self.host.set_prev_enabled(enabled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingHost;

    #[test]
    fn test_step_order() {
        assert_eq!(WizardStep::Personal.prev(), None);
        assert_eq!(WizardStep::Personal.next(), Some(WizardStep::Education));
        assert_eq!(WizardStep::Projects.prev(), Some(WizardStep::Experience));
        assert_eq!(WizardStep::Projects.next(), None);
    }

    #[test]
    fn test_inactive_step_does_not_reach_host() {
        let host = Arc::new(RecordingHost::default());
        let current = Arc::new(Mutex::new(WizardStep::Personal));
        let education = ActiveStepHost::new(WizardStep::Education, current.clone(), host.clone());

        education.set_next_enabled(false);
        assert!(host.calls().is_empty());

        *current.lock().unwrap() = WizardStep::Education;
        education.set_next_enabled(false);
        assert_eq!(host.next_calls(), vec![false]);
    }
}

//! One editing session: a fetched document, the shared store holding it, and the
//! controllers mounted on it.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::document::DocumentStore;
use crate::errors::EditorError;
use crate::gateway::ResumeGateway;
use crate::models::resume::{ResumeDocument, ResumeId};
use crate::navigation::{ActiveStepHost, GateState, NavigationGate, StepHost, WizardStep};
use crate::sections::education::Education;
use crate::sections::experience::Experience;
use crate::sections::personal::PersonalController;
use crate::sections::projects::Projects;
use crate::sections::theme::ThemeController;
use crate::sections::SectionController;

pub struct EditorSession {
    store: DocumentStore,
    current: Arc<Mutex<WizardStep>>,
    gates: [NavigationGate; 4],
    personal: PersonalController,
    education: SectionController<Education>,
    experience: SectionController<Experience>,
    projects: SectionController<Projects>,
    theme: ThemeController,
}

impl EditorSession {
    /// Fetches `id` and mounts every section on it. The wizard starts on the
    /// personal-details step.
    pub async fn open(
        gateway: Arc<dyn ResumeGateway>,
        id: &ResumeId,
        host: Arc<dyn StepHost>,
    ) -> Result<Self, EditorError> {
        let document = gateway.fetch_one(id).await?;
        if document.id != *id {
            return Err(EditorError::IdentityChanged {
                loaded: id.clone(),
                attempted: document.id,
            });
        }
        Self::from_document(gateway, document, host)
    }

    pub fn from_document(
        gateway: Arc<dyn ResumeGateway>,
        document: ResumeDocument,
        host: Arc<dyn StepHost>,
    ) -> Result<Self, EditorError> {
        info!("Opening editing session for resume {}", document.id);
        let store = DocumentStore::new();
        store.load(document);

        let current = Arc::new(Mutex::new(WizardStep::Personal));
        let gates = WizardStep::ALL.map(|step| {
            NavigationGate::new(
                step.as_str(),
                Arc::new(ActiveStepHost::new(step, current.clone(), host.clone())),
            )
        });

        let session = Self {
            personal: PersonalController::new(
                store.clone(),
                gateway.clone(),
                Some(gates[WizardStep::Personal.index()].clone()),
            )?,
            education: SectionController::new(
                store.clone(),
                gateway.clone(),
                Some(gates[WizardStep::Education.index()].clone()),
            )?,
            experience: SectionController::new(
                store.clone(),
                gateway.clone(),
                Some(gates[WizardStep::Experience.index()].clone()),
            )?,
            projects: SectionController::new(
                store.clone(),
                gateway.clone(),
                Some(gates[WizardStep::Projects.index()].clone()),
            )?,
            theme: ThemeController::new(store.clone(), gateway)?,
            store,
            current,
            gates,
        };
        session.enter(WizardStep::Personal);
        Ok(session)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Combined document as every section currently sees it, saved or not.
    pub fn document(&self) -> Result<Arc<ResumeDocument>, EditorError> {
        self.store.require()
    }

    pub fn personal(&self) -> &PersonalController {
        &self.personal
    }

    pub fn education(&self) -> &SectionController<Education> {
        &self.education
    }

    pub fn experience(&self) -> &SectionController<Experience> {
        &self.experience
    }

    pub fn projects(&self) -> &SectionController<Projects> {
        &self.projects
    }

    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    pub fn step(&self) -> WizardStep {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn gate(&self, step: WizardStep) -> &NavigationGate {
        &self.gates[step.index()]
    }

    pub fn advance(&self) -> Result<WizardStep, EditorError> {
        self.move_to(WizardStep::next, "no step after")
    }

    pub fn retreat(&self) -> Result<WizardStep, EditorError> {
        self.move_to(WizardStep::prev, "no step before")
    }

    /// Tears every controller down. Saves still in flight finish against the
    /// backend, but their completions no longer touch any state.
    pub fn close(self) {
        info!("Closing editing session");
        self.store.clear();
    }

    fn move_to(
        &self,
        target: fn(WizardStep) -> Option<WizardStep>,
        missing: &str,
    ) -> Result<WizardStep, EditorError> {
        let step = self.step();
        if !self.gate(step).can_navigate() {
            return Err(EditorError::NavigationLocked(step));
        }
        let next = target(step)
            .ok_or_else(|| EditorError::Validation(format!("{missing} '{step}'")))?;
        self.enter(next);
        Ok(next)
    }

    fn enter(&self, step: WizardStep) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = step;
        let gate = self.gate(step);
        if gate.state() == GateState::Ready {
            gate.force_ready();
        } else {
            gate.announce_current();
        }
    }
}

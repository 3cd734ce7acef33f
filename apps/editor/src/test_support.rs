//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::document::DocumentStore;
use crate::gateway::{GatewayError, InMemoryGateway, ResumeGateway};
use crate::models::resume::{
    EducationRecord, ExperienceRecord, GradeType, NewResume, PersonalDetails, ProjectRecord,
    ResumeDocument, ResumeId, ResumeSummary, SectionPayload,
};
use crate::navigation::{NavigationGate, StepHost};
use crate::rich_text::RichText;
use crate::sections::{ListSection, SectionController};

pub const OWNER: &str = "u1";

pub fn sample_document() -> ResumeDocument {
    let mut doc = ResumeDocument::new(ResumeId::new("resume-1"), "Backend Engineer");
    doc.personal = PersonalDetails {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        job_title: "Engineer".to_string(),
        address: "12 St James's Square, London".to_string(),
        phone: "+44 20 0000 0000".to_string(),
        email: "ada@example.org".to_string(),
    };
    doc.theme_color = "#336699".to_string();
    doc.education = vec![EducationRecord {
        university_name: "University of London".to_string(),
        degree: "BSc".to_string(),
        major: "Mathematics".to_string(),
        grade: "3.8".to_string(),
        grade_type: GradeType::Gpa,
        start_date: "2015-09-01".to_string(),
        end_date: "2019-06-30".to_string(),
        description: String::new(),
    }];
    doc.experience = vec![ExperienceRecord {
        title: "Engineer".to_string(),
        company_name: "Analytical Engines Ltd".to_string(),
        city: "London".to_string(),
        state: "UK".to_string(),
        start_date: "2019-07-01".to_string(),
        end_date: String::new(),
        currently_working: true,
        work_summary: RichText::new("<ul><li>Shipped</li></ul>"),
    }];
    doc.projects = vec![ProjectRecord {
        project_name: "Difference Engine".to_string(),
        tech_stack: "Brass, Steam".to_string(),
        project_summary: RichText::new("<p>Tables</p>"),
    }];
    doc
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Next,
    Prev,
}

/// Step host that records every call it receives.
#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<(Affordance, bool)>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<(Affordance, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn next_calls(&self) -> Vec<bool> {
        self.only(Affordance::Next)
    }

    pub fn prev_calls(&self) -> Vec<bool> {
        self.only(Affordance::Prev)
    }

    fn only(&self, which: Affordance) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter(|(a, _)| *a == which)
            .map(|(_, v)| v)
            .collect()
    }
}

impl StepHost for RecordingHost {
    fn set_next_enabled(&self, enabled: bool) {
        self.calls.lock().unwrap().push((Affordance::Next, enabled));
    }

    fn set_prev_enabled(&self, enabled: bool) {
        self.calls.lock().unwrap().push((Affordance::Prev, enabled));
    }
}

/// A store loaded with one document plus the gateway behind it.
pub struct EditorFixture {
    pub store: DocumentStore,
    /// Concrete handle for assertions on what was persisted.
    pub gateway: Arc<InMemoryGateway>,
    /// What the controllers talk to.
    pub backend: Arc<dyn ResumeGateway>,
}

impl EditorFixture {
    pub fn new(doc: ResumeDocument) -> Self {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.insert(Some(OWNER), doc.clone());
        let store = DocumentStore::new();
        store.load(doc);
        Self {
            store,
            backend: gateway.clone(),
            gateway,
        }
    }

    pub fn with_gateway(doc: ResumeDocument, holding: HoldingGateway) -> Self {
        let store = DocumentStore::new();
        store.load(doc);
        Self {
            store,
            gateway: holding.inner.clone(),
            backend: Arc::new(holding),
        }
    }

    pub fn list_controller<S: ListSection>(&self) -> SectionController<S> {
        SectionController::new(self.store.clone(), self.backend.clone(), None).unwrap()
    }

    pub fn list_controller_with_gate<S: ListSection>(
        &self,
        gate: NavigationGate,
    ) -> SectionController<S> {
        SectionController::new(self.store.clone(), self.backend.clone(), Some(gate)).unwrap()
    }
}

/// Gateway whose updates park until the test calls [`release`](Self::release), so a
/// save can be observed while it is in flight.
#[derive(Clone)]
pub struct HoldingGateway {
    pub inner: Arc<InMemoryGateway>,
    permits: Arc<Semaphore>,
    waiting: Arc<AtomicUsize>,
}

impl HoldingGateway {
    pub fn new(doc: ResumeDocument) -> Self {
        let inner = Arc::new(InMemoryGateway::new());
        inner.insert(Some(OWNER), doc);
        Self {
            inner,
            permits: Arc::new(Semaphore::new(0)),
            waiting: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Lets exactly one parked (or future) update through.
    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    /// Updates that have arrived and are parked.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResumeGateway for HoldingGateway {
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<ResumeSummary>, GatewayError> {
        self.inner.list_by_owner(owner).await
    }

    async fn create(&self, initial: &NewResume) -> Result<ResumeId, GatewayError> {
        self.inner.create(initial).await
    }

    async fn fetch_one(&self, id: &ResumeId) -> Result<ResumeDocument, GatewayError> {
        self.inner.fetch_one(id).await
    }

    async fn update(&self, id: &ResumeId, payload: &SectionPayload) -> Result<Value, GatewayError> {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GatewayError::Rejected("gateway closed".to_string()))?;
        permit.forget();
        self.waiting.fetch_sub(1, Ordering::SeqCst);
        self.inner.update(id, payload).await
    }

    async fn delete(&self, id: &ResumeId) -> Result<(), GatewayError> {
        self.inner.delete(id).await
    }
}

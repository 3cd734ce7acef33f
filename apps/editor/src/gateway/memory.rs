use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::gateway::{GatewayError, ResumeGateway};
use crate::models::resume::{NewResume, ResumeDocument, ResumeId, ResumeSummary, SectionPayload};

/// Process-local gateway. Backs offline runs and the test suite.
///
/// Failures can be injected per operation; they stay in effect until cleared, the
/// same way a backend outage would.
#[derive(Default)]
pub struct InMemoryGateway {
    resumes: Mutex<HashMap<ResumeId, StoredResume>>,
    updates: Mutex<Vec<(ResumeId, SectionPayload)>>,
    failures: Mutex<Failures>,
}

struct StoredResume {
    owner: Option<String>,
    document: ResumeDocument,
}

#[derive(Default)]
struct Failures {
    update: Option<String>,
    delete: Option<String>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document as if it had been created earlier.
    pub fn insert(&self, owner: Option<&str>, document: ResumeDocument) {
        lock(&self.resumes).insert(
            document.id.clone(),
            StoredResume {
                owner: owner.map(str::to_string),
                document,
            },
        );
    }

    pub fn document(&self, id: &ResumeId) -> Option<ResumeDocument> {
        lock(&self.resumes).get(id).map(|r| r.document.clone())
    }

    /// Every update request received, including rejected ones, in arrival order.
    pub fn updates(&self) -> Vec<(ResumeId, SectionPayload)> {
        lock(&self.updates).clone()
    }

    pub fn fail_updates(&self, reason: Option<&str>) {
        lock(&self.failures).update = reason.map(str::to_string);
    }

    pub fn fail_deletes(&self, reason: Option<&str>) {
        lock(&self.failures).delete = reason.map(str::to_string);
    }
}

#[async_trait]
impl ResumeGateway for InMemoryGateway {
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<ResumeSummary>, GatewayError> {
        let mut summaries: Vec<ResumeSummary> = lock(&self.resumes)
            .values()
            .filter(|r| r.owner.as_deref() == Some(owner))
            .map(|r| ResumeSummary::from(&r.document))
            .collect();
        // Most recently touched first, like the dashboard shows them.
        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(summaries)
    }

    async fn create(&self, initial: &NewResume) -> Result<ResumeId, GatewayError> {
        if initial.title.trim().is_empty() {
            return Err(GatewayError::Rejected("title is required".to_string()));
        }
        let id = ResumeId::new(Uuid::new_v4().to_string());
        let mut document = ResumeDocument::new(id.clone(), initial.title.clone());
        document.theme_color = initial.theme_color.clone();
        document.updated_at = Some(Utc::now());

        self.insert(initial.owner.as_deref(), document);
        info!("Created resume {id} ('{}')", initial.title);
        Ok(id)
    }

    async fn fetch_one(&self, id: &ResumeId) -> Result<ResumeDocument, GatewayError> {
        self.document(id)
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }

    async fn update(&self, id: &ResumeId, payload: &SectionPayload) -> Result<Value, GatewayError> {
        lock(&self.updates).push((id.clone(), payload.clone()));

        if let Some(reason) = lock(&self.failures).update.clone() {
            return Err(GatewayError::Rejected(reason));
        }

        let mut resumes = lock(&self.resumes);
        let stored = resumes
            .get_mut(id)
            .ok_or_else(|| GatewayError::NotFound(id.clone()))?;
        payload.apply_to(&mut stored.document);
        stored.document.updated_at = Some(Utc::now());
        debug!("Stored section '{}' of resume {id}", payload.key());

        Ok(payload.to_fields()?)
    }

    async fn delete(&self, id: &ResumeId) -> Result<(), GatewayError> {
        if let Some(reason) = lock(&self.failures).delete.clone() {
            return Err(GatewayError::Rejected(reason));
        }
        lock(&self.resumes)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::document::DocumentStore;
use crate::errors::EditorError;
use crate::gateway::ResumeGateway;
use crate::models::resume::{PersonalDetails, ResumeId, SectionKey, SectionPayload};
use crate::navigation::NavigationGate;
use crate::sections::save_cycle::{SaveCycle, SaveReport, SaveState};
use crate::sections::{FieldName, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    FirstName,
    LastName,
    JobTitle,
    Address,
    Phone,
    Email,
}

impl FieldName for PersonalField {
    const ALL: &'static [Self] = &[
        PersonalField::FirstName,
        PersonalField::LastName,
        PersonalField::JobTitle,
        PersonalField::Address,
        PersonalField::Phone,
        PersonalField::Email,
    ];

    fn name(self) -> &'static str {
        match self {
            PersonalField::FirstName => "firstName",
            PersonalField::LastName => "lastName",
            PersonalField::JobTitle => "jobTitle",
            PersonalField::Address => "address",
            PersonalField::Phone => "phone",
            PersonalField::Email => "email",
        }
    }
}

/// Fields that must be filled in before the section can be saved. Job title is optional.
const REQUIRED: [PersonalField; 5] = [
    PersonalField::FirstName,
    PersonalField::LastName,
    PersonalField::Address,
    PersonalField::Phone,
    PersonalField::Email,
];

fn field_mut(details: &mut PersonalDetails, field: PersonalField) -> &mut String {
    match field {
        PersonalField::FirstName => &mut details.first_name,
        PersonalField::LastName => &mut details.last_name,
        PersonalField::JobTitle => &mut details.job_title,
        PersonalField::Address => &mut details.address,
        PersonalField::Phone => &mut details.phone,
        PersonalField::Email => &mut details.email,
    }
}

fn field_ref(details: &PersonalDetails, field: PersonalField) -> &str {
    match field {
        PersonalField::FirstName => &details.first_name,
        PersonalField::LastName => &details.last_name,
        PersonalField::JobTitle => &details.job_title,
        PersonalField::Address => &details.address,
        PersonalField::Phone => &details.phone,
        PersonalField::Email => &details.email,
    }
}

/// Buffer controller for the personal-details step.
pub struct PersonalController {
    shared: Arc<Shared>,
}

struct Shared {
    id: ResumeId,
    store: DocumentStore,
    gateway: Arc<dyn ResumeGateway>,
    details: Mutex<PersonalDetails>,
    cycle: Arc<SaveCycle>,
}

impl PersonalController {
    pub fn new(
        store: DocumentStore,
        gateway: Arc<dyn ResumeGateway>,
        gate: Option<NavigationGate>,
    ) -> Result<Self, EditorError> {
        let doc = store.require()?;
        Ok(Self {
            shared: Arc::new(Shared {
                id: doc.id.clone(),
                details: Mutex::new(doc.personal.clone()),
                store,
                gateway,
                cycle: SaveCycle::new(SectionKey::Personal, gate),
            }),
        })
    }

    pub fn details(&self) -> PersonalDetails {
        self.shared.details().clone()
    }

    pub fn save_state(&self) -> SaveState {
        self.shared.cycle.state()
    }

    pub fn gate(&self) -> Option<&NavigationGate> {
        self.shared.cycle.gate()
    }

    /// Updates one field locally and in the shared document. Nothing changes when
    /// the shared document cannot take the write.
    pub fn update_field(
        &self,
        field: PersonalField,
        value: impl Into<FieldValue>,
    ) -> Result<(), EditorError> {
        let value = value.into().into_text(field.name())?;
        let commit = {
            let mut details = self.shared.details();
            let commit = self.shared.store.commit(&self.shared.id, |doc| {
                *field_mut(&mut doc.personal, field) = value.clone();
            })?;
            *field_mut(&mut details, field) = value;
            commit
        };
        self.shared.cycle.note_edit();
        self.shared.store.publish(commit);
        Ok(())
    }

    pub fn update_field_named(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), EditorError> {
        let field = PersonalField::from_name(name).ok_or_else(|| EditorError::UnknownField {
            section: SectionKey::Personal,
            field: name.to_string(),
        })?;
        self.update_field(field, value)
    }

    pub async fn save(&self) -> Result<SaveReport, EditorError> {
        self.shared.cycle.ensure_idle()?;
        let details = self.details();
        validate(&details)?;
        let ticket = self.shared.cycle.begin()?;
        ticket
            .persist(
                self.shared.gateway.clone(),
                self.shared.id.clone(),
                SectionPayload::Personal(details),
            )
            .await
    }
}

impl Shared {
    fn details(&self) -> MutexGuard<'_, PersonalDetails> {
        self.details.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PersonalController {
    fn drop(&mut self) {
        debug!("Tearing down 'personal' controller for resume {}", self.shared.id);
        self.shared.cycle.detach();
    }
}

fn validate(details: &PersonalDetails) -> Result<(), EditorError> {
    let missing: Vec<&str> = REQUIRED
        .iter()
        .filter(|f| field_ref(details, **f).trim().is_empty())
        .map(|f| f.name())
        .collect();
    if !missing.is_empty() {
        return Err(EditorError::Validation(format!(
            "Required fields are empty: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::GateState;
    use crate::test_support::{sample_document, EditorFixture, RecordingHost};

    #[test]
    fn test_edit_reaches_store_immediately() {
        let fx = EditorFixture::new(sample_document());
        let personal = PersonalController::new(fx.store.clone(), fx.backend.clone(), None).unwrap();

        personal
            .update_field(PersonalField::JobTitle, "Principal Engineer")
            .unwrap();

        assert_eq!(personal.details().job_title, "Principal Engineer");
        let doc = fx.store.snapshot().unwrap();
        assert_eq!(doc.personal.job_title, "Principal Engineer");
        assert_eq!(doc.personal.first_name, sample_document().personal.first_name);
    }

    #[test]
    fn test_unknown_and_mistyped_fields() {
        let fx = EditorFixture::new(sample_document());
        let personal = PersonalController::new(fx.store.clone(), fx.backend.clone(), None).unwrap();

        assert!(matches!(
            personal.update_field_named("nickname", "x"),
            Err(EditorError::UnknownField { .. })
        ));
        assert!(matches!(
            personal.update_field(PersonalField::Email, true),
            Err(EditorError::InvalidFieldValue { field: "email", .. })
        ));
    }

    #[test]
    fn test_refused_store_write_leaves_details_and_gate() {
        let fx = EditorFixture::new(sample_document());
        let gate = NavigationGate::new("personal", Arc::new(RecordingHost::default()));
        let personal =
            PersonalController::new(fx.store.clone(), fx.backend.clone(), Some(gate.clone()))
                .unwrap();
        fx.store.clear();

        assert!(matches!(
            personal.update_field(PersonalField::FirstName, "Augusta"),
            Err(EditorError::NotLoaded)
        ));
        assert_eq!(personal.details(), sample_document().personal);
        assert_eq!(gate.state(), GateState::Ready);
    }

    #[tokio::test]
    async fn test_blank_required_field_blocks_save() {
        let fx = EditorFixture::new(sample_document());
        let gate = NavigationGate::new("personal", Arc::new(RecordingHost::default()));
        let personal =
            PersonalController::new(fx.store.clone(), fx.backend.clone(), Some(gate.clone()))
                .unwrap();

        personal.update_field_named("phone", "  ").unwrap();
        let err = personal.save().await.unwrap_err();

        assert!(matches!(err, EditorError::Validation(ref m) if m.contains("phone")));
        assert!(fx.gateway.updates().is_empty());
        assert_eq!(gate.state(), GateState::Dirty);
    }

    #[tokio::test]
    async fn test_save_sends_personal_fields() {
        let fx = EditorFixture::new(sample_document());
        let host = Arc::new(RecordingHost::default());
        let gate = NavigationGate::new("personal", host.clone());
        let personal =
            PersonalController::new(fx.store.clone(), fx.backend.clone(), Some(gate.clone()))
                .unwrap();

        personal
            .update_field(PersonalField::Email, "ada@example.com")
            .unwrap();
        let report = personal.save().await.unwrap();

        assert_eq!(report.section, SectionKey::Personal);
        assert_eq!(report.accepted["email"], "ada@example.com");
        assert_eq!(personal.save_state(), SaveState::Succeeded);
        assert_eq!(gate.state(), GateState::Ready);
        assert_eq!(host.next_calls(), vec![false, true]);

        let stored = fx.gateway.document(&sample_document().id).unwrap();
        assert_eq!(stored.personal.email, "ada@example.com");
    }
}

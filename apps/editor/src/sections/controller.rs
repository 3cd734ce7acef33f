use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::document::{list_ops, DocumentStore};
use crate::errors::EditorError;
use crate::gateway::ResumeGateway;
use crate::models::resume::{ResumeId, SectionPayload};
use crate::navigation::NavigationGate;
use crate::sections::save_cycle::{SaveCycle, SaveReport, SaveState, SaveTicket};
use crate::sections::{FieldName, FieldValue, ListSection};

/// Buffer controller for one list section (education, experience, projects).
///
/// Records are addressed by their position in the list. Every edit produces a new
/// list, which is written back into the shared store before the call returns. An
/// edit the store refuses leaves the buffer and the gate as they were.
pub struct SectionController<S: ListSection> {
    shared: Arc<Shared<S>>,
}

struct Shared<S: ListSection> {
    id: ResumeId,
    store: DocumentStore,
    gateway: Arc<dyn ResumeGateway>,
    records: Mutex<Vec<S::Record>>,
    cycle: Arc<SaveCycle>,
}

impl<S: ListSection> SectionController<S> {
    /// Builds the buffer from the loaded document. A section with no records starts
    /// from the schema's seed, which is merged into the store right away.
    pub fn new(
        store: DocumentStore,
        gateway: Arc<dyn ResumeGateway>,
        gate: Option<NavigationGate>,
    ) -> Result<Self, EditorError> {
        let doc = store.require()?;
        let mut records = S::records(&doc).to_vec();
        let seeded = records.is_empty() && !S::seed().is_empty();
        if seeded {
            records = S::seed();
        }

        let controller = Self {
            shared: Arc::new(Shared {
                id: doc.id.clone(),
                store,
                gateway,
                records: Mutex::new(records),
                cycle: SaveCycle::new(S::KEY, gate),
            }),
        };
        if seeded {
            controller.merge(controller.records())?;
        }
        Ok(controller)
    }

    pub fn records(&self) -> Vec<S::Record> {
        self.shared.records().clone()
    }

    pub fn record(&self, index: usize) -> Result<S::Record, EditorError> {
        let records = self.shared.records();
        records
            .get(index)
            .cloned()
            .ok_or(EditorError::IndexOutOfRange {
                index,
                len: records.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.shared.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn save_state(&self) -> SaveState {
        self.shared.cycle.state()
    }

    pub fn gate(&self) -> Option<&NavigationGate> {
        self.shared.cycle.gate()
    }

    /// Appends a record holding the schema defaults.
    pub fn add_record(&self) -> Result<(), EditorError> {
        self.edit(|records| list_ops::insert_at(records, S::Record::default(), None))
    }

    pub fn remove_record(&self, index: usize) -> Result<(), EditorError> {
        self.edit(|records| list_ops::remove_at(records, index))
    }

    pub fn update_field(
        &self,
        index: usize,
        field: S::Field,
        value: impl Into<FieldValue>,
    ) -> Result<(), EditorError> {
        let value = value.into();
        self.edit(|records| {
            let current = records.get(index).ok_or(EditorError::IndexOutOfRange {
                index,
                len: records.len(),
            })?;
            let next = S::with_field(current, field, value)?;
            list_ops::replace_at(records, index, next)
        })
    }

    /// Same as [`update_field`](Self::update_field) with the field given by its wire
    /// name, as an input widget reports it.
    pub fn update_field_named(
        &self,
        index: usize,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), EditorError> {
        let field = S::Field::from_name(name).ok_or_else(|| EditorError::UnknownField {
            section: S::KEY,
            field: name.to_string(),
        })?;
        self.update_field(index, field, value)
    }

    /// Persists the current buffer. Local records are kept whatever the outcome.
    pub async fn save(&self) -> Result<SaveReport, EditorError> {
        let (ticket, payload) = self.shared.prepare_save()?;
        ticket
            .persist(self.shared.gateway.clone(), self.shared.id.clone(), payload)
            .await
    }

    /// Starts a save that outlives this controller. Busy and validation errors are
    /// reported synchronously; the handle yields the gateway outcome. If the
    /// controller is dropped first, the completion changes nothing.
    pub fn spawn_save(&self) -> Result<JoinHandle<Result<SaveReport, EditorError>>, EditorError> {
        let (ticket, payload) = self.shared.prepare_save()?;
        let gateway = self.shared.gateway.clone();
        let id = self.shared.id.clone();
        Ok(tokio::spawn(ticket.persist(gateway, id, payload)))
    }

    fn edit<F>(&self, f: F) -> Result<(), EditorError>
    where
        F: FnOnce(&[S::Record]) -> Result<Vec<S::Record>, EditorError>,
    {
        let commit = {
            let mut records = self.shared.records();
            let next = f(records.as_slice())?;
            let commit = self
                .shared
                .store
                .commit(&self.shared.id, |doc| S::store_records(doc, next.clone()))?;
            *records = next;
            commit
        };
        self.shared.cycle.note_edit();
        self.shared.store.publish(commit);
        Ok(())
    }

    fn merge(&self, records: Vec<S::Record>) -> Result<(), EditorError> {
        self.shared
            .store
            .update(&self.shared.id, |doc| S::store_records(doc, records))?;
        Ok(())
    }
}

impl<S: ListSection> Shared<S> {
    fn records(&self) -> MutexGuard<'_, Vec<S::Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prepare_save(&self) -> Result<(SaveTicket, SectionPayload), EditorError> {
        self.cycle.ensure_idle()?;
        let records = self.records().clone();
        S::validate(&records)?;
        let ticket = self.cycle.begin()?;
        Ok((ticket, S::payload(records)))
    }
}

impl<S: ListSection> Drop for SectionController<S> {
    fn drop(&mut self) {
        debug!("Tearing down '{}' controller for resume {}", S::KEY, self.shared.id);
        self.shared.cycle.detach();
    }
}

//! Shared document store.
//!
//! One store per editing session, passed to every controller at construction.
//! Writers always hand over (or compute) the full next document; listeners are
//! called synchronously, before the write returns.
//!
//! Every write takes a version number while it holds the write lock. Delivery is
//! done by one thread at a time and only ever moves forward: a notification older
//! than one already delivered is dropped, so listeners always end on the latest
//! document even when writers race.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock, RwLockWriteGuard};
use std::thread::{self, ThreadId};

use tracing::{debug, info};

use crate::errors::EditorError;
use crate::models::resume::{ResumeDocument, ResumeId};

type Listener = Arc<dyn Fn(&ResumeDocument) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone, Default)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    slot: RwLock<Slot>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
    delivery: Mutex<Delivery>,
    delivered_cv: Condvar,
}

#[derive(Default)]
struct Slot {
    document: Option<Arc<ResumeDocument>>,
    version: u64,
}

#[derive(Default)]
struct Delivery {
    /// Newest committed write not yet handed to listeners.
    pending: Option<Commit>,
    delivered: u64,
    /// Thread currently running listeners, if any.
    draining: Option<ThreadId>,
}

/// A write that is installed in the store but not yet announced.
#[must_use = "a commit must be published"]
pub(crate) struct Commit {
    version: u64,
    document: Arc<ResumeDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a freshly fetched or created document, dropping whatever was loaded.
    pub fn load(&self, document: ResumeDocument) -> Arc<ResumeDocument> {
        info!("Loading resume {} into the shared store", document.id);
        let commit = {
            let mut slot = self.write();
            install(&mut slot, document)
        };
        let document = commit.document.clone();
        self.publish(commit);
        document
    }

    /// The current document, if one is loaded. Holding the snapshot is safe across
    /// later writes; they install a new `Arc` rather than mutating this one.
    pub fn snapshot(&self) -> Option<Arc<ResumeDocument>> {
        self.inner
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .document
            .clone()
    }

    pub fn require(&self) -> Result<Arc<ResumeDocument>, EditorError> {
        self.snapshot().ok_or(EditorError::NotLoaded)
    }

    /// Overwrites the whole document. The id must match the loaded one.
    pub fn replace(&self, document: ResumeDocument) -> Result<(), EditorError> {
        let commit = {
            let mut slot = self.write();
            let current = slot.document.as_ref().ok_or(EditorError::NotLoaded)?;
            ensure_same_id(&current.id, &document.id)?;
            install(&mut slot, document)
        };
        debug!("Replaced resume {}", commit.document.id);
        self.publish(commit);
        Ok(())
    }

    /// Reads the latest snapshot, lets `f` compute the next document from a copy of
    /// it, and installs the result. The read and the write happen under one lock.
    pub fn update<F>(&self, id: &ResumeId, f: F) -> Result<Arc<ResumeDocument>, EditorError>
    where
        F: FnOnce(&mut ResumeDocument),
    {
        let commit = self.commit(id, f)?;
        let document = commit.document.clone();
        self.publish(commit);
        Ok(document)
    }

    /// The write half of [`update`](Self::update). Nothing is announced until the
    /// returned commit goes through [`publish`](Self::publish), so a caller can
    /// settle its own state in between.
    pub(crate) fn commit<F>(&self, id: &ResumeId, f: F) -> Result<Commit, EditorError>
    where
        F: FnOnce(&mut ResumeDocument),
    {
        let mut slot = self.write();
        let current = slot.document.as_ref().ok_or(EditorError::NotLoaded)?;
        ensure_same_id(&current.id, id)?;

        let mut next = ResumeDocument::clone(current);
        f(&mut next);
        ensure_same_id(&current.id, &next.id)?;
        Ok(install(&mut slot, next))
    }

    /// Ends the session's use of the store. Listeners are kept but not notified.
    pub fn clear(&self) {
        let mut slot = self.write();
        slot.document = None;
        slot.version += 1;
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ResumeDocument) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners().push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` when the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// Hands `commit` to the listeners unless something newer already went out.
    ///
    /// Returns once listeners have seen this write or a later one. A write made by
    /// a listener is queued and delivered by the same loop after that listener
    /// returns. Listeners run without any store lock held.
    pub(crate) fn publish(&self, commit: Commit) {
        let me = thread::current().id();
        let version = commit.version;

        let mut delivery = self.delivery();
        if version <= delivery.delivered {
            debug!("Dropping stale notification v{version}");
            return;
        }
        if delivery
            .pending
            .as_ref()
            .map_or(true, |p| p.version < version)
        {
            delivery.pending = Some(commit);
        }

        let draining = delivery.draining;
        match draining {
            Some(owner) if owner == me => return,
            Some(_) => {
                while delivery.delivered < version {
                    delivery = self
                        .inner
                        .delivered_cv
                        .wait(delivery)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                return;
            }
            None => delivery.draining = Some(me),
        }
        drop(delivery);

        let _drain = DrainGuard(self);
        loop {
            let next = {
                let mut delivery = self.delivery();
                match delivery.pending.take() {
                    Some(next) if next.version > delivery.delivered => next,
                    _ => break,
                }
            };

            let listeners: Vec<Listener> =
                self.listeners().iter().map(|(_, l)| l.clone()).collect();
            for listener in listeners {
                listener(&next.document);
            }

            self.delivery().delivered = next.version;
            self.inner.delivered_cv.notify_all();
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.inner
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn delivery(&self) -> MutexGuard<'_, Delivery> {
        self.inner
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the delivery loop even if a listener panics.
struct DrainGuard<'a>(&'a DocumentStore);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        let mut delivery = self.0.delivery();
        delivery.draining = None;
        if thread::panicking() {
            // Waiters must not hang on a delivery that will never happen.
            if let Some(p) = delivery.pending.take() {
                delivery.delivered = delivery.delivered.max(p.version);
            }
        }
        drop(delivery);
        self.0.inner.delivered_cv.notify_all();
    }
}

fn install(slot: &mut Slot, document: ResumeDocument) -> Commit {
    slot.version += 1;
    let document = Arc::new(document);
    slot.document = Some(document.clone());
    Commit {
        version: slot.version,
        document,
    }
}

fn ensure_same_id(loaded: &ResumeId, attempted: &ResumeId) -> Result<(), EditorError> {
    if loaded != attempted {
        return Err(EditorError::IdentityChanged {
            loaded: loaded.clone(),
            attempted: attempted.clone(),
        });
    }
    Ok(())
}

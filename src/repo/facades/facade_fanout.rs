//! Fan-out write coordination.
//!
//! An update touches the root record and any number of child sections, each
//! stored in its own relation and each written through independent storage
//! calls. Nothing spans those calls, so the coordinator issues all of them at
//! once and settles the caller with a single outcome:
//!
//! * success, once every unit has completed;
//! * the first error, as soon as it is observed.
//!
//! Units still in flight when the caller is settled are never cancelled. They
//! run to completion in the background and their outcome is only logged.
//!
//! Updates of the same business are serialized: a business stays locked until
//! every unit of its current update has completed, including the ones still
//! running after an early error. Updates of different businesses never wait on
//! each other.

use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{OwnedMutexGuard, oneshot};

use super::{AggregateError, FacadeError};
use crate::{
    repo::{self, ChildCollection, ChildSingleton, RecordStore},
    types::{BusinessId, RootPatch, Section, Sections, UpdateReport, UpdateRequest},
};

/// What a unit writes
#[derive(Debug, Clone)]
enum UnitOp {
    Root(RootPatch),
    Singleton(ChildSingleton),
    Collection(ChildCollection),
}

/// One independently tracked piece of an update.
#[derive(Debug, Clone)]
pub struct Unit {
    section: Section,
    op: UnitOp,
}

impl Unit {
    pub fn section(&self) -> Section {
        self.section
    }

    /// Storage write calls issued by this unit.
    ///
    /// A collection is replaced with one delete followed by one insert per
    /// item. Existence probes a store may perform to emulate an upsert are
    /// not counted.
    pub fn storage_calls(&self) -> usize {
        match &self.op {
            UnitOp::Root(_) | UnitOp::Singleton(_) => 1,
            UnitOp::Collection(items) => 1 + items.len(),
        }
    }

    async fn run(self, id: BusinessId, store: &dyn RecordStore) -> Result<(), repo::Error> {
        match self.op {
            UnitOp::Root(patch) => store.patch_root(id, &patch).await,
            UnitOp::Singleton(value) => {
                let outcome = store.upsert_child_singleton(id, &value).await?;
                trace!("`{}` of business `{}` {:?}", value.kind(), id, outcome);
                Ok(())
            }
            UnitOp::Collection(items) => store.replace_child_collection(id, &items).await,
        }
    }
}

/// Every unit an update fans out to, computed before anything is issued.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    id: BusinessId,
    units: Vec<Unit>,
}

impl UpdatePlan {
    /// The root patch always comes first, then one unit per present section.
    pub fn new(request: UpdateRequest) -> Self {
        let UpdateRequest { id, root, sections } = request;

        let mut plan = Self::sections_only(id, sections);
        plan.units.insert(
            0,
            Unit {
                section: Section::Business,
                op: UnitOp::Root(root),
            },
        );
        plan
    }

    /// One unit per present section, the root is left untouched.
    pub fn sections_only(id: BusinessId, sections: Sections) -> Self {
        let mut units = Vec::new();

        let singletons = [
            (Section::Contact, sections.contact.map(ChildSingleton::Contact)),
            (
                Section::Coordinates,
                sections.coordinates.map(ChildSingleton::Coordinates),
            ),
        ];
        for (section, value) in singletons {
            if let Some(value) = value {
                units.push(Unit {
                    section,
                    op: UnitOp::Singleton(value),
                });
            }
        }

        let collections = [
            (
                Section::Amenities,
                sections.amenities.map(ChildCollection::Amenities),
            ),
            (Section::Gallery, sections.gallery.map(ChildCollection::Gallery)),
            (
                Section::Schedule,
                sections.schedule.map(ChildCollection::Schedule),
            ),
        ];
        for (section, items) in collections {
            if let Some(items) = items {
                units.push(Unit {
                    section,
                    op: UnitOp::Collection(items),
                });
            }
        }

        Self { id, units }
    }

    pub fn id(&self) -> BusinessId {
        self.id
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Number of units the aggregator has to wait for
    pub fn expected(&self) -> usize {
        self.units.len()
    }

    pub fn sections(&self) -> Vec<Section> {
        self.units.iter().map(Unit::section).collect()
    }

    pub fn storage_calls(&self) -> usize {
        self.units.iter().map(Unit::storage_calls).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateState {
    Pending { remaining: usize },
    Succeeded,
    Failed(Section),
}

pub type Settlement = Result<(), AggregateError>;

/// Single-settlement aggregation of unit outcomes.
///
/// The caller is resolved exactly once: with the first error reported, or
/// with success when all `expected` units completed without one. Outcomes
/// reported after resolution are discarded.
#[derive(Debug)]
pub struct Aggregator {
    expected: usize,
    completed: usize,
    first_error: Option<Section>,
    resolver: Option<oneshot::Sender<Settlement>>,
}

impl Aggregator {
    /// An `expected` of zero resolves immediately with success.
    pub fn new(expected: usize) -> (Self, oneshot::Receiver<Settlement>) {
        let (tx, rx) = oneshot::channel();
        let mut aggregator = Self {
            expected,
            completed: 0,
            first_error: None,
            resolver: Some(tx),
        };
        if expected == 0 {
            aggregator.resolve(Ok(()));
        }
        (aggregator, rx)
    }

    pub fn state(&self) -> AggregateState {
        match self.first_error {
            Some(section) => AggregateState::Failed(section),
            None if self.completed >= self.expected => AggregateState::Succeeded,
            None => AggregateState::Pending {
                remaining: self.expected - self.completed,
            },
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolver.is_none()
    }

    /// Records the outcome of the unit writing `section`.
    pub fn apply(&mut self, section: Section, outcome: Result<(), repo::Error>) -> AggregateState {
        self.completed += 1;

        match outcome {
            Err(e) if self.first_error.is_none() => {
                warn!("`{}` update failed, settling with error :: {}", section, e);
                self.first_error = Some(section);
                self.resolve(Err(AggregateError::new(section, e)));
            }
            Err(e) => {
                warn!(
                    "`{}` update failed after the update was settled, discarding :: {}",
                    section, e
                );
            }
            Ok(()) if self.first_error.is_some() => {
                trace!("`{}` completed after the update was settled", section);
            }
            Ok(()) => {
                if self.completed == self.expected {
                    self.resolve(Ok(()));
                }
            }
        }

        self.state()
    }

    fn resolve(&mut self, settlement: Settlement) {
        if let Some(tx) = self.resolver.take()
            && tx.send(settlement).is_err()
        {
            debug!("update settled but no caller is waiting anymore");
        }
    }
}

/// Per-business exclusion between updates.
#[derive(Debug, Default)]
struct BusinessLocks {
    locks: Mutex<HashMap<BusinessId, Arc<tokio::sync::Mutex<()>>>>,
}

impl BusinessLocks {
    /// Waits until no other update of `id` is running.
    async fn acquire(self: &Arc<Self>, id: BusinessId) -> BusinessGuard {
        let lock = self.locks.lock().entry(id).or_default().clone();

        // Built before waiting so that a cancelled wait still cleans up
        let mut guard = BusinessGuard {
            id,
            guard: None,
            locks: self.clone(),
        };
        guard.guard = Some(lock.lock_owned().await);
        guard
    }

    fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Holds a business locked, the entry is removed once nobody uses it.
#[derive(Debug)]
struct BusinessGuard {
    id: BusinessId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<BusinessLocks>,
}

impl Drop for BusinessGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.locks.lock();
        drop(self.guard.take());

        if let Some(lock) = locks.get(&self.id)
            && Arc::strong_count(lock) == 1
        {
            locks.remove(&self.id);
        }
    }
}

/// Fan-out write coordinator over a [`RecordStore`].
pub struct FacadeFanOut {
    store: repo::RecordStoreRef,
    locks: Arc<BusinessLocks>,
}

impl FacadeFanOut {
    pub fn new(store: repo::RecordStoreRef) -> Self {
        Self {
            store,
            locks: Arc::default(),
        }
    }

    /// Applies `request`, issuing every unit concurrently.
    ///
    /// Returns as soon as the outcome is known. On error, units still in
    /// flight keep running and may leave the aggregate partially updated.
    pub async fn apply(&self, request: UpdateRequest) -> Result<UpdateReport, FacadeError> {
        self.execute(UpdatePlan::new(request)).await
    }

    /// Writes `sections` of an existing business without touching its root.
    pub async fn apply_sections(
        &self,
        id: BusinessId,
        sections: Sections,
    ) -> Result<UpdateReport, FacadeError> {
        self.execute(UpdatePlan::sections_only(id, sections)).await
    }

    /// Businesses with an update running or waiting.
    pub fn locked_businesses(&self) -> usize {
        self.locks.len()
    }

    async fn execute(&self, plan: UpdatePlan) -> Result<UpdateReport, FacadeError> {
        let id = plan.id();
        let sections = plan.sections();
        let storage_calls = plan.storage_calls();

        let guard = Arc::new(self.locks.acquire(id).await);
        debug!(
            "update of business `{}` fans out to {} units ({} storage calls)",
            id,
            plan.expected(),
            storage_calls
        );

        let (aggregator, settled) = Aggregator::new(plan.expected());
        let aggregator = Arc::new(Mutex::new(aggregator));

        for unit in plan.units {
            let store = self.store.clone();
            let aggregator = aggregator.clone();
            let guard = guard.clone();

            // Detached: dropping the caller must not cancel a unit
            tokio::spawn(async move {
                let section = unit.section();
                let outcome = unit.run(id, store.as_ref()).await;
                let state = aggregator.lock().apply(section, outcome);
                trace!("`{}` settled, update is {:?}", section, state);
                drop(guard);
            });
        }
        drop(aggregator);
        drop(guard);

        match settled.await {
            Ok(Ok(())) => Ok(UpdateReport {
                id,
                sections,
                storage_calls,
            }),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(FacadeError::ConcurrencyError(format!(
                "update of business `{}` was dropped before settling",
                id
            ))),
        }
    }
}

//! In-memory implementation of the [`RecordStore`].
//!
//! Tables live behind a lock and each trait call is decomposed into the same
//! primitive steps a table store without native upsert would perform: a
//! singleton upsert probes for an existing row and then inserts or updates it,
//! a collection replace deletes and then inserts every item.
//!
//! Every step is recorded in a journal and can be held behind a [`Gate`] or
//! made to fail, which makes the store suitable to observe and perturb the
//! fan-out performed by the facades.

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use tokio::sync::watch;

use super::{
    AmenityRecord, BusinessRecord, ChildCollection, ChildKind, ChildRows, ChildSingleton,
    CollectionRow, ContactRecord, CoordinatesRecord, Error, GalleryImageRecord, RecordStore,
    RootPredicate, ScheduleRecord, Upserted,
};
use crate::types::{BusinessId, RootPatch};

/// A primitive storage step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    GetRoot,
    ListRoots,
    InsertRoot,
    UpsertRoot,
    PatchRoot,
    Probe(ChildKind),
    Insert(ChildKind),
    Update(ChildKind),
    Delete(ChildKind),
    BatchGet(ChildKind),
}

/// Table content of a [`MemoryRecordStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub businesses: HashMap<BusinessId, BusinessRecord>,
    pub contacts: HashMap<BusinessId, ContactRecord>,
    pub coordinates: HashMap<BusinessId, CoordinatesRecord>,
    pub amenities: Vec<AmenityRecord>,
    pub gallery: Vec<GalleryImageRecord>,
    pub schedule: Vec<ScheduleRecord>,
}

impl Tables {
    fn has_singleton(&self, kind: ChildKind, parent: &BusinessId) -> bool {
        match kind {
            ChildKind::Contact => self.contacts.contains_key(parent),
            ChildKind::Coordinates => self.coordinates.contains_key(parent),
            _ => false,
        }
    }

    fn put_singleton(&mut self, parent: BusinessId, value: &ChildSingleton) {
        match value {
            ChildSingleton::Contact(contact) => {
                self.contacts
                    .insert(parent, ContactRecord::new(parent, contact));
            }
            ChildSingleton::Coordinates(coordinates) => {
                self.coordinates
                    .insert(parent, CoordinatesRecord::new(parent, coordinates));
            }
        }
    }

    fn delete_children(&mut self, kind: ChildKind, parent: &BusinessId) {
        match kind {
            ChildKind::Contact => {
                self.contacts.remove(parent);
            }
            ChildKind::Coordinates => {
                self.coordinates.remove(parent);
            }
            ChildKind::Amenities => self.amenities.retain(|r| r.parent() != *parent),
            ChildKind::Gallery => self.gallery.retain(|r| r.parent() != *parent),
            ChildKind::Schedule => self.schedule.retain(|r| r.parent() != *parent),
        }
    }

    fn push(&mut self, row: CollectionRow) {
        match row {
            CollectionRow::Amenity(r) => self.amenities.push(r),
            CollectionRow::Gallery(r) => self.gallery.push(r),
            CollectionRow::Schedule(r) => self.schedule.push(r),
        }
    }

    fn select(&self, kind: ChildKind, parents: &HashSet<BusinessId>) -> ChildRows {
        fn owned<R: Clone>(
            rows: &[R],
            parents: &HashSet<BusinessId>,
            parent: impl Fn(&R) -> BusinessId,
        ) -> Vec<R> {
            rows.iter()
                .filter(|r| parents.contains(&parent(r)))
                .cloned()
                .collect()
        }

        match kind {
            ChildKind::Contact => ChildRows::Contact(
                self.contacts
                    .iter()
                    .filter(|(id, _)| parents.contains(*id))
                    .map(|(_, r)| r.clone())
                    .collect(),
            ),
            ChildKind::Coordinates => ChildRows::Coordinates(
                self.coordinates
                    .iter()
                    .filter(|(id, _)| parents.contains(*id))
                    .map(|(_, r)| r.clone())
                    .collect(),
            ),
            ChildKind::Amenities => {
                let mut rows = owned(&self.amenities, parents, AmenityRecord::parent);
                rows.sort_by_key(|r| r.position);
                ChildRows::Amenities(rows)
            }
            ChildKind::Gallery => {
                let mut rows = owned(&self.gallery, parents, GalleryImageRecord::parent);
                rows.sort_by_key(|r| r.position);
                ChildRows::Gallery(rows)
            }
            ChildKind::Schedule => {
                let mut rows = owned(&self.schedule, parents, ScheduleRecord::parent);
                rows.sort_by_key(|r| r.position);
                ChildRows::Schedule(rows)
            }
        }
    }
}

/// Holds every step of a given kind until released.
///
/// Dropping the gate releases the held steps as well.
pub struct Gate(watch::Sender<bool>);

impl Gate {
    pub fn release(&self) {
        self.0.send_replace(true);
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
    journal: Mutex<Vec<Call>>,
    faults: Mutex<HashMap<Call, String>>,
    gates: Mutex<HashMap<Call, watch::Receiver<bool>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current table content.
    pub fn snapshot(&self) -> Tables {
        self.tables.read().clone()
    }

    /// Every step performed so far, in start order.
    pub fn journal(&self) -> Vec<Call> {
        self.journal.lock().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }

    /// Number of times `call` was started.
    pub fn calls(&self, call: Call) -> usize {
        self.journal.lock().iter().filter(|c| **c == call).count()
    }

    /// Makes every subsequent `call` step fail with `msg`.
    pub fn fail_on(&self, call: Call, msg: &str) {
        self.faults.lock().insert(call, msg.to_owned());
    }

    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    /// Holds every subsequent `call` step until the returned gate is released.
    pub fn hold(&self, call: Call) -> Gate {
        let (tx, rx) = watch::channel(false);
        self.gates.lock().insert(call, rx);
        Gate(tx)
    }

    async fn step(&self, call: Call) -> Result<(), Error> {
        self.journal.lock().push(call);

        let gate = self.gates.lock().get(&call).cloned();
        if let Some(mut gate) = gate {
            // An error means the gate was dropped, which releases it as well
            let _ = gate.wait_for(|open| *open).await;
        }

        if let Some(msg) = self.faults.lock().get(&call) {
            return Err(Error::Unavailable(msg.clone()));
        }
        Ok(())
    }

    async fn insert_row(&self, kind: ChildKind, row: CollectionRow) -> Result<(), Error> {
        self.step(Call::Insert(kind)).await?;
        self.tables.write().push(row);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_root(&self, id: BusinessId) -> Result<Option<BusinessRecord>, Error> {
        self.step(Call::GetRoot).await?;
        Ok(self.tables.read().businesses.get(&id).cloned())
    }

    async fn list_roots(&self, predicate: &RootPredicate) -> Result<Vec<BusinessRecord>, Error> {
        self.step(Call::ListRoots).await?;

        let mut roots: Vec<BusinessRecord> = self
            .tables
            .read()
            .businesses
            .values()
            .filter(|r| predicate.matches(r))
            .cloned()
            .collect();
        roots.sort_by(|a, b| {
            a.business_name
                .cmp(&b.business_name)
                .then_with(|| a.business_id.cmp(&b.business_id))
        });
        Ok(roots)
    }

    async fn insert_root(&self, fields: &RootPatch) -> Result<BusinessRecord, Error> {
        self.step(Call::InsertRoot).await?;

        let record = BusinessRecord::new(fields);
        self.tables
            .write()
            .businesses
            .insert(record.id(), record.clone());
        Ok(record)
    }

    async fn upsert_root(&self, record: &BusinessRecord) -> Result<Upserted, Error> {
        self.step(Call::UpsertRoot).await?;

        let previous = self
            .tables
            .write()
            .businesses
            .insert(record.id(), record.clone());
        Ok(if previous.is_some() {
            Upserted::Updated
        } else {
            Upserted::Inserted
        })
    }

    async fn patch_root(&self, id: BusinessId, patch: &RootPatch) -> Result<(), Error> {
        self.step(Call::PatchRoot).await?;

        let mut tables = self.tables.write();
        let record = tables
            .businesses
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("business `{}`", id)))?;
        record.apply(patch);
        Ok(())
    }

    async fn upsert_child_singleton(
        &self,
        parent: BusinessId,
        value: &ChildSingleton,
    ) -> Result<Upserted, Error> {
        let kind = value.kind();

        self.step(Call::Probe(kind)).await?;
        let exists = self.tables.read().has_singleton(kind, &parent);

        let upserted = if exists {
            self.step(Call::Update(kind)).await?;
            Upserted::Updated
        } else {
            self.step(Call::Insert(kind)).await?;
            Upserted::Inserted
        };

        self.tables.write().put_singleton(parent, value);
        Ok(upserted)
    }

    async fn replace_child_collection(
        &self,
        parent: BusinessId,
        items: &ChildCollection,
    ) -> Result<(), Error> {
        let kind = items.kind();

        self.step(Call::Delete(kind)).await?;
        self.tables.write().delete_children(kind, &parent);

        let results = join_all(
            items
                .rows(parent)
                .into_iter()
                .map(|row| self.insert_row(kind, row)),
        )
        .await;

        results.into_iter().collect()
    }

    async fn batch_get_children(
        &self,
        kind: ChildKind,
        parents: &[BusinessId],
    ) -> Result<ChildRows, Error> {
        self.step(Call::BatchGet(kind)).await?;

        let parents: HashSet<BusinessId> = parents.iter().copied().collect();
        Ok(self.tables.read().select(kind, &parents))
    }
}

use async_trait::async_trait;
use std::{fmt, sync::Arc};

use super::{
    AmenityRecord, BusinessRecord, ContactRecord, CoordinatesRecord, Error, GalleryImageRecord,
    ScheduleRecord,
};
use crate::types::{
    BusinessId, Contact, Coordinates, GalleryImage, RootPatch, ScheduleEntry, Section,
};

pub type RecordStoreRef = Arc<dyn RecordStore>;

/// Child relations of a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    Contact,
    Coordinates,
    Amenities,
    Gallery,
    Schedule,
}

impl ChildKind {
    pub const ALL: [ChildKind; 5] = [
        ChildKind::Contact,
        ChildKind::Amenities,
        ChildKind::Gallery,
        ChildKind::Coordinates,
        ChildKind::Schedule,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Self::Contact => "contact_t",
            Self::Coordinates => "coordinates_t",
            Self::Amenities => "amenity_t",
            Self::Gallery => "gallery_image_t",
            Self::Schedule => "schedule_t",
        }
    }

    /// One-to-one relations
    pub fn is_singleton(&self) -> bool {
        matches!(self, Self::Contact | Self::Coordinates)
    }

    pub fn section(&self) -> Section {
        match self {
            Self::Contact => Section::Contact,
            Self::Coordinates => Section::Coordinates,
            Self::Amenities => Section::Amenities,
            Self::Gallery => Section::Gallery,
            Self::Schedule => Section::Schedule,
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section().as_str())
    }
}

/// Value written into a one-to-one child relation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildSingleton {
    Contact(Contact),
    Coordinates(Coordinates),
}

impl ChildSingleton {
    pub fn kind(&self) -> ChildKind {
        match self {
            Self::Contact(_) => ChildKind::Contact,
            Self::Coordinates(_) => ChildKind::Coordinates,
        }
    }
}

/// Items replacing the whole content of a one-to-many child relation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildCollection {
    Amenities(Vec<String>),
    Gallery(Vec<GalleryImage>),
    Schedule(Vec<ScheduleEntry>),
}

impl ChildCollection {
    pub fn kind(&self) -> ChildKind {
        match self {
            Self::Amenities(_) => ChildKind::Amenities,
            Self::Gallery(_) => ChildKind::Gallery,
            Self::Schedule(_) => ChildKind::Schedule,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Amenities(v) => v.len(),
            Self::Gallery(v) => v.len(),
            Self::Schedule(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows to insert for `parent`, positioned in list order.
    pub fn rows(&self, parent: BusinessId) -> Vec<CollectionRow> {
        match self {
            Self::Amenities(v) => v
                .iter()
                .enumerate()
                .map(|(pos, label)| {
                    CollectionRow::Amenity(AmenityRecord::new(parent, pos as i32, label))
                })
                .collect(),
            Self::Gallery(v) => v
                .iter()
                .enumerate()
                .map(|(pos, image)| {
                    CollectionRow::Gallery(GalleryImageRecord::new(parent, pos as i32, image))
                })
                .collect(),
            Self::Schedule(v) => v
                .iter()
                .enumerate()
                .map(|(pos, entry)| {
                    CollectionRow::Schedule(ScheduleRecord::new(parent, pos as i32, entry))
                })
                .collect(),
        }
    }
}

/// A single row of a one-to-many child relation.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionRow {
    Amenity(AmenityRecord),
    Gallery(GalleryImageRecord),
    Schedule(ScheduleRecord),
}

/// Rows returned by a batched child read, ordered by `position` within each parent.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildRows {
    Contact(Vec<ContactRecord>),
    Coordinates(Vec<CoordinatesRecord>),
    Amenities(Vec<AmenityRecord>),
    Gallery(Vec<GalleryImageRecord>),
    Schedule(Vec<ScheduleRecord>),
}

impl ChildRows {
    pub fn empty(kind: ChildKind) -> Self {
        match kind {
            ChildKind::Contact => Self::Contact(Vec::new()),
            ChildKind::Coordinates => Self::Coordinates(Vec::new()),
            ChildKind::Amenities => Self::Amenities(Vec::new()),
            ChildKind::Gallery => Self::Gallery(Vec::new()),
            ChildKind::Schedule => Self::Schedule(Vec::new()),
        }
    }

    pub fn kind(&self) -> ChildKind {
        match self {
            Self::Contact(_) => ChildKind::Contact,
            Self::Coordinates(_) => ChildKind::Coordinates,
            Self::Amenities(_) => ChildKind::Amenities,
            Self::Gallery(_) => ChildKind::Gallery,
            Self::Schedule(_) => ChildKind::Schedule,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Contact(v) => v.len(),
            Self::Coordinates(v) => v.len(),
            Self::Amenities(v) => v.len(),
            Self::Gallery(v) => v.len(),
            Self::Schedule(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mismatch(self, expected: ChildKind) -> Error {
        Error::KindMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn into_contacts(self) -> Result<Vec<ContactRecord>, Error> {
        match self {
            Self::Contact(v) => Ok(v),
            other => Err(other.mismatch(ChildKind::Contact)),
        }
    }

    pub fn into_coordinates(self) -> Result<Vec<CoordinatesRecord>, Error> {
        match self {
            Self::Coordinates(v) => Ok(v),
            other => Err(other.mismatch(ChildKind::Coordinates)),
        }
    }

    pub fn into_amenities(self) -> Result<Vec<AmenityRecord>, Error> {
        match self {
            Self::Amenities(v) => Ok(v),
            other => Err(other.mismatch(ChildKind::Amenities)),
        }
    }

    pub fn into_gallery(self) -> Result<Vec<GalleryImageRecord>, Error> {
        match self {
            Self::Gallery(v) => Ok(v),
            other => Err(other.mismatch(ChildKind::Gallery)),
        }
    }

    pub fn into_schedule(self) -> Result<Vec<ScheduleRecord>, Error> {
        match self {
            Self::Schedule(v) => Ok(v),
            other => Err(other.mismatch(ChildKind::Schedule)),
        }
    }
}

/// Storage-side scoping of a root listing.
///
/// Only criteria that live on the root table belong here, everything that
/// involves children is evaluated after the join.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootPredicate {
    pub ids: Option<Vec<BusinessId>>,
    pub owner: Option<String>,
}

impl RootPredicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_ids(mut self, ids: Vec<BusinessId>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_owned());
        self
    }

    pub fn matches(&self, record: &BusinessRecord) -> bool {
        if let Some(ids) = &self.ids
            && !ids.contains(&record.id())
        {
            return false;
        }
        if let Some(owner) = &self.owner
            && record.owner_id.as_deref() != Some(owner.as_str())
        {
            return false;
        }
        true
    }
}

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Updated,
}

/// Persistence primitives over the root and child tables.
///
/// No operation is transactional with any other.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_root(&self, id: BusinessId) -> Result<Option<BusinessRecord>, Error>;

    /// Roots matching `predicate`, ordered by name and then id.
    async fn list_roots(&self, predicate: &RootPredicate) -> Result<Vec<BusinessRecord>, Error>;

    /// Creates a root with a freshly generated id.
    async fn insert_root(&self, fields: &RootPatch) -> Result<BusinessRecord, Error>;

    /// Writes `record` as a whole, creating it if absent.
    async fn upsert_root(&self, record: &BusinessRecord) -> Result<Upserted, Error>;

    /// Overwrites the supplied fields of an existing root.
    ///
    /// Fails with [`Error::NotFound`] when no root has the given id.
    async fn patch_root(&self, id: BusinessId, patch: &RootPatch) -> Result<(), Error>;

    async fn upsert_child_singleton(
        &self,
        parent: BusinessId,
        value: &ChildSingleton,
    ) -> Result<Upserted, Error>;

    /// Deletes every row of the collection owned by `parent`, then inserts
    /// `items`. Returns only once the delete and all inserts have settled; an
    /// empty `items` still performs (and awaits) the delete.
    async fn replace_child_collection(
        &self,
        parent: BusinessId,
        items: &ChildCollection,
    ) -> Result<(), Error>;

    /// Reads every row of `kind` whose parent is in `parents` with a single query.
    async fn batch_get_children(
        &self,
        kind: ChildKind,
        parents: &[BusinessId],
    ) -> Result<ChildRows, Error>;
}

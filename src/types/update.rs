use serde::Serialize;
use std::fmt;

use super::{BusinessId, Contact, Coordinates, GalleryImage, RootPatch, ScheduleEntry};

/// Name of a part of the business aggregate touched by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Business,
    Contact,
    Coordinates,
    Amenities,
    Gallery,
    Schedule,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Contact => "contact",
            Self::Coordinates => "coordinates",
            Self::Amenities => "amenities",
            Self::Gallery => "gallery",
            Self::Schedule => "schedule",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional child sections of a write. A [`None`] section is left untouched,
/// a present collection fully replaces the stored one (even when empty).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sections {
    pub contact: Option<Contact>,
    pub coordinates: Option<Coordinates>,
    pub amenities: Option<Vec<String>>,
    pub gallery: Option<Vec<GalleryImage>>,
    pub schedule: Option<Vec<ScheduleEntry>>,
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        self.contact.is_none()
            && self.coordinates.is_none()
            && self.amenities.is_none()
            && self.gallery.is_none()
            && self.schedule.is_none()
    }
}

/// A fully parsed and validated "update one business" request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub id: BusinessId,
    pub root: RootPatch,
    pub sections: Sections,
}

impl UpdateRequest {
    pub fn new(id: BusinessId, root: RootPatch) -> Self {
        Self {
            id,
            root,
            sections: Sections::default(),
        }
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.sections.contact = Some(contact);
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.sections.coordinates = Some(coordinates);
        self
    }

    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.amenities = Some(amenities.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_gallery(mut self, gallery: Vec<GalleryImage>) -> Self {
        self.sections.gallery = Some(gallery);
        self
    }

    pub fn with_schedule(mut self, schedule: Vec<ScheduleEntry>) -> Self {
        self.sections.schedule = Some(schedule);
        self
    }
}

/// A fully parsed and validated request creating a new business.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub root: RootPatch,
    pub sections: Sections,
}

/// Caller-facing summary of a successful update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateReport {
    pub id: BusinessId,
    /// Coordinator units that completed, root first
    pub sections: Vec<Section>,
    /// Storage calls the update fanned out to
    pub storage_calls: usize,
}

use serde::Serialize;

use super::{Business, BusinessId, Contact, Coordinates, GalleryImage, WeekHours};

/// A business joined with all of its child relations.
///
/// Absent children are always represented (empty collection, `None`
/// singleton, closed week), never as a missing key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessView {
    #[serde(flatten)]
    pub business: Business,
    pub contact: Option<Contact>,
    pub coordinates: Option<Coordinates>,
    pub amenities: Vec<String>,
    pub gallery: Vec<GalleryImage>,
    pub schedule: WeekHours,
}

impl BusinessView {
    pub fn id(&self) -> BusinessId {
        self.business.id
    }

    /// Fields searched by free-text queries.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        let b = &self.business;
        [
            Some(b.name.as_str()),
            b.category.as_deref(),
            b.region.as_deref(),
            b.location.as_deref(),
        ]
        .into_iter()
        .flatten()
        .chain(self.amenities.iter().map(String::as_str))
    }
}

use chrono::{NaiveTime, Weekday};
use sqlx::types::Json;
use std::collections::BTreeMap;

use crate::{
    repo,
    types::{BusinessId, Contact, Coordinates, GalleryImage, ScheduleEntry},
};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ContactRecord {
    pub business_id: uuid::Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub social: Json<BTreeMap<String, String>>,
}

impl ContactRecord {
    pub fn new(parent: BusinessId, contact: &Contact) -> Self {
        Self {
            business_id: parent.into(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
            website: contact.website.clone(),
            social: Json(contact.social.clone()),
        }
    }

    pub fn parent(&self) -> BusinessId {
        self.business_id.into()
    }
}

impl From<ContactRecord> for Contact {
    fn from(value: ContactRecord) -> Self {
        Self {
            phone: value.phone,
            email: value.email,
            website: value.website,
            social: value.social.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CoordinatesRecord {
    pub business_id: uuid::Uuid,
    pub lat: f64,
    pub lng: f64,
}

impl CoordinatesRecord {
    pub fn new(parent: BusinessId, coordinates: &Coordinates) -> Self {
        Self {
            business_id: parent.into(),
            lat: coordinates.lat,
            lng: coordinates.lng,
        }
    }

    pub fn parent(&self) -> BusinessId {
        self.business_id.into()
    }
}

impl From<CoordinatesRecord> for Coordinates {
    fn from(value: CoordinatesRecord) -> Self {
        Coordinates::new(value.lat, value.lng)
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AmenityRecord {
    pub business_id: uuid::Uuid,
    pub position: i32,
    pub label: String,
}

impl AmenityRecord {
    pub fn new(parent: BusinessId, position: i32, label: &str) -> Self {
        Self {
            business_id: parent.into(),
            position,
            label: label.to_owned(),
        }
    }

    pub fn parent(&self) -> BusinessId {
        self.business_id.into()
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct GalleryImageRecord {
    pub business_id: uuid::Uuid,
    pub position: i32,
    pub url: String,
    pub caption: Option<String>,
}

impl GalleryImageRecord {
    pub fn new(parent: BusinessId, position: i32, image: &GalleryImage) -> Self {
        Self {
            business_id: parent.into(),
            position,
            url: image.url.clone(),
            caption: image.caption.clone(),
        }
    }

    pub fn parent(&self) -> BusinessId {
        self.business_id.into()
    }
}

impl From<GalleryImageRecord> for GalleryImage {
    fn from(value: GalleryImageRecord) -> Self {
        Self {
            url: value.url,
            caption: value.caption,
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ScheduleRecord {
    pub business_id: uuid::Uuid,
    pub position: i32,
    /// Days from monday (0 = monday, 6 = sunday)
    pub weekday: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

impl ScheduleRecord {
    pub fn new(parent: BusinessId, position: i32, entry: &ScheduleEntry) -> Self {
        Self {
            business_id: parent.into(),
            position,
            weekday: entry.day.num_days_from_monday() as i16,
            open_time: entry.open,
            close_time: entry.close,
        }
    }

    pub fn parent(&self) -> BusinessId {
        self.business_id.into()
    }
}

impl TryFrom<ScheduleRecord> for ScheduleEntry {
    type Error = repo::Error;

    fn try_from(value: ScheduleRecord) -> Result<Self, Self::Error> {
        let day = u8::try_from(value.weekday)
            .ok()
            .and_then(|d| Weekday::try_from(d).ok())
            .ok_or_else(|| repo::Error::Corrupted {
                table: "schedule_t",
                msg: format!("invalid weekday `{}`", value.weekday),
            })?;

        Ok(ScheduleEntry::new(day, value.open_time, value.close_time))
    }
}

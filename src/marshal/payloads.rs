use serde::Deserialize;

use super::{Error, business_filter_from_serde_value};
use crate::{
    query::BusinessFilter,
    repo::RootPredicate,
    types::{
        BusinessId, Contact, Coordinates, CreateRequest, GalleryImage, RootPatch, ScheduleEntry,
        Sections, UpdateRequest, ValidationError, parse_time, parse_weekday,
    },
};

fn parse_id(field: &str, value: &str) -> Result<BusinessId, ValidationError> {
    value
        .parse()
        .map_err(|e| ValidationError::invalid(field, format!("`{}` is not a uuid ({})", value, e)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulePayload {
    pub day: String,
    pub open: String,
    pub close: String,
}

impl SchedulePayload {
    fn parse(&self, idx: usize) -> Result<ScheduleEntry, ValidationError> {
        let field = |name: &str| format!("schedule[{}].{}", idx, name);

        let day = parse_weekday(&self.day).ok_or_else(|| {
            ValidationError::invalid(&field("day"), format!("`{}` is not a weekday", self.day))
        })?;
        let open = parse_time(&self.open).ok_or_else(|| {
            ValidationError::invalid(&field("open"), format!("`{}` is not HH:MM", self.open))
        })?;
        let close = parse_time(&self.close).ok_or_else(|| {
            ValidationError::invalid(&field("close"), format!("`{}` is not HH:MM", self.close))
        })?;

        Ok(ScheduleEntry::new(day, open, close))
    }
}

/// Root fields and optional sections of a create or update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
    pub logo: Option<String>,
    pub cover: Option<String>,
    pub rating: Option<f64>,
    pub price_tier: Option<i16>,
    pub featured: Option<bool>,
    pub owner: Option<String>,

    pub contact: Option<Contact>,
    pub coordinates: Option<Coordinates>,
    pub amenities: Option<Vec<String>>,
    pub gallery: Option<Vec<GalleryImage>>,
    pub schedule: Option<Vec<SchedulePayload>>,
}

impl BusinessPayload {
    fn into_parts(self) -> Result<(RootPatch, Sections), ValidationError> {
        let name = self
            .name
            .ok_or_else(|| ValidationError::MissingField("name".to_owned()))?;

        let schedule = self
            .schedule
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .map(|(idx, e)| e.parse(idx))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let root = RootPatch {
            name,
            category: self.category,
            region: self.region,
            location: self.location,
            logo: self.logo,
            cover: self.cover,
            rating: self.rating,
            price_tier: self.price_tier,
            featured: self.featured,
            owner: self.owner,
        };
        let sections = Sections {
            contact: self.contact,
            coordinates: self.coordinates,
            amenities: self.amenities,
            gallery: self.gallery,
            schedule,
        };
        Ok((root, sections))
    }
}

impl TryFrom<BusinessPayload> for CreateRequest {
    type Error = ValidationError;

    fn try_from(payload: BusinessPayload) -> Result<Self, Self::Error> {
        let (root, sections) = payload.into_parts()?;
        let request = CreateRequest { root, sections };
        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessUpdatePayload {
    pub id: String,
    #[serde(flatten)]
    pub body: BusinessPayload,
}

impl TryFrom<BusinessUpdatePayload> for UpdateRequest {
    type Error = ValidationError;

    fn try_from(payload: BusinessUpdatePayload) -> Result<Self, Self::Error> {
        let id = parse_id("id", &payload.id)?;
        let (root, sections) = payload.body.into_parts()?;
        let request = UpdateRequest { id, root, sections };
        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessGetPayload {
    pub id: String,
}

impl BusinessGetPayload {
    pub fn id(&self) -> Result<BusinessId, ValidationError> {
        parse_id("id", &self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessListPayload {
    pub owner: Option<String>,
    pub ids: Option<Vec<String>>,
    pub filter: Option<serde_json::Value>,
}

impl BusinessListPayload {
    pub fn scope(&self) -> Result<RootPredicate, ValidationError> {
        let mut scope = RootPredicate::all();
        if let Some(owner) = &self.owner {
            scope = scope.with_owner(owner);
        }
        if let Some(ids) = &self.ids {
            let ids = ids
                .iter()
                .map(|id| parse_id("ids", id))
                .collect::<Result<Vec<_>, _>>()?;
            scope = scope.with_ids(ids);
        }
        Ok(scope)
    }

    pub fn filter(&self) -> Result<BusinessFilter, Error> {
        match &self.filter {
            Some(value) => Ok(business_filter_from_serde_value(value.clone())?),
            None => Ok(BusinessFilter::default()),
        }
    }
}

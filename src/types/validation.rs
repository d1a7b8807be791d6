use super::{CreateRequest, RootPatch, Sections, UpdateRequest, weekday_name};

pub const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=5.0;
pub const PRICE_TIER_RANGE: std::ops::RangeInclusive<i16> = 1..=4;

/// A request rejected before any storage call.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing mandatory field `{0}`")]
    MissingField(String),
    #[error("invalid value for `{field}`: {msg}")]
    InvalidField { field: String, msg: String },
}

impl ValidationError {
    pub fn invalid(field: &str, msg: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_owned(),
            msg: msg.into(),
        }
    }
}

impl RootPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_owned()));
        }
        if let Some(rating) = self.rating
            && !RATING_RANGE.contains(&rating)
        {
            return Err(ValidationError::invalid(
                "rating",
                format!("{} is outside {:?}", rating, RATING_RANGE),
            ));
        }
        if let Some(tier) = self.price_tier
            && !PRICE_TIER_RANGE.contains(&tier)
        {
            return Err(ValidationError::invalid(
                "price_tier",
                format!("{} is outside {:?}", tier, PRICE_TIER_RANGE),
            ));
        }
        Ok(())
    }
}

impl Sections {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(coordinates) = &self.coordinates
            && !coordinates.is_valid()
        {
            return Err(ValidationError::invalid(
                "coordinates",
                format!("({}, {}) is not a valid position", coordinates.lat, coordinates.lng),
            ));
        }
        if let Some(amenities) = &self.amenities
            && amenities.iter().any(|a| a.trim().is_empty())
        {
            return Err(ValidationError::invalid("amenities", "blank label"));
        }
        if let Some(gallery) = &self.gallery
            && gallery.iter().any(|i| i.url.trim().is_empty())
        {
            return Err(ValidationError::invalid("gallery", "blank image url"));
        }
        if let Some(schedule) = &self.schedule {
            let mut seen = [false; 7];
            for (idx, entry) in schedule.iter().enumerate() {
                let day = entry.day.num_days_from_monday() as usize;
                if std::mem::replace(&mut seen[day], true) {
                    return Err(ValidationError::invalid(
                        &format!("schedule[{}].day", idx),
                        format!("`{}` appears more than once", weekday_name(entry.day)),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl UpdateRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.root.validate()?;
        self.sections.validate()
    }
}

impl CreateRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.root.validate()?;
        self.sections.validate()
    }
}

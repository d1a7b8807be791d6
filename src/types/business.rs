use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Identifier of a business root record.
///
/// Ids are generated when the root is created, before any child row can
/// reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(uuid::Uuid);

impl BusinessId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl From<uuid::Uuid> for BusinessId {
    fn from(value: uuid::Uuid) -> Self {
        Self(value)
    }
}

impl From<BusinessId> for uuid::Uuid {
    fn from(value: BusinessId) -> Self {
        value.0
    }
}

impl FromStr for BusinessId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UNIX timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for i64 {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

/// Scalar attributes of a business as exposed in joined views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub category: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
    pub logo: Option<String>,
    pub cover: Option<String>,
    pub rating: Option<f64>,
    pub price_tier: Option<i16>,
    pub featured: bool,
    pub owner: Option<String>,
    pub created_at: Timestamp,
}

/// Root fields of a create or update.
///
/// An update writes the whole root: fields left as [`None`] are stored empty,
/// so re-applying the same patch always yields the same row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootPatch {
    pub name: String,
    pub category: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
    pub logo: Option<String>,
    pub cover: Option<String>,
    pub rating: Option<f64>,
    pub price_tier: Option<i16>,
    pub featured: Option<bool>,
    pub owner: Option<String>,
}

impl RootPatch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_owned());
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_owned());
        self
    }
}

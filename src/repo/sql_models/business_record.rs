use crate::types::{self, BusinessId, RootPatch};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BusinessRecord {
    pub business_id: uuid::Uuid,
    pub business_name: String,
    pub category: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
    pub logo: Option<String>,
    pub cover: Option<String>,
    pub rating: Option<f64>,
    pub price_tier: Option<i16>,
    pub featured: bool,
    pub owner_id: Option<String>,

    /// UNIX timestamp in milliseconds from the creation
    pub(super) creation_unix_tstamp: i64,
}

impl From<BusinessRecord> for types::Business {
    fn from(value: BusinessRecord) -> Self {
        Self {
            id: value.business_id.into(),
            name: value.business_name,
            category: value.category,
            region: value.region,
            location: value.location,
            logo: value.logo,
            cover: value.cover,
            rating: value.rating,
            price_tier: value.price_tier,
            featured: value.featured,
            owner: value.owner_id,
            created_at: value.creation_unix_tstamp.into(),
        }
    }
}

impl BusinessRecord {
    /// Builds a new record with a freshly generated id.
    pub fn new(fields: &RootPatch) -> Self {
        let mut record = Self {
            business_id: BusinessId::generate().into(),
            business_name: String::new(),
            category: None,
            region: None,
            location: None,
            logo: None,
            cover: None,
            rating: None,
            price_tier: None,
            featured: false,
            owner_id: None,
            creation_unix_tstamp: types::Timestamp::now().into(),
        };
        record.apply(fields);
        record
    }

    pub fn id(&self) -> BusinessId {
        self.business_id.into()
    }

    pub fn creation_timestamp(&self) -> types::Timestamp {
        types::Timestamp::from(self.creation_unix_tstamp)
    }

    /// Overwrites every root field with the value in `patch`.
    ///
    /// Fields left empty in the patch are cleared, `featured` falls back to
    /// `false`. Id and creation time are never touched.
    pub fn apply(&mut self, patch: &RootPatch) {
        self.business_name.clone_from(&patch.name);
        self.category.clone_from(&patch.category);
        self.region.clone_from(&patch.region);
        self.location.clone_from(&patch.location);
        self.logo.clone_from(&patch.logo);
        self.cover.clone_from(&patch.cover);
        self.rating = patch.rating;
        self.price_tier = patch.price_tier;
        self.featured = patch.featured.unwrap_or_default();
        self.owner_id.clone_from(&patch.owner);
    }
}

use log::{debug, info, trace};

use super::{AggregateError, FacadeError, FacadeFanOut, FacadeGather};
use crate::{
    query::BusinessFilter,
    repo::{self, RootPredicate},
    types::{self, BusinessId, Section},
};

/// Business aggregate service.
///
/// Validates requests, then delegates reads to [`FacadeGather`] and writes to
/// [`FacadeFanOut`].
pub struct FacadeCatalog {
    store: repo::RecordStoreRef,
    gather: FacadeGather,
    fanout: FacadeFanOut,
}

impl FacadeCatalog {
    pub fn new(store: repo::RecordStoreRef) -> Self {
        Self {
            gather: FacadeGather::new(store.clone()),
            fanout: FacadeFanOut::new(store.clone()),
            store,
        }
    }

    /// Lists the businesses in `scope` matching `filter`, sorted by name.
    pub async fn list(
        &self,
        scope: &RootPredicate,
        filter: &BusinessFilter,
    ) -> Result<Vec<types::BusinessView>, FacadeError> {
        let roots = self.store.list_roots(scope).await?;
        trace!("{} businesses in scope {:?}", roots.len(), scope);

        let views = self.gather.join(roots).await?;
        let total = views.len();
        let views = filter.apply(views);

        debug!("{} of {} businesses match the filter", views.len(), total);
        Ok(views)
    }

    pub async fn get(&self, id: BusinessId) -> Result<types::BusinessView, FacadeError> {
        let root = self
            .store
            .get_root(id)
            .await?
            .ok_or(FacadeError::BusinessNotFound(id))?;

        self.gather
            .join(vec![root])
            .await?
            .pop()
            .ok_or(FacadeError::BusinessNotFound(id))
    }

    /// Creates a business, then writes its sections through the fan-out.
    ///
    /// The root is written once, by the insert.
    ///
    /// The root exists once this returns, even on
    /// [`FacadeError::PartiallyCreated`].
    pub async fn create(&self, request: types::CreateRequest) -> Result<BusinessId, FacadeError> {
        request.validate()?;

        let record = self.store.insert_root(&request.root).await?;
        let id = record.id();
        info!("created business `{}` ({})", record.business_name, id);

        if request.sections.is_empty() {
            return Ok(id);
        }

        match self.fanout.apply_sections(id, request.sections).await {
            Ok(report) => {
                trace!("business `{}` sections written: {:?}", id, report.sections);
                Ok(id)
            }
            Err(FacadeError::AggregateError(source)) => {
                Err(FacadeError::PartiallyCreated { id, source })
            }
            Err(e) => Err(e),
        }
    }

    /// Validates and applies an update.
    pub async fn apply_update(
        &self,
        request: types::UpdateRequest,
    ) -> Result<types::UpdateReport, FacadeError> {
        request.validate()?;

        let id = request.id;
        info!("updating business `{}`", id);

        self.fanout.apply(request).await.map_err(|e| match e {
            FacadeError::AggregateError(AggregateError {
                section: Section::Business,
                source: repo::Error::NotFound(_),
            }) => FacadeError::BusinessNotFound(id),
            e => e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Op, TextQuery};
    use crate::repo::{Call, ChildKind, testing};
    use crate::types::{
        Coordinates, CreateRequest, RootPatch, Sections, UpdateRequest, ValidationError,
    };

    #[tokio::test]
    async fn create_then_get() {
        let store = testing::store();
        let catalog = FacadeCatalog::new(store.clone());

        let id = catalog
            .create(CreateRequest {
                root: RootPatch::new("Cafe Azul").with_region("Atlántida"),
                sections: Sections {
                    amenities: Some(vec!["wifi".into()]),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        let view = catalog.get(id).await.unwrap();
        assert_eq!(view.business.name, "Cafe Azul");
        assert_eq!(view.business.region.as_deref(), Some("Atlántida"));
        assert_eq!(view.amenities, vec!["wifi"]);
    }

    #[tokio::test]
    async fn create_writes_the_root_once() {
        let store = testing::store();
        let catalog = FacadeCatalog::new(store.clone());

        catalog
            .create(CreateRequest {
                root: RootPatch::new("Cafe Azul"),
                sections: Sections {
                    amenities: Some(vec!["wifi".into()]),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(
            store.journal(),
            vec![
                Call::InsertRoot,
                Call::Delete(ChildKind::Amenities),
                Call::Insert(ChildKind::Amenities),
            ]
        );
    }

    #[tokio::test]
    async fn update_clears_omitted_fields() {
        let store = testing::store();
        let catalog = FacadeCatalog::new(store.clone());
        let id = catalog
            .create(CreateRequest {
                root: RootPatch {
                    featured: Some(true),
                    ..RootPatch::new("Cafe Azul")
                        .with_category("cafe")
                        .with_region("Atlántida")
                },
                sections: Sections::default(),
            })
            .await
            .unwrap();

        catalog
            .apply_update(UpdateRequest::new(
                id,
                RootPatch::new("Cafe Azul").with_region("Atlántida"),
            ))
            .await
            .unwrap();

        let view = catalog.get(id).await.unwrap();
        assert_eq!(view.business.region.as_deref(), Some("Atlántida"));
        assert!(view.business.category.is_none());
        assert!(!view.business.featured);
    }

    #[tokio::test]
    async fn get_unknown_business() {
        let catalog = FacadeCatalog::new(testing::store());
        let id = BusinessId::generate();

        assert!(matches!(
            catalog.get(id).await,
            Err(FacadeError::BusinessNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn update_unknown_business() {
        let store = testing::store();
        let catalog = FacadeCatalog::new(store.clone());
        let id = BusinessId::generate();

        let res = catalog
            .apply_update(UpdateRequest::new(id, RootPatch::new("Fantasma")))
            .await;

        assert!(matches!(res, Err(FacadeError::BusinessNotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn invalid_update_touches_nothing() {
        let store = testing::store();
        let id = testing::seed(&store, "Cafe Azul").await;
        store.clear_journal();

        let catalog = FacadeCatalog::new(store.clone());
        let res = catalog
            .apply_update(
                UpdateRequest::new(id, RootPatch::new("Cafe Azul"))
                    .with_coordinates(Coordinates::new(123.0, 0.0)),
            )
            .await;

        assert!(matches!(
            res,
            Err(FacadeError::ValidationError(ValidationError::InvalidField { .. }))
        ));
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn partial_create_reports_the_id() {
        let store = testing::store();
        store.fail_on(Call::Insert(ChildKind::Amenities), "amenities offline");

        let catalog = FacadeCatalog::new(store.clone());
        let res = catalog
            .create(CreateRequest {
                root: RootPatch::new("Cafe Azul"),
                sections: Sections {
                    amenities: Some(vec!["wifi".into()]),
                    ..Default::default()
                },
            })
            .await;

        match res {
            Err(FacadeError::PartiallyCreated { id, source }) => {
                assert_eq!(source.section, Section::Amenities);
                assert!(catalog.get(id).await.is_ok());
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn list_scopes_then_filters() {
        let store = testing::store();
        let catalog = FacadeCatalog::new(store.clone());

        for (name, owner, amenities) in [
            ("Hotel Playa", "ana", vec!["piscina", "wifi"]),
            ("Café Azul", "ana", vec!["wifi", "parking"]),
            ("Pulpería Ñato", "luis", vec![]),
        ] {
            catalog
                .create(CreateRequest {
                    root: RootPatch::new(name).with_owner(owner),
                    sections: Sections {
                        amenities: Some(amenities.into_iter().map(String::from).collect()),
                        ..Default::default()
                    },
                })
                .await
                .unwrap();
        }

        let names = |views: Vec<types::BusinessView>| -> Vec<String> {
            views.into_iter().map(|v| v.business.name).collect()
        };

        let all = catalog
            .list(&RootPredicate::all(), &BusinessFilter::default())
            .await
            .unwrap();
        assert_eq!(names(all), vec!["Café Azul", "Hotel Playa", "Pulpería Ñato"]);

        let owned = catalog
            .list(&RootPredicate::all().with_owner("ana"), &BusinessFilter::default())
            .await
            .unwrap();
        assert_eq!(names(owned), vec!["Café Azul", "Hotel Playa"]);

        let filter = BusinessFilter {
            text: Some(TextQuery::new("WIFI")),
            category: None,
            ..Default::default()
        };
        let searched = catalog
            .list(&RootPredicate::all().with_owner("ana"), &filter)
            .await
            .unwrap();
        assert_eq!(searched.len(), 2);

        let filter = BusinessFilter::default().with_text("pulperia");
        let searched = catalog.list(&RootPredicate::all(), &filter).await.unwrap();
        assert_eq!(names(searched), vec!["Pulpería Ñato"]);

        let filter = BusinessFilter::default().with_category(Op::Ex);
        let searched = catalog.list(&RootPredicate::all(), &filter).await.unwrap();
        assert!(searched.is_empty());
    }
}

use log::{debug, trace};
use std::collections::HashMap;
use std::time::Instant;

use super::FacadeError;
use crate::{
    repo::{self, ChildKind},
    types::{self, BusinessId},
};

/// Scatter-gather reader: joins root records with their children.
///
/// Children are read with one batched query per child relation, whatever the
/// number of roots, so a join costs [`ChildKind::ALL`] queries instead of one
/// per root and relation.
pub struct FacadeGather {
    store: repo::RecordStoreRef,
}

impl FacadeGather {
    pub fn new(store: repo::RecordStoreRef) -> Self {
        Self { store }
    }

    /// Joins every root with its children, preserving the order of `roots`.
    ///
    /// Any failed read aborts the whole join, no partial view is returned.
    pub async fn join(
        &self,
        roots: Vec<repo::BusinessRecord>,
    ) -> Result<Vec<types::BusinessView>, FacadeError> {
        if roots.is_empty() {
            trace!("no business requested, skipping children reads");
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let ids: Vec<BusinessId> = roots.iter().map(repo::BusinessRecord::id).collect();
        let store = &self.store;

        // Relations are independent, all reads are issued at once
        let (contacts, amenities, gallery, coordinates, schedule) = futures::try_join!(
            store.batch_get_children(ChildKind::Contact, &ids),
            store.batch_get_children(ChildKind::Amenities, &ids),
            store.batch_get_children(ChildKind::Gallery, &ids),
            store.batch_get_children(ChildKind::Coordinates, &ids),
            store.batch_get_children(ChildKind::Schedule, &ids),
        )?;

        let mut index = ChildIndex::default();
        index.add_contacts(contacts.into_contacts()?);
        index.add_amenities(amenities.into_amenities()?);
        index.add_gallery(gallery.into_gallery()?);
        index.add_coordinates(coordinates.into_coordinates()?);
        index.add_schedule(schedule.into_schedule()?)?;

        debug!(
            "gathered children of {} businesses with {} queries in {}us",
            ids.len(),
            ChildKind::ALL.len(),
            start.elapsed().as_micros()
        );

        Ok(roots.into_iter().map(|root| index.view(root)).collect())
    }
}

/// Children grouped by parent id
#[derive(Default)]
struct ChildIndex {
    contacts: HashMap<BusinessId, types::Contact>,
    coordinates: HashMap<BusinessId, types::Coordinates>,
    amenities: HashMap<BusinessId, Vec<String>>,
    gallery: HashMap<BusinessId, Vec<types::GalleryImage>>,
    schedule: HashMap<BusinessId, Vec<types::ScheduleEntry>>,
}

impl ChildIndex {
    fn add_contacts(&mut self, rows: Vec<repo::ContactRecord>) {
        for row in rows {
            self.contacts.insert(row.parent(), row.into());
        }
    }

    fn add_coordinates(&mut self, rows: Vec<repo::CoordinatesRecord>) {
        for row in rows {
            self.coordinates.insert(row.parent(), row.into());
        }
    }

    fn add_amenities(&mut self, rows: Vec<repo::AmenityRecord>) {
        for row in rows {
            self.amenities
                .entry(row.parent())
                .or_default()
                .push(row.label);
        }
    }

    fn add_gallery(&mut self, rows: Vec<repo::GalleryImageRecord>) {
        for row in rows {
            self.gallery.entry(row.parent()).or_default().push(row.into());
        }
    }

    fn add_schedule(&mut self, rows: Vec<repo::ScheduleRecord>) -> Result<(), repo::Error> {
        for row in rows {
            let parent = row.parent();
            self.schedule
                .entry(parent)
                .or_default()
                .push(types::ScheduleEntry::try_from(row)?);
        }
        Ok(())
    }

    fn view(&self, root: repo::BusinessRecord) -> types::BusinessView {
        let id = root.id();
        types::BusinessView {
            business: root.into(),
            contact: self.contacts.get(&id).cloned(),
            coordinates: self.coordinates.get(&id).copied(),
            amenities: self.amenities.get(&id).cloned().unwrap_or_default(),
            gallery: self.gallery.get(&id).cloned().unwrap_or_default(),
            schedule: types::WeekHours::from_entries(
                self.schedule.get(&id).into_iter().flatten().copied(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{Call, ChildCollection, ChildSingleton, RecordStore, testing};
    use crate::types::{Coordinates, RootPatch, ScheduleEntry, parse_time};
    use chrono::Weekday;

    #[tokio::test]
    async fn join_costs_one_query_per_relation() {
        let store = testing::store();
        let mut roots = Vec::new();
        for name in ["Arrecife", "Bahia", "Coral"] {
            roots.push(store.insert_root(&RootPatch::new(name)).await.unwrap());
        }
        store.clear_journal();

        let gather = FacadeGather::new(store.clone());
        let views = gather.join(roots).await.unwrap();

        assert_eq!(views.len(), 3);
        let journal = store.journal();
        assert_eq!(journal.len(), ChildKind::ALL.len());
        for kind in ChildKind::ALL {
            assert_eq!(store.calls(Call::BatchGet(kind)), 1);
        }

        // A single root costs the same number of queries
        let root = store.get_root(views[0].business.id).await.unwrap().unwrap();
        store.clear_journal();

        let views = gather.join(vec![root]).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(store.journal().len(), ChildKind::ALL.len());
        for kind in ChildKind::ALL {
            assert_eq!(store.calls(Call::BatchGet(kind)), 1);
        }
    }

    #[tokio::test]
    async fn empty_join_issues_no_query() {
        let store = testing::store();
        let gather = FacadeGather::new(store.clone());

        let views = gather.join(Vec::new()).await.unwrap();

        assert!(views.is_empty());
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn missing_children_are_empty_not_absent() {
        let store = testing::store();
        let with = store.insert_root(&RootPatch::new("Con")).await.unwrap();
        let without = store.insert_root(&RootPatch::new("Sin")).await.unwrap();

        store
            .upsert_child_singleton(
                with.id(),
                &ChildSingleton::Coordinates(Coordinates::new(15.77, -86.79)),
            )
            .await
            .unwrap();
        store
            .replace_child_collection(
                with.id(),
                &ChildCollection::Amenities(vec!["wifi".into(), "bar".into()]),
            )
            .await
            .unwrap();

        let gather = FacadeGather::new(store.clone());
        let views = gather.join(vec![with, without]).await.unwrap();

        assert_eq!(views[0].amenities, vec!["wifi", "bar"]);
        assert_eq!(views[0].coordinates, Some(Coordinates::new(15.77, -86.79)));

        assert!(views[1].amenities.is_empty());
        assert!(views[1].gallery.is_empty());
        assert!(views[1].contact.is_none());
        assert!(views[1].coordinates.is_none());
        assert_eq!(views[1].schedule, types::WeekHours::closed());
    }

    #[tokio::test]
    async fn schedule_is_canonicalized() {
        let store = testing::store();
        let root = store.insert_root(&RootPatch::new("Cafe Azul")).await.unwrap();

        let t = |v: &str| parse_time(v).unwrap();
        let entries = vec![
            ScheduleEntry::new(Weekday::Sat, t("09:00"), t("13:00")),
            ScheduleEntry::new(Weekday::Tue, t("07:00"), t("18:00")),
            ScheduleEntry::new(Weekday::Mon, t("07:00"), t("18:00")),
        ];
        store
            .replace_child_collection(root.id(), &ChildCollection::Schedule(entries))
            .await
            .unwrap();

        let gather = FacadeGather::new(store.clone());
        let view = gather.join(vec![root]).await.unwrap().remove(0);

        let days: Vec<(Weekday, bool)> = view
            .schedule
            .days()
            .iter()
            .map(|d| (d.day, d.is_closed()))
            .collect();
        assert_eq!(
            days,
            vec![
                (Weekday::Mon, false),
                (Weekday::Tue, false),
                (Weekday::Wed, true),
                (Weekday::Thu, true),
                (Weekday::Fri, true),
                (Weekday::Sat, false),
                (Weekday::Sun, true),
            ]
        );
    }

    #[tokio::test]
    async fn failed_read_aborts_join() {
        let store = testing::store();
        let root = store.insert_root(&RootPatch::new("Cafe Azul")).await.unwrap();
        store.fail_on(Call::BatchGet(ChildKind::Gallery), "gallery offline");

        let gather = FacadeGather::new(store.clone());
        let res = gather.join(vec![root]).await;

        assert!(matches!(
            res,
            Err(FacadeError::RepositoryError(repo::Error::Unavailable(_)))
        ));
    }
}

//! Postgres implementation of the [`RecordStore`].
//!
//! Every trait call runs on its own pooled connection with no enclosing
//! transaction. Singleton upserts use native `ON CONFLICT` statements, so no
//! existence probe is needed.

use async_trait::async_trait;
use futures::future::join_all;
use log::trace;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{
    BusinessRecord, ChildCollection, ChildKind, ChildRows, ChildSingleton, ContactRecord,
    CoordinatesRecord, Error, RecordStore, RootPredicate, Upserted,
};
use crate::types::{BusinessId, RootPatch};

pub type Database = sqlx::Postgres;

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub async fn try_new(database_url: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the schema migrations shipped with the crate.
    pub async fn migrate(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn upserted(inserted: bool) -> Upserted {
    if inserted {
        Upserted::Inserted
    } else {
        Upserted::Updated
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get_root(&self, id: BusinessId) -> Result<Option<BusinessRecord>, Error> {
        super::business_find_by_id(&self.pool, id).await
    }

    async fn list_roots(&self, predicate: &RootPredicate) -> Result<Vec<BusinessRecord>, Error> {
        super::business_find_all(&self.pool, predicate).await
    }

    async fn insert_root(&self, fields: &RootPatch) -> Result<BusinessRecord, Error> {
        super::business_create(&self.pool, &BusinessRecord::new(fields)).await
    }

    async fn upsert_root(&self, record: &BusinessRecord) -> Result<Upserted, Error> {
        Ok(upserted(super::business_upsert(&self.pool, record).await?))
    }

    async fn patch_root(&self, id: BusinessId, patch: &RootPatch) -> Result<(), Error> {
        let updated = super::business_patch(&self.pool, id, patch).await?;
        if updated == 0 {
            return Err(Error::NotFound(format!("business `{}`", id)));
        }
        Ok(())
    }

    async fn upsert_child_singleton(
        &self,
        parent: BusinessId,
        value: &ChildSingleton,
    ) -> Result<Upserted, Error> {
        let inserted = match value {
            ChildSingleton::Contact(contact) => {
                super::contact_upsert(&self.pool, &ContactRecord::new(parent, contact)).await?
            }
            ChildSingleton::Coordinates(coordinates) => {
                super::coordinates_upsert(&self.pool, &CoordinatesRecord::new(parent, coordinates))
                    .await?
            }
        };
        Ok(upserted(inserted))
    }

    async fn replace_child_collection(
        &self,
        parent: BusinessId,
        items: &ChildCollection,
    ) -> Result<(), Error> {
        let kind = items.kind();

        let deleted = super::children_delete(&self.pool, kind, parent).await?;
        trace!("deleted {} `{}` rows of {}", deleted, kind, parent);

        // Inserts run concurrently, the `position` column keeps list order.
        // Every insert is awaited before reporting, even after a failure.
        let rows = items.rows(parent);
        let results = join_all(
            rows.iter()
                .map(|row| super::collection_row_create(&self.pool, row)),
        )
        .await;

        results.into_iter().collect()
    }

    async fn batch_get_children(
        &self,
        kind: ChildKind,
        parents: &[BusinessId],
    ) -> Result<ChildRows, Error> {
        super::children_find_by_parents(&self.pool, kind, parents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Contact, Coordinates};

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a postgres instance (DATABASE_URL)"]
    async fn collection_replace_supersedes(pool: sqlx::Pool<Database>) -> sqlx::Result<()> {
        let store = PgRecordStore::from_pool(pool);
        let root = store
            .insert_root(&RootPatch::new("Cafe Azul"))
            .await
            .unwrap();

        let items = ChildCollection::Amenities(vec!["wifi".into(), "parking".into()]);
        store
            .replace_child_collection(root.id(), &items)
            .await
            .unwrap();
        let items = ChildCollection::Amenities(vec!["pool".into()]);
        store
            .replace_child_collection(root.id(), &items)
            .await
            .unwrap();

        let rows = store
            .batch_get_children(ChildKind::Amenities, &[root.id()])
            .await
            .unwrap()
            .into_amenities()
            .unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["pool"]);

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a postgres instance (DATABASE_URL)"]
    async fn singleton_upsert_branches(pool: sqlx::Pool<Database>) -> sqlx::Result<()> {
        let store = PgRecordStore::from_pool(pool);
        let id = BusinessId::generate();

        let value = ChildSingleton::Coordinates(Coordinates::new(16.3, -86.5));
        assert_eq!(
            store.upsert_child_singleton(id, &value).await.unwrap(),
            Upserted::Inserted
        );
        let value = ChildSingleton::Contact(Contact::default());
        assert_eq!(
            store.upsert_child_singleton(id, &value).await.unwrap(),
            Upserted::Inserted
        );
        let value = ChildSingleton::Coordinates(Coordinates::new(15.0, -87.0));
        assert_eq!(
            store.upsert_child_singleton(id, &value).await.unwrap(),
            Upserted::Updated
        );

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a postgres instance (DATABASE_URL)"]
    async fn patch_unknown_root(pool: sqlx::Pool<Database>) -> sqlx::Result<()> {
        let store = PgRecordStore::from_pool(pool);

        let res = store
            .patch_root(BusinessId::generate(), &RootPatch::new("ghost"))
            .await;
        assert!(matches!(res, Err(Error::NotFound(_))));

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a postgres instance (DATABASE_URL)"]
    async fn patch_clears_omitted_fields(pool: sqlx::Pool<Database>) -> sqlx::Result<()> {
        let store = PgRecordStore::from_pool(pool);
        let root = store
            .insert_root(&RootPatch {
                featured: Some(true),
                ..RootPatch::new("Cafe Azul").with_category("cafe")
            })
            .await
            .unwrap();

        store
            .patch_root(root.id(), &RootPatch::new("Cafe Azul"))
            .await
            .unwrap();

        let stored = store.get_root(root.id()).await.unwrap().unwrap();
        assert_eq!(stored.business_name, "Cafe Azul");
        assert!(stored.category.is_none());
        assert!(!stored.featured);
        assert_eq!(stored.creation_timestamp(), root.creation_timestamp());

        Ok(())
    }
}

use sqlx::PgExecutor;

use crate::{
    repo::{self, ChildKind, ChildRows, CollectionRow, sql_models},
    types::BusinessId,
};

/// Inserts or updates the contact of a business, returns `true` if the row was inserted.
pub async fn contact_upsert<'e>(
    exec: impl PgExecutor<'e>,
    record: &sql_models::ContactRecord,
) -> Result<bool, repo::Error> {
    let inserted = sqlx::query_scalar::<_, bool>(
        r#"INSERT INTO contact_t(business_id, phone, email, website, social)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (business_id)
        DO UPDATE SET
            phone = EXCLUDED.phone,
            email = EXCLUDED.email,
            website = EXCLUDED.website,
            social = EXCLUDED.social
        RETURNING (xmax = 0)"#,
    )
    .bind(record.business_id)
    .bind(&record.phone)
    .bind(&record.email)
    .bind(&record.website)
    .bind(&record.social)
    .fetch_one(exec)
    .await?;
    Ok(inserted)
}

/// Inserts or updates the coordinates of a business, returns `true` if the row was inserted.
pub async fn coordinates_upsert<'e>(
    exec: impl PgExecutor<'e>,
    record: &sql_models::CoordinatesRecord,
) -> Result<bool, repo::Error> {
    let inserted = sqlx::query_scalar::<_, bool>(
        r#"INSERT INTO coordinates_t(business_id, lat, lng)
        VALUES ($1, $2, $3)
        ON CONFLICT (business_id)
        DO UPDATE SET
            lat = EXCLUDED.lat,
            lng = EXCLUDED.lng
        RETURNING (xmax = 0)"#,
    )
    .bind(record.business_id)
    .bind(record.lat)
    .bind(record.lng)
    .fetch_one(exec)
    .await?;
    Ok(inserted)
}

/// Deletes every `kind` row owned by `parent`, returns the number of deleted rows.
pub async fn children_delete<'e>(
    exec: impl PgExecutor<'e>,
    kind: ChildKind,
    parent: BusinessId,
) -> Result<u64, repo::Error> {
    // Table names come from a closed set, never from user input
    let query = format!("DELETE FROM {} WHERE business_id = $1", kind.table());
    let res = sqlx::query(&query)
        .bind(uuid::Uuid::from(parent))
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

pub async fn collection_row_create<'e>(
    exec: impl PgExecutor<'e>,
    row: &CollectionRow,
) -> Result<(), repo::Error> {
    match row {
        CollectionRow::Amenity(r) => {
            sqlx::query(
                r#"INSERT INTO amenity_t(business_id, position, label)
                VALUES ($1, $2, $3)"#,
            )
            .bind(r.business_id)
            .bind(r.position)
            .bind(&r.label)
            .execute(exec)
            .await?;
        }
        CollectionRow::Gallery(r) => {
            sqlx::query(
                r#"INSERT INTO gallery_image_t(business_id, position, url, caption)
                VALUES ($1, $2, $3, $4)"#,
            )
            .bind(r.business_id)
            .bind(r.position)
            .bind(&r.url)
            .bind(&r.caption)
            .execute(exec)
            .await?;
        }
        CollectionRow::Schedule(r) => {
            sqlx::query(
                r#"INSERT INTO schedule_t(business_id, position, weekday, open_time, close_time)
                VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(r.business_id)
            .bind(r.position)
            .bind(r.weekday)
            .bind(r.open_time)
            .bind(r.close_time)
            .execute(exec)
            .await?;
        }
    }
    Ok(())
}

/// Returns all `kind` rows owned by any of `parents` using a single query.
pub async fn children_find_by_parents<'e>(
    exec: impl PgExecutor<'e>,
    kind: ChildKind,
    parents: &[BusinessId],
) -> Result<ChildRows, repo::Error> {
    let ids: Vec<uuid::Uuid> = parents.iter().map(|id| (*id).into()).collect();

    let order = if kind.is_singleton() {
        "business_id"
    } else {
        "business_id, position"
    };
    let query = format!(
        "SELECT * FROM {} WHERE business_id = ANY($1) ORDER BY {}",
        kind.table(),
        order
    );

    let rows = match kind {
        ChildKind::Contact => ChildRows::Contact(
            sqlx::query_as::<_, sql_models::ContactRecord>(&query)
                .bind(ids)
                .fetch_all(exec)
                .await?,
        ),
        ChildKind::Coordinates => ChildRows::Coordinates(
            sqlx::query_as::<_, sql_models::CoordinatesRecord>(&query)
                .bind(ids)
                .fetch_all(exec)
                .await?,
        ),
        ChildKind::Amenities => ChildRows::Amenities(
            sqlx::query_as::<_, sql_models::AmenityRecord>(&query)
                .bind(ids)
                .fetch_all(exec)
                .await?,
        ),
        ChildKind::Gallery => ChildRows::Gallery(
            sqlx::query_as::<_, sql_models::GalleryImageRecord>(&query)
                .bind(ids)
                .fetch_all(exec)
                .await?,
        ),
        ChildKind::Schedule => ChildRows::Schedule(
            sqlx::query_as::<_, sql_models::ScheduleRecord>(&query)
                .bind(ids)
                .fetch_all(exec)
                .await?,
        ),
    };

    Ok(rows)
}

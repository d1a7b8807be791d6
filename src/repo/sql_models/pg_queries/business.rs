use sqlx::{PgExecutor, Postgres, QueryBuilder};

use crate::{
    repo::{self, sql_models},
    types::{BusinessId, RootPatch},
};

pub async fn business_find_by_id<'e>(
    exec: impl PgExecutor<'e>,
    id: BusinessId,
) -> Result<Option<sql_models::BusinessRecord>, repo::Error> {
    let res = sqlx::query_as::<_, sql_models::BusinessRecord>(
        "SELECT * FROM business_t WHERE business_id = $1",
    )
    .bind(uuid::Uuid::from(id))
    .fetch_optional(exec)
    .await?;
    Ok(res)
}

/// Returns the businesses matching `predicate`, ordered by name.
pub async fn business_find_all<'e>(
    exec: impl PgExecutor<'e>,
    predicate: &repo::RootPredicate,
) -> Result<Vec<sql_models::BusinessRecord>, repo::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM business_t WHERE TRUE");

    if let Some(ids) = &predicate.ids {
        let ids: Vec<uuid::Uuid> = ids.iter().map(|id| (*id).into()).collect();
        qb.push(" AND business_id = ANY(").push_bind(ids).push(")");
    }
    if let Some(owner) = &predicate.owner {
        qb.push(" AND owner_id = ").push_bind(owner.clone());
    }
    qb.push(" ORDER BY business_name, business_id");

    let res = qb
        .build_query_as::<sql_models::BusinessRecord>()
        .fetch_all(exec)
        .await?;
    Ok(res)
}

pub async fn business_create<'e>(
    exec: impl PgExecutor<'e>,
    record: &sql_models::BusinessRecord,
) -> Result<sql_models::BusinessRecord, repo::Error> {
    let res = sqlx::query_as::<_, sql_models::BusinessRecord>(
        r#"INSERT INTO business_t(
            business_id, business_name, category, region, location,
            logo, cover, rating, price_tier, featured, owner_id,
            creation_unix_tstamp
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *"#,
    )
    .bind(record.business_id)
    .bind(&record.business_name)
    .bind(&record.category)
    .bind(&record.region)
    .bind(&record.location)
    .bind(&record.logo)
    .bind(&record.cover)
    .bind(record.rating)
    .bind(record.price_tier)
    .bind(record.featured)
    .bind(&record.owner_id)
    .bind(record.creation_unix_tstamp)
    .fetch_one(exec)
    .await?;
    Ok(res)
}

/// Writes the whole record, returns `true` if the row was inserted.
pub async fn business_upsert<'e>(
    exec: impl PgExecutor<'e>,
    record: &sql_models::BusinessRecord,
) -> Result<bool, repo::Error> {
    // `xmax` is zero only for rows created by this statement
    let inserted = sqlx::query_scalar::<_, bool>(
        r#"INSERT INTO business_t(
            business_id, business_name, category, region, location,
            logo, cover, rating, price_tier, featured, owner_id,
            creation_unix_tstamp
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (business_id)
        DO UPDATE SET
            business_name = EXCLUDED.business_name,
            category = EXCLUDED.category,
            region = EXCLUDED.region,
            location = EXCLUDED.location,
            logo = EXCLUDED.logo,
            cover = EXCLUDED.cover,
            rating = EXCLUDED.rating,
            price_tier = EXCLUDED.price_tier,
            featured = EXCLUDED.featured,
            owner_id = EXCLUDED.owner_id
        RETURNING (xmax = 0)"#,
    )
    .bind(record.business_id)
    .bind(&record.business_name)
    .bind(&record.category)
    .bind(&record.region)
    .bind(&record.location)
    .bind(&record.logo)
    .bind(&record.cover)
    .bind(record.rating)
    .bind(record.price_tier)
    .bind(record.featured)
    .bind(&record.owner_id)
    .bind(record.creation_unix_tstamp)
    .fetch_one(exec)
    .await?;
    Ok(inserted)
}

/// Overwrites every root field with `patch`, returns the number of updated rows.
pub async fn business_patch<'e>(
    exec: impl PgExecutor<'e>,
    id: BusinessId,
    patch: &RootPatch,
) -> Result<u64, repo::Error> {
    let res = sqlx::query(
        r#"UPDATE business_t SET
            business_name = $2,
            category = $3,
            region = $4,
            location = $5,
            logo = $6,
            cover = $7,
            rating = $8,
            price_tier = $9,
            featured = $10,
            owner_id = $11
    WHERE business_id = $1"#,
    )
    .bind(uuid::Uuid::from(id))
    .bind(&patch.name)
    .bind(&patch.category)
    .bind(&patch.region)
    .bind(&patch.location)
    .bind(&patch.logo)
    .bind(&patch.cover)
    .bind(patch.rating)
    .bind(patch.price_tier)
    .bind(patch.featured.unwrap_or_default())
    .bind(&patch.owner)
    .execute(exec)
    .await?;
    Ok(res.rows_affected())
}

//! Read operations for the `stores` table.

use sqlx::PgPool;
use uuid::Uuid;
use washbay_core::{ProximityQuery, StoreListQuery};

use super::types::StoreRow;
use super::STORE_COLUMNS;
use crate::DbError;

/// Active stores within `radius_m` metres of the origin with
/// `rating >= min_rating`, nearest first.
///
/// Uses `ST_DWithin` on the GIST-indexed geography column for the radius and
/// the `<->` KNN operator for ordering. Ties on distance fall back to `id`
/// so paging is deterministic.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_nearby_stores(
    pool: &PgPool,
    query: &ProximityQuery,
) -> Result<Vec<StoreRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {STORE_COLUMNS} \
         FROM stores \
         WHERE is_active = TRUE \
           AND rating >= $3 \
           AND ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $4) \
         ORDER BY location <-> ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, id \
         LIMIT $5 OFFSET $6"
    );

    sqlx::query_as::<_, StoreRow>(&sql)
        .bind(query.origin.longitude)
        .bind(query.origin.latitude)
        .bind(query.min_rating)
        .bind(query.radius_m)
        .bind(i64::from(query.limit))
        .bind(i64::from(query.skip))
        .fetch_all(pool)
        .await
}

/// Fetch one store by id, regardless of `is_active`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has this id, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_store(pool: &PgPool, id: Uuid) -> Result<StoreRow, DbError> {
    let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1");

    sqlx::query_as::<_, StoreRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// List stores ordered by `name ASC`. Inactive stores are hidden unless
/// `include_inactive` is set.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_stores(
    pool: &PgPool,
    query: &StoreListQuery,
) -> Result<Vec<StoreRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {STORE_COLUMNS} \
         FROM stores \
         WHERE ($1 OR is_active = TRUE) \
         ORDER BY name ASC, id ASC \
         LIMIT $2 OFFSET $3"
    );

    sqlx::query_as::<_, StoreRow>(&sql)
        .bind(query.include_inactive)
        .bind(i64::from(query.limit))
        .bind(i64::from(query.skip))
        .fetch_all(pool)
        .await
}

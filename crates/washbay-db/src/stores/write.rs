//! Write operations for the `stores` table.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use washbay_core::{NewStore, StorePatch};

use super::types::StoreRow;
use super::STORE_COLUMNS;
use crate::DbError;

/// Insert a new store and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if a store with the same name and address
/// already exists, or [`DbError::Sqlx`] for any other database failure.
pub async fn insert_store(pool: &PgPool, store: &NewStore) -> Result<StoreRow, DbError> {
    let sql = format!(
        "INSERT INTO stores \
             (id, name, address, city, state, zip, phone, latitude, longitude, \
              rating, review_count, is_active, capacity, current_queue, \
              base_wait_minutes, services, hours) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
         RETURNING {STORE_COLUMNS}"
    );

    sqlx::query_as::<_, StoreRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.city)
        .bind(&store.state)
        .bind(&store.zip)
        .bind(&store.phone)
        .bind(store.latitude)
        .bind(store.longitude)
        .bind(store.rating)
        .bind(store.review_count)
        .bind(store.is_active)
        .bind(store.capacity)
        .bind(store.current_queue)
        .bind(store.base_wait_minutes)
        .bind(Json(&store.services))
        .bind(Json(&store.hours))
        .fetch_one(pool)
        .await
        .map_err(|e| unique_violation_as_duplicate(e, &store.name, &store.address))
}

/// Apply a sparse patch to one store and return the updated row.
///
/// Absent fields keep their stored values via `COALESCE`. The nullable text
/// columns carry an explicit "supplied" flag so that JSON `null` clears them.
/// `services` and `hours` are replaced wholesale when supplied.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has this id, [`DbError::Duplicate`]
/// if the new name/address collides with another store, or [`DbError::Sqlx`]
/// for any other database failure.
pub async fn update_store(pool: &PgPool, id: Uuid, patch: &StorePatch) -> Result<StoreRow, DbError> {
    let sql = format!(
        "UPDATE stores SET \
             name              = COALESCE($2, name), \
             address           = COALESCE($3, address), \
             city              = COALESCE($4, city), \
             state             = CASE WHEN $5 THEN $6 ELSE state END, \
             zip               = CASE WHEN $7 THEN $8 ELSE zip END, \
             phone             = CASE WHEN $9 THEN $10 ELSE phone END, \
             latitude          = COALESCE($11, latitude), \
             longitude         = COALESCE($12, longitude), \
             rating            = COALESCE($13, rating), \
             review_count      = COALESCE($14, review_count), \
             is_active         = COALESCE($15, is_active), \
             capacity          = COALESCE($16, capacity), \
             current_queue     = COALESCE($17, current_queue), \
             base_wait_minutes = COALESCE($18, base_wait_minutes), \
             services          = COALESCE($19, services), \
             hours             = COALESCE($20, hours), \
             updated_at        = NOW() \
         WHERE id = $1 \
         RETURNING {STORE_COLUMNS}"
    );

    let nullable = |field: &Option<Option<String>>| {
        (
            field.is_some(),
            field.as_ref().and_then(Option::as_deref).map(str::to_owned),
        )
    };
    let (state_supplied, state) = nullable(&patch.state);
    let (zip_supplied, zip) = nullable(&patch.zip);
    let (phone_supplied, phone) = nullable(&patch.phone);

    sqlx::query_as::<_, StoreRow>(&sql)
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.address.as_deref())
        .bind(patch.city.as_deref())
        .bind(state_supplied)
        .bind(state)
        .bind(zip_supplied)
        .bind(zip)
        .bind(phone_supplied)
        .bind(phone)
        .bind(patch.latitude)
        .bind(patch.longitude)
        .bind(patch.rating)
        .bind(patch.review_count)
        .bind(patch.is_active)
        .bind(patch.capacity)
        .bind(patch.current_queue)
        .bind(patch.base_wait_minutes)
        .bind(patch.services.as_ref().map(Json))
        .bind(patch.hours.as_ref().map(Json))
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            unique_violation_as_duplicate(
                e,
                patch.name.as_deref().unwrap_or("<unchanged>"),
                patch.address.as_deref().unwrap_or("<unchanged>"),
            )
        })?
        .ok_or(DbError::NotFound)
}

/// Soft delete: mark the store inactive so it drops out of search results.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has this id, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn deactivate_store(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let rows_affected = sqlx::query(
        "UPDATE stores \
         SET is_active = FALSE, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Upsert seed stores keyed on `(name, address)`.
///
/// Returns `(inserted, updated)`. All upserts run inside a single
/// transaction; if any statement fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn upsert_seed_stores(pool: &PgPool, stores: &[NewStore]) -> Result<(u64, u64), DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0_u64;
    let mut updated = 0_u64;

    for store in stores {
        let is_new: bool = sqlx::query_scalar(
            "INSERT INTO stores \
                 (id, name, address, city, state, zip, phone, latitude, longitude, \
                  rating, review_count, is_active, capacity, current_queue, \
                  base_wait_minutes, services, hours) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             ON CONFLICT (name, address) DO UPDATE SET \
                 city              = EXCLUDED.city, \
                 state             = EXCLUDED.state, \
                 zip               = EXCLUDED.zip, \
                 phone             = EXCLUDED.phone, \
                 latitude          = EXCLUDED.latitude, \
                 longitude         = EXCLUDED.longitude, \
                 rating            = EXCLUDED.rating, \
                 review_count      = EXCLUDED.review_count, \
                 is_active         = EXCLUDED.is_active, \
                 capacity          = EXCLUDED.capacity, \
                 current_queue     = EXCLUDED.current_queue, \
                 base_wait_minutes = EXCLUDED.base_wait_minutes, \
                 services          = EXCLUDED.services, \
                 hours             = EXCLUDED.hours, \
                 updated_at        = NOW() \
             RETURNING (xmax = 0) AS is_new",
        )
        .bind(Uuid::new_v4())
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.city)
        .bind(&store.state)
        .bind(&store.zip)
        .bind(&store.phone)
        .bind(store.latitude)
        .bind(store.longitude)
        .bind(store.rating)
        .bind(store.review_count)
        .bind(store.is_active)
        .bind(store.capacity)
        .bind(store.current_queue)
        .bind(store.base_wait_minutes)
        .bind(Json(&store.services))
        .bind(Json(&store.hours))
        .fetch_one(&mut *tx)
        .await?;

        if is_new {
            inserted += 1;
        } else {
            updated += 1;
        }
    }

    tx.commit().await?;
    Ok((inserted, updated))
}

fn unique_violation_as_duplicate(err: sqlx::Error, name: &str, address: &str) -> DbError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DbError::Duplicate(format!("'{name}' at '{address}'"))
        }
        _ => DbError::Sqlx(err),
    }
}

//! Postgres/PostGIS implementation of [`StoreRepository`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use washbay_core::{
    NewStore, ProximityQuery, RepositoryError, Store, StoreListQuery, StorePatch, StoreRepository,
};

use crate::{stores, DbError};

#[derive(Debug, Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn backend(err: sqlx::Error) -> RepositoryError {
    RepositoryError::from(DbError::from(err))
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn find_nearby(&self, query: &ProximityQuery) -> Result<Vec<Store>, RepositoryError> {
        let rows = stores::find_nearby_stores(&self.pool, query)
            .await
            .map_err(backend)?;
        tracing::debug!(rows = rows.len(), radius_m = query.radius_m, "proximity query");
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Store, RepositoryError> {
        Ok(stores::get_store(&self.pool, id).await?.into())
    }

    async fn list(&self, query: &StoreListQuery) -> Result<Vec<Store>, RepositoryError> {
        let rows = stores::list_stores(&self.pool, query)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn insert(&self, store: &NewStore) -> Result<Store, RepositoryError> {
        Ok(stores::insert_store(&self.pool, store).await?.into())
    }

    async fn update(&self, id: Uuid, patch: &StorePatch) -> Result<Store, RepositoryError> {
        Ok(stores::update_store(&self.pool, id, patch).await?.into())
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), RepositoryError> {
        Ok(stores::deactivate_store(&self.pool, id).await?)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

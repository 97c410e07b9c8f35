use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::geo::Coordinates;
use crate::stores::{NewStore, Store, StorePatch};

/// Inputs to the single proximity query issued per search.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityQuery {
    pub origin: Coordinates,
    /// Search radius in metres.
    pub radius_m: f64,
    pub min_rating: f64,
    pub limit: u32,
    pub skip: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreListQuery {
    pub limit: u32,
    pub skip: u32,
    pub include_inactive: bool,
}

/// Port for the store collection.
///
/// Implementations must order `find_nearby` results by increasing distance
/// from the origin and only return active stores.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Active stores within `radius_m` of the origin with `rating >= min_rating`.
    async fn find_nearby(&self, query: &ProximityQuery) -> Result<Vec<Store>, RepositoryError>;

    /// Fetch one store by id, active or not.
    async fn get(&self, id: Uuid) -> Result<Store, RepositoryError>;

    /// Stores ordered by name.
    async fn list(&self, query: &StoreListQuery) -> Result<Vec<Store>, RepositoryError>;

    async fn insert(&self, store: &NewStore) -> Result<Store, RepositoryError>;

    /// Apply a sparse patch and return the updated row.
    async fn update(&self, id: Uuid, patch: &StorePatch) -> Result<Store, RepositoryError>;

    /// Soft delete: sets `is_active = false`.
    async fn deactivate(&self, id: Uuid) -> Result<(), RepositoryError>;

    async fn health_check(&self) -> Result<(), RepositoryError>;
}

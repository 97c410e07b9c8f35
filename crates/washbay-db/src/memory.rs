//! In-memory [`StoreRepository`] for development and tests.
//!
//! Mirrors the Postgres semantics: great-circle radius check, nearest-first
//! ordering with `id` as the tie-break, unique `(name, address)`, and soft
//! delete. Uses `tokio::sync::RwLock`, which cannot be poisoned.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use washbay_core::{
    haversine_km, NewStore, ProximityQuery, RepositoryError, Store, StoreListQuery, StorePatch,
    StoreRepository,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryStoreRepository {
    stores: Arc<RwLock<HashMap<Uuid, Store>>>,
}

impl MemoryStoreRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-populated with `stores`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if two entries share a name and address.
    pub async fn with_stores(stores: &[NewStore]) -> Result<Self, RepositoryError> {
        let repo = Self::new();
        for store in stores {
            repo.insert(store).await?;
        }
        Ok(repo)
    }

    pub async fn len(&self) -> usize {
        self.stores.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.stores.read().await.is_empty()
    }
}

fn collides(existing: &HashMap<Uuid, Store>, skip: Option<Uuid>, name: &str, address: &str) -> bool {
    existing
        .values()
        .any(|s| Some(s.id) != skip && s.name == name && s.address == address)
}

fn page<T>(items: Vec<T>, skip: u32, limit: u32) -> Vec<T> {
    items
        .into_iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl StoreRepository for MemoryStoreRepository {
    async fn find_nearby(&self, query: &ProximityQuery) -> Result<Vec<Store>, RepositoryError> {
        let radius_km = query.radius_m / 1000.0;
        let stores = self.stores.read().await;

        let mut hits: Vec<(f64, &Store)> = stores
            .values()
            .filter(|s| s.is_active && s.rating >= query.min_rating)
            .map(|s| (haversine_km(query.origin, s.coordinates()), s))
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));

        let ordered = hits.into_iter().map(|(_, s)| s.clone()).collect();
        Ok(page(ordered, query.skip, query.limit))
    }

    async fn get(&self, id: Uuid) -> Result<Store, RepositoryError> {
        self.stores
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, query: &StoreListQuery) -> Result<Vec<Store>, RepositoryError> {
        let stores = self.stores.read().await;
        let mut visible: Vec<Store> = stores
            .values()
            .filter(|s| query.include_inactive || s.is_active)
            .cloned()
            .collect();
        visible.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(page(visible, query.skip, query.limit))
    }

    async fn insert(&self, store: &NewStore) -> Result<Store, RepositoryError> {
        let mut stores = self.stores.write().await;
        if collides(&stores, None, &store.name, &store.address) {
            return Err(RepositoryError::Conflict(format!(
                "'{}' at '{}'",
                store.name, store.address
            )));
        }

        let now = Utc::now();
        let created = Store {
            id: Uuid::new_v4(),
            name: store.name.clone(),
            address: store.address.clone(),
            city: store.city.clone(),
            state: store.state.clone(),
            zip: store.zip.clone(),
            phone: store.phone.clone(),
            latitude: store.latitude,
            longitude: store.longitude,
            rating: store.rating,
            review_count: store.review_count,
            is_active: store.is_active,
            capacity: store.capacity,
            current_queue: store.current_queue,
            base_wait_minutes: store.base_wait_minutes,
            services: store.services.clone(),
            hours: store.hours.clone(),
            created_at: now,
            updated_at: now,
        };
        stores.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: &StorePatch) -> Result<Store, RepositoryError> {
        let mut stores = self.stores.write().await;
        let mut updated = stores.get(&id).cloned().ok_or(RepositoryError::NotFound)?;
        patch.apply_to(&mut updated, Utc::now());

        if collides(&stores, Some(id), &updated.name, &updated.address) {
            return Err(RepositoryError::Conflict(format!(
                "'{}' at '{}'",
                updated.name, updated.address
            )));
        }
        stores.insert(id, updated.clone());
        Ok(updated)
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut stores = self.stores.write().await;
        let store = stores.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        store.is_active = false;
        store.updated_at = Utc::now();
        Ok(())
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use washbay_core::Coordinates;

    use super::*;

    fn new_store(name: &str, latitude: f64, longitude: f64) -> NewStore {
        NewStore {
            name: name.to_string(),
            address: format!("{name} Ave"),
            city: "New York".to_string(),
            state: Some("NY".to_string()),
            zip: None,
            phone: None,
            latitude,
            longitude,
            rating: 4.5,
            review_count: 10,
            is_active: true,
            capacity: 3,
            current_queue: 0,
            base_wait_minutes: 5,
            services: vec![],
            hours: washbay_core::WeeklyHours::default(),
        }
    }

    fn nyc_query(radius_m: f64) -> ProximityQuery {
        ProximityQuery {
            origin: Coordinates {
                latitude: 40.7128,
                longitude: -74.0060,
            },
            radius_m,
            min_rating: 0.0,
            limit: 20,
            skip: 0,
        }
    }

    #[tokio::test]
    async fn find_nearby_orders_by_distance_and_respects_radius() {
        let repo = MemoryStoreRepository::with_stores(&[
            new_store("Two", 40.7308, -74.0060),
            new_store("One", 40.7218, -74.0060),
            new_store("Far", 34.0522, -118.2437),
        ])
        .await
        .expect("seed");

        let hits = repo.find_nearby(&nyc_query(5000.0)).await.expect("query");
        let names: Vec<&str> = hits.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["One", "Two"]);
    }

    #[tokio::test]
    async fn find_nearby_skips_inactive_and_low_rated() {
        let mut low = new_store("Low", 40.7130, -74.0060);
        low.rating = 2.0;
        let mut closed = new_store("Closed", 40.7131, -74.0060);
        closed.is_active = false;
        let repo = MemoryStoreRepository::with_stores(&[low, closed, new_store("Good", 40.7132, -74.0060)])
            .await
            .expect("seed");

        let mut query = nyc_query(5000.0);
        query.min_rating = 3.0;
        let hits = repo.find_nearby(&query).await.expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Good");
    }

    #[tokio::test]
    async fn find_nearby_pages_after_ordering() {
        let repo = MemoryStoreRepository::with_stores(&[
            new_store("A", 40.7130, -74.0060),
            new_store("B", 40.7140, -74.0060),
            new_store("C", 40.7150, -74.0060),
        ])
        .await
        .expect("seed");

        let mut query = nyc_query(5000.0);
        query.skip = 1;
        query.limit = 1;
        let hits = repo.find_nearby(&query).await.expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "B");
    }

    #[tokio::test]
    async fn duplicate_name_and_address_is_a_conflict() {
        let repo = MemoryStoreRepository::new();
        repo.insert(&new_store("Dup", 1.0, 1.0)).await.expect("first insert");
        let err = repo.insert(&new_store("Dup", 2.0, 2.0)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn update_and_deactivate_unknown_ids_are_not_found() {
        let repo = MemoryStoreRepository::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            repo.update(id, &StorePatch::default()).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.deactivate(id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deactivated_store_is_listed_only_when_requested() {
        let repo = MemoryStoreRepository::new();
        let store = repo.insert(&new_store("Gone", 1.0, 1.0)).await.expect("insert");
        repo.deactivate(store.id).await.expect("deactivate");

        let mut query = StoreListQuery {
            limit: 10,
            skip: 0,
            include_inactive: false,
        };
        assert!(repo.list(&query).await.expect("list").is_empty());
        query.include_inactive = true;
        assert_eq!(repo.list(&query).await.expect("list").len(), 1);
        assert!(!repo.get(store.id).await.expect("get").is_active);
    }
}

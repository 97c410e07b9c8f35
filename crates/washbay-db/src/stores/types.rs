//! Row type for the `stores` table.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;
use washbay_core::{ServiceOffering, Store, WeeklyHours};

/// A row from the `stores` table. `services` and `hours` live in JSONB columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub review_count: i32,
    pub is_active: bool,
    pub capacity: i32,
    pub current_queue: i32,
    pub base_wait_minutes: i32,
    pub services: Json<Vec<ServiceOffering>>,
    pub hours: Json<WeeklyHours>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            zip: row.zip,
            phone: row.phone,
            latitude: row.latitude,
            longitude: row.longitude,
            rating: row.rating,
            review_count: row.review_count,
            is_active: row.is_active,
            capacity: row.capacity,
            current_queue: row.current_queue,
            base_wait_minutes: row.base_wait_minutes,
            services: row.services.0,
            hours: row.hours.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

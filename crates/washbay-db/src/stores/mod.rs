//! Database operations for the `stores` table.

mod read;
mod types;
mod write;

pub use read::{find_nearby_stores, get_store, list_stores};
pub use types::StoreRow;
pub use write::{deactivate_store, insert_store, update_store, upsert_seed_stores};

/// Column list shared by every query that reads back a full [`StoreRow`].
///
/// The generated `location` column is never selected; callers only see the
/// scalar coordinates.
const STORE_COLUMNS: &str = "id, name, address, city, state, zip, phone, \
     latitude, longitude, rating, review_count, is_active, \
     capacity, current_queue, base_wait_minutes, services, hours, \
     created_at, updated_at";

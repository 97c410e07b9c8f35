//! Live integration tests for washbay-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The server behind `DATABASE_URL` must have the PostGIS
//! extension available. Run with:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -p washbay-db --test live -- --ignored
//! ```

use uuid::Uuid;
use washbay_core::{
    Coordinates, NewStore, ProximityQuery, RepositoryError, StoreListQuery, StorePatch,
    StoreRepository,
};
use washbay_db::{
    deactivate_store, find_nearby_stores, get_store, insert_store, update_store,
    upsert_seed_stores, DbError, PgStoreRepository,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_store(name: &str, latitude: f64, longitude: f64) -> NewStore {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "address": format!("{name} Street"),
        "city": "New York",
        "state": "NY",
        "phone": "555-0100",
        "latitude": latitude,
        "longitude": longitude,
        "rating": 4.5,
        "capacity": 3,
        "services": [{ "name": "Express Wash", "price": 12.0, "durationMinutes": 10 }],
        "hours": { "monday": { "open": "08:00", "close": "20:00" } }
    }))
    .expect("valid new store")
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

// ---------------------------------------------------------------------------
// Section 1: Proximity query
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres with PostGIS"]
async fn nearby_returns_active_stores_nearest_first(pool: sqlx::PgPool) {
    insert_store(&pool, &new_store("Two Km", 40.7308, -74.0060))
        .await
        .expect("insert two km");
    insert_store(&pool, &new_store("One Km", 40.7218, -74.0060))
        .await
        .expect("insert one km");
    insert_store(&pool, &new_store("Los Angeles", 34.0522, -118.2437))
        .await
        .expect("insert far");
    let closed = insert_store(&pool, &new_store("Closed", 40.7130, -74.0060))
        .await
        .expect("insert closed");
    deactivate_store(&pool, closed.id)
        .await
        .expect("deactivate closed");

    let rows = find_nearby_stores(&pool, &nyc_query(5000.0))
        .await
        .expect("find_nearby_stores failed");

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["One Km", "Two Km"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres with PostGIS"]
async fn nearby_applies_rating_floor_and_paging(pool: sqlx::PgPool) {
    let mut low = new_store("Low Rated", 40.7129, -74.0060);
    low.rating = 2.0;
    insert_store(&pool, &low).await.expect("insert low");
    for (i, lat) in [40.7140, 40.7150, 40.7160].iter().enumerate() {
        insert_store(&pool, &new_store(&format!("Good {i}"), *lat, -74.0060))
            .await
            .expect("insert good");
    }

    let mut query = nyc_query(5000.0);
    query.min_rating = 4.0;
    query.skip = 1;
    query.limit = 1;
    let rows = find_nearby_stores(&pool, &query)
        .await
        .expect("find_nearby_stores failed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Good 1");
}

// ---------------------------------------------------------------------------
// Section 2: Admin writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres with PostGIS"]
async fn insert_round_trips_jsonb_columns(pool: sqlx::PgPool) {
    let created = insert_store(&pool, &new_store("Round Trip", 40.7, -74.0))
        .await
        .expect("insert_store failed");
    let fetched = get_store(&pool, created.id)
        .await
        .expect("get_store failed");

    assert_eq!(fetched.services.0.len(), 1);
    assert_eq!(fetched.services.0[0].duration_minutes, 10);
    assert_eq!(
        fetched.hours.0.monday.as_ref().map(|h| h.open.as_str()),
        Some("08:00")
    );
    assert!(fetched.is_active);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres with PostGIS"]
async fn duplicate_name_and_address_is_rejected(pool: sqlx::PgPool) {
    insert_store(&pool, &new_store("Twin", 40.7, -74.0))
        .await
        .expect("first insert");
    let err = insert_store(&pool, &new_store("Twin", 40.8, -74.1))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Duplicate(_)), "got: {err:?}");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres with PostGIS"]
async fn patch_keeps_absent_fields_and_clears_explicit_nulls(pool: sqlx::PgPool) {
    let created = insert_store(&pool, &new_store("Patch Me", 40.7, -74.0))
        .await
        .expect("insert");

    let patch: StorePatch = serde_json::from_value(serde_json::json!({
        "phone": null,
        "currentQueue": 3,
        "latitude": 40.71,
        "longitude": -74.01
    }))
    .expect("valid patch");
    let updated = update_store(&pool, created.id, &patch)
        .await
        .expect("update_store failed");

    assert!(updated.phone.is_none());
    assert_eq!(updated.state.as_deref(), Some("NY"));
    assert_eq!(updated.current_queue, 3);
    assert!((updated.latitude - 40.71).abs() < 1e-9);
    assert!(updated.updated_at >= created.updated_at);

    // The generated geography column follows the scalar coordinates.
    let rows = find_nearby_stores(
        &pool,
        &ProximityQuery {
            origin: Coordinates {
                latitude: 40.71,
                longitude: -74.01,
            },
            radius_m: 10.0,
            min_rating: 0.0,
            limit: 5,
            skip: 0,
        },
    )
    .await
    .expect("find_nearby_stores failed");
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres with PostGIS"]
async fn unknown_ids_are_not_found(pool: sqlx::PgPool) {
    let id = Uuid::new_v4();
    assert!(matches!(get_store(&pool, id).await, Err(DbError::NotFound)));
    assert!(matches!(
        update_store(&pool, id, &StorePatch::default()).await,
        Err(DbError::NotFound)
    ));
    assert!(matches!(
        deactivate_store(&pool, id).await,
        Err(DbError::NotFound)
    ));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres with PostGIS"]
async fn seed_upsert_is_idempotent(pool: sqlx::PgPool) {
    let stores = vec![
        new_store("Seed A", 40.70, -74.00),
        new_store("Seed B", 40.71, -74.00),
    ];

    let first = upsert_seed_stores(&pool, &stores)
        .await
        .expect("first seed");
    assert_eq!(first, (2, 0));

    let second = upsert_seed_stores(&pool, &stores)
        .await
        .expect("second seed");
    assert_eq!(second, (0, 2));
}

// ---------------------------------------------------------------------------
// Section 3: Repository port
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres with PostGIS"]
async fn repository_maps_errors_onto_port_variants(pool: sqlx::PgPool) {
    let repo = PgStoreRepository::new(pool);
    repo.health_check().await.expect("health check");

    repo.insert(&new_store("Port", 40.7, -74.0))
        .await
        .expect("insert");
    assert!(matches!(
        repo.insert(&new_store("Port", 40.7, -74.0)).await,
        Err(RepositoryError::Conflict(_))
    ));
    assert!(matches!(
        repo.get(Uuid::new_v4()).await,
        Err(RepositoryError::NotFound)
    ));

    let listed = repo
        .list(&StoreListQuery {
            limit: 10,
            skip: 0,
            include_inactive: false,
        })
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
}

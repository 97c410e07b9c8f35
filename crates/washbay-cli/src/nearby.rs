use washbay_core::search::MAX_LIMIT;
use washbay_core::{AppConfig, Coordinates, NearbyStore, SearchCriteria, SystemClock};
use washbay_db::PgStoreRepository;

use crate::NearbyArgs;

pub(crate) fn criteria_from_args(args: NearbyArgs) -> anyhow::Result<SearchCriteria> {
    let origin = Coordinates::new(args.latitude, args.longitude)?;
    let mut criteria = SearchCriteria::near(origin);
    criteria.max_distance_m = args.max_distance_m;
    criteria.min_rating = args.min_rating;
    criteria.limit = args.limit.clamp(1, MAX_LIMIT);
    criteria.open_now = args.open_now;
    criteria.available_bays_only = args.available_only;
    criteria.services = args.services;
    criteria.validate()?;
    Ok(criteria)
}

/// Run the search pipeline against the configured database and print a table.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the store query fails.
pub(crate) async fn run_nearby(config: &AppConfig, args: NearbyArgs) -> anyhow::Result<()> {
    let criteria = criteria_from_args(args)?;
    let pool = crate::db::connect(config).await?;
    let repo = PgStoreRepository::new(pool.clone());

    let result =
        washbay_core::search_stores(&repo, &SystemClock, &criteria, &config.search_settings())
            .await;
    pool.close().await;
    let envelope = result?;

    if envelope.data.is_empty() {
        println!(
            "no stores within {} m of ({}, {})",
            criteria.max_distance_m, criteria.origin.latitude, criteria.origin.longitude
        );
        return Ok(());
    }

    println!("{}", format_header());
    for hit in &envelope.data {
        println!("{}", format_row(hit));
    }
    Ok(())
}

fn format_header() -> String {
    format!(
        "{:<32}{:>9}{:>7}{:>6}{:>8}  CITY",
        "NAME", "DIST KM", "ETA", "BAYS", "RATING"
    )
}

fn format_row(hit: &NearbyStore) -> String {
    let name = if hit.store.name.chars().count() > 30 {
        format!("{}...", hit.store.name.chars().take(27).collect::<String>())
    } else {
        hit.store.name.clone()
    };
    let eta = format!("{}m", hit.estimated_time);
    format!(
        "{:<32}{:>9.2}{:>7}{:>6}{:>8.1}  {}",
        name,
        hit.distance,
        eta,
        hit.available_bays,
        hit.store.rating,
        hit.store.city
    )
}

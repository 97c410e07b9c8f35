//! Nearby-store search: proximity query, in-memory filters, ranking by
//! distance, and response assembly.

mod assemble;
pub mod filter;
pub mod rank;

use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::{RepositoryError, SearchError, ValidationError};
use crate::geo::{Coordinates, EtaModel};
use crate::ports::{ProximityQuery, StoreRepository};
use crate::stores::{Store, MAX_RATING};

pub use assemble::{assemble, NearbyStore, SearchEnvelope};
pub use filter::{FilterChain, StoreFilter};

pub const DEFAULT_RADIUS_M: f64 = 5000.0;
pub const DEFAULT_NEARBY_LIMIT: u32 = 20;
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 100;

/// How the price filter treats stores offering several services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceMatch {
    /// Keep the store if any service is priced within range.
    #[default]
    Any,
    /// Keep the store only if every service is priced within range.
    All,
}

impl FromStr for PriceMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            other => Err(format!("expected 'any' or 'all', got '{other}'")),
        }
    }
}

/// Process-wide knobs for the search pipeline, built once from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub eta: EtaModel,
    pub price_match: PriceMatch,
    pub store_query_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            eta: EtaModel::default(),
            price_match: PriceMatch::Any,
            store_query_timeout: Duration::from_secs(5),
        }
    }
}

/// Validated, request-scoped search input.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub origin: Coordinates,
    pub max_distance_m: f64,
    pub min_rating: f64,
    pub max_rating: Option<f64>,
    pub available_bays_only: bool,
    pub open_now: bool,
    /// Case-insensitive substrings matched against service names.
    pub services: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub limit: u32,
    pub skip: u32,
}

impl SearchCriteria {
    /// Criteria with every optional filter off and the nearby defaults.
    #[must_use]
    pub fn near(origin: Coordinates) -> Self {
        Self {
            origin,
            max_distance_m: DEFAULT_RADIUS_M,
            min_rating: 0.0,
            max_rating: None,
            available_bays_only: false,
            open_now: false,
            services: Vec::new(),
            price_min: None,
            price_max: None,
            limit: DEFAULT_NEARBY_LIMIT,
            skip: 0,
        }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError`] for out-of-range numeric inputs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Coordinates::new(self.origin.latitude, self.origin.longitude)?;
        if !self.max_distance_m.is_finite() || self.max_distance_m <= 0.0 {
            return Err(ValidationError::new("maxDistance must be a positive number"));
        }
        if !self.min_rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.min_rating) {
            return Err(ValidationError::new("minRating must be between 0 and 5"));
        }
        if let Some(max) = self.max_rating {
            if !max.is_finite() || max < self.min_rating || max > MAX_RATING {
                return Err(ValidationError::new(
                    "maxRating must be between minRating and 5",
                ));
            }
        }
        for (field, bound) in [("priceMin", self.price_min), ("priceMax", self.price_max)] {
            if bound.is_some_and(|p| !p.is_finite() || p < 0.0) {
                return Err(ValidationError::new(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(ValidationError::new("priceMin must not exceed priceMax"));
            }
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(ValidationError::new(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(())
    }

    fn proximity_query(&self) -> ProximityQuery {
        ProximityQuery {
            origin: self.origin,
            radius_m: self.max_distance_m,
            min_rating: self.min_rating,
            limit: self.limit,
            skip: self.skip,
        }
    }
}

/// A fetched store annotated with its distance from the search origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub store: Store,
    pub distance_km: f64,
}

impl Candidate {
    #[must_use]
    pub fn new(store: Store, origin: Coordinates) -> Self {
        let distance_km = origin.distance_km(&store.coordinates());
        Self { store, distance_km }
    }
}

/// Run the full pipeline: fetch, annotate, filter, rank, assemble.
///
/// Either the complete ranked list is returned or an error; there are no
/// partial results and no retries.
///
/// # Errors
///
/// [`SearchError::Validation`] before any store work for bad criteria,
/// [`SearchError::Upstream`] when the store query fails or times out.
pub async fn search_stores(
    repo: &dyn StoreRepository,
    clock: &dyn Clock,
    criteria: &SearchCriteria,
    settings: &SearchSettings,
) -> Result<SearchEnvelope, SearchError> {
    criteria.validate()?;

    let started = Instant::now();
    let stores = fetch_candidates(repo, &criteria.proximity_query(), settings.store_query_timeout)
        .await?;
    let fetched = stores.len();

    let candidates: Vec<Candidate> = stores
        .into_iter()
        .map(|store| Candidate::new(store, criteria.origin))
        .collect();

    let chain = FilterChain::from_criteria(criteria, settings.price_match, clock.now_local());
    let mut kept = chain.apply(candidates);
    rank::sort_by_distance(&mut kept);

    let envelope = SearchEnvelope::ok(assemble(kept, &settings.eta));
    tracing::debug!(
        fetched,
        returned = envelope.count,
        filters = chain.len(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "store search complete"
    );
    Ok(envelope)
}

async fn fetch_candidates(
    repo: &dyn StoreRepository,
    query: &ProximityQuery,
    timeout: Duration,
) -> Result<Vec<Store>, RepositoryError> {
    match tokio::time::timeout(timeout, repo.find_nearby(query)).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::Timeout(timeout)),
    }
}

//! In-memory filters applied after the proximity query.
//!
//! Every active filter must accept a candidate for it to survive (logical AND).
//! Filters only ever remove candidates and never reorder them.

use chrono::{Datelike, NaiveDateTime, Weekday};

use super::{Candidate, PriceMatch, SearchCriteria};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreFilter {
    /// Distance from the origin, in kilometres, must not exceed this.
    MaxDistance(f64),
    MinRating(f64),
    MaxRating(f64),
    /// At least one free bay.
    AvailableBays,
    /// Any service name contains any of these lowercase substrings.
    ServiceNames(Vec<String>),
    PriceRange {
        min: Option<f64>,
        max: Option<f64>,
        policy: PriceMatch,
    },
    /// Open on `weekday` at `time` (`HH:MM`). Stores without hours for that
    /// day are rejected.
    OpenAt { weekday: Weekday, time: String },
}

impl StoreFilter {
    #[must_use]
    pub fn accepts(&self, candidate: &Candidate) -> bool {
        let store = &candidate.store;
        match self {
            Self::MaxDistance(km) => candidate.distance_km <= *km,
            Self::MinRating(floor) => store.rating >= *floor,
            Self::MaxRating(ceiling) => store.rating <= *ceiling,
            Self::AvailableBays => store.available_bays() > 0,
            Self::ServiceNames(wanted) => store.services.iter().any(|service| {
                let name = service.name.to_lowercase();
                wanted.iter().any(|w| name.contains(w.as_str()))
            }),
            Self::PriceRange { min, max, policy } => {
                if store.services.is_empty() {
                    return false;
                }
                let in_range = |price: f64| {
                    min.is_none_or(|lo| price >= lo) && max.is_none_or(|hi| price <= hi)
                };
                match policy {
                    PriceMatch::Any => store.services.iter().any(|s| in_range(s.price)),
                    PriceMatch::All => store.services.iter().all(|s| in_range(s.price)),
                }
            }
            Self::OpenAt { weekday, time } => store
                .hours
                .for_weekday(*weekday)
                .is_some_and(|hours| hours.is_open_at(time)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    filters: Vec<StoreFilter>,
}

impl FilterChain {
    #[must_use]
    pub fn new(filters: Vec<StoreFilter>) -> Self {
        Self { filters }
    }

    /// Build the chain for a search. `now` is only consulted for open-now.
    #[must_use]
    pub fn from_criteria(
        criteria: &SearchCriteria,
        price_match: PriceMatch,
        now: NaiveDateTime,
    ) -> Self {
        let mut filters = vec![
            StoreFilter::MaxDistance(criteria.max_distance_m / 1000.0),
            StoreFilter::MinRating(criteria.min_rating),
        ];

        if let Some(ceiling) = criteria.max_rating {
            filters.push(StoreFilter::MaxRating(ceiling));
        }
        if criteria.available_bays_only {
            filters.push(StoreFilter::AvailableBays);
        }

        let wanted: Vec<String> = criteria
            .services
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !wanted.is_empty() {
            filters.push(StoreFilter::ServiceNames(wanted));
        }

        if criteria.price_min.is_some() || criteria.price_max.is_some() {
            filters.push(StoreFilter::PriceRange {
                min: criteria.price_min,
                max: criteria.price_max,
                policy: price_match,
            });
        }
        if criteria.open_now {
            filters.push(StoreFilter::OpenAt {
                weekday: now.weekday(),
                time: now.format("%H:%M").to_string(),
            });
        }

        Self { filters }
    }

    #[must_use]
    pub fn accepts(&self, candidate: &Candidate) -> bool {
        self.filters.iter().all(|f| f.accepts(candidate))
    }

    /// Keep the candidates every filter accepts, preserving input order.
    #[must_use]
    pub fn apply(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.retain(|c| self.accepts(c));
        candidates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    #[must_use]
    pub fn filters(&self) -> &[StoreFilter] {
        &self.filters
    }
}

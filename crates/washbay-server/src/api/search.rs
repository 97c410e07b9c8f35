//! Public store search handlers: the query-string nearby lookup and the
//! JSON-body search with the full filter set.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use washbay_core::search::{DEFAULT_NEARBY_LIMIT, DEFAULT_RADIUS_M, DEFAULT_SEARCH_LIMIT, MAX_LIMIT};
use washbay_core::{Coordinates, SearchCriteria, SearchEnvelope, SearchError};

use crate::middleware::RequestId;

use super::{map_repository_error, reject_query, ApiError, AppState};

/// Raw query parameters. Kept as strings so malformed numbers surface as the
/// domain's own 400 messages instead of a generic extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NearbyParams {
    latitude: Option<String>,
    longitude: Option<String>,
    /// Metres.
    max_distance: Option<String>,
    min_rating: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchRequest {
    latitude: Option<f64>,
    longitude: Option<f64>,
    /// Kilometres.
    max_distance: Option<f64>,
    min_rating: Option<f64>,
    max_rating: Option<f64>,
    #[serde(default)]
    available_bays_only: bool,
    #[serde(default)]
    open_now: bool,
    #[serde(default)]
    services: Vec<String>,
    price_min: Option<f64>,
    price_max: Option<f64>,
    limit: Option<u32>,
    skip: Option<u32>,
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

fn parse_number(field: &str, raw: Option<&str>) -> Result<Option<f64>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ApiError::validation(format!("{field} must be a number"))),
    }
}

impl NearbyParams {
    fn into_criteria(self) -> Result<SearchCriteria, ApiError> {
        let origin = Coordinates::parse(self.latitude.as_deref(), self.longitude.as_deref())
            .map_err(|e| ApiError::validation(e.to_string()))?;

        let mut criteria = SearchCriteria::near(origin);
        criteria.max_distance_m =
            parse_number("maxDistance", self.max_distance.as_deref())?.unwrap_or(DEFAULT_RADIUS_M);
        criteria.min_rating = parse_number("minRating", self.min_rating.as_deref())?.unwrap_or(0.0);

        let limit = match self.limit.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => DEFAULT_NEARBY_LIMIT,
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| ApiError::validation("limit must be a positive integer"))?,
        };
        criteria.limit = clamp_limit(limit);
        Ok(criteria)
    }
}

impl SearchRequest {
    fn into_criteria(self) -> Result<SearchCriteria, ApiError> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(ApiError::validation("Invalid latitude or longitude"));
        };
        let origin =
            Coordinates::new(latitude, longitude).map_err(|e| ApiError::validation(e.to_string()))?;

        let mut criteria = SearchCriteria::near(origin);
        criteria.max_distance_m = self
            .max_distance
            .map_or(DEFAULT_RADIUS_M, |km| km * 1000.0);
        criteria.min_rating = self.min_rating.unwrap_or(0.0);
        criteria.max_rating = self.max_rating;
        criteria.available_bays_only = self.available_bays_only;
        criteria.open_now = self.open_now;
        criteria.services = self.services;
        criteria.price_min = self.price_min;
        criteria.price_max = self.price_max;
        criteria.limit = clamp_limit(self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT));
        criteria.skip = self.skip.unwrap_or(0);
        Ok(criteria)
    }
}

async fn run_search(
    state: &AppState,
    req_id: &RequestId,
    criteria: &SearchCriteria,
) -> Result<Json<SearchEnvelope>, ApiError> {
    match washbay_core::search_stores(
        state.stores.as_ref(),
        state.clock.as_ref(),
        criteria,
        &state.search,
    )
    .await
    {
        Ok(envelope) => {
            tracing::info!(
                request_id = %req_id.0,
                count = envelope.count,
                "store search served"
            );
            Ok(Json(envelope))
        }
        Err(SearchError::Validation(e)) => Err(ApiError::validation(e.to_string())),
        Err(SearchError::Upstream(e)) => Err(map_repository_error(req_id, e)),
    }
}

/// GET /api/v1/stores/nearby — `maxDistance` is in metres.
pub(super) async fn nearby_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<SearchEnvelope>, ApiError> {
    let Query(params) = params.map_err(|e| reject_query(&req_id, &e))?;
    let criteria = params.into_criteria()?;
    run_search(&state, &req_id, &criteria).await
}

/// POST /api/v1/stores/search — `maxDistance` is in kilometres.
pub(super) async fn search_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchEnvelope>, ApiError> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!(request_id = %req_id.0, error = %e, "rejected search body");
        ApiError::new("bad_request", format!("Malformed request body: {}", e.body_text()))
    })?;
    let criteria = body.into_criteria()?;
    run_search(&state, &req_id, &criteria).await
}

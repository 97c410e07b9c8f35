mod search;
mod stores;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::QueryRejection, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use washbay_core::{Clock, RepositoryError, SearchSettings, StoreRepository};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<dyn StoreRepository>,
    pub clock: Arc<dyn Clock>,
    pub search: SearchSettings,
}

/// Success envelope for single records.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Success envelope for collections.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn ok(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Error envelope: `{ "success": false, "error": "<message>" }`.
///
/// `code` selects the HTTP status and never leaves the process.
#[derive(Debug)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    pub fn internal() -> Self {
        Self::new("internal_error", "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            success: false,
            error: self.message,
        };
        (status, Json(body)).into_response()
    }
}

/// Translate a repository failure. Backend detail is logged, never returned.
pub(super) fn map_repository_error(req_id: &RequestId, error: RepositoryError) -> ApiError {
    match error {
        RepositoryError::NotFound => ApiError::new("not_found", "Store not found"),
        RepositoryError::Conflict(detail) => ApiError::new(
            "conflict",
            format!("a store with that name and address already exists: {detail}"),
        ),
        other => {
            tracing::error!(request_id = %req_id.0, error = %other, "store repository failed");
            ApiError::internal()
        }
    }
}

/// Turn a query-string extractor rejection into the JSON error envelope.
pub(super) fn reject_query(req_id: &RequestId, rejection: &QueryRejection) -> ApiError {
    tracing::debug!(request_id = %req_id.0, error = %rejection, "rejected query string");
    ApiError::new(
        "bad_request",
        format!("Malformed query string: {}", rejection.body_text()),
    )
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn admin_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/stores",
            get(stores::list_stores).post(stores::create_store),
        )
        .route(
            "/api/v1/stores/{id}",
            get(stores::get_store)
                .patch(stores::update_store)
                .delete(stores::deactivate_store),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/stores/nearby", get(search::nearby_stores))
        .route("/api/v1/stores/search", post(search::search_stores));

    Router::new()
        .merge(public_routes)
        .merge(admin_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.stores.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(request_id = %req_id.0, error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

#[must_use]
pub fn rate_limit_state(per_minute: usize) -> RateLimitState {
    RateLimitState::new(per_minute, Duration::from_secs(60))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use chrono::{NaiveDate, NaiveDateTime};
    use tower::ServiceExt;
    use washbay_core::{FixedClock, NewStore, SearchSettings};
    use washbay_db::MemoryStoreRepository;

    use super::{build_app, rate_limit_state, AppState};
    use crate::middleware::AuthState;

    pub const API_KEY: &str = "test-key";

    /// Monday 2026-10-19 at 10:30 local time.
    pub fn monday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .expect("valid timestamp")
    }

    pub fn new_store(name: &str, latitude: f64, longitude: f64) -> NewStore {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "address": format!("{name} Plaza"),
            "city": "New York",
            "state": "NY",
            "latitude": latitude,
            "longitude": longitude,
            "rating": 4.5,
            "capacity": 4,
            "currentQueue": 1,
            "services": [{ "name": "Express Wash", "price": 12.0, "durationMinutes": 10 }],
            "hours": { "monday": { "open": "08:00", "close": "20:00" } }
        }))
        .expect("valid store")
    }

    pub fn app_with(repo: MemoryStoreRepository) -> Router {
        let state = AppState {
            stores: std::sync::Arc::new(repo),
            clock: std::sync::Arc::new(FixedClock(monday_morning())),
            search: SearchSettings::default(),
        };
        let auth = AuthState::from_keys(API_KEY, false).expect("auth");
        build_app(state, auth, rate_limit_state(1_000))
    }

    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("json parse")
        };
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{app_with, send};
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use washbay_db::MemoryStoreRepository;

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::validation("invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn repository_errors_map_to_statuses() {
        let rid = RequestId("req-1".to_string());
        let cases = [
            (RepositoryError::NotFound, StatusCode::NOT_FOUND),
            (
                RepositoryError::Conflict("dup".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                RepositoryError::Backend("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RepositoryError::Timeout(Duration::from_secs(5)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            let response = map_repository_error(&rid, error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn health_reports_ok_and_echoes_request_id() {
        let app = app_with(MemoryStoreRepository::new());
        let response = tower::ServiceExt::oneshot(
            app,
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("abc-123")
        );
    }

    #[tokio::test]
    async fn health_body_has_status_and_database() {
        let app = app_with(MemoryStoreRepository::new());
        let (status, json) = send(
            app,
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], "ok");
    }
}

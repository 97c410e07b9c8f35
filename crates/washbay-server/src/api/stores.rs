//! Admin store handlers: list, fetch, create, patch, deactivate.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use washbay_core::search::MAX_LIMIT;
use washbay_core::{NewStore, Store, StoreListQuery, StorePatch};

use crate::middleware::RequestId;

use super::{
    map_repository_error, reject_query, ApiError, ApiResponse, AppState, ListResponse,
};

const DEFAULT_LIST_LIMIT: u32 = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListParams {
    limit: Option<u32>,
    skip: Option<u32>,
    #[serde(default)]
    include_inactive: bool,
}

fn parse_store_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation(format!("invalid store id '{raw}'")))
}

fn reject_body(req_id: &RequestId, rejection: &JsonRejection) -> ApiError {
    tracing::debug!(request_id = %req_id.0, error = %rejection, "rejected store body");
    ApiError::new(
        "bad_request",
        format!("Malformed request body: {}", rejection.body_text()),
    )
}

/// GET /api/v1/stores — stores ordered by name.
pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse<Store>>, ApiError> {
    let Query(params) = params.map_err(|e| reject_query(&req_id, &e))?;
    let query = StoreListQuery {
        limit: params.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIMIT),
        skip: params.skip.unwrap_or(0),
        include_inactive: params.include_inactive,
    };

    let stores = state
        .stores
        .list(&query)
        .await
        .map_err(|e| map_repository_error(&req_id, e))?;
    Ok(Json(ListResponse::ok(stores)))
}

/// GET /api/v1/stores/{id} — one store, active or not.
pub(super) async fn get_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Store>>, ApiError> {
    let id = parse_store_id(&id)?;
    let store = state
        .stores
        .get(id)
        .await
        .map_err(|e| map_repository_error(&req_id, e))?;
    Ok(Json(ApiResponse::ok(store)))
}

/// POST /api/v1/stores — create a store.
pub(super) async fn create_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<NewStore>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Store>>), ApiError> {
    let Json(body) = payload.map_err(|e| reject_body(&req_id, &e))?;
    body.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let store = state
        .stores
        .insert(&body)
        .await
        .map_err(|e| map_repository_error(&req_id, e))?;
    tracing::info!(request_id = %req_id.0, store_id = %store.id, name = %store.name, "store created");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(store))))
}

/// PATCH /api/v1/stores/{id} — sparse update; absent fields are kept.
pub(super) async fn update_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    payload: Result<Json<StorePatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Store>>, ApiError> {
    let id = parse_store_id(&id)?;
    let Json(patch) = payload.map_err(|e| reject_body(&req_id, &e))?;
    if patch.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }
    patch
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let store = state
        .stores
        .update(id, &patch)
        .await
        .map_err(|e| map_repository_error(&req_id, e))?;
    tracing::info!(request_id = %req_id.0, store_id = %store.id, "store updated");
    Ok(Json(ApiResponse::ok(store)))
}

/// DELETE /api/v1/stores/{id} — soft delete.
pub(super) async fn deactivate_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let id = parse_store_id(&id)?;
    state
        .stores
        .deactivate(id)
        .await
        .map_err(|e| map_repository_error(&req_id, e))?;
    tracing::info!(request_id = %req_id.0, store_id = %id, "store deactivated");
    Ok(Json(ApiResponse::ok(
        serde_json::json!({ "id": id, "deactivated": true }),
    )))
}

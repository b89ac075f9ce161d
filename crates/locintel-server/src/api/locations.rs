//! Location handlers: register, fetch, scores, listing profile.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use locintel_core::{ComponentScores, ProfileSnapshot};
use locintel_engine::{ListingOutcome, LocationView, RegisterLocation, ScoreOutcome};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_engine_error, ApiError, ApiResponse, AppState};

/// POST /api/v1/locations
pub(super) async fn register_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RegisterLocation>,
) -> Result<(StatusCode, Json<ApiResponse<LocationView>>), ApiError> {
    let view = locintel_engine::register_location(&state.ctx, body)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok((StatusCode::CREATED, ApiResponse::new(view, &req_id)))
}

/// GET /api/v1/locations/{id}
pub(super) async fn get_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LocationView>>, ApiError> {
    let view = locintel_engine::get_location(&state.ctx, id)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(view, &req_id))
}

/// PUT /api/v1/locations/{id}/scores
pub(super) async fn update_scores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<ComponentScores>,
) -> Result<Json<ApiResponse<ScoreOutcome>>, ApiError> {
    let outcome = locintel_engine::update_scores(&state.ctx, id, &body)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(outcome, &req_id))
}

/// PUT /api/v1/locations/{id}/listing
pub(super) async fn update_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProfileSnapshot>,
) -> Result<Json<ApiResponse<ListingOutcome>>, ApiError> {
    let outcome = locintel_engine::update_listing_profile(&state.ctx, id, &body)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(outcome, &req_id))
}

//! Keyword tracking and rank handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use locintel_engine::{KeywordRankInput, KeywordRankResult, KeywordView};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_engine_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct TrackKeywordRequest {
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SetTrackingRequest {
    pub keyword: String,
    pub is_tracking: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateRanksRequest {
    pub rankings: Vec<KeywordRankInput>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrackingData {
    pub keyword: String,
    pub is_tracking: bool,
}

/// GET /api/v1/locations/{id}/keywords
pub(super) async fn list_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<KeywordView>>>, ApiError> {
    let keywords = locintel_engine::list_keywords(&state.ctx, id)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(keywords, &req_id))
}

/// POST /api/v1/locations/{id}/keywords
pub(super) async fn track_keyword(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<TrackKeywordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<KeywordView>>), ApiError> {
    let keyword = locintel_engine::track_keyword(&state.ctx, id, &body.keyword)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok((StatusCode::CREATED, ApiResponse::new(keyword, &req_id)))
}

/// PUT /api/v1/locations/{id}/keywords/tracking
pub(super) async fn set_tracking(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetTrackingRequest>,
) -> Result<Json<ApiResponse<TrackingData>>, ApiError> {
    locintel_engine::set_keyword_tracking(&state.ctx, id, &body.keyword, body.is_tracking)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(
        TrackingData {
            keyword: body.keyword.trim().to_string(),
            is_tracking: body.is_tracking,
        },
        &req_id,
    ))
}

/// PUT /api/v1/locations/{id}/keywords/ranks
pub(super) async fn update_ranks(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRanksRequest>,
) -> Result<Json<ApiResponse<Vec<KeywordRankResult>>>, ApiError> {
    let results = locintel_engine::update_keyword_ranks(&state.ctx, id, &body.rankings)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(results, &req_id))
}

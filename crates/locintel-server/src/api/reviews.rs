//! Review ingestion, upstream sync, and response handlers.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use locintel_core::IncomingReview;
use locintel_engine::{IngestOutcome, ReviewView, SyncOutcome};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_engine_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ReviewsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct IngestReviewsRequest {
    pub platform: String,
    pub reviews: Vec<IncomingReview>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponseRequest {
    pub response_text: String,
}

/// GET /api/v1/locations/{id}/reviews
pub(super) async fn list_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewView>>>, ApiError> {
    let reviews = locintel_engine::list_reviews(&state.ctx, id, normalize_limit(query.limit))
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(reviews, &req_id))
}

/// POST /api/v1/locations/{id}/reviews
pub(super) async fn ingest_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<IngestReviewsRequest>,
) -> Result<Json<ApiResponse<IngestOutcome>>, ApiError> {
    let outcome = locintel_engine::ingest_reviews(&state.ctx, id, &body.platform, &body.reviews)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(outcome, &req_id))
}

/// POST /api/v1/locations/{id}/reviews/sync
pub(super) async fn sync_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SyncOutcome>>, ApiError> {
    let Some(source) = state.source.as_deref() else {
        return Err(ApiError::new(
            req_id.0,
            "upstream_unavailable",
            "no listing source is configured",
        ));
    };
    let outcome = locintel_engine::sync_location_listing(&state.ctx, source, id)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(outcome, &req_id))
}

/// POST /api/v1/reviews/{review_id}/response
pub(super) async fn record_response(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(review_id): Path<Uuid>,
    Json(body): Json<ResponseRequest>,
) -> Result<Json<ApiResponse<ReviewView>>, ApiError> {
    let review = locintel_engine::record_review_response(&state.ctx, review_id, &body.response_text)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok(ApiResponse::new(review, &req_id))
}

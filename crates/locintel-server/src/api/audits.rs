//! Audit snapshot handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use locintel_core::AuditType;
use locintel_engine::{AuditRequest, AuditSnapshot};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_engine_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AuditsQuery {
    pub limit: Option<i64>,
    /// `owner` hides agency-only fields.
    pub view: Option<String>,
}

/// GET /api/v1/locations/{id}/audits
pub(super) async fn list_audits(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Query(query): Query<AuditsQuery>,
) -> Result<Json<ApiResponse<Vec<AuditSnapshot>>>, ApiError> {
    let owner_view = match query.view.as_deref() {
        None | Some("agency") => false,
        Some("owner") => true,
        Some(other) => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                format!("view must be 'agency' or 'owner', got '{other}'"),
            ))
        }
    };

    let snapshots =
        locintel_engine::list_audit_snapshots(&state.ctx, id, normalize_limit(query.limit))
            .await
            .map_err(|e| map_engine_error(&req_id, e))?;
    let snapshots = if owner_view {
        snapshots
            .into_iter()
            .map(AuditSnapshot::for_business_owner)
            .collect()
    } else {
        snapshots
    };
    Ok(ApiResponse::new(snapshots, &req_id))
}

/// POST /api/v1/locations/{id}/audits
pub(super) async fn run_audit(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<AuditRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuditSnapshot>>), ApiError> {
    let snapshot = locintel_engine::run_full_audit(&state.ctx, id, AuditType::OnDemand, &body)
        .await
        .map_err(|e| map_engine_error(&req_id, e))?;
    Ok((StatusCode::CREATED, ApiResponse::new(snapshot, &req_id)))
}

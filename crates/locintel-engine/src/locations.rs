//! Location registration and read views.

use chrono::{DateTime, Utc};
use locintel_core::ComponentScores;
use locintel_db::{decimal_to_f64, LocationRow, NewLocation, ReviewStatsRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineContext, EngineError};

/// Input for [`register_location`].
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterLocation {
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub business_name: String,
    #[serde(default)]
    pub google_place_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStatsView {
    pub platform: String,
    pub total_reviews: i32,
    pub responded_count: i32,
    pub response_rate: f64,
    pub computed_at: DateTime<Utc>,
}

impl From<ReviewStatsRow> for ReviewStatsView {
    fn from(row: ReviewStatsRow) -> Self {
        Self {
            platform: row.platform,
            total_reviews: row.total_reviews,
            responded_count: row.responded_count,
            response_rate: decimal_to_f64(row.response_rate),
            computed_at: row.computed_at,
        }
    }
}

/// Public view of a location and its latest derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub id: Uuid,
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub business_name: String,
    pub google_place_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub scores: ComponentScores,
    pub local_seo_score: Option<f64>,
    pub google_rating: Option<f64>,
    pub google_review_count: i32,
    pub listing_completeness: Option<i16>,
    pub seo_data_last_updated: Option<DateTime<Utc>>,
    pub gbp_data_last_updated: Option<DateTime<Utc>>,
    pub review_stats: Vec<ReviewStatsView>,
}

impl LocationView {
    fn from_row(row: &LocationRow, stats: Vec<ReviewStatsRow>) -> Self {
        Self {
            id: row.public_id,
            client_id: row.client_id,
            agency_id: row.agency_id,
            business_name: row.business_name.clone(),
            google_place_id: row.google_place_id.clone(),
            address: row.address.clone(),
            phone: row.phone.clone(),
            website: row.website.clone(),
            scores: row.component_scores(),
            local_seo_score: row.overall_score(),
            google_rating: row.google_rating.map(decimal_to_f64),
            google_review_count: row.google_review_count,
            listing_completeness: row.listing_completeness,
            seo_data_last_updated: row.seo_data_last_updated,
            gbp_data_last_updated: row.gbp_data_last_updated,
            review_stats: stats.into_iter().map(ReviewStatsView::from).collect(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Register a new location.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] for a blank business name and
/// [`EngineError::Storage`] if the insert fails.
pub async fn register_location(
    ctx: &EngineContext,
    input: RegisterLocation,
) -> Result<LocationView, EngineError> {
    let business_name = input.business_name.trim().to_string();
    if business_name.is_empty() {
        return Err(EngineError::InvalidInput(
            "business_name must not be empty".to_string(),
        ));
    }

    let new = NewLocation {
        client_id: input.client_id,
        agency_id: input.agency_id,
        business_name,
        google_place_id: non_blank(input.google_place_id),
        address: non_blank(input.address),
        phone: non_blank(input.phone),
        website: non_blank(input.website),
    };
    let row = locintel_db::insert_location(&ctx.pool, &new).await?;
    tracing::info!(location = %row.public_id, name = %row.business_name, "location registered");
    Ok(LocationView::from_row(&row, Vec::new()))
}

/// Fetch a location with its per-platform review stats.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown id.
pub async fn get_location(ctx: &EngineContext, location: Uuid) -> Result<LocationView, EngineError> {
    let row = load_location(ctx, location).await?;
    let stats = locintel_db::get_review_stats(&ctx.pool, row.id).await?;
    Ok(LocationView::from_row(&row, stats))
}

pub(crate) async fn load_location(
    ctx: &EngineContext,
    location: Uuid,
) -> Result<LocationRow, EngineError> {
    locintel_db::get_location_by_public_id(&ctx.pool, location)
        .await?
        .ok_or_else(|| EngineError::not_found("location", location))
}

pub(crate) async fn reload_location(
    ctx: &EngineContext,
    row: &LocationRow,
) -> Result<LocationRow, EngineError> {
    locintel_db::get_location(&ctx.pool, row.id)
        .await?
        .ok_or_else(|| EngineError::not_found("location", row.public_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  12 Elm St ".to_string())), Some("12 Elm St".to_string()));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn register_input_defaults_optional_fields() {
        let input: RegisterLocation = serde_json::from_str(
            r#"{
                "client_id": "00000000-0000-0000-0000-000000000001",
                "agency_id": "00000000-0000-0000-0000-000000000002",
                "business_name": "Harbor Dental"
            }"#,
        )
        .unwrap();
        assert_eq!(input.business_name, "Harbor Dental");
        assert!(input.google_place_id.is_none());
        assert!(input.website.is_none());
    }
}

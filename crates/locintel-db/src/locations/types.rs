//! Row types for the `locations` table.

use chrono::{DateTime, Utc};
use locintel_core::ComponentScores;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::numeric::decimal_to_f64;

/// Input record for registering a location.
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub business_name: String,
    pub google_place_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

/// A row from the `locations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: i64,
    pub public_id: Uuid,
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub business_name: String,
    pub google_place_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub citation_score: Option<Decimal>,
    pub review_score: Option<Decimal>,
    pub visibility_score: Option<Decimal>,
    pub optimization_score: Option<Decimal>,
    pub local_seo_score: Option<Decimal>,
    pub google_rating: Option<Decimal>,
    pub google_review_count: i32,
    pub listing_completeness: Option<i16>,
    pub seo_data_last_updated: Option<DateTime<Utc>>,
    pub gbp_data_last_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocationRow {
    /// The stored component scores as `f64`.
    #[must_use]
    pub fn component_scores(&self) -> ComponentScores {
        ComponentScores {
            citation: self.citation_score.map(decimal_to_f64),
            review: self.review_score.map(decimal_to_f64),
            visibility: self.visibility_score.map(decimal_to_f64),
            optimization: self.optimization_score.map(decimal_to_f64),
        }
    }

    #[must_use]
    pub fn overall_score(&self) -> Option<f64> {
        self.local_seo_score.map(decimal_to_f64)
    }
}

/// Full replacement of the score columns, applied only if
/// `seo_data_last_updated` still equals `expected_last_updated`.
#[derive(Debug, Clone, Copy)]
pub struct ScoreUpdate {
    pub scores: ComponentScores,
    pub overall: f64,
    pub updated_at: DateTime<Utc>,
    pub expected_last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ListingUpdate {
    pub google_rating: Option<f64>,
    pub google_review_count: i32,
    pub listing_completeness: i16,
    pub updated_at: DateTime<Utc>,
}

/// Contact fields discovered upstream. Only fills columns that are currently NULL.
#[derive(Debug, Clone, Default)]
pub struct ContactBackfill {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

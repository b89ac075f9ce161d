//! Domain types and pure scoring logic for location intelligence.
//!
//! Everything in this crate is free of I/O: the score normalizer, the listing
//! completeness rubric, the keyword rank tracker, review sentiment bucketing,
//! keyword aggregation, and audit provenance. Persistence lives in
//! `locintel-db`; orchestration lives in `locintel-engine`.

pub mod app_config;
pub mod audit;
pub mod completeness;
pub mod config;
pub mod rank;
pub mod reviews;
pub mod scores;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use audit::{
    aggregate_keyword_ranks, round_to_tenth, AuditType, KeywordAggregate, Provenance,
};
pub use completeness::{completeness_points, listing_completeness, ProfileSnapshot};
pub use config::{load_app_config, load_app_config_from_env};
pub use rank::{KeywordRankState, RankObservation, RankReading, HISTORY_LIMIT};
pub use reviews::{
    response_rate, ExternalReviewKey, IncomingReview, ResponseStatus, Sentiment,
};
pub use scores::{normalize_health_score, ComponentScores, ScoreComponent};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Validation failures raised by the pure domain functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("{component} score {value} is outside 0-100")]
    ScoreOutOfRange {
        component: ScoreComponent,
        value: f64,
    },

    #[error("at least one component score is required")]
    NoComponentScores,

    #[error("rank must be a positive integer, got {0}")]
    InvalidRank(i64),

    #[error("review rating must be 1-5, got {0}")]
    InvalidRating(i64),

    #[error("invalid review: {0}")]
    InvalidReview(String),

    #[error("invalid profile snapshot: {0}")]
    InvalidProfile(String),

    #[error("unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

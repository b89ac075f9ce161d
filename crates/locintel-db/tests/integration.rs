//! Offline unit tests for locintel-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Utc;
use locintel_core::{AppConfig, Environment};
use locintel_db::{KeywordRow, LocationRow, PoolConfig};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        places_api_key: None,
        places_request_timeout_secs: 30,
        places_max_retries: 3,
        places_retry_backoff_base_ms: 1000,
        sync_max_concurrent_locations: 4,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

fn location_row() -> LocationRow {
    LocationRow {
        id: 1,
        public_id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        agency_id: Uuid::new_v4(),
        business_name: "Harbor Dental".to_string(),
        google_place_id: None,
        address: None,
        phone: None,
        website: None,
        citation_score: Some(Decimal::new(8000, 2)),
        review_score: Some(Decimal::new(9050, 2)),
        visibility_score: None,
        optimization_score: Some(Decimal::new(60, 0)),
        local_seo_score: Some(Decimal::new(7812, 2)),
        google_rating: Some(Decimal::new(45, 1)),
        google_review_count: 120,
        listing_completeness: Some(90),
        seo_data_last_updated: None,
        gbp_data_last_updated: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn location_row_exposes_scores_as_f64() {
    let row = location_row();
    let scores = row.component_scores();

    assert_eq!(scores.citation, Some(80.0));
    assert_eq!(scores.review, Some(90.5));
    assert_eq!(scores.visibility, None);
    assert_eq!(scores.optimization, Some(60.0));
    assert_eq!(row.overall_score(), Some(78.12));
}

#[test]
fn keyword_row_converts_to_rank_state() {
    let row = KeywordRow {
        id: 5,
        location_id: 1,
        keyword: "emergency dentist".to_string(),
        is_tracking: true,
        current_rank: Some(7),
        previous_rank: Some(9),
        rank_change: Some(-2),
        best_rank: Some(5),
        worst_rank: Some(12),
        rank_history: Json(Vec::new()),
        last_checked_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let state = row.rank_state();
    assert_eq!(state.current_rank, Some(7));
    assert_eq!(state.best_rank, Some(5));
    assert_eq!(state.worst_rank, Some(12));
    assert!(state.history.is_empty());
    assert!(state.extrema_consistent());
}

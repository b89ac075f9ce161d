//! Database operations for the `location_keywords` table.

use chrono::{DateTime, Utc};
use locintel_core::{KeywordRankState, RankObservation};
use sqlx::types::Json;
use sqlx::PgPool;

/// A row from the `location_keywords` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordRow {
    pub id: i64,
    pub location_id: i64,
    pub keyword: String,
    pub is_tracking: bool,
    pub current_rank: Option<i32>,
    pub previous_rank: Option<i32>,
    pub rank_change: Option<i32>,
    pub best_rank: Option<i32>,
    pub worst_rank: Option<i32>,
    pub rank_history: Json<Vec<RankObservation>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KeywordRow {
    #[must_use]
    pub fn rank_state(&self) -> KeywordRankState {
        KeywordRankState {
            current_rank: self.current_rank,
            previous_rank: self.previous_rank,
            rank_change: self.rank_change,
            best_rank: self.best_rank,
            worst_rank: self.worst_rank,
            history: self.rank_history.0.clone(),
            last_checked_at: self.last_checked_at,
        }
    }
}

/// New rank state for one keyword, applied only if `last_checked_at` is
/// still `expected_last_checked`.
#[derive(Debug, Clone)]
pub struct KeywordRankUpdate<'a> {
    pub state: &'a KeywordRankState,
    pub expected_last_checked: Option<DateTime<Utc>>,
}

const KEYWORD_COLUMNS: &str = "id, location_id, keyword, is_tracking, current_rank, \
     previous_rank, rank_change, best_rank, worst_rank, rank_history, last_checked_at, \
     created_at, updated_at";

/// Start tracking `keyword` for a location.
///
/// Re-adding a phrase that already exists re-enables tracking and keeps its
/// history.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn insert_keyword(
    pool: &PgPool,
    location_id: i64,
    keyword: &str,
) -> Result<KeywordRow, sqlx::Error> {
    sqlx::query_as::<_, KeywordRow>(&format!(
        "INSERT INTO location_keywords (location_id, keyword) \
         VALUES ($1, $2) \
         ON CONFLICT (location_id, keyword) DO UPDATE SET is_tracking = TRUE \
         RETURNING {KEYWORD_COLUMNS}"
    ))
    .bind(location_id)
    .bind(keyword)
    .fetch_one(pool)
    .await
}

/// Fetch one keyword of a location by phrase.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_keyword(
    pool: &PgPool,
    location_id: i64,
    keyword: &str,
) -> Result<Option<KeywordRow>, sqlx::Error> {
    sqlx::query_as::<_, KeywordRow>(&format!(
        "SELECT {KEYWORD_COLUMNS} FROM location_keywords \
         WHERE location_id = $1 AND keyword = $2"
    ))
    .bind(location_id)
    .bind(keyword)
    .fetch_optional(pool)
    .await
}

/// All keywords of a location, tracked or not, ordered by phrase.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_keywords_for_location(
    pool: &PgPool,
    location_id: i64,
) -> Result<Vec<KeywordRow>, sqlx::Error> {
    sqlx::query_as::<_, KeywordRow>(&format!(
        "SELECT {KEYWORD_COLUMNS} FROM location_keywords \
         WHERE location_id = $1 \
         ORDER BY keyword"
    ))
    .bind(location_id)
    .fetch_all(pool)
    .await
}

/// Keywords with `is_tracking = TRUE`, ordered by phrase.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_tracked_keywords(
    pool: &PgPool,
    location_id: i64,
) -> Result<Vec<KeywordRow>, sqlx::Error> {
    sqlx::query_as::<_, KeywordRow>(&format!(
        "SELECT {KEYWORD_COLUMNS} FROM location_keywords \
         WHERE location_id = $1 AND is_tracking \
         ORDER BY keyword"
    ))
    .bind(location_id)
    .fetch_all(pool)
    .await
}

/// Enable or disable tracking. Returns `false` if the keyword does not exist.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn set_keyword_tracking(
    pool: &PgPool,
    location_id: i64,
    keyword: &str,
    is_tracking: bool,
) -> Result<bool, sqlx::Error> {
    let rows_affected = sqlx::query(
        "UPDATE location_keywords SET is_tracking = $3 \
         WHERE location_id = $1 AND keyword = $2",
    )
    .bind(location_id)
    .bind(keyword)
    .bind(is_tracking)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected == 1)
}

/// Write a keyword's full rank state with a compare-and-swap on
/// `last_checked_at`.
///
/// Returns `false` when another writer checked the keyword first.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn update_keyword_rank_if_unchanged(
    pool: &PgPool,
    keyword_id: i64,
    update: &KeywordRankUpdate<'_>,
) -> Result<bool, sqlx::Error> {
    let state = update.state;
    let rows_affected = sqlx::query(
        "UPDATE location_keywords SET \
             current_rank    = $2, \
             previous_rank   = $3, \
             rank_change     = $4, \
             best_rank       = $5, \
             worst_rank      = $6, \
             rank_history    = $7, \
             last_checked_at = $8 \
         WHERE id = $1 \
           AND last_checked_at IS NOT DISTINCT FROM $9::timestamptz",
    )
    .bind(keyword_id)
    .bind(state.current_rank)
    .bind(state.previous_rank)
    .bind(state.rank_change)
    .bind(state.best_rank)
    .bind(state.worst_rank)
    .bind(Json(&state.history))
    .bind(state.last_checked_at)
    .bind(update.expected_last_checked)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected == 1)
}

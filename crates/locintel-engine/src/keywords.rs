//! Keyword tracking and rank history updates.

use chrono::{DateTime, Utc};
use locintel_core::{RankObservation, RankReading};
use locintel_db::{KeywordRankUpdate, KeywordRow, LocationRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::locations::load_location;
use crate::{EngineContext, EngineError};

/// One rank check result submitted by a caller. `rank: null` means the
/// business was not found in the results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeywordRankInput {
    pub keyword: String,
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordRankResult {
    pub keyword: String,
    /// `false` when the keyword is unknown or no longer tracked.
    pub applied: bool,
    pub rank_change: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordView {
    pub keyword: String,
    pub is_tracking: bool,
    pub current_rank: Option<i32>,
    pub previous_rank: Option<i32>,
    pub rank_change: Option<i32>,
    pub best_rank: Option<i32>,
    pub worst_rank: Option<i32>,
    pub rank_history: Vec<RankObservation>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl From<KeywordRow> for KeywordView {
    fn from(row: KeywordRow) -> Self {
        Self {
            keyword: row.keyword,
            is_tracking: row.is_tracking,
            current_rank: row.current_rank,
            previous_rank: row.previous_rank,
            rank_change: row.rank_change,
            best_rank: row.best_rank,
            worst_rank: row.worst_rank,
            rank_history: row.rank_history.0,
            last_checked_at: row.last_checked_at,
        }
    }
}

fn normalize_phrase(keyword: &str) -> Result<&str, EngineError> {
    let phrase = keyword.trim();
    if phrase.is_empty() {
        return Err(EngineError::InvalidInput(
            "keyword must not be empty".to_string(),
        ));
    }
    Ok(phrase)
}

/// Start (or resume) tracking a search phrase.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown location and
/// [`EngineError::InvalidInput`] for a blank phrase.
pub async fn track_keyword(
    ctx: &EngineContext,
    location: Uuid,
    keyword: &str,
) -> Result<KeywordView, EngineError> {
    let phrase = normalize_phrase(keyword)?;
    let row = load_location(ctx, location).await?;
    let keyword = locintel_db::insert_keyword(&ctx.pool, row.id, phrase).await?;
    Ok(keyword.into())
}

/// Pause or resume tracking. History is kept either way.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown location or keyword.
pub async fn set_keyword_tracking(
    ctx: &EngineContext,
    location: Uuid,
    keyword: &str,
    is_tracking: bool,
) -> Result<(), EngineError> {
    let phrase = normalize_phrase(keyword)?;
    let row = load_location(ctx, location).await?;
    if locintel_db::set_keyword_tracking(&ctx.pool, row.id, phrase, is_tracking).await? {
        Ok(())
    } else {
        Err(EngineError::not_found("keyword", phrase))
    }
}

/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown location.
pub async fn list_keywords(
    ctx: &EngineContext,
    location: Uuid,
) -> Result<Vec<KeywordView>, EngineError> {
    let row = load_location(ctx, location).await?;
    let keywords = locintel_db::list_keywords_for_location(&ctx.pool, row.id).await?;
    Ok(keywords.into_iter().map(KeywordView::from).collect())
}

/// Apply a batch of rank readings.
///
/// Every reading is validated before anything is written. Unknown and
/// untracked keywords are reported with `applied: false`.
///
/// # Errors
///
/// - [`EngineError::NotFound`] for an unknown location.
/// - [`EngineError::InvalidInput`] for a non-positive rank or blank phrase.
/// - [`EngineError::StorageConflict`] when a concurrent check wins twice on
///   the same keyword.
pub async fn update_keyword_ranks(
    ctx: &EngineContext,
    location: Uuid,
    readings: &[KeywordRankInput],
) -> Result<Vec<KeywordRankResult>, EngineError> {
    let parsed = parse_readings(readings)?;
    let row = load_location(ctx, location).await?;
    apply_readings(ctx, &row, &parsed).await
}

pub(crate) fn parse_readings(
    readings: &[KeywordRankInput],
) -> Result<Vec<(String, RankReading)>, EngineError> {
    readings
        .iter()
        .map(|r| {
            let phrase = normalize_phrase(&r.keyword)?;
            let reading = RankReading::from_raw(r.rank)?;
            Ok((phrase.to_string(), reading))
        })
        .collect()
}

pub(crate) async fn apply_readings(
    ctx: &EngineContext,
    row: &LocationRow,
    readings: &[(String, RankReading)],
) -> Result<Vec<KeywordRankResult>, EngineError> {
    let mut results = Vec::with_capacity(readings.len());
    for (phrase, reading) in readings {
        let rank_change = apply_one(ctx, row.id, phrase, *reading).await?;
        results.push(KeywordRankResult {
            keyword: phrase.clone(),
            applied: rank_change.is_some(),
            rank_change: rank_change.flatten(),
        });
    }
    Ok(results)
}

/// `None` when the keyword was skipped, `Some(change)` when it was written.
async fn apply_one(
    ctx: &EngineContext,
    location_id: i64,
    phrase: &str,
    reading: RankReading,
) -> Result<Option<Option<i32>>, EngineError> {
    for attempt in 0..2 {
        let Some(keyword) = locintel_db::get_keyword(&ctx.pool, location_id, phrase).await? else {
            return Ok(None);
        };
        if !keyword.is_tracking {
            return Ok(None);
        }

        let mut state = keyword.rank_state();
        let change = state.apply(reading, ctx.now());
        let update = KeywordRankUpdate {
            state: &state,
            expected_last_checked: keyword.last_checked_at,
        };
        if locintel_db::update_keyword_rank_if_unchanged(&ctx.pool, keyword.id, &update).await? {
            return Ok(Some(change));
        }
        tracing::warn!(keyword = %phrase, attempt, "rank update lost a concurrent write");
    }

    Err(EngineError::StorageConflict(format!("rank of keyword '{phrase}'")))
}

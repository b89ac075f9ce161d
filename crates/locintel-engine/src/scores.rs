//! Component score updates and the overall health score.

use chrono::{DateTime, Utc};
use locintel_core::{normalize_health_score, ComponentScores};
use locintel_db::{LocationRow, ScoreUpdate};
use serde::Serialize;
use uuid::Uuid;

use crate::locations::{load_location, reload_location};
use crate::{EngineContext, EngineError};

/// Result of [`update_scores`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub scores: ComponentScores,
    pub local_seo_score: f64,
    /// Change from the previous overall score, if there was one.
    pub delta: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Merge a partial score set over the stored scores and recompute the
/// overall score.
///
/// # Errors
///
/// - [`EngineError::NotFound`] for an unknown location.
/// - [`EngineError::InvalidInput`] for a component outside `[0, 100]`, or when
///   no component is present after merging.
/// - [`EngineError::StorageConflict`] when a concurrent writer wins twice.
pub async fn update_scores(
    ctx: &EngineContext,
    location: Uuid,
    partial: &ComponentScores,
) -> Result<ScoreOutcome, EngineError> {
    partial.validate()?;
    let row = load_location(ctx, location).await?;
    apply_scores(ctx, row, partial).await
}

pub(crate) async fn apply_scores(
    ctx: &EngineContext,
    mut row: LocationRow,
    partial: &ComponentScores,
) -> Result<ScoreOutcome, EngineError> {
    for attempt in 0..2 {
        if attempt > 0 {
            row = reload_location(ctx, &row).await?;
        }

        let previous = row.overall_score();
        let merged = at_column_precision(&partial.merged_over(&row.component_scores()));
        let overall = normalize_health_score(&merged)?;
        let update = ScoreUpdate {
            scores: merged,
            overall,
            updated_at: ctx.now(),
            expected_last_updated: row.seo_data_last_updated,
        };

        if locintel_db::update_location_scores_if_unchanged(&ctx.pool, row.id, &update).await? {
            tracing::debug!(
                location = %row.public_id,
                overall,
                "scores updated"
            );
            return Ok(ScoreOutcome {
                scores: merged,
                local_seo_score: overall,
                delta: previous.map(|p| round_to_hundredth(overall - p)),
                updated_at: update.updated_at,
            });
        }
        tracing::warn!(location = %row.public_id, attempt, "score update lost a concurrent write");
    }

    Err(EngineError::StorageConflict(format!(
        "scores for location {}",
        row.public_id
    )))
}

/// Check that merging `partial` over `current` leaves something to score.
pub(crate) fn check_scoreable(
    partial: &ComponentScores,
    current: &ComponentScores,
) -> Result<(), EngineError> {
    partial.validate()?;
    normalize_health_score(&partial.merged_over(current))?;
    Ok(())
}

fn round_to_hundredth(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Components as `NUMERIC(5,2)` will store them, so the overall score is
/// derived from exactly what is persisted.
fn at_column_precision(scores: &ComponentScores) -> ComponentScores {
    let round = |v: Option<f64>| v.map(|x| locintel_db::round_f64(x, 2));
    ComponentScores {
        citation: round(scores.citation),
        review: round(scores.review),
        visibility: round(scores.visibility),
        optimization: round(scores.optimization),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoreable_requires_a_component_after_merge() {
        let empty = ComponentScores::default();
        assert!(matches!(
            check_scoreable(&empty, &empty),
            Err(EngineError::InvalidInput(_))
        ));

        let stored = ComponentScores {
            review: Some(70.0),
            ..ComponentScores::default()
        };
        assert!(check_scoreable(&empty, &stored).is_ok());
    }

    #[test]
    fn scoreable_rejects_out_of_range_partials() {
        let partial = ComponentScores {
            citation: Some(101.0),
            ..ComponentScores::default()
        };
        let stored = ComponentScores {
            review: Some(70.0),
            ..ComponentScores::default()
        };
        let err = check_scoreable(&partial, &stored).unwrap_err();
        assert!(err.to_string().contains("citation"), "{err}");
    }

    #[test]
    fn components_round_half_away_from_zero_to_cents() {
        let raw = ComponentScores {
            citation: Some(50.037),
            review: Some(60.005),
            ..ComponentScores::default()
        };
        let stored = at_column_precision(&raw);
        assert!((stored.citation.unwrap() - 50.04).abs() < 1e-9);
        assert!((stored.review.unwrap() - 60.01).abs() < 1e-9);
        assert!(stored.visibility.is_none());
        assert_eq!(
            normalize_health_score(&stored).unwrap(),
            normalize_health_score(&at_column_precision(&stored)).unwrap()
        );
    }

    #[test]
    fn delta_is_rounded_to_cents() {
        assert!((round_to_hundredth(81.18 - 75.1) - 6.08).abs() < 1e-9);
    }
}

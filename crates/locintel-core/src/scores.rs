//! Weighted local-SEO health score.
//!
//! The overall score is a weighted mean of up to four component scores. When
//! a component is missing, the remaining weights are renormalized so a
//! location is not penalized for data that was never collected.

use serde::{Deserialize, Serialize};

use crate::CoreError;

// ---------------------------------------------------------------------------
// Weight constants, in basis points (must sum to exactly 10_000)
// ---------------------------------------------------------------------------

pub const W_CITATION_BP: u32 = 2_500;
pub const W_REVIEW_BP: u32 = 3_500;
pub const W_VISIBILITY_BP: u32 = 2_500;
pub const W_OPTIMIZATION_BP: u32 = 1_500;

const TOTAL_WEIGHT_BP: u32 = 10_000;

const _: () = assert!(
    W_CITATION_BP + W_REVIEW_BP + W_VISIBILITY_BP + W_OPTIMIZATION_BP == TOTAL_WEIGHT_BP,
    "score weights must sum to exactly 10_000 basis points"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    Citation,
    Review,
    Visibility,
    Optimization,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 4] = [
        ScoreComponent::Citation,
        ScoreComponent::Review,
        ScoreComponent::Visibility,
        ScoreComponent::Optimization,
    ];

    #[must_use]
    pub const fn weight_bp(self) -> u32 {
        match self {
            ScoreComponent::Citation => W_CITATION_BP,
            ScoreComponent::Review => W_REVIEW_BP,
            ScoreComponent::Visibility => W_VISIBILITY_BP,
            ScoreComponent::Optimization => W_OPTIMIZATION_BP,
        }
    }
}

impl std::fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreComponent::Citation => write!(f, "citation"),
            ScoreComponent::Review => write!(f, "review"),
            ScoreComponent::Visibility => write!(f, "visibility"),
            ScoreComponent::Optimization => write!(f, "optimization"),
        }
    }
}

/// Up to four component scores, each in `[0, 100]` when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub citation: Option<f64>,
    pub review: Option<f64>,
    pub visibility: Option<f64>,
    pub optimization: Option<f64>,
}

impl ComponentScores {
    #[must_use]
    pub fn get(&self, component: ScoreComponent) -> Option<f64> {
        match component {
            ScoreComponent::Citation => self.citation,
            ScoreComponent::Review => self.review,
            ScoreComponent::Visibility => self.visibility,
            ScoreComponent::Optimization => self.optimization,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        ScoreComponent::ALL.iter().all(|c| self.get(*c).is_none())
    }

    /// Overlay the components present in `self` on top of `current`.
    ///
    /// Components absent from `self` keep their stored value.
    #[must_use]
    pub fn merged_over(&self, current: &ComponentScores) -> ComponentScores {
        ComponentScores {
            citation: self.citation.or(current.citation),
            review: self.review.or(current.review),
            visibility: self.visibility.or(current.visibility),
            optimization: self.optimization.or(current.optimization),
        }
    }

    /// Check every present component lies in `[0, 100]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ScoreOutOfRange`] for the first component that is
    /// NaN, infinite, or outside the range.
    pub fn validate(&self) -> Result<(), CoreError> {
        for component in ScoreComponent::ALL {
            if let Some(value) = self.get(component) {
                if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                    return Err(CoreError::ScoreOutOfRange { component, value });
                }
            }
        }
        Ok(())
    }
}

/// Compute the overall health score from the present components.
///
/// Sums `component × weight` over present components. If the weights used
/// sum to less than 1.0, the sum is divided by the used weight. The result is
/// rounded to two decimals (half away from zero).
///
/// # Errors
///
/// Returns [`CoreError::NoComponentScores`] when every component is absent and
/// [`CoreError::ScoreOutOfRange`] when a present component is invalid.
pub fn normalize_health_score(scores: &ComponentScores) -> Result<f64, CoreError> {
    scores.validate()?;

    let mut weighted_sum = 0.0_f64;
    let mut used_bp = 0_u32;
    for component in ScoreComponent::ALL {
        if let Some(value) = scores.get(component) {
            weighted_sum += value * f64::from(component.weight_bp());
            used_bp += component.weight_bp();
        }
    }

    if used_bp == 0 {
        return Err(CoreError::NoComponentScores);
    }

    // used_bp == TOTAL_WEIGHT_BP is the unrenormalized case; the division is identical.
    let normalized = weighted_sum / f64::from(used_bp);
    Ok(round_to_hundredth(normalized))
}

fn round_to_hundredth(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn weights_sum_to_one() {
        let sum: u32 = ScoreComponent::ALL.iter().map(|c| c.weight_bp()).sum();
        assert_eq!(sum, TOTAL_WEIGHT_BP);
    }

    #[test]
    fn missing_optimization_is_renormalized() {
        let scores = ComponentScores {
            citation: Some(80.0),
            review: Some(90.0),
            visibility: Some(70.0),
            optimization: None,
        };
        // 69 / 0.85 = 81.176...
        let overall = normalize_health_score(&scores).unwrap();
        assert!(approx_eq(overall, 81.18), "got {overall}");
    }

    #[test]
    fn all_components_present_uses_plain_weighted_sum() {
        let scores = ComponentScores {
            citation: Some(80.0),
            review: Some(90.0),
            visibility: Some(70.0),
            optimization: Some(60.0),
        };
        // 20 + 31.5 + 17.5 + 9 = 78
        let overall = normalize_health_score(&scores).unwrap();
        assert!(approx_eq(overall, 78.0), "got {overall}");
    }

    #[test]
    fn single_component_normalizes_to_itself() {
        let scores = ComponentScores {
            review: Some(42.5),
            ..ComponentScores::default()
        };
        let overall = normalize_health_score(&scores).unwrap();
        assert!(approx_eq(overall, 42.5), "got {overall}");
    }

    #[test]
    fn no_components_is_rejected() {
        let err = normalize_health_score(&ComponentScores::default()).unwrap_err();
        assert_eq!(err, CoreError::NoComponentScores);
    }

    #[test]
    fn out_of_range_component_is_rejected() {
        let scores = ComponentScores {
            citation: Some(101.0),
            ..ComponentScores::default()
        };
        let err = normalize_health_score(&scores).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ScoreOutOfRange {
                component: ScoreComponent::Citation,
                ..
            }
        ));
    }

    #[test]
    fn negative_and_nan_components_are_rejected() {
        let negative = ComponentScores {
            visibility: Some(-0.5),
            ..ComponentScores::default()
        };
        assert!(normalize_health_score(&negative).is_err());

        let nan = ComponentScores {
            optimization: Some(f64::NAN),
            ..ComponentScores::default()
        };
        assert!(normalize_health_score(&nan).is_err());
    }

    #[test]
    fn output_stays_in_range_across_input_grid() {
        let values = [None, Some(0.0), Some(12.34), Some(50.0), Some(99.99), Some(100.0)];
        for citation in values {
            for review in values {
                for visibility in values {
                    for optimization in values {
                        let scores = ComponentScores {
                            citation,
                            review,
                            visibility,
                            optimization,
                        };
                        match normalize_health_score(&scores) {
                            Ok(overall) => assert!(
                                (0.0..=100.0).contains(&overall),
                                "{scores:?} produced {overall}"
                            ),
                            Err(e) => {
                                assert!(scores.is_empty(), "{scores:?} unexpectedly failed: {e}");
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn merged_over_keeps_stored_values_for_absent_components() {
        let stored = ComponentScores {
            citation: Some(10.0),
            review: Some(20.0),
            visibility: None,
            optimization: Some(40.0),
        };
        let partial = ComponentScores {
            review: Some(55.0),
            visibility: Some(65.0),
            ..ComponentScores::default()
        };
        let merged = partial.merged_over(&stored);
        assert_eq!(merged.citation, Some(10.0));
        assert_eq!(merged.review, Some(55.0));
        assert_eq!(merged.visibility, Some(65.0));
        assert_eq!(merged.optimization, Some(40.0));
    }

    #[test]
    fn score_component_display_is_snake_case() {
        assert_eq!(ScoreComponent::Optimization.to_string(), "optimization");
    }
}

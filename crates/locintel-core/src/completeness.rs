//! Listing completeness for a public business profile.
//!
//! A fixed ten-point rubric scaled to a percentage.

use serde::{Deserialize, Serialize};

use crate::CoreError;

const MAX_POINTS: u8 = 10;

/// Photos needed for the full photo credit.
pub const PHOTOS_FOR_FULL_CREDIT: i64 = 5;
/// Ratings needed for the full rating-volume credit.
pub const RATINGS_FOR_FULL_CREDIT: i64 = 10;
/// Average rating at or above which the rating-quality point is awarded.
pub const MIN_GOOD_RATING: f64 = 3.0;

/// A point-in-time view of a business's public listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub has_hours: bool,
    #[serde(default)]
    pub photo_count: i64,
    #[serde(default)]
    pub rating_count: i64,
    pub average_rating: Option<f64>,
}

impl ProfileSnapshot {
    /// Reject snapshots whose numeric fields cannot describe a real listing.
    ///
    /// [`listing_completeness`] itself never fails; this is the stricter gate
    /// applied before a snapshot is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProfile`] for negative counts or a rating
    /// that is NaN or outside `[0, 5]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.photo_count < 0 {
            return Err(CoreError::InvalidProfile(format!(
                "photo_count must be non-negative, got {}",
                self.photo_count
            )));
        }
        if self.rating_count < 0 {
            return Err(CoreError::InvalidProfile(format!(
                "rating_count must be non-negative, got {}",
                self.rating_count
            )));
        }
        if let Some(rating) = self.average_rating {
            if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
                return Err(CoreError::InvalidProfile(format!(
                    "average_rating must be within 0-5, got {rating}"
                )));
            }
        }
        Ok(())
    }

    /// The average rating, if it is a usable value.
    #[must_use]
    pub fn valid_rating(&self) -> Option<f64> {
        self.average_rating
            .filter(|r| r.is_finite() && (0.0..=5.0).contains(r))
    }
}

fn present(field: Option<&String>) -> bool {
    field.is_some_and(|s| !s.trim().is_empty())
}

/// Raw rubric points, `0..=10`.
///
/// Malformed numbers (negative counts, NaN or out-of-range ratings) contribute
/// nothing rather than failing.
#[must_use]
pub fn completeness_points(profile: &ProfileSnapshot) -> u8 {
    let mut points = 0_u8;

    for field in [
        profile.name.as_ref(),
        profile.address.as_ref(),
        profile.phone.as_ref(),
        profile.website.as_ref(),
    ] {
        if present(field) {
            points += 1;
        }
    }

    if profile.has_hours {
        points += 1;
    }

    points += match profile.photo_count {
        n if n >= PHOTOS_FOR_FULL_CREDIT => 2,
        n if n >= 1 => 1,
        _ => 0,
    };

    points += match profile.rating_count {
        n if n >= RATINGS_FOR_FULL_CREDIT => 2,
        n if n >= 1 => 1,
        _ => 0,
    };

    if profile.valid_rating().is_some_and(|r| r >= MIN_GOOD_RATING) {
        points += 1;
    }

    points.min(MAX_POINTS)
}

/// Completeness percentage, `0..=100`.
#[must_use]
pub fn listing_completeness(profile: &ProfileSnapshot) -> u8 {
    // points / 10 × 100 is exact in integers.
    completeness_points(profile) * (100 / MAX_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> ProfileSnapshot {
        ProfileSnapshot {
            name: Some("Blue Door Bistro".to_string()),
            address: Some("12 Harbor St, Portland, ME".to_string()),
            phone: Some("(207) 555-0100".to_string()),
            website: Some("https://bluedoor.example".to_string()),
            has_hours: true,
            photo_count: 6,
            rating_count: 15,
            average_rating: Some(4.2),
        }
    }

    #[test]
    fn fully_filled_profile_scores_one_hundred() {
        let profile = full_profile();
        assert_eq!(completeness_points(&profile), 10);
        assert_eq!(listing_completeness(&profile), 100);
    }

    #[test]
    fn empty_profile_scores_zero() {
        assert_eq!(listing_completeness(&ProfileSnapshot::default()), 0);
    }

    #[test]
    fn blank_strings_do_not_count_as_present() {
        let profile = ProfileSnapshot {
            name: Some("   ".to_string()),
            phone: Some(String::new()),
            ..ProfileSnapshot::default()
        };
        assert_eq!(completeness_points(&profile), 0);
    }

    #[test]
    fn partial_photo_and_rating_credit() {
        let profile = ProfileSnapshot {
            photo_count: 2,
            rating_count: 3,
            average_rating: Some(2.9),
            ..ProfileSnapshot::default()
        };
        // 1 (photos) + 1 (ratings) + 0 (rating below 3.0)
        assert_eq!(completeness_points(&profile), 2);
        assert_eq!(listing_completeness(&profile), 20);
    }

    #[test]
    fn rating_threshold_is_inclusive() {
        let profile = ProfileSnapshot {
            average_rating: Some(3.0),
            ..ProfileSnapshot::default()
        };
        assert_eq!(completeness_points(&profile), 1);
    }

    #[test]
    fn malformed_numbers_contribute_zero() {
        let profile = ProfileSnapshot {
            photo_count: -4,
            rating_count: -1,
            average_rating: Some(f64::NAN),
            ..ProfileSnapshot::default()
        };
        assert_eq!(completeness_points(&profile), 0);

        let too_high = ProfileSnapshot {
            average_rating: Some(7.5),
            ..ProfileSnapshot::default()
        };
        assert_eq!(completeness_points(&too_high), 0);
    }

    #[test]
    fn improving_any_single_factor_never_lowers_completeness() {
        let base = ProfileSnapshot {
            name: Some("Corner Shop".to_string()),
            photo_count: 1,
            rating_count: 1,
            average_rating: Some(2.0),
            ..ProfileSnapshot::default()
        };
        let baseline = listing_completeness(&base);

        let improvements: Vec<ProfileSnapshot> = vec![
            ProfileSnapshot {
                address: Some("1 Main St".to_string()),
                ..base.clone()
            },
            ProfileSnapshot {
                phone: Some("555-0101".to_string()),
                ..base.clone()
            },
            ProfileSnapshot {
                website: Some("https://corner.example".to_string()),
                ..base.clone()
            },
            ProfileSnapshot {
                has_hours: true,
                ..base.clone()
            },
            ProfileSnapshot {
                average_rating: Some(4.5),
                ..base.clone()
            },
        ];
        for improved in &improvements {
            assert!(listing_completeness(improved) >= baseline, "{improved:?}");
        }

        let mut previous = 0;
        for photos in 0..=12 {
            let score = listing_completeness(&ProfileSnapshot {
                photo_count: photos,
                ..base.clone()
            });
            assert!(score >= previous, "photos={photos} dropped to {score}");
            previous = score;
        }

        let mut previous = 0;
        for ratings in 0..=25 {
            let score = listing_completeness(&ProfileSnapshot {
                rating_count: ratings,
                ..base.clone()
            });
            assert!(score >= previous, "ratings={ratings} dropped to {score}");
            previous = score;
        }
    }

    #[test]
    fn validate_rejects_negative_counts_and_bad_ratings() {
        assert!(full_profile().validate().is_ok());

        let negative = ProfileSnapshot {
            photo_count: -1,
            ..ProfileSnapshot::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(CoreError::InvalidProfile(_))
        ));

        let bad_rating = ProfileSnapshot {
            average_rating: Some(5.1),
            ..ProfileSnapshot::default()
        };
        assert!(matches!(
            bad_rating.validate(),
            Err(CoreError::InvalidProfile(_))
        ));
    }

    #[test]
    fn deserializes_with_defaults_for_missing_counts() {
        let profile: ProfileSnapshot =
            serde_json::from_str(r#"{"name":"Cafe","average_rating":4.0}"#).unwrap();
        assert_eq!(profile.photo_count, 0);
        assert_eq!(profile.rating_count, 0);
        assert!(!profile.has_hours);
        assert_eq!(completeness_points(&profile), 2);
    }
}

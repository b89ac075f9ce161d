//! Review identity, sentiment bucketing, and response statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Bucket a 1-5 star rating: 4 and up is positive, 3 is neutral.
    #[must_use]
    pub fn from_rating(rating: i16) -> Self {
        match rating {
            r if r >= 4 => Self::Positive,
            3 => Self::Neutral,
            _ => Self::Negative,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            other => Err(CoreError::UnknownVariant {
                kind: "sentiment",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Pending,
    Responded,
}

impl ResponseStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Responded => "responded",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResponseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "responded" => Ok(Self::Responded),
            other => Err(CoreError::UnknownVariant {
                kind: "response status",
                value: other.to_string(),
            }),
        }
    }
}

/// The parts of a review that identify it stably across repeated fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalReviewKey<'a> {
    pub platform: &'a str,
    pub source_id: &'a str,
    pub reviewed_at: DateTime<Utc>,
}

impl ExternalReviewKey<'_> {
    /// `{platform}_{source_id}_{unix_seconds}`.
    #[must_use]
    pub fn external_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.platform,
            self.source_id,
            self.reviewed_at.timestamp()
        )
    }
}

/// A review as delivered by an upstream source, before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingReview {
    /// Source-side identifier; combined with the platform and timestamp into
    /// the stored external id.
    pub source_id: String,
    pub reviewer_name: Option<String>,
    pub rating: i64,
    pub text: Option<String>,
    pub reviewed_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl IncomingReview {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRating`] for ratings outside 1-5 and
    /// [`CoreError::InvalidReview`] for a blank source id.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=5).contains(&self.rating) {
            return Err(CoreError::InvalidRating(self.rating));
        }
        if self.source_id.trim().is_empty() {
            return Err(CoreError::InvalidReview(
                "source id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Rating narrowed for storage. Only meaningful after [`Self::validate`].
    #[must_use]
    pub fn rating_i16(&self) -> i16 {
        i16::try_from(self.rating.clamp(1, 5)).unwrap_or(1)
    }

    #[must_use]
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_rating(self.rating_i16())
    }

    #[must_use]
    pub fn key<'a>(&'a self, platform: &'a str) -> ExternalReviewKey<'a> {
        ExternalReviewKey {
            platform,
            source_id: &self.source_id,
            reviewed_at: self.reviewed_at,
        }
    }
}

/// `responded / total`, or `0.0` when there are no reviews.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn response_rate(responded: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    responded.clamp(0, total) as f64 / total as f64
}

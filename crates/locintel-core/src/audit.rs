//! Audit snapshot building blocks: keyword aggregation and provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditType {
    Periodic,
    OnDemand,
}

impl AuditType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Periodic => "periodic",
            Self::OnDemand => "on_demand",
        }
    }
}

impl std::fmt::Display for AuditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "periodic" => Ok(Self::Periodic),
            "on_demand" => Ok(Self::OnDemand),
            other => Err(CoreError::UnknownVariant {
                kind: "audit type",
                value: other.to_string(),
            }),
        }
    }
}

/// Summary statistics over a location's tracked keywords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordAggregate {
    pub total_tracked: i32,
    pub top_3: i32,
    pub top_10: i32,
    /// Mean of present current ranks, one decimal. `None` when no keyword ranks.
    pub average_rank: Option<f64>,
}

/// Aggregate the current ranks of tracked keywords.
///
/// `None` entries (keywords not found in results) count toward the total but
/// are excluded from the top-N counts and the average.
#[must_use]
pub fn aggregate_keyword_ranks<I>(current_ranks: I) -> KeywordAggregate
where
    I: IntoIterator<Item = Option<i32>>,
{
    let mut agg = KeywordAggregate::default();
    let mut sum = 0_i64;
    let mut ranked = 0_i32;

    for rank in current_ranks {
        agg.total_tracked += 1;
        let Some(rank) = rank else { continue };
        if rank <= 3 {
            agg.top_3 += 1;
        }
        if rank <= 10 {
            agg.top_10 += 1;
        }
        sum += i64::from(rank);
        ranked += 1;
    }

    if ranked > 0 {
        #[allow(clippy::cast_precision_loss)]
        let mean = sum as f64 / f64::from(ranked);
        agg.average_rank = Some(round_to_tenth(mean));
    }
    agg
}

/// Round to one decimal, half away from zero.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Which sub-steps contributed to a snapshot.
///
/// `None` means the step was not requested; `Some(false)` means it was
/// attempted and failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_profile: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_fetch: Option<bool>,
    pub manual_update: bool,
    pub recorded_at: DateTime<Utc>,
}

impl Provenance {
    #[must_use]
    pub fn new(audit_type: AuditType, recorded_at: DateTime<Utc>) -> Self {
        Self {
            scores: None,
            listing_profile: None,
            keywords: None,
            reviews: None,
            upstream_fetch: None,
            manual_update: audit_type == AuditType::OnDemand,
            recorded_at,
        }
    }

    /// True when every requested step succeeded.
    #[must_use]
    pub fn complete(&self) -> bool {
        [
            self.scores,
            self.listing_profile,
            self.keywords,
            self.reviews,
            self.upstream_fetch,
        ]
        .into_iter()
        .all(|step| step != Some(false))
    }
}

//! Keyword rank tracking with a bounded observation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Maximum number of observations kept per keyword.
pub const HISTORY_LIMIT: usize = 12;

/// One rank check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankReading {
    /// Position in the results, 1-based.
    Ranked(i32),
    /// The business did not appear in the checked results.
    NotFound,
}

impl RankReading {
    /// Build a reading from a raw rank where `None` means not found.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRank`] for zero, negative, or oversized ranks.
    pub fn from_raw(raw: Option<i64>) -> Result<Self, CoreError> {
        match raw {
            None => Ok(Self::NotFound),
            Some(rank) if rank > 0 => i32::try_from(rank)
                .map(Self::Ranked)
                .map_err(|_| CoreError::InvalidRank(rank)),
            Some(rank) => Err(CoreError::InvalidRank(rank)),
        }
    }

    #[must_use]
    pub fn rank(self) -> Option<i32> {
        match self {
            Self::Ranked(rank) => Some(rank),
            Self::NotFound => None,
        }
    }
}

/// One entry of the rolling rank history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankObservation {
    pub checked_at: DateTime<Utc>,
    pub rank: Option<i32>,
    pub change: i32,
}

/// Stored rank state for one tracked keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRankState {
    pub current_rank: Option<i32>,
    pub previous_rank: Option<i32>,
    pub rank_change: Option<i32>,
    pub best_rank: Option<i32>,
    pub worst_rank: Option<i32>,
    pub history: Vec<RankObservation>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl KeywordRankState {
    /// Fold one observation into the state.
    ///
    /// Returns the signed rank change for a ranked reading, or `None` for
    /// [`RankReading::NotFound`], which is logged to history but leaves the
    /// current, previous, best, and worst ranks untouched.
    pub fn apply(&mut self, reading: RankReading, now: DateTime<Utc>) -> Option<i32> {
        let change = match reading {
            RankReading::Ranked(new) => {
                let change = self.current_rank.map_or(0, |old| new - old);
                self.previous_rank = self.current_rank;
                self.current_rank = Some(new);
                self.rank_change = Some(change);
                self.best_rank = Some(self.best_rank.map_or(new, |best| best.min(new)));
                self.worst_rank = Some(self.worst_rank.map_or(new, |worst| worst.max(new)));
                Some(change)
            }
            RankReading::NotFound => None,
        };

        self.history.push(RankObservation {
            checked_at: now,
            rank: reading.rank(),
            change: change.unwrap_or(0),
        });
        if self.history.len() > HISTORY_LIMIT {
            let overflow = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..overflow);
        }

        self.last_checked_at = Some(now);
        change
    }

    /// `best <= current <= worst` whenever a current rank is present.
    #[must_use]
    pub fn extrema_consistent(&self) -> bool {
        match (self.best_rank, self.current_rank, self.worst_rank) {
            (Some(best), Some(current), Some(worst)) => best <= current && current <= worst,
            (_, None, _) => true,
            _ => false,
        }
    }
}

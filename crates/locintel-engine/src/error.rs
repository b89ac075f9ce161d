use locintel_core::CoreError;
use locintel_db::DbError;
use locintel_places::PlacesError;
use thiserror::Error;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown location, keyword, or review.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Rejected before any write.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream listing source failed after the client's own retries.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A compare-and-swap update lost twice in a row.
    #[error("storage conflict: {0}")]
    StorageConflict(String),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl EngineError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(DbError::Sqlx(e))
    }
}

impl From<CoreError> for EngineError {
    fn from(e: CoreError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<PlacesError> for EngineError {
    fn from(e: PlacesError) -> Self {
        Self::UpstreamUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_become_invalid_input() {
        let err: EngineError = CoreError::InvalidRank(0).into();
        assert!(matches!(err, EngineError::InvalidInput(ref m) if m.contains("positive")));
    }

    #[test]
    fn places_errors_become_upstream_unavailable() {
        let err: EngineError = PlacesError::NotFound("abc".to_string()).into();
        assert!(matches!(err, EngineError::UpstreamUnavailable(_)));
    }

    #[test]
    fn not_found_names_kind_and_id() {
        let err = EngineError::not_found("location", "42");
        assert_eq!(err.to_string(), "location not found: 42");
    }
}

//! Location intelligence engine.
//!
//! Every operation takes an [`EngineContext`] (pool plus clock) and a
//! location's public id. Writes that can race go through compare-and-swap
//! updates in `locintel-db`; a lost swap is retried once.

pub mod audit;
pub mod context;
pub mod error;
pub mod keywords;
pub mod listing;
pub mod locations;
pub mod reviews;
pub mod scores;
pub mod source;
pub mod sync;

pub use audit::{
    list_audit_snapshots, run_full_audit, AuditNotes, AuditRequest, AuditSnapshot, ReviewBatch,
};
pub use context::{Clock, EngineContext, SystemClock};
pub use error::EngineError;
pub use keywords::{
    list_keywords, set_keyword_tracking, track_keyword, update_keyword_ranks, KeywordRankInput,
    KeywordRankResult, KeywordView,
};
pub use listing::{update_listing_profile, ListingOutcome};
pub use locations::{get_location, register_location, LocationView, RegisterLocation};
pub use reviews::{
    ingest_reviews, list_reviews, record_review_response, IngestOutcome, ReviewView,
};
pub use scores::{update_scores, ScoreOutcome};
pub use source::{ListingFetch, ListingSource};
pub use sync::{
    run_periodic_audits, sync_location_listing, sync_locations, BulkReport, LocationFailure,
    SyncOutcome,
};

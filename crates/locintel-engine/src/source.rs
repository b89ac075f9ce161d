//! Upstream listing sources.

use async_trait::async_trait;
use locintel_core::{IncomingReview, ProfileSnapshot};
use locintel_places::{place_reviews, profile_snapshot, PlacesClient, GOOGLE_PLATFORM};

use crate::EngineError;

/// Profile and recent reviews fetched for one place.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFetch {
    pub place_id: String,
    pub profile: ProfileSnapshot,
    pub reviews: Vec<IncomingReview>,
}

/// A provider of public listing data.
///
/// Implementations do their own retrying; any error returned here is final
/// and surfaces as [`EngineError::UpstreamUnavailable`].
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Platform tag stored with reviews from this source.
    fn platform(&self) -> &str;

    async fn fetch_listing(&self, place_id: &str) -> Result<ListingFetch, EngineError>;

    /// Resolve a free-text query to a place id.
    async fn resolve_place_id(&self, query: &str) -> Result<String, EngineError>;
}

#[async_trait]
impl ListingSource for PlacesClient {
    fn platform(&self) -> &str {
        GOOGLE_PLATFORM
    }

    async fn fetch_listing(&self, place_id: &str) -> Result<ListingFetch, EngineError> {
        let details = self.get_place_details(place_id).await?;
        Ok(ListingFetch {
            place_id: place_id.to_string(),
            profile: profile_snapshot(&details),
            reviews: place_reviews(place_id, &details),
        })
    }

    async fn resolve_place_id(&self, query: &str) -> Result<String, EngineError> {
        Ok(self.find_place_id(query).await?)
    }
}

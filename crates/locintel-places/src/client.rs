//! HTTP client for the Google Places API.
//!
//! Wraps `reqwest` with API key handling, the `status` envelope check, and
//! retry on transient failures.

use std::time::Duration;

use locintel_core::AppConfig;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiResponse, DetailsResponse, PlaceDetails, TextSearchResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";

/// Fields requested from `place/details`.
pub const DETAILS_FIELDS: &str = "place_id,name,rating,user_ratings_total,reviews,\
formatted_address,formatted_phone_number,website,opening_hours,photos";

/// Client for the Places API.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Builds a client from application config, or `None` when no API key
    /// is configured.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, PlacesError> {
        config
            .places_api_key
            .as_deref()
            .map(|key| {
                Self::new(
                    key,
                    config.places_request_timeout_secs,
                    config.places_max_retries,
                    config.places_retry_backoff_base_ms,
                )
            })
            .transpose()
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PlacesError::ApiError`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("locintel/0.1 (listing-sync)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::ApiError {
            status: "INVALID_BASE_URL".to_string(),
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches profile fields and recent reviews for one place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NotFound`] if the place id is unknown.
    /// - [`PlacesError::ApiError`] for any other non-`OK` status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status,
    ///   after retries are exhausted.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "maps/api/place/details/json",
            &[("place_id", place_id), ("fields", DETAILS_FIELDS)],
        );
        let context = format!("place/details(place_id={place_id})");

        let response: ApiResponse<DetailsResponse> = self.get_envelope(&url, &context).await?;
        let mut details = response
            .data
            .result
            .ok_or_else(|| PlacesError::NotFound(place_id.to_string()))?;
        if details.place_id.is_none() {
            details.place_id = Some(place_id.to_string());
        }

        tracing::debug!(
            place_id,
            reviews = details.reviews.len(),
            "fetched place details"
        );
        Ok(details)
    }

    /// Resolves a free-text query (business name plus address) to the first
    /// matching place id.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::get_place_details`].
    pub async fn find_place_id(&self, query: &str) -> Result<String, PlacesError> {
        let url = self.build_url("maps/api/place/textsearch/json", &[("query", query)]);
        let context = format!("place/textsearch(query={query})");

        let response: ApiResponse<TextSearchResponse> = self.get_envelope(&url, &context).await?;
        response
            .data
            .results
            .into_iter()
            .next()
            .map(|r| r.place_id)
            .ok_or_else(|| PlacesError::NotFound(query.to_string()))
    }

    /// Builds the request URL with percent-encoded query parameters and the key.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{path}", self.base_url.path()));
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<ApiResponse<T>, PlacesError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, move || async move {
            let body = self.request_json(url, context).await?;
            let envelope: ApiResponse<T> =
                serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                    context: context.to_string(),
                    source: e,
                })?;
            Self::check_status(&envelope, context)?;
            Ok(envelope)
        })
        .await
    }

    /// Sends a GET request, asserts a 2xx status, and parses the body as JSON.
    async fn request_json(&self, url: &Url, context: &str) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    fn check_status<T>(envelope: &ApiResponse<T>, context: &str) -> Result<(), PlacesError> {
        match envelope.status.as_str() {
            "OK" => Ok(()),
            "ZERO_RESULTS" | "NOT_FOUND" => Err(PlacesError::NotFound(context.to_string())),
            other => Err(PlacesError::ApiError {
                status: other.to_string(),
                message: envelope
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "no error message".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PlacesClient {
        PlacesClient::with_base_url("test-key", 30, 0, 0, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_path_and_key() {
        let client = test_client("https://maps.googleapis.com");
        let url = client.build_url("maps/api/place/details/json", &[("place_id", "abc")]);
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/place/details/json?place_id=abc&key=test-key"
        );
    }

    #[test]
    fn build_url_keeps_base_path_prefix() {
        let client = test_client("http://127.0.0.1:9000/proxy/");
        let url = client.build_url("maps/api/place/textsearch/json", &[("query", "a b")]);
        assert!(
            url.as_str()
                .starts_with("http://127.0.0.1:9000/proxy/maps/api/place/textsearch/json?"),
            "unexpected url: {url}"
        );
        assert!(url.as_str().contains("query=a+b"), "query should be encoded: {url}");
    }

    fn app_config(places_api_key: Option<&str>) -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/locintel".to_string(),
            env: locintel_core::Environment::Test,
            bind_addr: "127.0.0.1:3000".parse().expect("socket addr"),
            log_level: "info".to_string(),
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 10,
            places_api_key: places_api_key.map(str::to_string),
            places_request_timeout_secs: 30,
            places_max_retries: 2,
            places_retry_backoff_base_ms: 500,
            sync_max_concurrent_locations: 4,
        }
    }

    #[test]
    fn from_app_config_requires_an_api_key() {
        assert!(PlacesClient::from_app_config(&app_config(None))
            .expect("no key is not an error")
            .is_none());

        let client = PlacesClient::from_app_config(&app_config(Some("k")))
            .expect("client construction should not fail")
            .expect("client expected when key is set");
        assert_eq!(client.max_retries, 2);
        assert_eq!(client.backoff_base_ms, 500);
    }

    #[test]
    fn debug_output_omits_api_key() {
        let client = test_client("https://maps.googleapis.com");
        assert!(!format!("{client:?}").contains("test-key"));
    }
}

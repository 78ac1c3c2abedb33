//! HTTP client for the events API.
//!
//! This module provides the `ApiClient` struct, the production
//! [`RemoteFetcher`] used by the cache repository.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;

use super::wire::SnapshotBody;
use super::{ApiError, EventDto, RemoteFetcher, ScheduleDto};

// ============================================================================
// Constants
// ============================================================================

/// Path of the events snapshot, relative to the base URL
const EVENTS_PATH: &str = "events";

/// Path of the schedule snapshot, relative to the base URL
const SCHEDULE_PATH: &str = "schedule";

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay for rate limiting, doubled on each retry.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a new API client; `timeout` bounds every request end to end
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    /// Override the first rate-limit backoff delay
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// GET a full snapshot list.
    ///
    /// A body that cannot be parsed is an error, never an empty snapshot:
    /// reconciling an empty list would purge the whole local table.
    async fn get_snapshot<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = self
                .client
                .get(&url)
                .header(header::ACCEPT, "application/json")
                .send()
                .await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response.text().await?;
                    let body: SnapshotBody<T> = serde_json::from_str(&text).map_err(|e| {
                        ApiError::InvalidResponse(format!(
                            "{}: {}",
                            e,
                            ApiError::truncate_body(&text)
                        ))
                    })?;
                    let items = body.into_items();
                    debug!(url = %url, count = items.len(), "Snapshot received");
                    return Ok(items);
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl RemoteFetcher for ApiClient {
    async fn fetch_events(&self) -> Result<Vec<EventDto>, ApiError> {
        self.get_snapshot(EVENTS_PATH).await
    }

    async fn fetch_schedule(&self) -> Result<Vec<ScheduleDto>, ApiError> {
        self.get_snapshot(SCHEDULE_PATH).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_initial_backoff(Duration::from_millis(1))
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("https://api.example.com/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/v1");
        assert_eq!(client.url("events"), "https://api.example.com/v1/events");
    }

    #[tokio::test]
    async fn test_fetch_events_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 1,
                    "title": "Opening",
                    "subtitle": "Main stage",
                    "date": "2026-02-06T19:00:00Z",
                    "imageUrl": "https://img.example.com/1.jpg",
                    "videoUrl": "https://video.example.com/1.mp4"
                }
            ])))
            .mount(&server)
            .await;

        let events = client_for(&server).fetch_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Opening");
    }

    #[tokio::test]
    async fn test_fetch_schedule_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schedule"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": 4, "title": "Warmup", "date": "2026-02-07T08:00:00Z"},
                    {"id": 5, "title": "Final", "date": "2026-02-07T18:00:00Z"}
                ]
            })))
            .mount(&server)
            .await;

        let schedule = client_for(&server).fetch_schedule().await.unwrap();
        assert_eq!(schedule.iter().map(|s| s.id).collect::<Vec<_>>(), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_events().await;
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_events().await;
        assert!(matches!(result, Err(ApiError::ServerError(_))));
    }

    #[tokio::test]
    async fn test_rate_limited_gives_up_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schedule"))
            .respond_with(ResponseTemplate::new(429))
            .expect(u64::from(MAX_RATE_LIMIT_RETRIES) + 1)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_schedule().await;
        assert!(matches!(result, Err(ApiError::RateLimited)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 9 of localhost
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = client.fetch_events().await;
        assert!(matches!(
            result,
            Err(ApiError::NetworkError(_)) | Err(ApiError::Timeout)
        ));
    }
}

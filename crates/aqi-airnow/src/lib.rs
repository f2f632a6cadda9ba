//! AirNow observation source
//!
//! Fetches current observations by ZIP code from the AirNow REST API and
//! decodes them into [`ObservationRecord`]s. One request per call, no retry;
//! the API key never appears in logs or error messages.

pub mod wire;

pub use wire::*;

use std::fmt;
use std::time::Duration;

use aqi_config::AirNowConfig;
use aqi_core::{FetchError, FetchResult, ObservationRecord, ObservationSource};
use reqwest::header::ACCEPT;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const AIRNOW_BASE_URL: &str = "https://www.airnowapi.org/aq/observation/zipCode/current/";
pub const DEFAULT_DISTANCE: u32 = 25;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API key not set")]
    MissingApiKey,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] aqi_config::ConfigError),
}

#[derive(Clone)]
pub struct AirNowClient {
    client: Client,
    base_url: Url,
    distance: u32,
    api_key: String,
}

impl fmt::Debug for AirNowClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirNowClient")
            .field("base_url", &self.base_url.as_str())
            .field("distance", &self.distance)
            .field("api_key", &"***")
            .finish()
    }
}

impl AirNowClient {
    pub fn builder() -> AirNowClientBuilder {
        AirNowClientBuilder::default()
    }

    pub fn from_config(config: &AirNowConfig) -> Result<Self, ClientBuildError> {
        Self::builder()
            .base_url(config.base_url()?.as_str())
            .distance(config.distance())
            .timeout(Duration::from_secs(config.timeout_secs()))
            .api_key(config.api_key()?)
            .build()
    }

    /// Fetch current observations for `zip_code`, in source order.
    pub async fn fetch(&self, zip_code: &str) -> FetchResult<Vec<ObservationRecord>> {
        debug!(url = %self.redacted_url(zip_code), "requesting AirNow observations");

        let response = self
            .client
            .get(self.request_url(zip_code, &self.api_key))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadResponse(format!("HTTP {}", status)));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchError::BadResponse("empty body".to_string()));
        }

        let records = decode_observations(&body)?;
        debug!(count = records.len(), zip = zip_code, "decoded observations");
        Ok(records)
    }

    fn request_url(&self, zip_code: &str, api_key: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "application/json")
            .append_pair("zipCode", zip_code)
            .append_pair("distance", &self.distance.to_string())
            .append_pair("API_KEY", api_key);
        url
    }

    /// Request URL with the key masked, for logging
    pub fn redacted_url(&self, zip_code: &str) -> Url {
        self.request_url(zip_code, "***")
    }
}

#[async_trait::async_trait]
impl ObservationSource for AirNowClient {
    fn name(&self) -> &str {
        "airnow"
    }

    async fn fetch(&self, zip_code: &str) -> FetchResult<Vec<ObservationRecord>> {
        AirNowClient::fetch(self, zip_code).await
    }
}

/// reqwest errors carry the request URL, which embeds the key; drop it
/// before the message leaves this crate.
fn transport_error(err: reqwest::Error) -> FetchError {
    let err = err.without_url();
    let mut message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };

    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    FetchError::Transport(message)
}

pub struct AirNowClientBuilder {
    base_url: String,
    distance: u32,
    timeout: Duration,
    api_key: Option<String>,
}

impl Default for AirNowClientBuilder {
    fn default() -> Self {
        Self {
            base_url: AIRNOW_BASE_URL.to_string(),
            distance: DEFAULT_DISTANCE,
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
        }
    }
}

impl AirNowClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search radius in miles
    pub fn distance(mut self, distance: u32) -> Self {
        self.distance = distance;
        self
    }

    /// Whole-request timeout, surfaced as [`FetchError::Transport`]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn build(self) -> Result<AirNowClient, ClientBuildError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ClientBuildError::MissingApiKey)?;
        let base_url = Url::parse(&self.base_url)?;
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(AirNowClient {
            client,
            base_url,
            distance: self.distance,
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AirNowClient {
        AirNowClient::builder()
            .api_key("test-key")
            .build()
            .unwrap()
    }

    #[test]
    fn test_request_url_parameters() {
        let url = client().request_url("10001", "test-key");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("www.airnowapi.org"));
        assert_eq!(url.path(), "/aq/observation/zipCode/current/");
        assert_eq!(
            pairs,
            vec![
                ("format".to_string(), "application/json".to_string()),
                ("zipCode".to_string(), "10001".to_string()),
                ("distance".to_string(), "25".to_string()),
                ("API_KEY".to_string(), "test-key".to_string()),
            ]
        );
    }

    #[test]
    fn test_zip_is_query_encoded() {
        let url = client().request_url("100 01&x=1", "k");
        assert!(url.as_str().contains("zipCode=100+01%26x%3D1"));
    }

    #[test]
    fn test_redaction() {
        let c = client();
        assert!(!c.redacted_url("10001").as_str().contains("test-key"));
        assert!(!format!("{:?}", c).contains("test-key"));
    }

    #[test]
    fn test_builder_requires_key() {
        assert!(matches!(
            AirNowClient::builder().build(),
            Err(ClientBuildError::MissingApiKey)
        ));
        assert!(matches!(
            AirNowClient::builder().api_key(" ").build(),
            Err(ClientBuildError::MissingApiKey)
        ));
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        assert!(matches!(
            AirNowClient::builder()
                .api_key("k")
                .base_url("::nope")
                .build(),
            Err(ClientBuildError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = AirNowConfig {
            base_url: Some("http://127.0.0.1:9/aq/".to_string()),
            distance: Some(40),
            timeout_secs: Some(3),
            api_key: Some("cfg-key".to_string()),
        };
        let c = AirNowClient::from_config(&config).unwrap();
        let url = c.redacted_url("94103");
        assert_eq!(url.port(), Some(9));
        assert!(url.as_str().contains("distance=40"));

        let missing = AirNowConfig::default();
        assert!(matches!(
            AirNowClient::from_config(&missing),
            Err(ClientBuildError::Config(_))
        ));
    }
}

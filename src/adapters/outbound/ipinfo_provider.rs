//! IPInfo Provider
//!
//! Implements LocationProvider using ipinfo.io. Works without a token on
//! the free tier; a token raises the quota.

use super::http_support::{endpoint, fetch_json, DEFAULT_REQUEST_TIMEOUT};
use crate::domain::entities::LocationResult;
use crate::domain::errors::ProviderError;
use crate::domain::ports::LocationProvider;
use crate::domain::value_objects::{ProviderKind, ProviderParams};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://ipinfo.io";
const KIND: ProviderKind = ProviderKind::IpInfo;

/// Raw ipinfo.io response.
#[derive(Debug, Default, Deserialize)]
pub struct IpInfoResponse {
    /// "lat,lon"
    pub loc: Option<String>,
    pub city: Option<String>,
    /// ISO country code
    pub country: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<String>,
    pub org: Option<String>,
    pub error: Option<IpInfoError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IpInfoError {
    pub title: Option<String>,
    pub message: Option<String>,
}

/// ipinfo.io adapter.
pub struct IpInfoProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl IpInfoProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Per-request timeout, overriding any set on the client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Map an ipinfo response onto the common schema.
    pub fn normalize(ip: &str, raw: IpInfoResponse) -> Result<LocationResult, ProviderError> {
        let Some(loc) = raw.loc else {
            return Err(match raw.error.and_then(|e| e.message.or(e.title)) {
                Some(message) => ProviderError::Rejected {
                    provider: KIND,
                    message,
                },
                None => ProviderError::MissingLocation { provider: KIND },
            });
        };

        let (lat, lon) = parse_loc(&loc).ok_or_else(|| ProviderError::Malformed {
            provider: KIND,
            message: format!("invalid loc {:?}", loc),
        })?;

        Ok(LocationResult {
            city: raw.city,
            country: raw.country,
            region: raw.region,
            timezone: raw.timezone,
            org: raw.org,
            ..LocationResult::located(ip, KIND, lat, lon)
        })
    }
}

fn parse_loc(loc: &str) -> Option<(f64, f64)> {
    let (lat, lon) = loc.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    (lat.is_finite() && lon.is_finite()).then_some((lat, lon))
}

#[async_trait]
impl LocationProvider for IpInfoProvider {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn locate(
        &self,
        ip: &str,
        params: &ProviderParams,
    ) -> Result<LocationResult, ProviderError> {
        let url = endpoint(KIND, &self.base_url, &[ip, "json"])?;
        let mut request = self.client.get(url);
        if let Some(token) = params.api_key() {
            request = request.bearer_auth(token);
        }

        let raw: IpInfoResponse = fetch_json(KIND, request, self.timeout).await?;
        Self::normalize(ip, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(json: serde_json::Value) -> IpInfoResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_parse_loc() {
        assert_eq!(parse_loc("37.4056,-122.0775"), Some((37.4056, -122.0775)));
        assert_eq!(parse_loc(" 1.5 , 2.5 "), Some((1.5, 2.5)));
        assert_eq!(parse_loc("37.4"), None);
        assert_eq!(parse_loc("a,b"), None);
        assert_eq!(parse_loc("NaN,1.0"), None);
        assert_eq!(parse_loc("1.0,inf"), None);
    }

    #[test]
    fn test_normalize_success() {
        let raw = parse(serde_json::json!({
            "ip": "8.8.8.8",
            "hostname": "dns.google",
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775",
            "org": "AS15169 Google LLC",
            "timezone": "America/Los_Angeles"
        }));

        let r = IpInfoProvider::normalize("8.8.8.8", raw).unwrap();
        assert_eq!(r.latitude, Some(37.4056));
        assert_eq!(r.longitude, Some(-122.0775));
        assert_eq!(r.country.as_deref(), Some("US"));
        assert_eq!(r.region.as_deref(), Some("California"));
        assert_eq!(r.org.as_deref(), Some("AS15169 Google LLC"));
        assert_eq!(r.provider, Some(ProviderKind::IpInfo));
        assert!(r.error.is_none());
    }

    #[test]
    fn test_normalize_bogon_has_no_location() {
        let raw = parse(serde_json::json!({ "ip": "10.0.0.1", "bogon": true }));
        let err = IpInfoProvider::normalize("10.0.0.1", raw).unwrap_err();
        assert_eq!(err.to_string(), "IPInfo error: location data not available");
    }

    #[test]
    fn test_normalize_provider_error_message() {
        let raw = parse(serde_json::json!({
            "status": 404,
            "error": { "title": "Wrong ip", "message": "Please provide a valid IP address" }
        }));
        let err = IpInfoProvider::normalize("nope", raw).unwrap_err();
        assert_eq!(err.to_string(), "IPInfo error: Please provide a valid IP address");
    }

    #[test]
    fn test_normalize_malformed_loc() {
        let raw = parse(serde_json::json!({ "loc": "somewhere" }));
        let err = IpInfoProvider::normalize("8.8.8.8", raw).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
    }

    #[test]
    fn test_normalize_non_finite_loc() {
        let raw = parse(serde_json::json!({ "loc": "NaN,inf", "city": "Nowhere" }));
        let err = IpInfoProvider::normalize("8.8.8.8", raw).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_locate_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.1.1.1/json"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "city": "Brisbane",
                "country": "AU",
                "loc": "-27.4679,153.0281"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = IpInfoProvider::with_base_url(reqwest::Client::new(), mock_server.uri());
        let r = provider
            .locate("1.1.1.1", &ProviderParams::with_api_key("secret-token"))
            .await
            .unwrap();

        assert_eq!(r.city.as_deref(), Some("Brisbane"));
        assert_eq!(r.latitude, Some(-27.4679));
    }

    #[tokio::test]
    async fn test_locate_without_token_sends_no_auth_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.1.1.1/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "loc": "1.0,2.0"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = IpInfoProvider::with_base_url(reqwest::Client::new(), mock_server.uri());
        provider
            .locate("1.1.1.1", &ProviderParams::default())
            .await
            .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_locate_rate_limited_json_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "title": "Rate limit exceeded" }
            })))
            .mount(&mock_server)
            .await;

        let provider = IpInfoProvider::with_base_url(reqwest::Client::new(), mock_server.uri());
        let err = provider
            .locate("1.1.1.1", &ProviderParams::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "IPInfo error: Rate limit exceeded");
    }
}

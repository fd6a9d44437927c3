//! AbstractAPI Provider
//!
//! Implements LocationProvider using AbstractAPI's IP geolocation endpoint.
//! Requires an API key.

use super::http_support::{endpoint, fetch_json, lenient_f64, DEFAULT_REQUEST_TIMEOUT};
use crate::domain::entities::LocationResult;
use crate::domain::errors::ProviderError;
use crate::domain::ports::LocationProvider;
use crate::domain::value_objects::{ProviderKind, ProviderParams};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://ipgeolocation.abstractapi.com";
const KIND: ProviderKind = ProviderKind::AbstractApi;

/// Raw AbstractAPI response.
#[derive(Debug, Default, Deserialize)]
pub struct AbstractApiResponse {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<AbstractApiTimeZone>,
    pub error: Option<AbstractApiError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AbstractApiTimeZone {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AbstractApiError {
    pub message: Option<String>,
}

/// AbstractAPI adapter.
pub struct AbstractApiProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl AbstractApiProvider {
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

    /// Map an AbstractAPI response onto the common schema.
    pub fn normalize(ip: &str, raw: AbstractApiResponse) -> Result<LocationResult, ProviderError> {
        let (Some(lat), Some(lon)) = (raw.latitude, raw.longitude) else {
            return Err(match raw.error.and_then(|e| e.message) {
                Some(message) => ProviderError::Rejected {
                    provider: KIND,
                    message,
                },
                None => ProviderError::MissingLocation { provider: KIND },
            });
        };

        Ok(LocationResult {
            city: raw.city,
            country: raw.country,
            country_code: raw.country_code,
            region: raw.region,
            timezone: raw.timezone.and_then(|tz| tz.name),
            ..LocationResult::located(ip, KIND, lat, lon)
        })
    }
}

#[async_trait]
impl LocationProvider for AbstractApiProvider {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn locate(
        &self,
        ip: &str,
        params: &ProviderParams,
    ) -> Result<LocationResult, ProviderError> {
        let key = params
            .api_key()
            .ok_or(ProviderError::MissingCredential { provider: KIND })?;

        let mut url = endpoint(KIND, &self.base_url, &["v1", ""])?;
        url.query_pairs_mut()
            .append_pair("api_key", key)
            .append_pair("ip_address", ip);

        let raw: AbstractApiResponse = fetch_json(KIND, self.client.get(url), self.timeout).await?;
        Self::normalize(ip, raw)
    }
}

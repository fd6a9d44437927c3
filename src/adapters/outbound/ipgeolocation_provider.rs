//! IPGeolocation Provider
//!
//! Implements LocationProvider using api.ipgeolocation.io. The API key is
//! optional; coordinates come back as numeric strings.

use super::http_support::{endpoint, fetch_json, lenient_f64, DEFAULT_REQUEST_TIMEOUT};
use crate::domain::entities::LocationResult;
use crate::domain::errors::ProviderError;
use crate::domain::ports::LocationProvider;
use crate::domain::value_objects::{ProviderKind, ProviderParams};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.ipgeolocation.io";
const KIND: ProviderKind = ProviderKind::IpGeolocation;

/// Raw ipgeolocation.io response.
#[derive(Debug, Default, Deserialize)]
pub struct IpGeolocationResponse {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country_name: Option<String>,
    pub country_code2: Option<String>,
    pub state_prov: Option<String>,
    pub time_zone: Option<IpGeolocationTimeZone>,
    pub isp: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IpGeolocationTimeZone {
    pub name: Option<String>,
}

/// ipgeolocation.io adapter.
pub struct IpGeolocationProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl IpGeolocationProvider {
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

    /// Map an ipgeolocation response onto the common schema.
    pub fn normalize(
        ip: &str,
        raw: IpGeolocationResponse,
    ) -> Result<LocationResult, ProviderError> {
        let (Some(lat), Some(lon)) = (raw.latitude, raw.longitude) else {
            return Err(match raw.message {
                Some(message) => ProviderError::Rejected {
                    provider: KIND,
                    message,
                },
                None => ProviderError::MissingLocation { provider: KIND },
            });
        };

        Ok(LocationResult {
            city: raw.city,
            country: raw.country_name,
            country_code: raw.country_code2,
            region: raw.state_prov,
            timezone: raw.time_zone.and_then(|tz| tz.name),
            isp: raw.isp,
            ..LocationResult::located(ip, KIND, lat, lon)
        })
    }
}

#[async_trait]
impl LocationProvider for IpGeolocationProvider {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn locate(
        &self,
        ip: &str,
        params: &ProviderParams,
    ) -> Result<LocationResult, ProviderError> {
        let mut url = endpoint(KIND, &self.base_url, &["ipgeo"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ip", ip);
            if let Some(key) = params.api_key() {
                query.append_pair("apiKey", key);
            }
        }

        let raw: IpGeolocationResponse = fetch_json(KIND, self.client.get(url), self.timeout).await?;
        Self::normalize(ip, raw)
    }
}

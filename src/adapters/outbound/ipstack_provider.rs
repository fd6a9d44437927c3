//! IPStack Provider
//!
//! Implements LocationProvider using api.ipstack.com. Requires an access key.
//! IPStack reports failures with HTTP 200 and an `error` object.

use super::http_support::{endpoint, fetch_json, lenient_f64, DEFAULT_REQUEST_TIMEOUT};
use crate::domain::entities::LocationResult;
use crate::domain::errors::ProviderError;
use crate::domain::ports::LocationProvider;
use crate::domain::value_objects::{ProviderKind, ProviderParams};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://api.ipstack.com";
const KIND: ProviderKind = ProviderKind::IpStack;

/// Raw ipstack.com response.
#[derive(Debug, Default, Deserialize)]
pub struct IpStackResponse {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub region_name: Option<String>,
    pub time_zone: Option<IpStackTimeZone>,
    pub error: Option<IpStackError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IpStackTimeZone {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IpStackError {
    pub code: Option<i64>,
    pub info: Option<String>,
}

/// ipstack.com adapter.
pub struct IpStackProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl IpStackProvider {
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

    /// Map an ipstack response onto the common schema.
    pub fn normalize(ip: &str, raw: IpStackResponse) -> Result<LocationResult, ProviderError> {
        let (Some(lat), Some(lon)) = (raw.latitude, raw.longitude) else {
            return Err(ProviderError::Rejected {
                provider: KIND,
                message: raw
                    .error
                    .and_then(|e| e.info)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        };

        Ok(LocationResult {
            city: raw.city,
            country: raw.country_name,
            country_code: raw.country_code,
            region: raw.region_name,
            timezone: raw.time_zone.and_then(|tz| tz.id),
            ..LocationResult::located(ip, KIND, lat, lon)
        })
    }
}

#[async_trait]
impl LocationProvider for IpStackProvider {
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

        let mut url = endpoint(KIND, &self.base_url, &[ip])?;
        url.query_pairs_mut().append_pair("access_key", key);

        let raw: IpStackResponse = fetch_json(KIND, self.client.get(url), self.timeout).await?;
        Self::normalize(ip, raw)
    }
}

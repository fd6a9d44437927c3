//! IP-API Provider
//!
//! Implements LocationProvider using ip-api.com (free, no API key,
//! 45 requests per minute).

use super::http_support::{endpoint, fetch_json, DEFAULT_REQUEST_TIMEOUT};
use crate::domain::entities::LocationResult;
use crate::domain::errors::ProviderError;
use crate::domain::ports::LocationProvider;
use crate::domain::value_objects::{ProviderKind, ProviderParams};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://ip-api.com";
const KIND: ProviderKind = ProviderKind::IpApi;

/// Raw ip-api.com response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpApiResponse {
    pub status: Option<String>,
    pub message: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region_name: Option<String>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
}

/// ip-api.com adapter.
pub struct IpApiProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl IpApiProvider {
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

    /// Map an ip-api response onto the common schema.
    pub fn normalize(ip: &str, raw: IpApiResponse) -> Result<LocationResult, ProviderError> {
        if raw.status.as_deref() != Some("success") {
            return Err(ProviderError::Rejected {
                provider: KIND,
                message: raw.message.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        let (Some(lat), Some(lon)) = (raw.lat, raw.lon) else {
            return Err(ProviderError::MissingLocation { provider: KIND });
        };

        Ok(LocationResult {
            city: raw.city,
            country: raw.country,
            country_code: raw.country_code,
            region: raw.region_name,
            timezone: raw.timezone,
            isp: raw.isp,
            ..LocationResult::located(ip, KIND, lat, lon)
        })
    }
}

#[async_trait]
impl LocationProvider for IpApiProvider {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn locate(
        &self,
        ip: &str,
        _params: &ProviderParams,
    ) -> Result<LocationResult, ProviderError> {
        let url = endpoint(KIND, &self.base_url, &["json", ip])?;
        let raw: IpApiResponse = fetch_json(KIND, self.client.get(url), self.timeout).await?;
        Self::normalize(ip, raw)
    }
}

use crate::domain::value_objects::{ProviderKind, ProviderParams};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP front-end
    pub listen_addr: String,
    pub service_providers: Vec<String>,
    pub trust_forwarded_for: bool,
    pub cors_enabled: bool,
    pub debug: bool,

    // Outbound lookups
    pub http_timeout_secs: u64,
    pub fallback_delay_ms: u64,

    // Provider credentials
    pub ipinfo_token: Option<String>,
    pub ipgeolocation_api_key: Option<String>,
    pub abstractapi_api_key: Option<String>,
    pub ipstack_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            service_providers: vec!["ip-api".to_string(), "ipinfo".to_string()],
            trust_forwarded_for: true,
            cors_enabled: true,
            debug: false,
            http_timeout_secs: 10,
            fallback_delay_ms: 500,
            ipinfo_token: None,
            ipgeolocation_api_key: None,
            abstractapi_api_key: None,
            ipstack_api_key: None,
        }
    }
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    /// Configured keys, one entry per provider that has one.
    pub fn credentials(&self) -> Vec<(ProviderKind, ProviderParams)> {
        [
            (ProviderKind::IpInfo, &self.ipinfo_token),
            (ProviderKind::IpGeolocation, &self.ipgeolocation_api_key),
            (ProviderKind::AbstractApi, &self.abstractapi_api_key),
            (ProviderKind::IpStack, &self.ipstack_api_key),
        ]
        .into_iter()
        .filter_map(|(kind, key)| {
            key.as_ref()
                .map(|k| (kind, ProviderParams::with_api_key(k.clone())))
        })
        .collect()
    }

    /// Entries of `service_providers` that name no known provider.
    pub fn unknown_service_providers(&self) -> Vec<&str> {
        self.service_providers
            .iter()
            .map(String::as_str)
            .filter(|p| ProviderKind::parse(p).is_none())
            .collect()
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Build a `Config` from any variable source.
pub fn load_config_from<F>(var: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let flag = |key: &str, default: bool| {
        var(key)
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(default)
    };

    let listen_addr = var("GEOLOCATE_LISTEN_ADDR").unwrap_or(defaults.listen_addr);

    let service_providers = var("GEOLOCATE_SERVICE_PROVIDERS")
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|list| !list.is_empty())
        .unwrap_or(defaults.service_providers);

    let trust_forwarded_for = flag("GEOLOCATE_TRUST_FORWARDED_FOR", defaults.trust_forwarded_for);
    let cors_enabled = flag("GEOLOCATE_CORS_ENABLED", defaults.cors_enabled);

    let debug = var("DEBUG").is_some();

    let http_timeout_secs = var("GEOLOCATE_HTTP_TIMEOUT_SECS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.http_timeout_secs);

    let fallback_delay_ms = var("GEOLOCATE_FALLBACK_DELAY_MS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.fallback_delay_ms);

    // Provider credentials; blank values count as unset
    let secret = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    let ipinfo_token = secret("GEOLOCATE_IPINFO_TOKEN");
    let ipgeolocation_api_key = secret("GEOLOCATE_IPGEOLOCATION_API_KEY");
    let abstractapi_api_key = secret("GEOLOCATE_ABSTRACTAPI_API_KEY");
    let ipstack_api_key = secret("GEOLOCATE_IPSTACK_API_KEY");

    Ok(Config {
        listen_addr,
        service_providers,
        trust_forwarded_for,
        cors_enabled,
        debug,
        http_timeout_secs,
        fallback_delay_ms,
        ipinfo_token,
        ipgeolocation_api_key,
        abstractapi_api_key,
        ipstack_api_key,
    })
}

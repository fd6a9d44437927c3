//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Third-party geolocation provider.
///
/// Each variant maps to exactly one outbound adapter. The serialized form
/// is the stable provider identifier used in requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// ip-api.com - free, no key
    #[serde(rename = "ip-api")]
    IpApi,
    /// ipinfo.io - optional bearer token
    #[serde(rename = "ipinfo")]
    IpInfo,
    /// ipgeolocation.io - optional API key
    #[serde(rename = "ipgeolocation")]
    IpGeolocation,
    /// AbstractAPI - API key required
    #[serde(rename = "abstractapi")]
    AbstractApi,
    /// ipstack.com - API key required
    #[serde(rename = "ipstack")]
    IpStack,
}

impl ProviderKind {
    /// All providers, in registration order.
    pub const ALL: [ProviderKind; 5] = [
        Self::IpApi,
        Self::IpInfo,
        Self::IpGeolocation,
        Self::AbstractApi,
        Self::IpStack,
    ];

    /// Parse a provider identifier.
    ///
    /// # Examples
    /// ```
    /// use geolocate::ProviderKind;
    ///
    /// assert_eq!(ProviderKind::parse("ip-api"), Some(ProviderKind::IpApi));
    /// assert_eq!(ProviderKind::parse("nonexistent"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ip-api" => Some(Self::IpApi),
            "ipinfo" => Some(Self::IpInfo),
            "ipgeolocation" => Some(Self::IpGeolocation),
            "abstractapi" => Some(Self::AbstractApi),
            "ipstack" => Some(Self::IpStack),
            _ => None,
        }
    }

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IpApi => "ip-api",
            Self::IpInfo => "ipinfo",
            Self::IpGeolocation => "ipgeolocation",
            Self::AbstractApi => "abstractapi",
            Self::IpStack => "ipstack",
        }
    }

    /// Human-readable name used to prefix error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::IpApi => "IP-API",
            Self::IpInfo => "IPInfo",
            Self::IpGeolocation => "IPGeolocation",
            Self::AbstractApi => "AbstractAPI",
            Self::IpStack => "IPStack",
        }
    }

    /// Whether the provider refuses to answer without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::AbstractApi | Self::IpStack)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-call provider parameters.
///
/// The key is sent the way each provider expects it: a bearer token for
/// ipinfo, a query parameter for the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderParams {
    pub api_key: Option<String>,
}

impl ProviderParams {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    /// The key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

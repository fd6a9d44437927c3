//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the geolocation domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::ProviderKind;
use serde::{Deserialize, Serialize};

/// Normalized location record shared by every provider.
///
/// Built through [`LocationResult::located`] or [`LocationResult::failure`],
/// so a record either carries both coordinates and no error, or only an
/// error. Optional details are filled with struct update syntax:
///
/// ```
/// use geolocate::{LocationResult, ProviderKind};
///
/// let result = LocationResult {
///     city: Some("Mountain View".to_string()),
///     ..LocationResult::located("8.8.8.8", ProviderKind::IpApi, 37.4, -122.0)
/// };
/// assert!(result.is_success());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    /// Adapter that produced the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    /// Provider accepted by the fallback loop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_used: Option<ProviderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocationResult {
    /// A successful lookup with coordinates and no details.
    pub fn located(ip: &str, provider: ProviderKind, latitude: f64, longitude: f64) -> Self {
        Self {
            ip: Some(ip.to_string()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            provider: Some(provider),
            ..Self::default()
        }
    }

    /// A failed lookup carrying only the error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// No error and a latitude: the acceptance rule of the fallback loop.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.latitude.is_some()
    }

    /// Record which provider the fallback loop accepted.
    pub fn with_provider_used(mut self, provider: ProviderKind) -> Self {
        self.provider_used = Some(provider);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_located_sets_coordinates_only() {
        let r = LocationResult::located("1.1.1.1", ProviderKind::IpInfo, -33.49, 143.21);
        assert_eq!(r.ip.as_deref(), Some("1.1.1.1"));
        assert_eq!(r.latitude, Some(-33.49));
        assert_eq!(r.longitude, Some(143.21));
        assert_eq!(r.provider, Some(ProviderKind::IpInfo));
        assert!(r.error.is_none());
        assert!(r.is_success());
    }

    #[test]
    fn test_failure_sets_error_only() {
        let r = LocationResult::failure("All providers failed");
        assert_eq!(r.error.as_deref(), Some("All providers failed"));
        assert!(r.ip.is_none());
        assert!(r.latitude.is_none());
        assert!(r.longitude.is_none());
        assert!(r.provider.is_none());
        assert!(!r.is_success());
    }

    #[test]
    fn test_missing_latitude_is_not_success() {
        let r = LocationResult {
            latitude: None,
            ..LocationResult::located("8.8.8.8", ProviderKind::IpApi, 1.0, 2.0)
        };
        assert!(!r.is_success());
    }

    #[test]
    fn test_with_provider_used() {
        let r = LocationResult::located("8.8.8.8", ProviderKind::IpApi, 1.0, 2.0)
            .with_provider_used(ProviderKind::IpApi);
        assert_eq!(r.provider_used, Some(ProviderKind::IpApi));
    }

    #[test]
    fn test_serialize_omits_absent_fields() {
        let json = serde_json::to_value(LocationResult::failure("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "boom" }));
    }

    #[test]
    fn test_serialize_success() {
        let r = LocationResult {
            city: Some("Mountain View".to_string()),
            ..LocationResult::located("8.8.8.8", ProviderKind::IpApi, 37.4, -122.0)
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["ip"], "8.8.8.8");
        assert_eq!(json["latitude"], 37.4);
        assert_eq!(json["city"], "Mountain View");
        assert_eq!(json["provider"], "ip-api");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let r = LocationResult {
            timezone: Some("America/Chicago".to_string()),
            ..LocationResult::located("8.8.8.8", ProviderKind::IpStack, 37.751, -97.822)
        };
        let json = serde_json::to_string(&r).unwrap();
        let back: LocationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}

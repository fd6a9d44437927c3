//! Shared HTTP plumbing for the provider adapters.

use crate::domain::errors::ProviderError;
use crate::domain::value_objects::ProviderKind;
use reqwest::{RequestBuilder, Url};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Per-request timeout applied by every adapter unless overridden.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build `base_url` + escaped path segments.
///
/// A trailing empty segment produces a trailing slash.
pub(crate) fn endpoint(
    provider: ProviderKind,
    base_url: &str,
    segments: &[&str],
) -> Result<Url, ProviderError> {
    let invalid = |detail: String| ProviderError::Transport {
        provider,
        message: format!("invalid endpoint {}: {}", base_url, detail),
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Send the request and decode the body as JSON.
///
/// Providers report failures inside JSON bodies with 4xx codes, so the body
/// is decoded whatever the status. Only an undecodable body on a non-2xx
/// status is reported as an HTTP rejection.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    provider: ProviderKind,
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, ProviderError> {
    let response = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(provider, e))?;

    serde_json::from_slice(&body).map_err(|e| {
        if status.is_success() {
            ProviderError::Malformed {
                provider,
                message: e.to_string(),
            }
        } else {
            ProviderError::Rejected {
                provider,
                message: format!("HTTP {}", status),
            }
        }
    })
}

fn transport_error(provider: ProviderKind, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout { provider }
    } else {
        ProviderError::Transport {
            provider,
            message: err.to_string(),
        }
    }
}

/// Coordinate that may arrive as a JSON number or a numeric string.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Some(f)),
            Ok(_) => Err(de::Error::custom(format!("non-finite coordinate {:?}", s))),
            Err(e) => Err(de::Error::custom(e)),
        },
        Some(other) => Err(de::Error::custom(format!(
            "expected a coordinate, got {}",
            other
        ))),
    }
}

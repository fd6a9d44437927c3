//! Location Provider Port
//!
//! Defines the interface for resolving an IP address through a
//! third-party geolocation API.

use crate::domain::entities::LocationResult;
use crate::domain::errors::ProviderError;
use crate::domain::value_objects::{ProviderKind, ProviderParams};
use async_trait::async_trait;

/// Outbound port for one geolocation provider.
///
/// Implementations issue a single HTTP request per call, with no retries,
/// and normalize the provider's response into a [`LocationResult`].
/// A returned `Ok` always carries coordinates.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Which provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Look up the location of `ip`.
    async fn locate(
        &self,
        ip: &str,
        params: &ProviderParams,
    ) -> Result<LocationResult, ProviderError>;
}

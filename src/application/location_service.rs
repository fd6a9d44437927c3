//! Location Service - Main application use case
//!
//! Resolves an IP through a named provider, or through an ordered fallback
//! list of providers. This is the primary interface for the inbound adapter
//! and for library callers.

use crate::application::ProviderRegistry;
use crate::domain::entities::LocationResult;
use crate::domain::errors::ProviderError;
use crate::domain::value_objects::{ProviderKind, ProviderParams};
use std::collections::HashMap;
use std::time::Duration;

/// Fallback order used when the caller does not supply one.
pub const DEFAULT_FALLBACK_ORDER: [&str; 3] = ["ip-api", "ipinfo", "ipgeolocation"];

/// Pause between unsuccessful fallback attempts.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(500);

/// Location service - main application use case.
///
/// Every failure is returned as data: the result carries an `error` and no
/// coordinates. Providers are called one at a time, never concurrently.
pub struct LocationService {
    registry: ProviderRegistry,
    credentials: HashMap<ProviderKind, ProviderParams>,
    fallback_delay: Duration,
}

impl LocationService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            credentials: HashMap::new(),
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }

    /// Set the pause between unsuccessful fallback attempts.
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Credentials the fallback loop passes to `kind`.
    pub fn with_credentials(mut self, kind: ProviderKind, params: ProviderParams) -> Self {
        self.credentials.insert(kind, params);
        self
    }

    /// Credentials registered for a provider identifier, or none.
    pub fn credentials_for(&self, provider: &str) -> ProviderParams {
        ProviderKind::parse(provider)
            .and_then(|kind| self.credentials.get(&kind))
            .cloned()
            .unwrap_or_default()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn fallback_delay(&self) -> Duration {
        self.fallback_delay
    }

    /// Resolve `ip` through a single named provider.
    ///
    /// An unknown name fails without any HTTP call. Adapter errors are
    /// logged and converted into an error-bearing result.
    pub async fn resolve(&self, ip: &str, provider: &str, params: &ProviderParams) -> LocationResult {
        let Some(adapter) = self.registry.lookup(provider) else {
            tracing::warn!("unknown provider requested: {}", provider);
            return LocationResult::failure(
                ProviderError::UnknownProvider(provider.to_string()).to_string(),
            );
        };

        match adapter.locate(ip, params).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("error with provider {}: {}", provider, e);
                LocationResult::failure(e.to_string())
            }
        }
    }

    /// Try `providers` in order until one yields a location.
    ///
    /// The first result with no error and a latitude is stamped with the
    /// provider that produced it and returned; later providers are not
    /// called. Each provider gets the credentials registered through
    /// [`with_credentials`](Self::with_credentials). An empty list or an
    /// exhausted one yields `"All providers failed"`.
    pub async fn resolve_with_fallback<S: AsRef<str>>(
        &self,
        ip: &str,
        providers: &[S],
    ) -> LocationResult {
        for (attempt, name) in providers.iter().map(AsRef::as_ref).enumerate() {
            tracing::info!("trying provider: {}", name);

            let kind = ProviderKind::parse(name);
            let params = self.credentials_for(name);

            let result = self.resolve(ip, name, &params).await;
            if let (true, Some(kind)) = (result.is_success(), kind) {
                tracing::debug!("provider {} located {}", name, ip);
                return result.with_provider_used(kind);
            }

            tracing::info!(
                "provider {} failed for {}: {}",
                name,
                ip,
                result.error.as_deref().unwrap_or("no location")
            );

            if attempt + 1 < providers.len() {
                tokio::time::sleep(self.fallback_delay).await;
            }
        }

        tracing::warn!("all providers failed for {}", ip);
        LocationResult::failure(ProviderError::Exhausted.to_string())
    }

    /// [`resolve_with_fallback`](Self::resolve_with_fallback) over
    /// [`DEFAULT_FALLBACK_ORDER`].
    pub async fn resolve_with_default_fallback(&self, ip: &str) -> LocationResult {
        self.resolve_with_fallback(ip, &DEFAULT_FALLBACK_ORDER).await
    }
}

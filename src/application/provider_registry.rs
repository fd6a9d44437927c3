//! Provider Registry
//!
//! Immutable map from provider identifier to adapter, built once at startup.

use crate::domain::ports::LocationProvider;
use crate::domain::value_objects::ProviderKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Registered location providers.
///
/// Registering two adapters of the same kind keeps the last one.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn LocationProvider>>,
}

impl ProviderRegistry {
    pub fn new(providers: impl IntoIterator<Item = Arc<dyn LocationProvider>>) -> Self {
        Self {
            providers: providers.into_iter().map(|p| (p.kind(), p)).collect(),
        }
    }

    /// Adapter for `kind`, if registered.
    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn LocationProvider>> {
        self.providers.get(&kind)
    }

    /// Adapter for a provider identifier such as `"ip-api"`.
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn LocationProvider>> {
        ProviderKind::parse(name).and_then(|kind| self.get(kind))
    }

    /// Registered kinds in canonical order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|k| self.providers.contains_key(k))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::entities::LocationResult;
    use crate::domain::errors::ProviderError;
    use crate::domain::value_objects::ProviderParams;
    use async_trait::async_trait;

    struct StubProvider {
        kind: ProviderKind,
        latitude: f64,
    }

    #[async_trait]
    impl LocationProvider for StubProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn locate(
            &self,
            ip: &str,
            _params: &ProviderParams,
        ) -> Result<LocationResult, ProviderError> {
            Ok(LocationResult::located(ip, self.kind, self.latitude, 0.0))
        }
    }

    fn stub(kind: ProviderKind, latitude: f64) -> Arc<dyn LocationProvider> {
        Arc::new(StubProvider { kind, latitude })
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.lookup("ip-api").is_none());
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = ProviderRegistry::new([
            stub(ProviderKind::IpApi, 1.0),
            stub(ProviderKind::IpInfo, 2.0),
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.lookup("ipinfo").map(|p| p.kind()),
            Some(ProviderKind::IpInfo)
        );
        assert!(registry.lookup("ipstack").is_none());
        assert!(registry.lookup("nonexistent").is_none());
    }

    #[test]
    fn test_kinds_in_canonical_order() {
        let registry = ProviderRegistry::new([
            stub(ProviderKind::IpStack, 0.0),
            stub(ProviderKind::IpApi, 0.0),
            stub(ProviderKind::IpGeolocation, 0.0),
        ]);

        assert_eq!(
            registry.kinds(),
            vec![
                ProviderKind::IpApi,
                ProviderKind::IpGeolocation,
                ProviderKind::IpStack
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_kind_keeps_last() {
        let registry = ProviderRegistry::new([
            stub(ProviderKind::IpApi, 1.0),
            stub(ProviderKind::IpApi, 2.0),
        ]);

        assert_eq!(registry.len(), 1);
        let r = registry
            .get(ProviderKind::IpApi)
            .unwrap()
            .locate("8.8.8.8", &ProviderParams::default())
            .await
            .unwrap();
        assert_eq!(r.latitude, Some(2.0));
    }

    #[test]
    fn test_http_providers_cover_every_kind() {
        let registry = ProviderRegistry::new(crate::adapters::outbound::http_providers(
            reqwest::Client::new(),
            crate::adapters::outbound::DEFAULT_REQUEST_TIMEOUT,
        ));
        assert_eq!(registry.kinds(), ProviderKind::ALL.to_vec());
    }

    #[test]
    fn test_debug_lists_kinds() {
        let registry = ProviderRegistry::new([stub(ProviderKind::IpApi, 0.0)]);
        assert!(format!("{:?}", registry).contains("IpApi"));
    }
}

mod abstractapi_provider;
mod http_support;
mod ip_api_provider;
mod ipgeolocation_provider;
mod ipinfo_provider;
mod ipstack_provider;

pub use http_support::DEFAULT_REQUEST_TIMEOUT;
pub use abstractapi_provider::{AbstractApiProvider, AbstractApiResponse};
pub use ip_api_provider::{IpApiProvider, IpApiResponse};
pub use ipgeolocation_provider::{IpGeolocationProvider, IpGeolocationResponse};
pub use ipinfo_provider::{IpInfoProvider, IpInfoResponse};
pub use ipstack_provider::{IpStackProvider, IpStackResponse};

use crate::domain::ports::LocationProvider;
use std::sync::Arc;
use std::time::Duration;

/// One adapter per supported provider, all sharing `client`.
///
/// Every request is bounded by `timeout`, whatever the client's own settings.
pub fn http_providers(client: reqwest::Client, timeout: Duration) -> Vec<Arc<dyn LocationProvider>> {
    vec![
        Arc::new(IpApiProvider::new(client.clone()).with_timeout(timeout)),
        Arc::new(IpInfoProvider::new(client.clone()).with_timeout(timeout)),
        Arc::new(IpGeolocationProvider::new(client.clone()).with_timeout(timeout)),
        Arc::new(AbstractApiProvider::new(client.clone()).with_timeout(timeout)),
        Arc::new(IpStackProvider::new(client).with_timeout(timeout)),
    ]
}

//! geolocate Library
//!
//! IP geolocation over several third-party providers with ordered fallback,
//! exposed for the binary, integration tests and library use.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::{ApiServer, ApiState};
pub use adapters::outbound::http_providers;
pub use application::{LocationService, ProviderRegistry};
pub use config::{load_config, Config};
pub use domain::entities::LocationResult;
pub use domain::errors::ProviderError;
pub use domain::ports::LocationProvider;
pub use domain::value_objects::{ProviderKind, ProviderParams};

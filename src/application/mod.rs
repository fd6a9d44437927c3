//! Application Layer
//!
//! Use cases built on the domain ports.

mod location_service;
mod provider_registry;

pub use location_service::{LocationService, DEFAULT_FALLBACK_DELAY, DEFAULT_FALLBACK_ORDER};
pub use provider_registry::ProviderRegistry;

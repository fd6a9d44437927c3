//! Domain Layer
//!
//! Entities, value objects, errors and the outbound ports the application
//! layer depends on.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod value_objects;

pub use entities::LocationResult;
pub use errors::ProviderError;
pub use value_objects::{ProviderKind, ProviderParams};

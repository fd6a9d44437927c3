mod location_provider;

pub use location_provider::LocationProvider;

mod api_server;
mod lookup_command;

pub use api_server::{
    client_ip, router, ApiError, ApiServer, ApiState, GeolocateRequest, GeolocateResponse,
    HealthResponse, DEFAULT_SERVICE_PROVIDERS,
};
pub use lookup_command::{run_lookup, LookupReport};

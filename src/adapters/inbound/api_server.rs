//! Geolocation API Server
//!
//! Thin HTTP front-end over `LocationService`: resolves the supplied IP, or
//! the caller's own address, through a fixed fallback list.

use crate::application::LocationService;
use crate::domain::entities::LocationResult;
use crate::domain::value_objects::ProviderKind;
use crate::infrastructure::shutdown_signal;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Providers the endpoint falls back across by default: the two keyless ones.
pub const DEFAULT_SERVICE_PROVIDERS: [&str; 2] = ["ip-api", "ipinfo"];

/// Geolocation request, from the query string or a JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeolocateRequest {
    #[serde(default)]
    pub ip: Option<String>,
}

/// Geolocation response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeolocateResponse {
    Located {
        success: bool,
        ip: Option<String>,
        latitude: f64,
        longitude: f64,
        city: Option<String>,
        country: Option<String>,
        region: Option<String>,
        timezone: Option<String>,
        provider: Option<ProviderKind>,
        #[serde(skip_serializing_if = "Option::is_none")]
        country_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        isp: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        org: Option<String>,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl From<LocationResult> for GeolocateResponse {
    fn from(result: LocationResult) -> Self {
        match (result.error, result.latitude, result.longitude) {
            (None, Some(latitude), Some(longitude)) => Self::Located {
                success: true,
                ip: result.ip,
                latitude,
                longitude,
                city: result.city,
                country: result.country,
                region: result.region,
                timezone: result.timezone,
                provider: result.provider,
                country_code: result.country_code,
                isp: result.isp,
                org: result.org,
            },
            (error, _, _) => Self::Failed {
                success: false,
                error: error.unwrap_or_else(|| "Location data not available".to_string()),
            },
        }
    }
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Front-end failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no IP address supplied and client address unavailable")]
    MissingAddress,

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingAddress | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(serde_json::json!({
                "success": false,
                "error": self.to_string()
            })),
        )
            .into_response()
    }
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<LocationService>,
    /// Fallback list used for every request
    pub providers: Arc<Vec<String>>,
    /// Take the caller's address from `X-Forwarded-For` when present
    pub trust_forwarded_for: bool,
}

impl ApiState {
    pub fn new(service: Arc<LocationService>) -> Self {
        Self {
            service,
            providers: Arc::new(
                DEFAULT_SERVICE_PROVIDERS
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
            ),
            trust_forwarded_for: true,
        }
    }

    pub fn with_providers(mut self, providers: Vec<String>) -> Self {
        self.providers = Arc::new(providers);
        self
    }

    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

/// Caller address: the first `X-Forwarded-For` entry when trusted and
/// present, otherwise the socket peer.
///
/// The header is client-controlled; nothing here checks that it came from
/// a trusted proxy.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> Option<String> {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }
    peer.map(|addr| addr.ip().to_string())
}

/// Build the router with all routes and layers.
pub fn router(state: ApiState, cors_enabled: bool) -> Router {
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/geolocate", get(geolocate_get_handler).post(geolocate_post_handler))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response));

    // outside catch-panic, so panic responses carry CORS headers as well
    let app = if cors_enabled {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}

/// API Server for geolocation lookups.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
    cors_enabled: bool,
}

impl ApiServer {
    pub fn new(listen_addr: String, state: ApiState) -> Self {
        Self {
            listen_addr,
            state,
            cors_enabled: true,
        }
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    pub fn state(&self) -> ApiState {
        self.state.clone()
    }

    /// Run the API server until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.state.clone(), self.cors_enabled);

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("geolocation API listening on {}", self.listen_addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("geolocation API stopped");
        Ok(())
    }
}

// Handler functions

async fn index_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "IP Geolocation API",
        "endpoints": {
            "/geolocate": "GET or POST with ip parameter",
            "/health": "Health check"
        },
        "providers": state.providers.as_slice(),
        "example": {
            "url": "/geolocate?ip=8.8.8.8",
            "response": {
                "success": true,
                "ip": "8.8.8.8",
                "latitude": 37.751,
                "longitude": -97.822,
                "city": "Mountain View",
                "country": "United States"
            }
        }
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "geolocation",
    })
}

async fn geolocate_get_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Query(req): Query<GeolocateRequest>,
) -> Result<Json<GeolocateResponse>, ApiError> {
    geolocate(&state, req.ip, &headers, peer.map(|ConnectInfo(addr)| addr)).await
}

async fn geolocate_post_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> Result<Json<GeolocateResponse>, ApiError> {
    let supplied = parse_post_body(&body)?.ip;
    geolocate(&state, supplied, &headers, peer.map(|ConnectInfo(addr)| addr)).await
}

/// Decode a POST body as JSON whatever its content type.
///
/// Only an empty body means "no IP supplied".
fn parse_post_body(body: &[u8]) -> Result<GeolocateRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GeolocateRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

async fn geolocate(
    state: &ApiState,
    supplied: Option<String>,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
) -> Result<Json<GeolocateResponse>, ApiError> {
    let ip = supplied
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| client_ip(headers, peer, state.trust_forwarded_for))
        .ok_or(ApiError::MissingAddress)?;

    tracing::info!("geolocating IP: {}", ip);

    let result = state
        .service
        .resolve_with_fallback(&ip, state.providers.as_slice())
        .await;

    Ok(Json(result.into()))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal server error".to_string()
    };

    tracing::error!("geolocation error: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "success": false,
            "error": detail
        })),
    )
        .into_response()
}

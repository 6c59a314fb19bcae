//! Router configuration for the image server.
//!
//! This module defines the HTTP routes and applies middleware for CORS and
//! request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /health                              - Health check
//! /v1/{bucket}/{object}[/=s{N}]        - Image endpoint
//! /v2/{bucket}/{object}[/=s{N}]        - Image endpoint (same behavior)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use image_serve::codec::RasterCodec;
//! use image_serve::resize::{NamingConfig, ResizeService};
//! use image_serve::server::routes::{create_router, RouterConfig};
//!
//! let service = ResizeService::new(store, RasterCodec::new(), NamingConfig::new());
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{empty_path_handler, health_handler, image_handler, AppState};
use crate::codec::ImageCodec;
use crate::io::BlobStore;
use crate::resize::ResizeService;

/// API versions mounted by the router. Every version shares one handler.
pub const API_VERSIONS: [&str; 2] = ["v1", "v2"];

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: 3600,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Mounts the health check and the image endpoint under every entry of
/// [`API_VERSIONS`], then applies CORS and (optionally) request tracing.
///
/// `/{version}/` with nothing after it is rejected as a bad request instead
/// of falling through to a 404.
pub fn create_router<B, C>(resize_service: ResizeService<B, C>, config: RouterConfig) -> Router
where
    B: BlobStore + 'static,
    C: ImageCodec + 'static,
{
    let app_state = AppState::with_cache_max_age(resize_service, config.cache_max_age);
    let cors = build_cors_layer(&config);

    let mut router = Router::new().route("/health", get(health_handler));
    for version in API_VERSIONS {
        router = router
            .route(&format!("/{}/", version), get(empty_path_handler))
            .route(&format!("/{}/{{*path}}", version), get(image_handler::<B, C>));
    }

    let router = router.with_state(app_state).layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

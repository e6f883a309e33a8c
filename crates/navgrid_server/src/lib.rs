//! HTTP server wiring for navgrid (API, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for navigation, links, settings, and health.
pub mod handlers;
/// Sliding-window rate limiter shared by all handlers.
pub mod limiter;

pub use error::ApiError;
pub use limiter::RateLimiter;
pub use navgrid_core::{config, constants, models, store, Config, NavStore};

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<NavStore>,
    pub config: Arc<Config>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Construct shared application state, building the rate limiter from
    /// the configured window.
    pub fn new(config: Config, store: NavStore) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        ));
        Self::with_limiter(config, store, limiter)
    }

    /// Construct shared application state with a pre-built rate limiter.
    pub fn with_limiter(config: Config, store: NavStore, limiter: Arc<RateLimiter>) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            limiter,
        }
    }
}

/// Rewrite preflight responses to `204 No Content`.
///
/// The CORS layer answers every `OPTIONS` request itself with an empty 200
/// before the router sees it; this sits outside that layer and adjusts the
/// status to the documented preflight contract.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Create the application router with all routes and middleware.
///
/// CORS is permissive by design: the API serves a public static front end,
/// and every response carries CORS headers. `OPTIONS` requests are answered
/// by the CORS layer and never reach the route handlers.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86400));

    Router::new()
        .route(
            "/api/health",
            get(handlers::health::health).fallback(handlers::health_method_not_allowed),
        )
        .route(
            "/api/navigation",
            get(handlers::navigation::get_navigation)
                .post(handlers::navigation::save_navigation)
                .fallback(handlers::navigation_method_not_allowed),
        )
        .route(
            "/api/links",
            post(handlers::links::add_link).fallback(handlers::links_method_not_allowed),
        )
        .route(
            "/api/links/:id",
            delete(handlers::links::delete_link).fallback(handlers::link_id_method_not_allowed),
        )
        .route(
            "/api/settings",
            get(handlers::settings::get_settings)
                .post(handlers::settings::save_settings)
                .fallback(handlers::settings_method_not_allowed),
        )
        .with_state(state.clone())
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(state.config.max_body_size))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(middleware::from_fn(preflight_no_content))
                .layer(cors),
        )
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is
/// disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

/// Run the Axum server with graceful shutdown support.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::resolve_bind_address;
    use navgrid_core::Config;
    use std::net::SocketAddr;

    fn test_config(port: u16) -> Config {
        Config {
            kv_path: None,
            port,
            auth_keys: vec![],
            rate_limit_max: 60,
            rate_limit_window_secs: 60,
            max_body_size: 1024,
        }
    }

    #[test]
    fn resolve_bind_address_enforces_loopback_when_public_access_disabled() {
        std::env::set_var("BIND", "0.0.0.0:4040");
        let resolved = resolve_bind_address(&test_config(4040), false);
        assert_eq!(resolved.ip().to_string(), "127.0.0.1");
        assert_eq!(resolved.port(), 4040);
        std::env::remove_var("BIND");
    }

    #[test]
    fn resolve_bind_address_defaults_to_configured_port() {
        let resolved = resolve_bind_address(&test_config(4041), false);
        assert_eq!(resolved, SocketAddr::from(([127, 0, 0, 1], 4041)));
    }
}

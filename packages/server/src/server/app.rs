//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::middleware::{
    api_key_middleware, security_headers_middleware, signed_request_middleware,
    API_KEY_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use crate::server::routes::{
    health_handler, list_jobs_handler, list_schedules_handler, sync_jobs_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: ServerDeps,
}

/// Keys guarding the API.
#[derive(Clone)]
pub struct ApiKeys {
    /// Shared secret for signed read requests.
    pub api_key: Arc<str>,
    /// Key for the sync trigger.
    pub cron_api_key: Arc<str>,
}

impl ApiKeys {
    pub fn new(api_key: &str, cron_api_key: &str) -> Self {
        Self {
            api_key: Arc::from(api_key),
            cron_api_key: Arc::from(cron_api_key),
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(API_KEY_HEADER),
            HeaderName::from_static(TIMESTAMP_HEADER),
            HeaderName::from_static(SIGNATURE_HEADER),
        ])
        .max_age(Duration::from_secs(600));

    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring malformed allowed origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

/// Build the Axum application router
///
/// `/health` is public. Read endpoints require a signed request; the sync
/// trigger only requires the cron key.
pub fn build_app(deps: ServerDeps, keys: ApiKeys, allowed_origins: &[String]) -> Router {
    let app_state = AppState {
        db_pool: deps.db_pool.clone(),
        deps,
    };

    let signed_key = keys.api_key.clone();
    let read_routes = Router::new()
        .route("/api/jobs", get(list_jobs_handler))
        .route("/api/schedules", get(list_schedules_handler))
        .route_layer(middleware::from_fn(move |req, next| {
            signed_request_middleware(signed_key.clone(), req, next)
        }));

    let cron_key = keys.cron_api_key.clone();
    let sync_routes = Router::new()
        .route("/api/jobs/sync", post(sync_jobs_handler))
        .route_layer(middleware::from_fn(move |req, next| {
            api_key_middleware(cron_key.clone(), req, next)
        }));

    Router::new()
        .route("/health", get(health_handler))
        .merge(read_routes)
        .merge(sync_routes)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(Extension(app_state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

//! HTTP entry point: the route tree wrapped in the server middleware.
//!
//! `main.rs` and the integration tests both go through [`build_app_router`],
//! so requests in tests see the same request ids, tracing and timeouts as
//! production traffic.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Methods the API routes answer to. PUT is not routed.
const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];

/// Assemble the application: `/health` at the root, the API under `/api/v1`.
///
/// Middleware runs in the order listed in the [`ServiceBuilder`], outermost
/// first. CORS answers preflights before a request id is assigned, and a
/// panicking handler still produces a traced 500 carrying the request id.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CatchPanicLayer::new());

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(middleware)
        // CORS stays outermost; it is applied as its own router layer so it
        // wraps axum's boxed body, which satisfies its `Default` bound.
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

/// CORS for the configured origins. Entries that are not valid header values
/// are logged and skipped; with none left, no cross-origin request is allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_origins(origins)))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_origins_are_skipped() {
        let origins = vec![
            "http://localhost:5173".to_string(),
            "http://bad\norigin".to_string(),
            "https://yamdb.example".to_string(),
        ];
        let parsed = parse_origins(&origins);
        assert_eq!(
            parsed,
            vec![
                HeaderValue::from_static("http://localhost:5173"),
                HeaderValue::from_static("https://yamdb.example"),
            ]
        );
    }

    #[test]
    fn no_origins_yields_empty_list() {
        assert!(parse_origins(&[]).is_empty());
    }
}

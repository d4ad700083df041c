use crate::config::AppState;
use crate::middleware::error_pages::error_pages;
use axum::http::header::CONTENT_SECURITY_POLICY;
use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{compression::CompressionLayer, set_header::SetResponseHeaderLayer, trace};

const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'self'; img-src 'self' data:";

/// Configures middleware for the application
///
/// Error responses are turned into pages first. Every response is then
/// compressed, given a Content-Security-Policy and traced. Cookies are parsed
/// for the handlers, which forward them to the API.
///
/// # Parameters
/// - `app` - The application to configure the middleware for
/// - `app_state` - Shared application state, used by the error pages
///
/// # Returns
/// The application with the configured middleware
pub fn configure_middleware(app: Router, app_state: Arc<AppState>) -> Router {
    app.layer(from_fn_with_state(app_state, error_pages))
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
        ))
        .layer(
            ServiceBuilder::new().layer(
                trace::TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new())
                    .on_response(trace::DefaultOnResponse::new()),
            ),
        )
        .layer(CookieManagerLayer::new())
}

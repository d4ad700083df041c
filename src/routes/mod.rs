pub mod middleware;
pub mod site_routes;

use crate::config::AppState;
use crate::controllers::site_handler::handler_404;
use axum::Router;
use std::sync::Arc;

/// Builds the complete application: site routes mounted under the configured
/// prefix, wrapped in the error-page and HTTP middleware.
pub fn build_app(app_state: Arc<AppState>) -> Router {
    let routes = site_routes::get_routes(app_state.clone());
    let prefix = app_state.settings.prefix.trim_end_matches('/');

    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };

    middleware::configure_middleware(app.fallback(handler_404), app_state)
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::debug_handler;

#[debug_handler]
/// Fall back handler
///
/// This function is a handler for requests that do not match any other route.
///
/// # Returns
/// `Response` with a status code of 404 Not Found.
pub async fn handler_404() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

#[debug_handler]
/// Health check handler
///
/// Answers `200 OK` with no body and never calls the API.
pub async fn health_check() -> Response {
    StatusCode::OK.into_response()
}

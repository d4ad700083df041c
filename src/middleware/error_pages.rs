use crate::config::AppState;
use crate::controllers::app_error::ErrorReport;
use crate::models::error_model::FieldErrors;
use askama::Template;
use axum::extract::{Request, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

const PROBLEM_JSON: &str = "application/problem+json";

/// An RFC 7807 problem body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProblemError {
    title: String,
    detail: String,
    validation_errors: FieldErrors,
}

#[derive(Template, Debug)]
#[template(path = "error.html")]
struct ErrorTemplate {
    prefix: String,
    sirius_url: String,
    code: u16,
    error: String,
    correlation_id: String,
}

/// Turns failed handler responses into something a user or script can act on
///
/// Responses carrying an [`ErrorReport`] are replaced with:
/// - a redirect to the sign-in page when the API rejected the user's credentials
/// - an `application/problem+json` body when the request accepts JSON
/// - the HTML error page otherwise
///
/// Every other response passes through untouched.
pub async fn error_pages(
    State(app_state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let wants_json = req
        .headers()
        .get(ACCEPT)
        .is_some_and(|accept| accept == "application/json");

    let mut response = next.run(req).await;

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    let settings = &app_state.settings;

    if report.unauthorized {
        let location = format!(
            "{}/auth?redirect={}",
            settings.sirius_public_url,
            urlencoding::encode(&path)
        );
        return (StatusCode::FOUND, [(LOCATION, location)]).into_response();
    }

    if wants_json {
        let (detail, validation_errors) = match report.validation {
            Some(validation) => (validation.detail, validation.field),
            None => (String::new(), FieldErrors::new()),
        };

        let mut response = (
            report.status,
            Json(ProblemError {
                title: report.title,
                detail,
                validation_errors,
            }),
        )
            .into_response();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        return response;
    }

    let template = ErrorTemplate {
        prefix: settings.prefix.clone(),
        sirius_url: settings.sirius_public_url.clone(),
        code: report.status.as_u16(),
        error: report.title,
        correlation_id: report.correlation_id,
    };

    match template.render() {
        Ok(html) => (report.status, Html(html)).into_response(),
        Err(e) => {
            error!("could not render error page: {}", e);
            report.status.into_response()
        }
    }
}

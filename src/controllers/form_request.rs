use crate::client::RequestContext;
use crate::config::AppState;
use crate::controllers::app_error::AppError;
use crate::forms::FormValues;
use axum::body::to_bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::Method;
use std::sync::Arc;
use tower_cookies::Cookies;

const XSRF_COOKIE: &str = "XSRF-TOKEN";
const XSRF_FIELD: &str = "xsrfToken";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Upper bound on a posted form body.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// A page request: its method, the caller's credentials and its parameters.
///
/// The query string is always decoded. The body is decoded only for
/// non-GET requests sent as `application/x-www-form-urlencoded`.
///
/// # Fields
/// - `method` - The request method
/// - `context` - Cookies and XSRF token forwarded to the API
/// - `form` - Query and posted parameters
#[derive(Debug)]
pub struct FormRequest {
    pub method: Method,
    pub context: RequestContext,
    pub form: FormValues,
}

impl FormRequest {
    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }
}

impl FromRequest<Arc<AppState>> for FormRequest {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let cookies = Cookies::from_request_parts(&mut parts, state)
            .await
            .map_err(|(_, message)| AppError::Internal(message.to_string()))?;

        let is_form = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));

        let body = if parts.method != Method::GET && is_form {
            let bytes = to_bytes(body, MAX_BODY_BYTES)
                .await
                .map_err(|err| AppError::BadRequest(err.to_string()))?;
            Some(bytes)
        } else {
            None
        };

        let query = parts.uri.query().unwrap_or_default();
        let form = state.decoder.decode_request(query.as_bytes(), body.as_deref())?;

        let xsrf_token = if parts.method == Method::GET {
            cookies
                .get(XSRF_COOKIE)
                .map(|cookie| {
                    urlencoding::decode(cookie.value())
                        .map(|token| token.into_owned())
                        .unwrap_or_else(|_| cookie.value().to_string())
                })
                .unwrap_or_default()
        } else {
            form.value(XSRF_FIELD).unwrap_or_default().to_string()
        };

        let cookie_header = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");

        Ok(Self {
            method: parts.method,
            context: RequestContext {
                cookies: cookie_header,
                xsrf_token,
            },
            form,
        })
    }
}

use crate::client::ClientError;
use crate::forms::FormError;
use crate::models::case_model::CaseErr;
use crate::models::error_model::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// An enumeration of errors a page handler can fail with
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Case(#[from] CaseErr),
    #[error("could not render page: {0}")]
    Template(#[from] askama::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

/// What went wrong with a request, attached to the bare error response and
/// turned into a page by the error-page middleware.
///
/// # Fields
/// - `status` - Status the error page is served with
/// - `title` - The error message
/// - `correlation_id` - Upstream correlation id, empty when there is none
/// - `unauthorized` - The API rejected the user's credentials
/// - `validation` - Field errors, when the API rejected the submitted data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub title: String,
    pub correlation_id: String,
    pub unauthorized: bool,
    pub validation: Option<ValidationError>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Client(err) => err.status(),
            AppError::Form(_) | AppError::Case(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Template(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn report(&self) -> ErrorReport {
        let (unauthorized, correlation_id, validation) = match self {
            AppError::Client(err) => (
                err.is_unauthorized(),
                err.correlation_id().unwrap_or_default().to_string(),
                match err {
                    ClientError::Validation(validation) => Some(validation.clone()),
                    _ => None,
                },
            ),
            _ => (false, String::new(), None),
        };

        ErrorReport {
            status: self.status(),
            title: self.to_string(),
            correlation_id,
            unauthorized,
            validation,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = self.report();

        if report.status.is_server_error() {
            error!("{}", self);
        }

        let mut response = report.status.into_response();
        response.extensions_mut().insert(report);
        response
    }
}

mod http_client;

#[cfg(test)]
pub(crate) mod fake;

pub use http_client::HttpCaseClient;

use crate::models::case_model::{Case, CaseAllocation, CaseType, Team};
use crate::models::complaint_model::Complaint;
use crate::models::error_model::ValidationError;
use crate::models::payment_model::{FeeReduction, Payment};
use crate::models::ref_data_model::RefDataItem;
use crate::models::search_model::{DeletedCase, SearchResponse};
use crate::types::{ApiStatusCode, DateString, Pence};
use async_trait::async_trait;
use axum::http::StatusCode;

/// Credentials of the user on whose behalf the API is called.
///
/// # Fields
/// - `cookies` - The inbound `Cookie` header, forwarded as is
/// - `xsrf_token` - Token sent as `X-XSRF-TOKEN`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub cookies: String,
    pub xsrf_token: String,
}

/// An enumeration of errors returned by a [`CaseClient`]
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{method} {url} returned {code}")]
    Status {
        code: ApiStatusCode,
        method: String,
        url: String,
        correlation_id: String,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request to the case-management API failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Status { code, .. } if code.0 == StatusCode::UNAUTHORIZED.as_u16()
        )
    }

    /// The status the failed page should be served with.
    pub fn status(&self) -> StatusCode {
        match self {
            ClientError::Status { code, .. } => code.as_status_code(),
            ClientError::Validation(_) | ClientError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ClientError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            ClientError::Status { correlation_id, .. } if !correlation_id.is_empty() => {
                Some(correlation_id)
            }
            _ => None,
        }
    }
}

/// The case-management API as seen by the page handlers.
///
/// Every call takes the [`RequestContext`] of the inbound request. A `400`
/// from the API comes back as [`ClientError::Validation`] so that forms can be
/// re-rendered with field messages.
#[async_trait]
pub trait CaseClient: Send + Sync {
    async fn case(&self, ctx: &RequestContext, id: i64) -> Result<Case, ClientError>;

    async fn payments(
        &self,
        ctx: &RequestContext,
        case_id: i64,
    ) -> Result<Vec<Payment>, ClientError>;

    async fn payment_by_id(&self, ctx: &RequestContext, id: i64) -> Result<Payment, ClientError>;

    async fn ref_data_by_category(
        &self,
        ctx: &RequestContext,
        category: &str,
    ) -> Result<Vec<RefDataItem>, ClientError>;

    async fn add_payment(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        amount: Pence,
        source: &str,
        payment_date: &DateString,
    ) -> Result<(), ClientError>;

    async fn apply_fee_reduction(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        reduction: &FeeReduction,
    ) -> Result<(), ClientError>;

    async fn edit_payment(
        &self,
        ctx: &RequestContext,
        payment_id: i64,
        reduction: &FeeReduction,
    ) -> Result<(), ClientError>;

    async fn delete_payment(
        &self,
        ctx: &RequestContext,
        payment_id: i64,
    ) -> Result<(), ClientError>;

    async fn complaint(&self, ctx: &RequestContext, id: i64) -> Result<Complaint, ClientError>;

    async fn add_complaint(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        case_type: CaseType,
        complaint: &Complaint,
    ) -> Result<(), ClientError>;

    async fn edit_complaint(
        &self,
        ctx: &RequestContext,
        id: i64,
        complaint: &Complaint,
    ) -> Result<(), ClientError>;

    async fn teams(&self, ctx: &RequestContext) -> Result<Vec<Team>, ClientError>;

    async fn allocate_cases(
        &self,
        ctx: &RequestContext,
        assignee_id: i64,
        allocations: &[CaseAllocation],
    ) -> Result<(), ClientError>;

    async fn search(
        &self,
        ctx: &RequestContext,
        term: &str,
        page: u32,
        person_types: &[String],
    ) -> Result<SearchResponse, ClientError>;

    async fn deleted_cases(
        &self,
        ctx: &RequestContext,
        uid: &str,
    ) -> Result<Vec<DeletedCase>, ClientError>;
}

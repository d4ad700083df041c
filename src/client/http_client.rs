use super::{CaseClient, ClientError, RequestContext};
use crate::models::case_model::{Case, CaseAllocation, CaseType, Team};
use crate::models::complaint_model::Complaint;
use crate::models::error_model::ValidationError;
use crate::models::payment_model::{FeeReduction, Payment};
use crate::models::ref_data_model::RefDataItem;
use crate::models::search_model::{
    DeletedCase, SearchResponse, ALL_PERSON_TYPES, MIN_TERM_LENGTH, SEARCH_PAGE_SIZE,
};
use crate::types::{ApiStatusCode, DateString, Pence};
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;
use url::form_urlencoded;

const CORRELATION_ID: &str = "Correlation-Id";
const XSRF_HEADER: &str = "X-XSRF-TOKEN";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    term: &'a str,
    person_types: Vec<&'a str>,
    size: u32,
    from: u32,
}

#[derive(Debug, Serialize)]
struct AllocationRequest<'a> {
    data: &'a [CaseAllocation],
}

/// JSON over HTTP implementation of [`CaseClient`].
#[derive(Debug, Clone)]
pub struct HttpCaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCaseClient {
    /// Creates a client for the API at `base_url`.
    ///
    /// # Errors
    /// Fails when the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, ctx: &RequestContext, method: Method, path: &str) -> RequestBuilder {
        trace!("{} {}{}", method, self.base_url, path);

        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(XSRF_HEADER, &ctx.xsrf_token);

        if ctx.cookies.is_empty() {
            builder
        } else {
            builder.header(COOKIE, &ctx.cookies)
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = self.request(ctx, Method::GET, path).send().await?;

        if response.status() != StatusCode::OK {
            return Err(status_error(Method::GET, &response));
        }

        Ok(response.json().await?)
    }

    /// Sends a request with an optional JSON body, accepting any status in `accepted`.
    async fn send<B>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<&B>,
        accepted: &[StatusCode],
    ) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut builder = self.request(ctx, method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::BAD_REQUEST && method != Method::DELETE {
            let validation: ValidationError = response.json().await?;
            return Err(ClientError::Validation(validation));
        }

        if !accepted.contains(&status) {
            return Err(status_error(method, &response));
        }

        Ok(response)
    }

    async fn post<B>(&self, ctx: &RequestContext, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(
            ctx,
            Method::POST,
            path,
            Some(body),
            &[StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT],
        )
        .await?;
        Ok(())
    }

    async fn put<B>(&self, ctx: &RequestContext, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(ctx, Method::PUT, path, Some(body), &[StatusCode::OK, StatusCode::NO_CONTENT])
            .await?;
        Ok(())
    }
}

fn status_error(method: Method, response: &Response) -> ClientError {
    ClientError::Status {
        code: ApiStatusCode(response.status().as_u16()),
        method: method.to_string(),
        url: response.url().to_string(),
        correlation_id: response
            .headers()
            .get(CORRELATION_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    }
}

#[async_trait]
impl CaseClient for HttpCaseClient {
    async fn case(&self, ctx: &RequestContext, id: i64) -> Result<Case, ClientError> {
        self.get(ctx, &format!("/api/v1/cases/{id}")).await
    }

    async fn payments(
        &self,
        ctx: &RequestContext,
        case_id: i64,
    ) -> Result<Vec<Payment>, ClientError> {
        self.get(ctx, &format!("/api/v1/cases/{case_id}/payments")).await
    }

    async fn payment_by_id(&self, ctx: &RequestContext, id: i64) -> Result<Payment, ClientError> {
        self.get(ctx, &format!("/api/v1/payments/{id}")).await
    }

    async fn ref_data_by_category(
        &self,
        ctx: &RequestContext,
        category: &str,
    ) -> Result<Vec<RefDataItem>, ClientError> {
        self.get(ctx, &format!("/api/v1/reference-data/{}", urlencoding::encode(category)))
            .await
    }

    async fn add_payment(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        amount: Pence,
        source: &str,
        payment_date: &DateString,
    ) -> Result<(), ClientError> {
        let payment = Payment {
            source: source.to_string(),
            amount: Some(amount),
            payment_date: payment_date.clone(),
            ..Default::default()
        };

        self.post(ctx, &format!("/api/v1/cases/{case_id}/payments"), &payment).await
    }

    async fn apply_fee_reduction(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        reduction: &FeeReduction,
    ) -> Result<(), ClientError> {
        self.post(ctx, &format!("/api/v1/cases/{case_id}/payments"), reduction).await
    }

    async fn edit_payment(
        &self,
        ctx: &RequestContext,
        payment_id: i64,
        reduction: &FeeReduction,
    ) -> Result<(), ClientError> {
        self.put(ctx, &format!("/api/v1/payments/{payment_id}"), reduction).await
    }

    async fn delete_payment(
        &self,
        ctx: &RequestContext,
        payment_id: i64,
    ) -> Result<(), ClientError> {
        self.send::<()>(
            ctx,
            Method::DELETE,
            &format!("/api/v1/payments/{payment_id}"),
            None,
            &[StatusCode::NO_CONTENT],
        )
        .await?;
        Ok(())
    }

    async fn complaint(&self, ctx: &RequestContext, id: i64) -> Result<Complaint, ClientError> {
        self.get(ctx, &format!("/api/v1/complaints/{id}")).await
    }

    async fn add_complaint(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        case_type: CaseType,
        complaint: &Complaint,
    ) -> Result<(), ClientError> {
        self.post(ctx, &format!("/api/v1/{}/{case_id}/complaints", case_type.api_path()), complaint)
            .await
    }

    async fn edit_complaint(
        &self,
        ctx: &RequestContext,
        id: i64,
        complaint: &Complaint,
    ) -> Result<(), ClientError> {
        self.put(ctx, &format!("/api/v1/complaints/{id}"), complaint).await
    }

    async fn teams(&self, ctx: &RequestContext) -> Result<Vec<Team>, ClientError> {
        self.get(ctx, "/api/v1/teams").await
    }

    async fn allocate_cases(
        &self,
        ctx: &RequestContext,
        assignee_id: i64,
        allocations: &[CaseAllocation],
    ) -> Result<(), ClientError> {
        let ids = allocations
            .iter()
            .map(|allocation| allocation.id.to_string())
            .collect::<Vec<_>>()
            .join("+");

        self.put(
            ctx,
            &format!("/api/v1/users/{assignee_id}/cases/{ids}"),
            &AllocationRequest { data: allocations },
        )
        .await
    }

    async fn search(
        &self,
        ctx: &RequestContext,
        term: &str,
        page: u32,
        person_types: &[String],
    ) -> Result<SearchResponse, ClientError> {
        if term.chars().count() < MIN_TERM_LENGTH {
            return Err(ClientError::InvalidRequest(
                "Search term must be at least three characters".to_string(),
            ));
        }

        let person_types = if person_types.is_empty() {
            ALL_PERSON_TYPES.to_vec()
        } else {
            person_types.iter().map(String::as_str).collect()
        };

        let from = SEARCH_PAGE_SIZE
            .checked_mul(page.saturating_sub(1))
            .ok_or_else(|| ClientError::InvalidRequest(format!("Page {page} is out of range")))?;

        let request = SearchRequest {
            term,
            person_types,
            size: SEARCH_PAGE_SIZE,
            from,
        };

        let response = self
            .send(ctx, Method::POST, "/api/v1/search/persons", Some(&request), &[StatusCode::OK])
            .await?;

        Ok(response.json().await?)
    }

    async fn deleted_cases(
        &self,
        ctx: &RequestContext,
        uid: &str,
    ) -> Result<Vec<DeletedCase>, ClientError> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("uid", uid)
            .finish();

        self.get(ctx, &format!("/api/v1/deleted-cases?{query}")).await
    }
}

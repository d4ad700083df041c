use super::{CaseClient, ClientError, RequestContext};
use crate::models::case_model::{Case, CaseAllocation, CaseType, Team};
use crate::models::complaint_model::Complaint;
use crate::models::error_model::ValidationError;
use crate::models::payment_model::{FeeReduction, Payment};
use crate::models::ref_data_model::RefDataItem;
use crate::models::search_model::{DeletedCase, SearchResponse};
use crate::types::{ApiStatusCode, DateString, Pence};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// How a faked call should fail.
#[derive(Debug, Clone)]
pub enum Failure {
    Status(u16),
    Validation(ValidationError),
}

impl Failure {
    fn into_error(self, call: &str) -> ClientError {
        match self {
            Failure::Status(code) => ClientError::Status {
                code: ApiStatusCode(code),
                method: "GET".to_string(),
                url: format!("http://sirius/{call}"),
                correlation_id: "fake-correlation-id".to_string(),
            },
            Failure::Validation(validation) => ClientError::Validation(validation),
        }
    }
}

/// Canned responses for handler tests, recording every call it receives.
#[derive(Debug, Default)]
pub struct FakeClient {
    pub cases: HashMap<i64, Case>,
    pub payments: Vec<Payment>,
    pub ref_data: HashMap<String, Vec<RefDataItem>>,
    pub complaint: Complaint,
    pub teams: Vec<Team>,
    pub search: SearchResponse,
    pub deleted_cases: Vec<DeletedCase>,
    pub failures: HashMap<&'static str, Failure>,
    pub calls: Mutex<Vec<String>>,
    pub contexts: Mutex<Vec<RequestContext>>,
}

impl FakeClient {
    pub fn with_case(mut self, case: Case) -> Self {
        self.cases.insert(case.id, case);
        self
    }

    pub fn with_ref_data(mut self, category: &str, items: Vec<RefDataItem>) -> Self {
        self.ref_data.insert(category.to_string(), items);
        self
    }

    pub fn failing(mut self, call: &'static str, failure: Failure) -> Self {
        self.failures.insert(call, failure);
        self
    }

    /// Every call made so far, e.g. `case(800)`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|call| call.starts_with(prefix))
    }

    pub fn last_context(&self) -> Option<RequestContext> {
        self.contexts.lock().ok().and_then(|contexts| contexts.last().cloned())
    }

    fn record(
        &self,
        ctx: &RequestContext,
        name: &'static str,
        call: String,
    ) -> Result<(), ClientError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if let Ok(mut contexts) = self.contexts.lock() {
            contexts.push(ctx.clone());
        }

        match self.failures.get(name) {
            Some(failure) => Err(failure.clone().into_error(name)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CaseClient for FakeClient {
    async fn case(&self, ctx: &RequestContext, id: i64) -> Result<Case, ClientError> {
        self.record(ctx, "case", format!("case({id})"))?;
        self.cases
            .get(&id)
            .cloned()
            .ok_or_else(|| Failure::Status(404).into_error("case"))
    }

    async fn payments(
        &self,
        ctx: &RequestContext,
        case_id: i64,
    ) -> Result<Vec<Payment>, ClientError> {
        self.record(ctx, "payments", format!("payments({case_id})"))?;
        Ok(self.payments.clone())
    }

    async fn payment_by_id(&self, ctx: &RequestContext, id: i64) -> Result<Payment, ClientError> {
        self.record(ctx, "payment_by_id", format!("payment_by_id({id})"))?;
        self.payments
            .iter()
            .find(|payment| payment.id == id)
            .cloned()
            .ok_or_else(|| Failure::Status(404).into_error("payment_by_id"))
    }

    async fn ref_data_by_category(
        &self,
        ctx: &RequestContext,
        category: &str,
    ) -> Result<Vec<RefDataItem>, ClientError> {
        self.record(ctx, "ref_data_by_category", format!("ref_data_by_category({category})"))?;
        Ok(self.ref_data.get(category).cloned().unwrap_or_default())
    }

    async fn add_payment(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        amount: Pence,
        source: &str,
        payment_date: &DateString,
    ) -> Result<(), ClientError> {
        self.record(
            ctx,
            "add_payment",
            format!("add_payment({case_id}, {}, {source}, {payment_date})", amount.0),
        )
    }

    async fn apply_fee_reduction(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        reduction: &FeeReduction,
    ) -> Result<(), ClientError> {
        self.record(
            ctx,
            "apply_fee_reduction",
            format!("apply_fee_reduction({case_id}, {})", reduction.fee_reduction_type),
        )
    }

    async fn edit_payment(
        &self,
        ctx: &RequestContext,
        payment_id: i64,
        reduction: &FeeReduction,
    ) -> Result<(), ClientError> {
        self.record(
            ctx,
            "edit_payment",
            format!("edit_payment({payment_id}, {})", reduction.fee_reduction_type),
        )
    }

    async fn delete_payment(
        &self,
        ctx: &RequestContext,
        payment_id: i64,
    ) -> Result<(), ClientError> {
        self.record(ctx, "delete_payment", format!("delete_payment({payment_id})"))
    }

    async fn complaint(&self, ctx: &RequestContext, id: i64) -> Result<Complaint, ClientError> {
        self.record(ctx, "complaint", format!("complaint({id})"))?;
        Ok(self.complaint.clone())
    }

    async fn add_complaint(
        &self,
        ctx: &RequestContext,
        case_id: i64,
        case_type: CaseType,
        complaint: &Complaint,
    ) -> Result<(), ClientError> {
        self.record(
            ctx,
            "add_complaint",
            format!("add_complaint({case_id}, {case_type}, {})", complaint.summary),
        )
    }

    async fn edit_complaint(
        &self,
        ctx: &RequestContext,
        id: i64,
        complaint: &Complaint,
    ) -> Result<(), ClientError> {
        self.record(
            ctx,
            "edit_complaint",
            format!("edit_complaint({id}, {}, {})", complaint.category, complaint.sub_category),
        )
    }

    async fn teams(&self, ctx: &RequestContext) -> Result<Vec<Team>, ClientError> {
        self.record(ctx, "teams", "teams()".to_string())?;
        Ok(self.teams.clone())
    }

    async fn allocate_cases(
        &self,
        ctx: &RequestContext,
        assignee_id: i64,
        allocations: &[CaseAllocation],
    ) -> Result<(), ClientError> {
        let ids = allocations
            .iter()
            .map(|allocation| format!("{}:{}", allocation.case_type, allocation.id))
            .collect::<Vec<_>>()
            .join(",");

        self.record(ctx, "allocate_cases", format!("allocate_cases({assignee_id}, [{ids}])"))
    }

    async fn search(
        &self,
        ctx: &RequestContext,
        term: &str,
        page: u32,
        person_types: &[String],
    ) -> Result<SearchResponse, ClientError> {
        self.record(
            ctx,
            "search",
            format!("search({term}, {page}, [{}])", person_types.join(",")),
        )?;
        Ok(self.search.clone())
    }

    async fn deleted_cases(
        &self,
        ctx: &RequestContext,
        uid: &str,
    ) -> Result<Vec<DeletedCase>, ClientError> {
        self.record(ctx, "deleted_cases", format!("deleted_cases({uid})"))?;
        Ok(self.deleted_cases.clone())
    }
}

use crate::client::{ClientError, RequestContext};
use crate::config::AppState;
use crate::controllers::app_error::AppError;
use crate::controllers::form_request::FormRequest;
use crate::controllers::{ref_data_options, render, render_page, SelectOption};
use crate::models::case_model::Case;
use crate::models::error_model::ValidationError;
use crate::models::payment_model::{validate_new_payment, Payment, PaymentSummary};
use crate::models::ref_data_model::{self, FEE_REDUCTION_TYPE_CATEGORY, PAYMENT_SOURCE_CATEGORY};
use crate::types::{DateString, Pence};
use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::debug;

#[derive(Template, Debug)]
#[template(path = "payments.html")]
struct PaymentsTemplate {
    prefix: String,
    case: Case,
    payments: Vec<Payment>,
    fee_reductions: Vec<Payment>,
    total_paid: Pence,
}

#[derive(Template, Debug)]
#[template(path = "manage_fees.html")]
struct ManageFeesTemplate {
    prefix: String,
    case: Case,
    return_url: String,
}

#[derive(Template, Debug)]
#[template(path = "add_payment.html")]
struct AddPaymentTemplate {
    prefix: String,
    xsrf_token: String,
    error: ValidationError,
    case: Case,
    amount: String,
    payment_date: DateString,
    sources: Vec<SelectOption>,
    return_url: String,
}

#[derive(Template, Debug)]
#[template(path = "delete_payment.html")]
struct DeletePaymentTemplate {
    prefix: String,
    xsrf_token: String,
    case: Case,
    payment: Payment,
    fee_reduction_label: String,
    return_url: String,
}

async fn payments_page(
    app_state: &AppState,
    ctx: &RequestContext,
    case_id: i64,
) -> Result<Response, AppError> {
    let client = &app_state.client;

    let (case, payments) =
        tokio::try_join!(client.case(ctx, case_id), client.payments(ctx, case_id))?;
    let summary = PaymentSummary::from_payments(payments);

    debug!(
        "{} has {} payments and {} fee reductions, {} paid",
        case.entity(),
        summary.payments.len(),
        summary.fee_reductions.len(),
        summary.total_paid
    );

    render(&PaymentsTemplate {
        prefix: app_state.settings.prefix.clone(),
        case,
        payments: summary.payments,
        fee_reductions: summary.fee_reductions,
        total_paid: summary.total_paid,
    })
}

#[debug_handler]
/// Payments page handler
///
/// This function renders the payments recorded against a case, split into
/// payments and fee reductions, with the total paid.
///
/// # Parameters
/// - `app_state` - Shared application state
/// - `case_id` - The id of the case
/// - `request` - The page request
///
/// # Returns
/// `Response` with the rendered HTML page.
///
/// # Errors
/// Fails when the case or its payments cannot be fetched.
pub async fn get_payments(
    State(app_state): State<Arc<AppState>>,
    Path(case_id): Path<i64>,
    request: FormRequest,
) -> Result<Response, AppError> {
    payments_page(&app_state, &request.context, case_id).await
}

#[debug_handler]
/// Payments page handler for digital LPAs
///
/// Digital LPAs are addressed by uid in the path; the case id comes from the
/// `id` query parameter.
///
/// # Errors
/// Fails when `id` is missing or not a number, or when the case or its
/// payments cannot be fetched.
pub async fn get_lpa_payments(
    State(app_state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let case_id = request.form.id("id")?;
    debug!("payments for {} (case {})", uid, case_id);

    payments_page(&app_state, &request.context, case_id).await
}

#[debug_handler]
/// Manage fees handler
///
/// Renders the choice of fee actions for a case.
///
/// # Errors
/// Fails when `id` is not a number or the case cannot be fetched.
pub async fn manage_fees(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let case_id = request.form.id("id")?;
    let case = app_state.client.case(&request.context, case_id).await?;

    render(&ManageFeesTemplate {
        prefix: app_state.settings.prefix.clone(),
        return_url: case.payments_url(),
        case,
    })
}

#[debug_handler]
/// Add payment handler
///
/// On GET this renders the add payment form. On POST the amount is checked
/// first; a valid payment is sent to the API and the user is redirected to
/// the case's payments.
///
/// # Parameters
/// - `app_state` - Shared application state
/// - `request` - The page request, carrying the case `id` and the posted form
///
/// # Returns
/// The form, a `400 Bad Request` form with field errors, or a redirect.
///
/// # Errors
/// Fails when the case or payment sources cannot be fetched, or the API
/// rejects the payment for a reason other than validation.
pub async fn add_payment(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let case_id = request.form.id("id")?;
    let ctx = &request.context;
    let client = &app_state.client;

    let (case, sources) = tokio::try_join!(
        client.case(ctx, case_id),
        client.ref_data_by_category(ctx, PAYMENT_SOURCE_CATEGORY)
    )?;

    let source = request.form.post_string("source");
    let mut template = AddPaymentTemplate {
        prefix: app_state.settings.prefix.clone(),
        xsrf_token: ctx.xsrf_token.clone(),
        error: ValidationError::default(),
        return_url: case.payments_url(),
        case,
        amount: request.form.post_string("amount"),
        payment_date: request.form.post_date("paymentDate"),
        sources: ref_data_options(&sources, &source),
    };

    if request.is_post() {
        let amount = match validate_new_payment(&template.amount, &source, &template.payment_date) {
            Ok(amount) => amount,
            Err(field) => {
                template.error = ValidationError::from_fields(field);
                return render_page(StatusCode::BAD_REQUEST, &template);
            }
        };

        match client
            .add_payment(ctx, case_id, amount, &source, &template.payment_date)
            .await
        {
            Ok(()) => return Ok(app_state.redirect(&template.return_url)),
            Err(ClientError::Validation(validation)) => {
                template.error = validation;
                return render_page(StatusCode::BAD_REQUEST, &template);
            }
            Err(e) => return Err(e.into()),
        }
    }

    render(&template)
}

#[debug_handler]
/// Delete payment handler
///
/// On GET this asks for confirmation. On POST the payment is deleted and the
/// user is redirected to the case's payments.
///
/// # Errors
/// Fails when the payment, its case or the fee reduction types cannot be
/// fetched, or the API refuses the deletion.
pub async fn delete_payment(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let payment_id = request.form.id("id")?;
    let ctx = &request.context;
    let client = &app_state.client;

    let payment = client.payment_by_id(ctx, payment_id).await?;
    let (case, reduction_types) = tokio::try_join!(
        client.case(ctx, payment.case.id),
        client.ref_data_by_category(ctx, FEE_REDUCTION_TYPE_CATEGORY)
    )?;

    if request.is_post() {
        client.delete_payment(ctx, payment_id).await?;
        debug!("deleted payment {} from {}", payment_id, case.entity());

        return Ok(app_state.redirect(&case.payments_url()));
    }

    let fee_reduction_label =
        ref_data_model::translate(&reduction_types, &payment.fee_reduction_type).to_string();

    render(&DeletePaymentTemplate {
        prefix: app_state.settings.prefix.clone(),
        xsrf_token: ctx.xsrf_token.clone(),
        return_url: case.payments_url(),
        case,
        payment,
        fee_reduction_label,
    })
}

use crate::client::{ClientError, RequestContext};
use crate::config::AppState;
use crate::controllers::app_error::AppError;
use crate::controllers::form_request::FormRequest;
use crate::controllers::{ref_data_options, render, render_page, SelectOption};
use crate::models::case_model::Case;
use crate::models::error_model::ValidationError;
use crate::models::payment_model::{validate_fee_reduction, FeeReduction};
use crate::models::ref_data_model::{RefDataItem, FEE_REDUCTION_TYPE_CATEGORY};
use crate::types::DateString;
use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum_macros::debug_handler;
use chrono::Local;
use std::sync::Arc;
use tracing::debug;

/// The apply and edit fee reduction forms
#[derive(Template, Debug)]
#[template(path = "fee_reduction.html")]
struct FeeReductionTemplate {
    prefix: String,
    xsrf_token: String,
    error: ValidationError,
    title: &'static str,
    action: String,
    case: Case,
    reduction_types: Vec<SelectOption>,
    payment_evidence: String,
    payment_date: DateString,
    return_url: String,
}

impl FeeReductionTemplate {
    fn new(
        app_state: &AppState,
        ctx: &RequestContext,
        title: &'static str,
        action: String,
        case: Case,
        types: &[RefDataItem],
        reduction: &FeeReduction,
    ) -> Self {
        Self {
            prefix: app_state.settings.prefix.clone(),
            xsrf_token: ctx.xsrf_token.clone(),
            error: ValidationError::default(),
            title,
            action,
            return_url: case.payments_url(),
            case,
            reduction_types: ref_data_options(types, &reduction.fee_reduction_type),
            payment_evidence: reduction.payment_evidence.clone(),
            payment_date: reduction.payment_date.clone(),
        }
    }
}

/// Checks a posted fee reduction and hands it to `submit`.
///
/// Local validation failures and API validation errors both re-render the
/// form with `400 Bad Request`; success redirects to the case's payments.
async fn submit_fee_reduction<F, Fut>(
    app_state: &AppState,
    mut template: FeeReductionTemplate,
    reduction: &FeeReduction,
    types: &[RefDataItem],
    submit: F,
) -> Result<Response, AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), ClientError>>,
{
    let field = validate_fee_reduction(reduction, types, Local::now().date_naive());
    if !field.is_empty() {
        template.error = ValidationError::from_fields(field);
        return render_page(StatusCode::BAD_REQUEST, &template);
    }

    match submit().await {
        Ok(()) => Ok(app_state.redirect(&template.return_url)),
        Err(ClientError::Validation(validation)) => {
            template.error = validation;
            render_page(StatusCode::BAD_REQUEST, &template)
        }
        Err(e) => Err(e.into()),
    }
}

#[debug_handler]
/// Apply fee reduction handler
///
/// On GET this renders an empty fee reduction form for the case `id`. On POST
/// the reduction is checked and applied, then the user is redirected to the
/// case's payments.
///
/// # Parameters
/// - `app_state` - Shared application state
/// - `request` - The page request
///
/// # Returns
/// The form, a `400 Bad Request` form with field errors, or a redirect.
///
/// # Errors
/// Fails when the case or fee reduction types cannot be fetched, or the API
/// rejects the reduction for a reason other than validation.
pub async fn apply_fee_reduction(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let case_id = request.form.id("id")?;
    let ctx = &request.context;
    let client = &app_state.client;

    let (case, types) = tokio::try_join!(
        client.case(ctx, case_id),
        client.ref_data_by_category(ctx, FEE_REDUCTION_TYPE_CATEGORY)
    )?;

    let reduction = FeeReduction::from_form(&request.form);
    let template = FeeReductionTemplate::new(
        &app_state,
        ctx,
        "Apply a fee reduction",
        format!("/apply-fee-reduction?id={case_id}"),
        case,
        &types,
        &reduction,
    );

    if !request.is_post() {
        return render(&template);
    }

    debug!("applying {} to case {}", reduction.fee_reduction_type, case_id);

    submit_fee_reduction(&app_state, template, &reduction, &types, || {
        client.apply_fee_reduction(ctx, case_id, &reduction)
    })
    .await
}

#[debug_handler]
/// Edit fee reduction handler
///
/// The fee reduction `id` is looked up first to find its case. That chain
/// runs alongside the fee reduction types lookup. On GET the form is filled
/// from the existing reduction; on POST it is checked and saved.
///
/// # Errors
/// Fails when the reduction, its case or the fee reduction types cannot be
/// fetched, or the API rejects the change for a reason other than validation.
pub async fn edit_fee_reduction(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let payment_id = request.form.id("id")?;
    let ctx = &request.context;
    let client = &app_state.client;

    let payment_and_case = async {
        let payment = client.payment_by_id(ctx, payment_id).await?;
        let case = client.case(ctx, payment.case.id).await?;
        Ok::<_, ClientError>((payment, case))
    };

    let ((payment, case), types) = tokio::try_join!(
        payment_and_case,
        client.ref_data_by_category(ctx, FEE_REDUCTION_TYPE_CATEGORY)
    )?;

    let reduction = if request.is_post() {
        FeeReduction::from_form(&request.form)
    } else {
        FeeReduction::from_payment(&payment)
    };

    let template = FeeReductionTemplate::new(
        &app_state,
        ctx,
        "Edit fee reduction",
        format!("/edit-fee-reduction?id={payment_id}"),
        case,
        &types,
        &reduction,
    );

    if !request.is_post() {
        return render(&template);
    }

    submit_fee_reduction(&app_state, template, &reduction, &types, || {
        client.edit_payment(ctx, payment_id, &reduction)
    })
    .await
}

#[cfg(test)]
mod tests {
    use crate::client::fake::{FakeClient, Failure};
    use crate::controllers::test_support::{get, post, TestApp};
    use crate::models::case_model::Case;
    use crate::models::error_model::{add_reason, FieldErrors, ValidationError};
    use crate::models::payment_model::{Payment, PaymentCase, FEE_REDUCTION_SOURCE};
    use crate::models::ref_data_model::{RefDataItem, FEE_REDUCTION_TYPE_CATEGORY};
    use crate::types::DateString;
    use axum::http::StatusCode;

    fn client() -> FakeClient {
        FakeClient {
            payments: vec![Payment {
                id: 12,
                case: PaymentCase { id: 800 },
                source: FEE_REDUCTION_SOURCE.to_string(),
                fee_reduction_type: "EXEMPTION".to_string(),
                payment_evidence: "Court order".to_string(),
                payment_date: DateString::new("2023-05-04"),
                ..Default::default()
            }],
            ..Default::default()
        }
        .with_case(Case {
            id: 800,
            uid: "7000-0000-0000".to_string(),
            case_type: "LPA".to_string(),
            ..Default::default()
        })
        .with_ref_data(
            FEE_REDUCTION_TYPE_CATEGORY,
            vec![
                RefDataItem::new("REMISSION", "Remission"),
                RefDataItem::new("EXEMPTION", "Exemption"),
            ],
        )
    }

    const VALID: &str =
        "feeReductionType=REMISSION&paymentEvidence=Universal+credit&paymentDate=2022-04-05";

    #[tokio::test]
    async fn test_apply_fee_reduction_form() {
        let app = TestApp::new(client());

        let response = app.send(get("/apply-fee-reduction?id=800")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Apply a fee reduction"));
        assert!(response.body.contains("Exemption"));
    }

    #[tokio::test]
    async fn test_apply_fee_reduction_redirects() {
        let app = TestApp::new(client());

        let response = app.send(post("/apply-fee-reduction?id=800", VALID)).await;

        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), Some("/payments/800"));
        assert!(app.client.called("apply_fee_reduction(800, REMISSION)"));
    }

    #[tokio::test]
    async fn test_apply_fee_reduction_checks_form_before_calling_api() {
        let app = TestApp::new(client());

        let response = app
            .send(post(
                "/apply-fee-reduction?id=800",
                "feeReductionType=HARDSHIP&paymentDate=2999-01-01",
            ))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Please select a valid fee reduction type"));
        assert!(response.body.contains("Date must not be in the future"));
        assert!(!app.client.called("apply_fee_reduction"));
    }

    #[tokio::test]
    async fn test_apply_fee_reduction_api_validation() {
        let mut field = FieldErrors::new();
        add_reason(&mut field, "paymentEvidence", "Evidence is too long");
        let failure = Failure::Validation(ValidationError::from_fields(field));
        let app = TestApp::new(client().failing("apply_fee_reduction", failure));

        let response = app.send(post("/apply-fee-reduction?id=800", VALID)).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Evidence is too long"));
    }

    #[tokio::test]
    async fn test_edit_fee_reduction_prefills_form() {
        let app = TestApp::new(client());

        let response = app.send(get("/edit-fee-reduction?id=12")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Court order"));
        assert!(response.body.contains("2023-05-04"));
        assert!(app.client.called("payment_by_id(12)"));
        assert!(app.client.called("case(800)"));
    }

    #[tokio::test]
    async fn test_edit_fee_reduction_saves() {
        let app = TestApp::new(client());

        let response = app.send(post("/edit-fee-reduction?id=12", VALID)).await;

        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), Some("/payments/800"));
        assert!(app.client.called("edit_payment(12, REMISSION)"));
    }

    #[tokio::test]
    async fn test_edit_fee_reduction_fails_when_case_lookup_fails() {
        let app = TestApp::new(client().failing("case", Failure::Status(404)));

        let response = app.send(get("/edit-fee-reduction?id=12")).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}

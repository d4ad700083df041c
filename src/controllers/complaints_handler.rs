use crate::client::ClientError;
use crate::config::AppState;
use crate::controllers::app_error::AppError;
use crate::controllers::form_request::FormRequest;
use crate::controllers::{ref_data_options, render, render_page, SelectOption};
use crate::models::case_model::CaseType;
use crate::models::complaint_model::{validate_complaint_form, Complaint, COMPLAINT_CATEGORIES};
use crate::models::error_model::ValidationError;
use crate::models::ref_data_model::{
    RefDataItem, COMPENSATION_TYPE_CATEGORY, COMPLAINANT_CATEGORY, COMPLAINT_ORIGIN_CATEGORY,
};
use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, info};

const SEVERITIES: [&str; 2] = ["Minor", "Major"];

/// A complaint category radio with the subcategory select shown under it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryOption {
    code: &'static str,
    label: &'static str,
    selected: bool,
    subcategories: Vec<SelectOption>,
}

fn category_options(complaint: &Complaint) -> Vec<CategoryOption> {
    COMPLAINT_CATEGORIES
        .iter()
        .map(|category| {
            let selected = category.code == complaint.category;
            CategoryOption {
                code: category.code,
                label: category.label,
                selected,
                subcategories: category
                    .subcategories
                    .iter()
                    .map(|(code, label)| SelectOption {
                        value: code.to_string(),
                        label: label.to_string(),
                        selected: selected && *code == complaint.sub_category,
                    })
                    .collect(),
            }
        })
        .collect()
}

fn severity_options(selected: &str) -> Vec<SelectOption> {
    SEVERITIES
        .iter()
        .map(|severity| SelectOption {
            value: severity.to_string(),
            label: severity.to_string(),
            selected: *severity == selected,
        })
        .collect()
}

/// The add and edit complaint forms
#[derive(Template, Debug)]
#[template(path = "complaint.html")]
struct ComplaintTemplate {
    prefix: String,
    xsrf_token: String,
    error: ValidationError,
    success: bool,
    editing: bool,
    action: String,
    entity: String,
    categories: Vec<CategoryOption>,
    severities: Vec<SelectOption>,
    complainant_categories: Vec<SelectOption>,
    origins: Vec<SelectOption>,
    compensation_types: Vec<SelectOption>,
    complaint: Complaint,
}

/// Reference data lists the complaint form offers.
struct ComplaintLists {
    complainant_categories: Vec<RefDataItem>,
    origins: Vec<RefDataItem>,
    compensation_types: Vec<RefDataItem>,
}

impl ComplaintTemplate {
    fn new(
        app_state: &AppState,
        request: &FormRequest,
        action: String,
        entity: String,
        lists: &ComplaintLists,
        complaint: Complaint,
    ) -> Self {
        Self {
            prefix: app_state.settings.prefix.clone(),
            xsrf_token: request.context.xsrf_token.clone(),
            error: ValidationError::default(),
            success: false,
            editing: false,
            action,
            entity,
            categories: category_options(&complaint),
            severities: severity_options(&complaint.severity),
            complainant_categories: ref_data_options(
                &lists.complainant_categories,
                &complaint.complainant_category,
            ),
            origins: ref_data_options(&lists.origins, &complaint.origin),
            compensation_types: ref_data_options(
                &lists.compensation_types,
                &complaint.compensation_type,
            ),
            complaint,
        }
    }

    /// Shows `complaint` in the form alongside `error`.
    fn showing(mut self, complaint: Complaint, error: ValidationError) -> Self {
        self.error = error;
        self.categories = category_options(&complaint);
        self.severities = severity_options(&complaint.severity);
        mark_selected(&mut self.complainant_categories, &complaint.complainant_category);
        mark_selected(&mut self.origins, &complaint.origin);
        mark_selected(&mut self.compensation_types, &complaint.compensation_type);
        self.complaint = complaint;
        self
    }
}

fn mark_selected(options: &mut [SelectOption], value: &str) {
    for option in options.iter_mut() {
        option.selected = option.value == value;
    }
}

/// Checks and submits a posted complaint form.
///
/// Local validation runs before the API is called. Field errors from either
/// re-render the form with `400 Bad Request`; success re-renders it with a
/// confirmation.
async fn submit_complaint<F, Fut>(
    request: &FormRequest,
    template: ComplaintTemplate,
    submit: F,
) -> Result<Response, AppError>
where
    F: FnOnce(Complaint) -> Fut,
    Fut: Future<Output = Result<Complaint, ClientError>>,
{
    let complaint = Complaint::from_form(&request.form);

    let field = validate_complaint_form(&request.form);
    if !field.is_empty() {
        let template = template.showing(complaint, ValidationError::from_fields(field));
        return render_page(StatusCode::BAD_REQUEST, &template);
    }

    match submit(complaint.clone()).await {
        Ok(saved) => {
            let mut template = template.showing(saved, ValidationError::default());
            template.success = true;
            render(&template)
        }
        Err(ClientError::Validation(validation)) => {
            let template = template.showing(complaint, validation);
            render_page(StatusCode::BAD_REQUEST, &template)
        }
        Err(e) => Err(e.into()),
    }
}

#[debug_handler]
/// Add complaint handler
///
/// This function renders the complaint form for the case named by the `id`
/// and `case` parameters, and on POST files the complaint against it.
///
/// # Parameters
/// - `app_state` - Shared application state
/// - `request` - The page request
///
/// # Returns
/// The form, a `400 Bad Request` form with field errors, or the form with a
/// success banner.
///
/// # Errors
/// Fails when `id` or `case` are invalid, or when the case or reference data
/// cannot be fetched.
pub async fn add_complaint(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let case_id = request.form.id("id")?;
    let case_type = CaseType::parse(request.form.value("case").unwrap_or_default())?;
    let ctx = &request.context;
    let client = &app_state.client;

    let (case, complainant_categories, origins) = tokio::try_join!(
        client.case(ctx, case_id),
        client.ref_data_by_category(ctx, COMPLAINANT_CATEGORY),
        client.ref_data_by_category(ctx, COMPLAINT_ORIGIN_CATEGORY)
    )?;

    let lists = ComplaintLists {
        complainant_categories,
        origins,
        compensation_types: Vec::new(),
    };

    let template = ComplaintTemplate::new(
        &app_state,
        &request,
        format!("/add-complaint?id={case_id}&case={}", case_type.to_string().to_lowercase()),
        case.entity(),
        &lists,
        Complaint::default(),
    );

    if !request.is_post() {
        return render(&template);
    }

    submit_complaint(&request, template, |complaint| async move {
        client.add_complaint(ctx, case_id, case_type, &complaint).await?;
        info!("complaint added to {} {}", case_type, case_id);
        Ok::<_, ClientError>(Complaint::default())
    })
    .await
}

#[debug_handler]
/// Edit complaint handler
///
/// Renders the complaint `id` for editing. A posted resolution must come with
/// every field a resolved complaint needs.
///
/// # Errors
/// Fails when `id` is invalid, or when the complaint or reference data cannot
/// be fetched.
pub async fn edit_complaint(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let complaint_id = request.form.id("id")?;
    let ctx = &request.context;
    let client = &app_state.client;

    let (complaint, complainant_categories, origins, compensation_types) = tokio::try_join!(
        client.complaint(ctx, complaint_id),
        client.ref_data_by_category(ctx, COMPLAINANT_CATEGORY),
        client.ref_data_by_category(ctx, COMPLAINT_ORIGIN_CATEGORY),
        client.ref_data_by_category(ctx, COMPENSATION_TYPE_CATEGORY)
    )?;

    debug!("editing complaint {} ({})", complaint_id, complaint.category_label());

    let lists = ComplaintLists {
        complainant_categories,
        origins,
        compensation_types,
    };

    let mut template = ComplaintTemplate::new(
        &app_state,
        &request,
        format!("/edit-complaint?id={complaint_id}"),
        String::new(),
        &lists,
        complaint,
    );
    template.editing = true;

    if !request.is_post() {
        return render(&template);
    }

    submit_complaint(&request, template, |complaint| async move {
        client.edit_complaint(ctx, complaint_id, &complaint).await?;
        Ok::<_, ClientError>(complaint)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeClient, Failure};
    use crate::controllers::test_support::{get, post, TestApp};
    use crate::models::case_model::Case;
    use crate::models::error_model::{add_reason, FieldErrors};

    fn client() -> FakeClient {
        FakeClient {
            complaint: Complaint {
                category: "02".to_string(),
                sub_category: "19".to_string(),
                summary: "Slow registration".to_string(),
                severity: "Major".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
        .with_case(Case {
            id: 55,
            uid: "7000-5555-5555".to_string(),
            case_type: "LPA".to_string(),
            ..Default::default()
        })
        .with_ref_data(COMPLAINANT_CATEGORY, vec![RefDataItem::new("LPA_DONOR", "Donor")])
        .with_ref_data(COMPLAINT_ORIGIN_CATEGORY, vec![RefDataItem::new("PHONE", "Phone call")])
        .with_ref_data(
            COMPENSATION_TYPE_CATEGORY,
            vec![RefDataItem::new("NOT_APPLICABLE", "Not applicable")],
        )
    }

    #[test]
    fn test_category_options_select_matching_subcategory() {
        let complaint = Complaint {
            category: "04".to_string(),
            sub_category: "33".to_string(),
            ..Default::default()
        };

        let options = category_options(&complaint);
        let data_protection = options.iter().find(|option| option.code == "04").unwrap();

        assert!(data_protection.selected);
        assert_eq!(
            data_protection
                .subcategories
                .iter()
                .filter(|sub| sub.selected)
                .map(|sub| sub.value.as_str())
                .collect::<Vec<_>>(),
            vec!["33"]
        );
        assert!(options
            .iter()
            .filter(|option| option.code != "04")
            .all(|option| {
                !option.selected && option.subcategories.iter().all(|sub| !sub.selected)
            }));
    }

    #[tokio::test]
    async fn test_add_complaint_form() {
        let app = TestApp::new(client());

        let response = app.send(get("/add-complaint?id=55&case=lpa")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("LPA 7000-5555-5555"));
        assert!(response.body.contains("Phone call"));
        assert!(!app.client.called("ref_data_by_category(compensationType)"));
    }

    #[tokio::test]
    async fn test_add_complaint_rejects_unknown_case_type() {
        let app = TestApp::new(client());

        let response = app.send(get("/add-complaint?id=55&case=order")).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(app.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_complaint_picks_subcategory_for_category() {
        let app = TestApp::new(client());

        let response = app
            .send(post(
                "/add-complaint?id=55&case=lpa",
                "category=04&subCategory=06&subCategory=12&subCategory=33&subCategory=41\
                 &summary=Lost+letter",
            ))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Complaint saved"));
        assert!(app.client.called("add_complaint(55, LPA, Lost letter)"));
    }

    #[tokio::test]
    async fn test_add_complaint_requires_matching_subcategory() {
        let app = TestApp::new(client());

        let response = app
            .send(post(
                "/add-complaint?id=55&case=lpa",
                "category=04&subCategory=06&subCategory=12&subCategory=41",
            ))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Please select a subcategory"));
        assert!(!app.client.called("add_complaint"));
    }

    #[tokio::test]
    async fn test_add_complaint_api_validation() {
        let mut field = FieldErrors::new();
        add_reason(&mut field, "summary", "Summary is too long");
        let failure = Failure::Validation(ValidationError::from_fields(field));
        let app = TestApp::new(client().failing("add_complaint", failure));

        let response = app
            .send(post("/add-complaint?id=55&case=lpa", "category=01&subCategory=07&summary=Lost"))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Summary is too long"));
    }

    #[tokio::test]
    async fn test_edit_complaint_form() {
        let app = TestApp::new(client());

        let response = app.send(get("/edit-complaint?id=9")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Slow registration"));
        assert!(response.body.contains("Not applicable"));
        assert!(app.client.called("complaint(9)"));
    }

    #[tokio::test]
    async fn test_edit_complaint_resolution_needs_every_field() {
        let app = TestApp::new(client());

        let response = app
            .send(post("/edit-complaint?id=9", "resolution=complaint+upheld&summary=Slow"))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Value is required and can"));
        assert!(!app.client.called("edit_complaint"));
    }

    #[tokio::test]
    async fn test_edit_complaint_saves() {
        let app = TestApp::new(client());

        let response = app
            .send(post(
                "/edit-complaint?id=9",
                "category=03&subCategory=19&subCategory=25&summary=Rude",
            ))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Complaint saved"));
        assert!(app.client.called("edit_complaint(9, 03, 25)"));
    }

    #[tokio::test]
    async fn test_edit_complaint_fans_out_errors() {
        let app = TestApp::new(client().failing("complaint", Failure::Status(500)));

        let response = app.send(get("/edit-complaint?id=9")).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

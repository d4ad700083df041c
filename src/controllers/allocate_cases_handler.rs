use crate::client::ClientError;
use crate::config::AppState;
use crate::controllers::app_error::AppError;
use crate::controllers::form_request::FormRequest;
use crate::controllers::{render, render_page, SelectOption};
use crate::fanout::try_join_bounded;
use crate::forms::FormError;
use crate::models::case_model::{Assignee, CaseAllocation, CaseErr, Team};
use crate::models::error_model::{FieldErrors, ValidationError};
use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum_macros::debug_handler;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const ASSIGNEE_ID_FIELD: &str = "assigneeId";

#[derive(Template, Debug)]
#[template(path = "allocate_cases.html")]
struct AllocateCasesTemplate {
    prefix: String,
    xsrf_token: String,
    error: ValidationError,
    success: bool,
    action: String,
    entities: Vec<String>,
    teams: Vec<SelectOption>,
    assign_to: String,
    assignee_user_name: String,
}

fn team_options(teams: &[Team], selected: &str) -> Vec<SelectOption> {
    teams
        .iter()
        .map(|team| {
            let value = team.id.to_string();
            SelectOption {
                selected: value == selected,
                value,
                label: team.display_name.clone(),
            }
        })
        .collect()
}

/// Reads every `id` parameter as a case id.
fn case_ids(request: &FormRequest) -> Result<Vec<i64>, AppError> {
    let ids = request
        .form
        .all("id")
        .into_iter()
        .map(|raw| {
            raw.trim().parse().map_err(|_| FormError::NotAnInteger {
                field: "id".to_string(),
                value: raw.to_string(),
            })
        })
        .collect::<Result<Vec<i64>, _>>()?;

    if ids.is_empty() {
        return Err(CaseErr::NoCasesSelected.into());
    }

    Ok(ids)
}

/// Moves the API's `assigneeId` errors onto the field the user filled in.
///
/// With no assignee chosen there is no such field, so the error is reported
/// against the `assignTo` choice instead.
fn remap_assignee_errors(mut error: ValidationError, assign_to: &str) -> ValidationError {
    let assignee_errors = error.field.remove(ASSIGNEE_ID_FIELD);

    match (assign_to, assignee_errors) {
        ("user", Some(assignee_errors)) => {
            error.field.insert("assigneeUser".to_string(), assignee_errors);
        }
        ("team", Some(assignee_errors)) => {
            error.field.insert("assigneeTeam".to_string(), assignee_errors);
        }
        ("user" | "team", None) => {}
        _ => {
            error.field.insert(
                "assignTo".to_string(),
                BTreeMap::from([(String::new(), "Assignee not set".to_string())]),
            );
        }
    }

    error
}

#[debug_handler]
/// Allocate cases handler
///
/// Renders the allocation form for every case given as an `id` parameter.
/// The teams lookup and each case lookup run concurrently, with the case
/// lookups bounded. On POST the cases are allocated to the chosen user or
/// team.
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
/// Fails when no case ids are given or one is not a number, or when the
/// teams or any case cannot be fetched.
pub async fn allocate_cases(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let ids = case_ids(&request)?;
    let ctx = &request.context;
    let client = &app_state.client;

    let (teams, cases) = tokio::try_join!(
        client.teams(ctx),
        try_join_bounded(ids.iter().copied().map(|id| client.case(ctx, id)))
    )?;

    let allocations: Vec<CaseAllocation> = cases.iter().map(CaseAllocation::from).collect();
    let query = ids.iter().map(|id| format!("id={id}")).collect::<Vec<_>>().join("&");

    let mut template = AllocateCasesTemplate {
        prefix: app_state.settings.prefix.clone(),
        xsrf_token: ctx.xsrf_token.clone(),
        error: ValidationError::default(),
        success: false,
        action: format!("/allocate-cases?{query}"),
        entities: cases.iter().map(|case| case.entity()).collect(),
        teams: team_options(&teams, ""),
        assign_to: String::new(),
        assignee_user_name: String::new(),
    };

    if !request.is_post() {
        return render(&template);
    }

    let assign_to = request.form.post_string("assignTo");
    let assignee_team = request.form.post_string("assigneeTeam");
    let assignee_user = request.form.post_string("assigneeUser");
    let assignee = Assignee::from_form(&assign_to, &assignee_user, &assignee_team);

    if let Assignee::User { name, .. } = &assignee {
        template.assignee_user_name = name.clone();
    }

    match client.allocate_cases(ctx, assignee.id(), &allocations).await {
        Ok(()) => {
            info!("allocated {} cases to {:?}", allocations.len(), assignee);
            template.success = true;
            render(&template)
        }
        Err(ClientError::Validation(validation)) => {
            template.error = remap_assignee_errors(validation, &assign_to);
            template.teams = team_options(&teams, &assignee_team);
            template.assign_to = assign_to;
            render_page(StatusCode::BAD_REQUEST, &template)
        }
        Err(e) => Err(e.into()),
    }
}

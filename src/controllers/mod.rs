pub mod allocate_cases_handler;
pub mod app_error;
pub mod complaints_handler;
pub mod fee_reduction_handler;
pub mod form_request;
pub mod payments_handler;
pub mod search_handler;
pub mod site_handler;

#[cfg(test)]
pub(crate) mod test_support;

use crate::controllers::app_error::AppError;
use crate::models::ref_data_model::RefDataItem;
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Renders `template` as an HTML page served with `status`.
pub(crate) fn render_page<T: Template>(
    status: StatusCode,
    template: &T,
) -> Result<Response, AppError> {
    let html = template.render()?;
    Ok((status, Html(html)).into_response())
}

/// Renders `template` as a `200 OK` page.
pub(crate) fn render<T: Template>(template: &T) -> Result<Response, AppError> {
    render_page(StatusCode::OK, template)
}

/// One `<option>` of a select or radio group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Options for a reference data list with `selected` marked.
pub(crate) fn ref_data_options(items: &[RefDataItem], selected: &str) -> Vec<SelectOption> {
    items
        .iter()
        .map(|item| SelectOption {
            value: item.handle.clone(),
            label: item.label.clone(),
            selected: item.handle == selected,
        })
        .collect()
}

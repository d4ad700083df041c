use crate::config::AppState;
use crate::controllers::app_error::AppError;
use crate::controllers::form_request::FormRequest;
use crate::controllers::render;
use crate::models::search_model::{
    deleted_case_uid, encode_term, total_pages, DeletedCase, Person, SearchFilters,
    ALL_PERSON_TYPES, SEARCH_PAGE_SIZE,
};
use crate::pagination::{parse_page, Pagination};
use askama::Template;
use axum::extract::State;
use axum::response::Response;
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::debug;

/// A person type checkbox in the filter panel.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PersonTypeFilter {
    name: &'static str,
    count: u32,
    selected: bool,
}

#[derive(Template, Debug)]
#[template(path = "search.html")]
struct SearchTemplate {
    prefix: String,
    term: String,
    total: u32,
    results: Vec<Person>,
    person_types: Vec<PersonTypeFilter>,
    filters_set: bool,
    pagination: Pagination,
    deleted_cases: Vec<DeletedCase>,
}

#[debug_handler]
/// Person search handler
///
/// Searches for people matching the `term` parameter, narrowed by any
/// `person-type` filters, and shows the requested `page` of results. When
/// nothing matches and the term is a case uid, any deleted case with that
/// uid is shown instead.
///
/// # Parameters
/// - `app_state` - Shared application state
/// - `request` - The page request
///
/// # Returns
/// `Response` with the rendered results page.
///
/// # Errors
/// Fails when no term is given, or when the search or deleted case lookup
/// fails.
pub async fn search(
    State(app_state): State<Arc<AppState>>,
    request: FormRequest,
) -> Result<Response, AppError> {
    let term = request.form.value("term").unwrap_or_default().trim().to_string();
    if term.is_empty() {
        return Err(AppError::BadRequest("search term required".to_string()));
    }

    let ctx = &request.context;
    let client = &app_state.client;
    let filters = SearchFilters::from_form(&request.form);
    let page = parse_page(request.form.value("page"));

    let mut response = client.search(ctx, &term, page, &filters.person_types).await?;
    let total = response.total.count;
    let last_page = total_pages(total);

    debug!("search for {:?} found {} people", term, total);

    // a stale page past the end shows the last page instead
    let page = if total > 0 && page > last_page {
        response = client.search(ctx, &term, last_page, &filters.person_types).await?;
        last_page
    } else {
        page
    };

    let deleted_cases = match deleted_case_uid(&term) {
        Some(uid) if total == 0 => client.deleted_cases(ctx, &uid).await?,
        _ => Vec::new(),
    };

    let pagination = Pagination::new(total, page, last_page, SEARCH_PAGE_SIZE)
        .with_queries(&encode_term(&term), &filters.encode());

    let person_types = ALL_PERSON_TYPES
        .into_iter()
        .map(|name| PersonTypeFilter {
            name,
            count: response.aggregations.get(name).copied().unwrap_or_default(),
            selected: filters.is_selected(name),
        })
        .collect();

    render(&SearchTemplate {
        prefix: app_state.settings.prefix.clone(),
        term,
        total,
        results: response.results,
        person_types,
        filters_set: filters.is_set(),
        pagination,
        deleted_cases,
    })
}

use crate::config::AppState;
use crate::controllers::allocate_cases_handler::allocate_cases;
use crate::controllers::complaints_handler::{add_complaint, edit_complaint};
use crate::controllers::fee_reduction_handler::{apply_fee_reduction, edit_fee_reduction};
use crate::controllers::payments_handler::{
    add_payment, delete_payment, get_lpa_payments, get_payments, manage_fees,
};
use crate::controllers::search_handler::search;
use crate::controllers::site_handler::health_check;
use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Creates a new router with the site routes
///
/// This function configures routes for the site:
/// - The health check is served at `/health-check`
/// - Person search is served at `/search`
/// - Payments for a case are served at `/payments/{id}`, and for a digital LPA at
///   `/lpa/{uid}/payments`
/// - Payment and fee reduction forms at `/add-payment`, `/apply-fee-reduction`,
///   `/edit-fee-reduction`, `/delete-payment` and `/manage-fees`
/// - Complaint forms at `/add-complaint` and `/edit-complaint`
/// - Case allocation at `/allocate-cases`
/// - Static assets served from `/assets`, `/javascript` and `/stylesheets`
///
/// # Parameters
/// - `app_state` - Shared application state
///
/// # Returns
/// A Router with the site routes
pub fn get_routes(app_state: Arc<AppState>) -> Router {
    let static_dir = Path::new(&app_state.settings.web_dir).join("static");

    Router::new()
        .route("/health-check", get(health_check))
        .route("/search", get(search))
        .route("/payments/{id}", get(get_payments))
        .route("/lpa/{uid}/payments", get(get_lpa_payments))
        .route("/manage-fees", get(manage_fees))
        .route("/add-payment", get(add_payment).post(add_payment))
        .route("/delete-payment", get(delete_payment).post(delete_payment))
        .route("/apply-fee-reduction", get(apply_fee_reduction).post(apply_fee_reduction))
        .route("/edit-fee-reduction", get(edit_fee_reduction).post(edit_fee_reduction))
        .route("/add-complaint", get(add_complaint).post(add_complaint))
        .route("/edit-complaint", get(edit_complaint).post(edit_complaint))
        .route("/allocate-cases", get(allocate_cases).post(allocate_cases))
        .nest_service("/assets", ServeDir::new(static_dir.join("assets")))
        .nest_service("/javascript", ServeDir::new(static_dir.join("javascript")))
        .nest_service("/stylesheets", ServeDir::new(static_dir.join("stylesheets")))
        .with_state(app_state)
}

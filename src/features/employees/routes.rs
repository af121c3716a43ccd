use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::features::employees::handlers::{
    create_employee, delete_employee, get_asset, get_employee, list_employees, update_employee,
};
use crate::features::employees::services::EmployeeService;

/// Create routes for the employees feature
///
/// `max_upload_size` bounds multipart bodies on create and update.
pub fn routes(service: Arc<EmployeeService>, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/api/employees",
            get(list_employees)
                .post(create_employee)
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/api/employees/{id}",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee)
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/api/assets/{asset_name}", get(get_asset))
        .with_state(service)
}

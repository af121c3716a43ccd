use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::employees::services::EmployeeService;

/// Download an employee image
///
/// Asset names are opaque identifiers taken from `imageFileName`.
#[utoipa::path(
    get,
    path = "/api/assets/{asset_name}",
    tag = "employees",
    params(("asset_name" = String, Path, description = "Asset name as issued on upload")),
    responses(
        (status = 200, description = "Raw asset bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Malformed asset name"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(service): State<Arc<EmployeeService>>,
    Path(asset_name): Path<String>,
) -> Result<impl IntoResponse> {
    let bytes = service.read_asset(&asset_name).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

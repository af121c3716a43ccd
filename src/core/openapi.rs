use utoipa::{Modify, OpenApi};

use crate::core::error::FieldViolation;
use crate::features::employees::{dtos as employees_dtos, handlers as employees_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        employees_handlers::list_employees,
        employees_handlers::get_employee,
        employees_handlers::create_employee,
        employees_handlers::update_employee,
        employees_handlers::delete_employee,
        employees_handlers::get_asset,
    ),
    components(
        schemas(
            Meta,
            FieldViolation,
            employees_dtos::EmployeeFormDto,
            employees_dtos::EmployeeResponseDto,
            employees_dtos::AssetCleanup,
            employees_dtos::UpdateEmployeeResponseDto,
            employees_dtos::DeleteEmployeeResponseDto,
            ApiResponse<employees_dtos::EmployeeResponseDto>,
            ApiResponse<Vec<employees_dtos::EmployeeResponseDto>>,
            ApiResponse<employees_dtos::UpdateEmployeeResponseDto>,
            ApiResponse<employees_dtos::DeleteEmployeeResponseDto>,
        )
    ),
    tags(
        (name = "employees", description = "Employee records and image assets"),
    ),
    info(
        title = "Employee Registry API",
        version = "0.1.0",
        description = "Employee records with image assets",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, FieldViolation, Result};
use crate::features::employees::dtos::{
    CreateEmployeeDto, DeleteEmployeeResponseDto, EmployeeFormDto, EmployeeResponseDto,
    ImageUpload, UpdateEmployeeDto, UpdateEmployeeResponseDto, IMAGE_FILE_FIELD,
};
use crate::features::employees::models::EmployeeId;
use crate::features::employees::services::EmployeeService;
use crate::shared::types::{ApiResponse, Meta};

/// Raw values collected from an employee multipart form
#[derive(Debug, Default)]
struct EmployeeForm {
    name: String,
    city: String,
    designation: String,
    about: String,
    contact_details: String,
    /// Raw `joinedAt` text; only update parses it
    joined_at: Option<String>,
    image: Option<ImageUpload>,
}

impl EmployeeForm {
    fn into_create(self) -> (CreateEmployeeDto, Option<ImageUpload>) {
        // Create always joins on the current date, so a bad value is not an error
        let joined_at = self.joined_at.as_deref().and_then(|text| {
            parse_joined_at(text).unwrap_or_else(|_| {
                debug!("Ignoring unparseable joinedAt on create: {:?}", text);
                None
            })
        });

        let dto = CreateEmployeeDto {
            name: self.name,
            city: self.city,
            designation: self.designation,
            about: self.about,
            contact_details: self.contact_details,
            joined_at,
        };
        (dto, self.image)
    }

    fn into_update(self) -> Result<(UpdateEmployeeDto, Option<ImageUpload>)> {
        let parsed = match self.joined_at.as_deref() {
            Some(text) => parse_joined_at(text)?,
            None => None,
        };
        let joined_at = parsed.ok_or_else(|| {
            AppError::InvalidFields(vec![FieldViolation::new(
                "joinedAt",
                "Join date is required",
            )])
        })?;

        let dto = UpdateEmployeeDto {
            name: self.name,
            city: self.city,
            designation: self.designation,
            about: self.about,
            contact_details: self.contact_details,
            joined_at,
        };
        Ok((dto, self.image))
    }
}

fn parse_joined_at(text: &str) -> Result<Option<NaiveDate>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            AppError::InvalidFields(vec![FieldViolation::new(
                "joinedAt",
                "Join date must be formatted as YYYY-MM-DD",
            )])
        })
}

async fn read_employee_form(mut multipart: Multipart) -> Result<EmployeeForm> {
    let mut form = EmployeeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == IMAGE_FILE_FIELD {
            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unnamed".to_string());

            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read file bytes: {}", e);
                AppError::BadRequest(format!("Failed to read file data: {}", e))
            })?;

            form.image = Some(ImageUpload::new(data.to_vec(), file_name));
            continue;
        }

        let text = field.text().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
        })?;

        match field_name.as_str() {
            "name" => form.name = text,
            "city" => form.city = text,
            "designation" => form.designation = text,
            "about" => form.about = text,
            "contactDetails" => form.contact_details = text,
            "joinedAt" => form.joined_at = Some(text),
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    Ok(form)
}

/// List all employees
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "employees",
    responses(
        (status = 200, description = "All employees", body = ApiResponse<Vec<EmployeeResponseDto>>)
    )
)]
pub async fn list_employees(
    State(service): State<Arc<EmployeeService>>,
) -> Result<Json<ApiResponse<Vec<EmployeeResponseDto>>>> {
    let employees: Vec<EmployeeResponseDto> = service
        .list()
        .await?
        .into_iter()
        .map(EmployeeResponseDto::from)
        .collect();
    let total = employees.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(employees),
        None,
        Some(Meta { total }),
    )))
}

/// Get an employee by id
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee found", body = ApiResponse<EmployeeResponseDto>),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn get_employee(
    State(service): State<Arc<EmployeeService>>,
    Path(id): Path<EmployeeId>,
) -> Result<Json<ApiResponse<EmployeeResponseDto>>> {
    let employee = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(employee.into()), None, None)))
}

/// Create an employee with an image
///
/// Accepts multipart/form-data. `name` and `imageFile` are required; every
/// missing field is reported at once. `joinedAt` is ignored and the employee
/// joins on the current date.
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "employees",
    request_body(
        content = EmployeeFormDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Employee created", body = ApiResponse<EmployeeResponseDto>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 500, description = "Image could not be stored")
    )
)]
pub async fn create_employee(
    State(service): State<Arc<EmployeeService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<EmployeeResponseDto>>)> {
    let (dto, image) = read_employee_form(multipart).await?.into_create();

    let employee = service.create(dto, image).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(employee.into()),
            Some("Employee created successfully".to_string()),
            None,
        )),
    ))
}

/// Update an employee
///
/// Accepts multipart/form-data. Every text field overwrites the stored value
/// and `joinedAt` is required. When `imageFile` is present and non-empty the
/// image is replaced; otherwise the current image is kept.
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    request_body(
        content = EmployeeFormDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Employee updated", body = ApiResponse<UpdateEmployeeResponseDto>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn update_employee(
    State(service): State<Arc<EmployeeService>>,
    Path(id): Path<EmployeeId>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UpdateEmployeeResponseDto>>> {
    let (dto, image) = read_employee_form(multipart).await?.into_update()?;

    let outcome = service.update(id, dto, image).await?;

    Ok(Json(ApiResponse::success(
        Some(UpdateEmployeeResponseDto {
            employee: outcome.employee.into(),
            asset_cleanup: outcome.asset_cleanup,
        }),
        Some("Employee updated successfully".to_string()),
        None,
    )))
}

/// Delete an employee and its image
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted", body = ApiResponse<DeleteEmployeeResponseDto>),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn delete_employee(
    State(service): State<Arc<EmployeeService>>,
    Path(id): Path<EmployeeId>,
) -> Result<Json<ApiResponse<DeleteEmployeeResponseDto>>> {
    let outcome = service.delete(id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteEmployeeResponseDto {
            id: outcome.employee_id,
            deleted: true,
            asset_cleanup: outcome.asset_cleanup,
        }),
        Some("Employee deleted successfully".to_string()),
        None,
    )))
}

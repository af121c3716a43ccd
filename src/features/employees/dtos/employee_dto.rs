use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Field name reported when a create request carries no image payload
pub const IMAGE_FILE_FIELD: &str = "imageFile";

/// Fields supplied when creating an employee.
///
/// `joined_at` is accepted but not honored: new records always join on the
/// current date.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeDto {
    #[validate(length(min = 1, max = 255, message = "this is required field"))]
    pub name: String,

    #[validate(length(max = 255, message = "City must not exceed 255 characters"))]
    pub city: String,

    #[validate(length(
        max = 255,
        message = "Designation must not exceed 255 characters"
    ))]
    pub designation: String,

    pub about: String,

    #[validate(length(
        max = 255,
        message = "Contact details must not exceed 255 characters"
    ))]
    pub contact_details: String,

    pub joined_at: Option<NaiveDate>,
}

/// Fields supplied when updating an employee. Every field overwrites the
/// stored value, including `joined_at`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeDto {
    #[validate(length(min = 1, max = 255, message = "this is required field"))]
    pub name: String,

    #[validate(length(max = 255, message = "City must not exceed 255 characters"))]
    pub city: String,

    #[validate(length(
        max = 255,
        message = "Designation must not exceed 255 characters"
    ))]
    pub designation: String,

    pub about: String,

    #[validate(length(
        max = 255,
        message = "Contact details must not exceed 255 characters"
    ))]
    pub contact_details: String,

    pub joined_at: NaiveDate,
}

/// An uploaded image as handed over by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// Client-side file name, used only as a naming hint
    pub original_name: String,
}

impl ImageUpload {
    pub fn new(bytes: impl Into<Vec<u8>>, original_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            original_name: original_name.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Multipart form for creating or updating an employee.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handlers use axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct EmployeeFormDto {
    #[schema(example = "Alice")]
    pub name: String,
    pub city: Option<String>,
    pub designation: Option<String>,
    pub about: Option<String>,
    pub contact_details: Option<String>,
    /// `YYYY-MM-DD`; ignored on create, required on update
    #[schema(example = "2024-03-01")]
    pub joined_at: Option<String>,
    /// Employee image; required on create, optional on update
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image_file: Option<String>,
}

/// Response DTO for employee records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponseDto {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub designation: String,
    pub about: String,
    pub contact_details: String,
    pub joined_at: NaiveDate,
    /// Opaque asset identifier; do not parse
    pub image_file_name: Option<String>,
    /// Path serving the image bytes
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of removing an asset that is no longer referenced.
///
/// Removal is best-effort: a failure is reported here instead of failing the
/// surrounding operation, and leaves an orphaned asset behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AssetCleanup {
    /// No asset was released by the operation
    NotNeeded,
    /// The released asset was deleted
    Removed {
        #[serde(rename = "assetName")]
        asset_name: String,
    },
    /// The released asset could not be deleted
    Failed {
        #[serde(rename = "assetName")]
        asset_name: String,
        reason: String,
    },
}

impl AssetCleanup {
    pub fn is_failed(&self) -> bool {
        matches!(self, AssetCleanup::Failed { .. })
    }
}

/// Response DTO for updates
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeResponseDto {
    pub employee: EmployeeResponseDto,
    pub asset_cleanup: AssetCleanup,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEmployeeResponseDto {
    pub id: i32,
    pub deleted: bool,
    pub asset_cleanup: AssetCleanup,
}

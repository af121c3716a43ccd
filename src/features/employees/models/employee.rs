use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::features::employees::dtos::EmployeeResponseDto;

/// Identifier assigned by the record store on insert
pub type EmployeeId = i32;

/// Database model for employees
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub city: String,
    pub designation: String,
    pub about: String,
    pub contact_details: String,
    pub joined_at: NaiveDate,
    /// Name of the image asset; always resolvable in the asset store when set
    pub image_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An employee that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub city: String,
    pub designation: String,
    pub about: String,
    pub contact_details: String,
    pub joined_at: NaiveDate,
    pub image_file_name: String,
}

impl From<Employee> for EmployeeResponseDto {
    fn from(e: Employee) -> Self {
        let image_url = e
            .image_file_name
            .as_ref()
            .map(|name| format!("/api/assets/{}", name));

        Self {
            id: e.id,
            name: e.name,
            city: e.city,
            designation: e.designation,
            about: e.about,
            contact_details: e.contact_details,
            joined_at: e.joined_at,
            image_file_name: e.image_file_name,
            image_url,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

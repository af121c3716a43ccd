use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::employees::models::{Employee, EmployeeId, NewEmployee};

/// Persistence for employee records
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Employee>>;

    async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>>;

    /// Insert a new record; the store assigns the id
    async fn insert(&self, employee: NewEmployee) -> Result<Employee>;

    /// Overwrite every mutable column of an existing record
    async fn save(&self, employee: &Employee) -> Result<Employee>;

    async fn delete(&self, employee: &Employee) -> Result<()>;
}

/// PostgreSQL-backed employee repository
pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn insert(&self, employee: NewEmployee) -> Result<Employee> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (name, city, designation, about, contact_details, joined_at, image_file_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.city)
        .bind(&employee.designation)
        .bind(&employee.about)
        .bind(&employee.contact_details)
        .bind(employee.joined_at)
        .bind(&employee.image_file_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert employee: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(employee)
    }

    async fn save(&self, employee: &Employee) -> Result<Employee> {
        let saved = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET name = $2,
                city = $3,
                designation = $4,
                about = $5,
                contact_details = $6,
                joined_at = $7,
                image_file_name = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(employee.id)
        .bind(&employee.name)
        .bind(&employee.city)
        .bind(&employee.designation)
        .bind(&employee.about)
        .bind(&employee.contact_details)
        .bind(employee.joined_at)
        .bind(&employee.image_file_name)
        .fetch_optional(&self.pool)
        .await?;

        saved.ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee.id)))
    }

    async fn delete(&self, employee: &Employee) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM employees
            WHERE id = $1
            "#,
        )
        .bind(employee.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

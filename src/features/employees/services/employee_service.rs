//! Employee lifecycle: keeps image assets and employee records consistent.
//!
//! The asset store and the record store share no transaction, so every
//! operation follows a fixed ordering:
//!
//! - create: store the asset, then insert the record
//! - update: store the new asset, persist the record, then remove the old asset
//! - delete: delete the record, then remove its asset
//!
//! A record therefore never references an asset that does not exist. Removing
//! a released asset is best-effort; a failure leaves an orphan and is reported
//! as [`AssetCleanup::Failed`].

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::core::error::{AppError, FieldViolation, Result};
use crate::features::employees::dtos::{
    AssetCleanup, CreateEmployeeDto, ImageUpload, UpdateEmployeeDto, IMAGE_FILE_FIELD,
};
use crate::features::employees::models::{Employee, EmployeeId, NewEmployee};
use crate::features::employees::repositories::EmployeeRepository;
use crate::features::employees::services::EmployeeLocks;
use crate::modules::storage::AssetStore;
use crate::shared::validation::field_violations;

/// Result of a successful update
#[derive(Debug)]
pub struct UpdateOutcome {
    pub employee: Employee,
    pub asset_cleanup: AssetCleanup,
}

/// Result of a successful delete
#[derive(Debug)]
pub struct DeleteOutcome {
    pub employee_id: EmployeeId,
    pub asset_cleanup: AssetCleanup,
}

/// Service orchestrating the asset store and the employee repository
pub struct EmployeeService {
    repository: Arc<dyn EmployeeRepository>,
    assets: Arc<dyn AssetStore>,
    locks: EmployeeLocks,
}

impl EmployeeService {
    pub fn new(repository: Arc<dyn EmployeeRepository>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            repository,
            assets,
            locks: EmployeeLocks::new(),
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn not_found(id: EmployeeId) -> AppError {
        AppError::NotFound(format!("Employee {} not found", id))
    }

    /// List every employee
    pub async fn list(&self) -> Result<Vec<Employee>> {
        self.repository.find_all().await
    }

    /// Get one employee
    pub async fn get(&self, id: EmployeeId) -> Result<Employee> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Read the bytes of a stored asset
    pub async fn read_asset(&self, asset_name: &str) -> Result<Vec<u8>> {
        Ok(self.assets.retrieve(asset_name).await?)
    }

    /// Create an employee together with its image.
    ///
    /// Both `name` and a non-empty image are required; every violation is
    /// reported at once and nothing is written. The image is stored before
    /// the record, and a store failure aborts the whole operation.
    ///
    /// The record always joins on the current date. A caller-supplied
    /// `joined_at` is ignored here, while `update` honors it; this asymmetry
    /// is kept pending product confirmation.
    pub async fn create(
        &self,
        dto: CreateEmployeeDto,
        image: Option<ImageUpload>,
    ) -> Result<Employee> {
        let image = image.filter(|i| !i.is_empty());

        let mut violations = match dto.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => field_violations(&errors),
        };
        if image.is_none() {
            violations.push(FieldViolation::new(
                IMAGE_FILE_FIELD,
                "The image file is required",
            ));
        }
        let image = match image {
            Some(image) if violations.is_empty() => image,
            _ => return Err(AppError::InvalidFields(violations)),
        };

        let asset_name = self
            .assets
            .store(&image.bytes, &image.original_name)
            .await?;
        debug!("Stored image '{}' for new employee", asset_name);

        let joined_at = Self::today();
        if let Some(requested) = dto.joined_at.filter(|d| *d != joined_at) {
            debug!(
                "Ignoring requested join date {} on create, using {}",
                requested, joined_at
            );
        }

        let new_employee = NewEmployee {
            name: dto.name,
            city: dto.city,
            designation: dto.designation,
            about: dto.about,
            contact_details: dto.contact_details,
            joined_at,
            image_file_name: asset_name.clone(),
        };

        let employee = match self.repository.insert(new_employee).await {
            Ok(employee) => employee,
            Err(e) => {
                self.discard_asset(None, &asset_name).await;
                return Err(e);
            }
        };

        info!("Employee created: id={}, image={}", employee.id, asset_name);

        Ok(employee)
    }

    /// Update an employee, optionally replacing its image.
    ///
    /// Without a new image the stored image reference is left untouched.
    /// With one, the new asset is stored first and the record is persisted
    /// pointing at it; only then is the previous asset removed, best-effort.
    pub async fn update(
        &self,
        id: EmployeeId,
        dto: UpdateEmployeeDto,
        image: Option<ImageUpload>,
    ) -> Result<UpdateOutcome> {
        dto.validate()
            .map_err(|e| AppError::InvalidFields(field_violations(&e)))?;
        let image = image.filter(|i| !i.is_empty());

        let _guard = self.locks.acquire(id).await;

        let mut employee = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        let mut stored_asset = None;
        let mut released_asset = None;
        if let Some(image) = image {
            let asset_name = self
                .assets
                .store(&image.bytes, &image.original_name)
                .await?;
            debug!("Stored replacement image '{}' for employee {}", asset_name, id);

            released_asset = employee.image_file_name.replace(asset_name.clone());
            stored_asset = Some(asset_name);
        }

        employee.name = dto.name;
        employee.city = dto.city;
        employee.designation = dto.designation;
        employee.about = dto.about;
        employee.contact_details = dto.contact_details;
        employee.joined_at = dto.joined_at;

        let employee = match self.repository.save(&employee).await {
            Ok(saved) => saved,
            Err(e) => {
                if let Some(asset_name) = stored_asset {
                    self.discard_asset(Some(id), &asset_name).await;
                }
                return Err(e);
            }
        };

        let asset_cleanup = match released_asset {
            Some(previous) => self.discard_asset(Some(id), &previous).await,
            None => AssetCleanup::NotNeeded,
        };

        info!(
            "Employee updated: id={}, image_replaced={}",
            id,
            stored_asset.is_some()
        );

        Ok(UpdateOutcome {
            employee,
            asset_cleanup,
        })
    }

    /// Delete an employee and, best-effort, its image.
    ///
    /// The record goes first so that a failed asset removal can only leave an
    /// orphaned asset, never a record pointing at a missing one.
    pub async fn delete(&self, id: EmployeeId) -> Result<DeleteOutcome> {
        let _guard = self.locks.acquire(id).await;

        let employee = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        self.repository.delete(&employee).await?;

        let asset_cleanup = match employee.image_file_name.as_deref() {
            Some(asset_name) => self.discard_asset(Some(id), asset_name).await,
            None => AssetCleanup::NotNeeded,
        };

        info!("Employee deleted: id={}", id);

        Ok(DeleteOutcome {
            employee_id: id,
            asset_cleanup,
        })
    }

    /// Best-effort removal of an asset no record references any more
    async fn discard_asset(
        &self,
        employee_id: Option<EmployeeId>,
        asset_name: &str,
    ) -> AssetCleanup {
        match self.assets.delete(asset_name).await {
            Ok(()) => AssetCleanup::Removed {
                asset_name: asset_name.to_string(),
            },
            Err(e) => {
                warn!(
                    employee_id = ?employee_id,
                    asset_name = %asset_name,
                    error = %e,
                    "Failed to remove unreferenced asset; it is now orphaned"
                );
                AssetCleanup::Failed {
                    asset_name: asset_name.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::{is_valid_asset_name, StorageError};
    use crate::shared::test_helpers::{fake_create_dto, fake_update_dto, image, TestContext};
    use tokio_test::assert_ok;

    fn some_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_create_persists_record_and_asset() {
        let ctx = TestContext::new();
        let dto = CreateEmployeeDto {
            name: "Alice".to_string(),
            joined_at: None,
            ..fake_create_dto()
        };

        let employee = ctx
            .service
            .create(dto, image(&[0x01, 0x02], "alice.png"))
            .await
            .unwrap();

        assert_eq!(employee.name, "Alice");
        assert_eq!(employee.joined_at, Local::now().date_naive());
        let asset_name = employee.image_file_name.clone().unwrap();
        assert!(is_valid_asset_name(&asset_name));
        assert!(asset_name.ends_with("_alice.png"));
        assert_eq!(
            ctx.assets.retrieve(&asset_name).await.unwrap(),
            vec![0x01, 0x02]
        );
        assert_eq!(
            ctx.service.get(employee.id).await.unwrap().image_file_name,
            Some(asset_name)
        );
    }

    #[tokio::test]
    async fn test_create_accepts_awkward_upload_names() {
        let ctx = TestContext::new();
        let long_name = format!("{}.png", "x".repeat(300));

        for suggested in ["photo...png", "...", "a....b.png", long_name.as_str()] {
            let employee = assert_ok!(
                ctx.service
                    .create(fake_create_dto(), image(b"img", suggested))
                    .await
            );
            let asset_name = employee.image_file_name.unwrap();
            assert!(is_valid_asset_name(&asset_name));
            assert_eq!(ctx.assets.retrieve(&asset_name).await.unwrap(), b"img");
        }

        assert_eq!(ctx.repository.len().await, 4);
    }

    #[tokio::test]
    async fn test_create_ignores_requested_join_date() {
        let ctx = TestContext::new();
        let dto = CreateEmployeeDto {
            joined_at: Some(some_date()),
            ..fake_create_dto()
        };

        let employee = ctx.service.create(dto, image(b"img", "a.png")).await.unwrap();

        assert_eq!(employee.joined_at, Local::now().date_naive());
    }

    #[tokio::test]
    async fn test_create_reports_every_missing_field() {
        let ctx = TestContext::new();
        let dto = CreateEmployeeDto {
            name: String::new(),
            ..fake_create_dto()
        };

        let err = ctx.service.create(dto, None).await.unwrap_err();

        let fields = err.invalid_fields();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"imageFile"));
        assert!(ctx.assets.asset_names().is_empty());
        assert_eq!(ctx.repository.len().await, 0);
    }

    #[tokio::test]
    async fn test_create_treats_empty_upload_as_missing() {
        let ctx = TestContext::new();

        let err = ctx
            .service
            .create(fake_create_dto(), image(&[], "empty.png"))
            .await
            .unwrap_err();

        assert_eq!(err.invalid_fields(), vec!["imageFile"]);
        assert!(ctx.assets.asset_names().is_empty());
    }

    #[tokio::test]
    async fn test_create_aborts_when_asset_store_fails() {
        let ctx = TestContext::new();
        ctx.assets.fail_store(true);

        let err = ctx
            .service
            .create(fake_create_dto(), image(b"img", "a.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(StorageError::Io { .. })));
        assert_eq!(ctx.repository.len().await, 0);
        assert!(ctx.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_removes_asset_when_record_insert_fails() {
        let ctx = TestContext::new();
        ctx.repository.fail_writes(true);

        let err = ctx
            .service
            .create(fake_create_dto(), image(b"img", "a.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert!(ctx.assets.asset_names().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_image() {
        let ctx = TestContext::new();
        let seeded = ctx.seed_employee(7, b"old").await;
        let old_asset = seeded.image_file_name.clone().unwrap();

        let outcome = ctx
            .service
            .update(7, fake_update_dto(some_date()), image(b"new", "new.png"))
            .await
            .unwrap();

        let new_asset = outcome.employee.image_file_name.clone().unwrap();
        assert_ne!(new_asset, old_asset);
        assert_eq!(ctx.assets.retrieve(&new_asset).await.unwrap(), b"new");
        assert!(matches!(
            ctx.assets.retrieve(&old_asset).await,
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(
            outcome.asset_cleanup,
            AssetCleanup::Removed {
                asset_name: old_asset
            }
        );
        assert_eq!(
            ctx.service.get(7).await.unwrap().image_file_name,
            Some(new_asset.clone())
        );
        assert_eq!(ctx.assets.asset_names(), vec![new_asset]);
    }

    #[tokio::test]
    async fn test_update_without_image_keeps_asset_and_overwrites_fields() {
        let ctx = TestContext::new();
        let seeded = ctx.seed_employee(3, b"keep").await;
        let dto = UpdateEmployeeDto {
            name: "Renamed".to_string(),
            ..fake_update_dto(some_date())
        };

        let outcome = ctx.service.update(3, dto.clone(), None).await.unwrap();

        assert_eq!(outcome.asset_cleanup, AssetCleanup::NotNeeded);
        assert_eq!(outcome.employee.image_file_name, seeded.image_file_name);
        assert_eq!(outcome.employee.name, "Renamed");
        assert_eq!(outcome.employee.city, dto.city);
        assert_eq!(outcome.employee.contact_details, dto.contact_details);
        assert_eq!(outcome.employee.joined_at, some_date());
        assert_eq!(ctx.assets.asset_names().len(), 1);
    }

    #[tokio::test]
    async fn test_update_reports_failed_cleanup_and_still_persists() {
        let ctx = TestContext::new();
        let seeded = ctx.seed_employee(5, b"old").await;
        let old_asset = seeded.image_file_name.unwrap();
        ctx.assets.fail_delete(true);

        let outcome = ctx
            .service
            .update(5, fake_update_dto(some_date()), image(b"new", "n.png"))
            .await
            .unwrap();

        assert!(outcome.asset_cleanup.is_failed());
        assert!(matches!(
            &outcome.asset_cleanup,
            AssetCleanup::Failed { asset_name, .. } if *asset_name == old_asset
        ));
        let new_asset = outcome.employee.image_file_name.unwrap();
        assert!(ctx.assets.exists(&new_asset).await.unwrap());
        assert_eq!(
            ctx.service.get(5).await.unwrap().image_file_name,
            Some(new_asset)
        );
    }

    #[tokio::test]
    async fn test_update_keeps_old_image_when_new_store_fails() {
        let ctx = TestContext::new();
        let seeded = ctx.seed_employee(9, b"old").await;
        ctx.assets.fail_store(true);

        let err = ctx
            .service
            .update(9, fake_update_dto(some_date()), image(b"new", "n.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        let stored = ctx.service.get(9).await.unwrap();
        assert_eq!(stored, seeded);
        let old_asset = stored.image_file_name.unwrap();
        assert_eq!(ctx.assets.retrieve(&old_asset).await.unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_update_discards_new_image_when_save_fails() {
        let ctx = TestContext::new();
        let seeded = ctx.seed_employee(4, b"old").await;
        ctx.repository.fail_writes(true);

        let err = ctx
            .service
            .update(4, fake_update_dto(some_date()), image(b"new", "n.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(
            ctx.assets.asset_names(),
            vec![seeded.image_file_name.unwrap()]
        );
    }

    #[tokio::test]
    async fn test_update_missing_employee_is_not_found() {
        let ctx = TestContext::new();

        let err = ctx
            .service
            .update(42, fake_update_dto(some_date()), image(b"new", "n.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(ctx.assets.asset_names().is_empty());
    }

    #[tokio::test]
    async fn test_update_validates_fields() {
        let ctx = TestContext::new();
        ctx.seed_employee(1, b"old").await;
        let dto = UpdateEmployeeDto {
            name: String::new(),
            ..fake_update_dto(some_date())
        };

        let err = ctx.service.update(1, dto, None).await.unwrap_err();

        assert_eq!(err.invalid_fields(), vec!["name"]);
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_asset() {
        let ctx = TestContext::new();
        let seeded = ctx.seed_employee(42, b"bytes").await;
        let asset_name = seeded.image_file_name.unwrap();

        let outcome = ctx.service.delete(42).await.unwrap();

        assert_eq!(outcome.employee_id, 42);
        assert_eq!(outcome.asset_cleanup, AssetCleanup::Removed { asset_name: asset_name.clone() });
        assert!(matches!(ctx.service.get(42).await, Err(AppError::NotFound(_))));
        assert!(!ctx.assets.exists(&asset_name).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_employee_is_not_found() {
        let ctx = TestContext::new();
        ctx.seed_employee(1, b"bytes").await;

        let err = ctx.service.delete(42).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(ctx.repository.len().await, 1);
        assert_eq!(ctx.assets.asset_names().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_asset_cleanup_fails() {
        let ctx = TestContext::new();
        let seeded = ctx.seed_employee(2, b"bytes").await;
        ctx.assets.fail_delete(true);

        let outcome = ctx.service.delete(2).await.unwrap();

        assert!(outcome.asset_cleanup.is_failed());
        assert!(matches!(ctx.service.get(2).await, Err(AppError::NotFound(_))));
        assert!(ctx
            .assets
            .exists(&seeded.image_file_name.unwrap())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found_second_time() {
        let ctx = TestContext::new();
        ctx.seed_employee(8, b"bytes").await;

        assert_ok!(ctx.service.delete(8).await);
        assert!(matches!(
            ctx.service.delete(8).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_updates_leave_exactly_one_referenced_asset() {
        let ctx = TestContext::new();
        ctx.seed_employee(11, b"old").await;

        let updates: Vec<_> = (0..8u8)
            .map(|i| {
                let service = Arc::clone(&ctx.service);
                tokio::spawn(async move {
                    service
                        .update(11, fake_update_dto(some_date()), image(&[i + 1], "p.png"))
                        .await
                })
            })
            .collect();

        for result in futures::future::join_all(updates).await {
            let outcome = result.unwrap().unwrap();
            assert!(matches!(outcome.asset_cleanup, AssetCleanup::Removed { .. }));
        }

        let current = ctx.service.get(11).await.unwrap().image_file_name.unwrap();
        assert_eq!(ctx.assets.asset_names(), vec![current]);
    }

    #[tokio::test]
    async fn test_list_returns_created_employees() {
        let ctx = TestContext::new();
        ctx.service
            .create(fake_create_dto(), image(b"a", "a.png"))
            .await
            .unwrap();
        ctx.service
            .create(fake_create_dto(), image(b"b", "b.png"))
            .await
            .unwrap();

        let employees = ctx.service.list().await.unwrap();

        assert_eq!(employees.len(), 2);
        for employee in employees {
            let asset = employee.image_file_name.unwrap();
            assert!(ctx.assets.exists(&asset).await.unwrap());
        }
    }
}

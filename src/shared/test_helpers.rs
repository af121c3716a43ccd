//! Test doubles for the employee lifecycle: an in-memory record store and a
//! fault-injecting asset store over a temporary directory.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use fake::faker::address::en::CityName;
use fake::faker::job::en::Title;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use std::collections::BTreeMap;
use std::io::{Error as IoError, ErrorKind};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::features::employees::dtos::{CreateEmployeeDto, ImageUpload, UpdateEmployeeDto};
use crate::features::employees::models::{Employee, EmployeeId, NewEmployee};
use crate::features::employees::repositories::EmployeeRepository;
use crate::features::employees::EmployeeService;
use crate::modules::storage::{AssetStore, LocalAssetStore, StorageError};

/// Record store kept in memory, with switchable write failures
#[derive(Default)]
pub struct InMemoryEmployeeRepository {
    records: RwLock<BTreeMap<EmployeeId, Employee>>,
    next_id: AtomicI32,
    fail_writes: AtomicBool,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Place a record under a chosen id, bypassing id assignment
    pub async fn seed(&self, id: EmployeeId, employee: NewEmployee) -> Employee {
        let record = materialize(id, employee);
        self.records.write().await.insert(id, record.clone());
        self.next_id.fetch_max(id, Ordering::SeqCst);
        record
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn materialize(id: EmployeeId, employee: NewEmployee) -> Employee {
    let now = Utc::now();
    Employee {
        id,
        name: employee.name,
        city: employee.city,
        designation: employee.designation,
        about: employee.about,
        contact_details: employee.contact_details,
        joined_at: employee.joined_at,
        image_file_name: Some(employee.image_file_name).filter(|n| !n.is_empty()),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<Employee>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn insert(&self, employee: NewEmployee) -> Result<Employee> {
        self.check_writable()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = materialize(id, employee);
        self.records.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn save(&self, employee: &Employee) -> Result<Employee> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        let existing = records
            .get_mut(&employee.id)
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee.id)))?;
        *existing = Employee {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..employee.clone()
        };
        Ok(existing.clone())
    }

    async fn delete(&self, employee: &Employee) -> Result<()> {
        self.check_writable()?;
        self.records.write().await.remove(&employee.id);
        Ok(())
    }
}

/// Local asset store whose writes and deletes can be made to fail
pub struct FaultyAssetStore {
    inner: LocalAssetStore,
    fail_store: AtomicBool,
    fail_delete: AtomicBool,
}

impl FaultyAssetStore {
    pub fn new(dir: &TempDir) -> Self {
        Self {
            inner: LocalAssetStore::with_root(dir.path().join("images")),
            fail_store: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    pub fn fail_store(&self, fail: bool) {
        self.fail_store.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Names of every asset currently visible in the directory
    pub fn asset_names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.inner.root()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl AssetStore for FaultyAssetStore {
    async fn store(
        &self,
        payload: &[u8],
        suggested_name: &str,
    ) -> std::result::Result<String, StorageError> {
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(StorageError::io(
                "create",
                self.inner.root(),
                IoError::new(ErrorKind::Other, "No space left on device"),
            ));
        }
        self.inner.store(payload, suggested_name).await
    }

    async fn retrieve(&self, asset_name: &str) -> std::result::Result<Vec<u8>, StorageError> {
        self.inner.retrieve(asset_name).await
    }

    async fn exists(&self, asset_name: &str) -> std::result::Result<bool, StorageError> {
        self.inner.exists(asset_name).await
    }

    async fn delete(&self, asset_name: &str) -> std::result::Result<(), StorageError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::io(
                "delete",
                self.inner.root().join(asset_name),
                IoError::new(ErrorKind::PermissionDenied, "Permission denied"),
            ));
        }
        self.inner.delete(asset_name).await
    }
}

/// Everything a lifecycle test needs, sharing one temporary directory
pub struct TestContext {
    pub service: Arc<EmployeeService>,
    pub repository: Arc<InMemoryEmployeeRepository>,
    pub assets: Arc<FaultyAssetStore>,
    _dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repository = Arc::new(InMemoryEmployeeRepository::new());
        let assets = Arc::new(FaultyAssetStore::new(&dir));
        let service = Arc::new(EmployeeService::new(
            Arc::clone(&repository) as Arc<dyn EmployeeRepository>,
            Arc::clone(&assets) as Arc<dyn AssetStore>,
        ));

        Self {
            service,
            repository,
            assets,
            _dir: dir,
        }
    }

    /// Store `bytes` as an asset and seed a record referencing it under `id`
    pub async fn seed_employee(&self, id: EmployeeId, bytes: &[u8]) -> Employee {
        let asset_name = self.assets.store(bytes, "seed.png").await.unwrap();
        self.repository
            .seed(
                id,
                NewEmployee {
                    image_file_name: asset_name,
                    ..fake_new_employee()
                },
            )
            .await
    }
}

pub fn fake_create_dto() -> CreateEmployeeDto {
    CreateEmployeeDto {
        name: Name().fake(),
        city: CityName().fake(),
        designation: Title().fake(),
        about: Sentence(3..8).fake(),
        contact_details: PhoneNumber().fake(),
        joined_at: None,
    }
}

pub fn fake_update_dto(joined_at: NaiveDate) -> UpdateEmployeeDto {
    UpdateEmployeeDto {
        name: Name().fake(),
        city: CityName().fake(),
        designation: Title().fake(),
        about: Sentence(3..8).fake(),
        contact_details: PhoneNumber().fake(),
        joined_at,
    }
}

fn fake_new_employee() -> NewEmployee {
    NewEmployee {
        name: Name().fake(),
        city: CityName().fake(),
        designation: Title().fake(),
        about: Sentence(3..8).fake(),
        contact_details: PhoneNumber().fake(),
        joined_at: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
        image_file_name: String::new(),
    }
}

pub fn image(bytes: &[u8], name: &str) -> Option<ImageUpload> {
    Some(ImageUpload::new(bytes.to_vec(), name))
}

mod employee_locks;
mod employee_service;

pub use employee_locks::EmployeeLocks;
pub use employee_service::{DeleteOutcome, EmployeeService, UpdateOutcome};

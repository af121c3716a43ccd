mod employee;

pub use employee::{Employee, EmployeeId, NewEmployee};

//! Employee records and their image assets.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/employees` | List employees |
//! | GET | `/api/employees/{id}` | Get one employee |
//! | POST | `/api/employees` | Create an employee with an image (multipart) |
//! | PUT | `/api/employees/{id}` | Update an employee, optionally replacing the image (multipart) |
//! | DELETE | `/api/employees/{id}` | Delete an employee and its image |
//! | GET | `/api/assets/{asset_name}` | Download an image |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgEmployeeRepository;
pub use routes::routes;
pub use services::EmployeeService;

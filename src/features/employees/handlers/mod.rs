mod asset_handler;
mod employee_handler;

pub use asset_handler::*;
pub use employee_handler::*;

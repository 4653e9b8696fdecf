mod audit_service;
mod bulk_service;
mod bulk_validation;
mod filter_service;
mod permission_service;

pub use audit_service::*;
pub use bulk_service::*;
pub use bulk_validation::*;
pub use filter_service::*;
pub use permission_service::*;

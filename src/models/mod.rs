mod admin;
mod audit_log;
mod bulk;
mod entity;
mod filter;
mod permission_check;

pub use admin::*;
pub use audit_log::*;
pub use bulk::*;
pub use entity::*;
pub use filter::*;
pub use permission_check::*;

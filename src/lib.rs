//! Admin moderation rule engine
//!
//! Pure decision logic behind the moderation dashboard:
//! - **Filters**: composable, order-independent predicates over hackathons and users
//! - **Bulk actions**: request validation, per-item execution and exact success/failure accounting
//! - **Audit log**: immutable entries and field-level before/after diffs
//! - **Permissions**: four-level role hierarchy with per-assignment overrides
//!
//! The crate performs no I/O. Persistence, transport and notification delivery
//! belong to the caller; per-item mutations are plugged in through
//! [`services::BulkActionExecutor`].
//!
//! # Example: filtering then validating a bulk request
//!
//! ```rust
//! use admin_moderation::models::{EntityKind, FilterCriteria, Hackathon};
//! use admin_moderation::services::{apply_filters, validate_bulk_request};
//!
//! let hackathons: Vec<Hackathon> = Vec::new();
//! let criteria = FilterCriteria::default().with_status("pending_review");
//! let targets: Vec<i64> = apply_filters(&hackathons, &criteria).iter().map(|h| h.id).collect();
//!
//! let payload = serde_json::json!({ "ids": targets, "action": "approve", "reason": "meets guidelines" });
//! let result = validate_bulk_request(EntityKind::Hackathon, &payload);
//! // no hackathons matched, so the id list is empty
//! assert!(!result.valid);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

pub use config::ModerationConfig;
pub use error::{ModerationError, Result};

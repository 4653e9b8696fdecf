use serde::Serialize;

use super::admin::{AdminRole, Permission};

/// Outcome of a permission check, returned instead of raised so callers can
/// translate a denial into a 403-equivalent with actionable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCheckResult {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub role: Option<AdminRole>,
    /// Permissions that were evaluated.
    pub permissions: Vec<Permission>,
    /// Permissions the role lacks; filled on denial.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<Permission>,
}

impl PermissionCheckResult {
    pub fn allowed(role: AdminRole, permissions: Vec<Permission>) -> Self {
        Self {
            allowed: true,
            reason: None,
            role: Some(role),
            permissions,
            missing: Vec::new(),
        }
    }

    pub fn denied(
        role: Option<AdminRole>,
        permissions: Vec<Permission>,
        missing: Vec<Permission>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            role,
            permissions,
            missing,
        }
    }
}

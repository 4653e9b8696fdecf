use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModerationError;

/// Admin role hierarchy, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Viewer,
    Moderator,
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Viewer => "viewer",
            AdminRole::Moderator => "moderator",
            AdminRole::Admin => "admin",
            AdminRole::SuperAdmin => "super_admin",
        }
    }

    /// Numeric privilege level: super_admin=4, admin=3, moderator=2, viewer=1.
    pub const fn level(&self) -> u8 {
        match self {
            AdminRole::Viewer => 1,
            AdminRole::Moderator => 2,
            AdminRole::Admin => 3,
            AdminRole::SuperAdmin => 4,
        }
    }

    pub fn is_at_least(&self, required: AdminRole) -> bool {
        self.level() >= required.level()
    }

    pub const fn all() -> &'static [AdminRole] {
        &[
            AdminRole::SuperAdmin,
            AdminRole::Admin,
            AdminRole::Moderator,
            AdminRole::Viewer,
        ]
    }
}

impl PartialOrd for AdminRole {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AdminRole {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.level().cmp(&other.level())
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "admin" => Ok(AdminRole::Admin),
            "moderator" => Ok(AdminRole::Moderator),
            "viewer" => Ok(AdminRole::Viewer),
            other => Err(ModerationError::UnknownValue {
                kind: "admin role",
                value: other.to_string(),
            }),
        }
    }
}

/// Named capability gating one category of admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CanApproveHackathons,
    CanRejectHackathons,
    CanDeleteHackathons,
    CanEditHackathons,
    CanUnpublishHackathons,
    CanFeatureHackathons,
    CanModerateUsers,
    CanBanUsers,
    CanDeleteUsers,
    CanManageAdmins,
    CanViewAuditLogs,
    CanExportData,
    CanAccessAnalytics,
    CanSendAnnouncements,
    CanManageQueue,
    CanRevokeOrganizers,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanApproveHackathons => "can_approve_hackathons",
            Permission::CanRejectHackathons => "can_reject_hackathons",
            Permission::CanDeleteHackathons => "can_delete_hackathons",
            Permission::CanEditHackathons => "can_edit_hackathons",
            Permission::CanUnpublishHackathons => "can_unpublish_hackathons",
            Permission::CanFeatureHackathons => "can_feature_hackathons",
            Permission::CanModerateUsers => "can_moderate_users",
            Permission::CanBanUsers => "can_ban_users",
            Permission::CanDeleteUsers => "can_delete_users",
            Permission::CanManageAdmins => "can_manage_admins",
            Permission::CanViewAuditLogs => "can_view_audit_logs",
            Permission::CanExportData => "can_export_data",
            Permission::CanAccessAnalytics => "can_access_analytics",
            Permission::CanSendAnnouncements => "can_send_announcements",
            Permission::CanManageQueue => "can_manage_queue",
            Permission::CanRevokeOrganizers => "can_revoke_organizers",
        }
    }

    pub const fn all() -> &'static [Permission] {
        &[
            Permission::CanApproveHackathons,
            Permission::CanRejectHackathons,
            Permission::CanDeleteHackathons,
            Permission::CanEditHackathons,
            Permission::CanUnpublishHackathons,
            Permission::CanFeatureHackathons,
            Permission::CanModerateUsers,
            Permission::CanBanUsers,
            Permission::CanDeleteUsers,
            Permission::CanManageAdmins,
            Permission::CanViewAuditLogs,
            Permission::CanExportData,
            Permission::CanAccessAnalytics,
            Permission::CanSendAnnouncements,
            Permission::CanManageQueue,
            Permission::CanRevokeOrganizers,
        ]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ModerationError::UnknownValue {
                kind: "permission",
                value: s.to_string(),
            })
    }
}

/// Complete permission map. Every permission has an explicit flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<Permission, bool>);

impl PermissionSet {
    fn from_granted(granted: &[Permission]) -> Self {
        let map = Permission::all()
            .iter()
            .map(|p| (*p, granted.contains(p)))
            .collect();
        Self(map)
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.0.get(&permission).copied().unwrap_or(false)
    }

    /// Returns a new set with `overrides` applied on top of this one.
    pub fn merged(&self, overrides: &PermissionOverrides) -> Self {
        let mut map = self.0.clone();
        for (permission, allowed) in overrides.iter() {
            map.insert(*permission, *allowed);
        }
        Self(map)
    }

    pub fn granted(&self) -> Vec<Permission> {
        self.0
            .iter()
            .filter(|(_, allowed)| **allowed)
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Permission, &bool)> {
        self.0.iter()
    }
}

/// Partial permission map supplied on assignment or update.
pub type PermissionOverrides = BTreeMap<Permission, bool>;

static DEFAULT_PERMISSIONS: Lazy<BTreeMap<AdminRole, PermissionSet>> = Lazy::new(|| {
    use Permission::*;

    let mut table = BTreeMap::new();
    table.insert(AdminRole::SuperAdmin, PermissionSet::from_granted(Permission::all()));
    table.insert(
        AdminRole::Admin,
        PermissionSet::from_granted(&[
            CanApproveHackathons,
            CanRejectHackathons,
            CanDeleteHackathons,
            CanEditHackathons,
            CanUnpublishHackathons,
            CanFeatureHackathons,
            CanModerateUsers,
            CanBanUsers,
            CanDeleteUsers,
            CanViewAuditLogs,
            CanExportData,
            CanAccessAnalytics,
            CanSendAnnouncements,
            CanManageQueue,
            CanRevokeOrganizers,
        ]),
    );
    table.insert(
        AdminRole::Moderator,
        PermissionSet::from_granted(&[
            CanApproveHackathons,
            CanRejectHackathons,
            CanEditHackathons,
            CanModerateUsers,
            CanViewAuditLogs,
            CanManageQueue,
        ]),
    );
    table.insert(
        AdminRole::Viewer,
        PermissionSet::from_granted(&[CanViewAuditLogs, CanAccessAnalytics]),
    );
    table
});

/// Default permission map for a role.
pub fn default_permissions(role: AdminRole) -> &'static PermissionSet {
    // The table is built with an entry for every role.
    &DEFAULT_PERMISSIONS[&role]
}

/// A role granted to one admin account. Values are never mutated in place;
/// every change goes through [`AdminRoleAssignment::with_changes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRoleAssignment {
    pub id: Uuid,
    pub user_id: String,
    pub role: AdminRole,
    pub permissions: PermissionSet,
    pub granted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAdminRole {
    pub user_id: String,
    pub role: Option<AdminRole>,
    #[serde(default)]
    pub permissions: PermissionOverrides,
    pub granted_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAdminRole {
    pub role: Option<AdminRole>,
    pub permissions: Option<PermissionOverrides>,
}

impl AdminRoleAssignment {
    pub fn new(input: CreateAdminRole) -> Self {
        let role = input.role.unwrap_or(AdminRole::Viewer);
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            role,
            permissions: default_permissions(role).merged(&input.permissions),
            granted_by: input.granted_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy-on-write update.
    ///
    /// Switching to a different role resets the map to that role's defaults
    /// before applying overrides; keeping the role merges overrides onto the
    /// current map.
    pub fn with_changes(&self, changes: &UpdateAdminRole) -> Self {
        let empty = PermissionOverrides::new();
        let overrides = changes.permissions.as_ref().unwrap_or(&empty);

        let (role, permissions) = match changes.role {
            Some(role) if role != self.role => {
                (role, default_permissions(role).merged(overrides))
            }
            _ => (self.role, self.permissions.merged(overrides)),
        };

        Self {
            role,
            permissions,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions.allows(permission)
    }
}

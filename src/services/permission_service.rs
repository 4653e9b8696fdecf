//! Role-based permission checks.
//!
//! Every check returns a [`PermissionCheckResult`]; nothing here fails with an
//! error. Denials carry the role and the missing permissions so the caller can
//! explain them.

use crate::models::{
    AdminRole, AdminRoleAssignment, CreateAdminRole, Permission, PermissionCheckResult,
    UpdateAdminRole,
};

const NO_ROLE: &str = "no role assigned";

pub fn check_permission(
    assignment: Option<&AdminRoleAssignment>,
    permission: Permission,
) -> PermissionCheckResult {
    let Some(assignment) = assignment else {
        return PermissionCheckResult::denied(None, vec![permission], vec![permission], NO_ROLE);
    };

    if assignment.allows(permission) {
        PermissionCheckResult::allowed(assignment.role, vec![permission])
    } else {
        tracing::warn!(
            admin = %assignment.user_id,
            role = %assignment.role,
            permission = %permission,
            "permission denied"
        );
        PermissionCheckResult::denied(
            Some(assignment.role),
            vec![permission],
            vec![permission],
            format!(
                "permission '{}' is not granted to role '{}'",
                permission, assignment.role
            ),
        )
    }
}

/// Allowed when the role holds at least one of `permissions`.
pub fn check_any_permission(
    assignment: Option<&AdminRoleAssignment>,
    permissions: &[Permission],
) -> PermissionCheckResult {
    let Some(assignment) = assignment else {
        return PermissionCheckResult::denied(
            None,
            permissions.to_vec(),
            permissions.to_vec(),
            NO_ROLE,
        );
    };

    if permissions.iter().any(|p| assignment.allows(*p)) {
        return PermissionCheckResult::allowed(assignment.role, permissions.to_vec());
    }

    PermissionCheckResult::denied(
        Some(assignment.role),
        permissions.to_vec(),
        permissions.to_vec(),
        format!(
            "role '{}' holds none of: {}",
            assignment.role,
            join(permissions)
        ),
    )
}

/// Allowed only when the role holds every one of `permissions`.
pub fn check_all_permissions(
    assignment: Option<&AdminRoleAssignment>,
    permissions: &[Permission],
) -> PermissionCheckResult {
    let Some(assignment) = assignment else {
        return PermissionCheckResult::denied(
            None,
            permissions.to_vec(),
            permissions.to_vec(),
            NO_ROLE,
        );
    };

    let missing: Vec<Permission> = permissions
        .iter()
        .copied()
        .filter(|p| !assignment.allows(*p))
        .collect();

    if missing.is_empty() {
        return PermissionCheckResult::allowed(assignment.role, permissions.to_vec());
    }

    let reason = format!(
        "role '{}' is missing: {}",
        assignment.role,
        join(&missing)
    );
    PermissionCheckResult::denied(Some(assignment.role), permissions.to_vec(), missing, reason)
}

/// Whether `acting` may assign or alter an admin holding `target`.
///
/// Requires `can_manage_admins`. A super_admin may manage any role; any other
/// role may never manage a super_admin, even with `can_manage_admins` granted
/// through an override.
pub fn can_manage_admin_role(
    acting: Option<&AdminRoleAssignment>,
    target: Option<AdminRole>,
) -> PermissionCheckResult {
    let check = check_permission(acting, Permission::CanManageAdmins);
    if !check.allowed {
        return check;
    }

    match (acting, target) {
        (Some(acting), Some(AdminRole::SuperAdmin)) if acting.role != AdminRole::SuperAdmin => {
            tracing::warn!(
                admin = %acting.user_id,
                role = %acting.role,
                "attempt to manage a super_admin from a lower role"
            );
            PermissionCheckResult::denied(
                Some(acting.role),
                vec![Permission::CanManageAdmins],
                Vec::new(),
                "only a super_admin can manage super_admin roles",
            )
        }
        _ => check,
    }
}

/// Grants a role. Returns the denial when `acting` may not grant it.
pub fn create_admin_role(
    acting: Option<&AdminRoleAssignment>,
    input: CreateAdminRole,
) -> Result<AdminRoleAssignment, PermissionCheckResult> {
    let target = input.role.unwrap_or(AdminRole::Viewer);
    let check = can_manage_admin_role(acting, Some(target));
    if !check.allowed {
        return Err(check);
    }

    let assignment = AdminRoleAssignment::new(input);
    tracing::info!(
        admin = %assignment.user_id,
        role = %assignment.role,
        "admin role created"
    );
    Ok(assignment)
}

/// Copy-on-write update of `current`. Both the current and the requested role
/// must be manageable by `acting`.
pub fn update_admin_role(
    acting: Option<&AdminRoleAssignment>,
    current: &AdminRoleAssignment,
    changes: &UpdateAdminRole,
) -> Result<AdminRoleAssignment, PermissionCheckResult> {
    let check = can_manage_admin_role(acting, Some(current.role));
    if !check.allowed {
        return Err(check);
    }
    if let Some(role) = changes.role {
        let check = can_manage_admin_role(acting, Some(role));
        if !check.allowed {
            return Err(check);
        }
    }

    let updated = current.with_changes(changes);
    tracing::info!(
        admin = %updated.user_id,
        from = %current.role,
        to = %updated.role,
        "admin role updated"
    );
    Ok(updated)
}

fn join(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

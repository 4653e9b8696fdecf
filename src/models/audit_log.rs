// Audit log model - entries are append-only and never mutated after construction
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::error::ModerationError;

/// Plain key/value state snapshot recorded before or after an action.
pub type Snapshot = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditActionType {
    // Hackathon moderation
    HackathonApprove,
    HackathonReject,
    HackathonUnpublish,
    HackathonFeature,
    HackathonUnfeature,
    HackathonDelete,
    HackathonEdit,
    // User moderation
    UserWarn,
    UserMute,
    UserSuspend,
    UserBan,
    UserUnban,
    UserDelete,
    // Admin management
    AdminRoleAssign,
    AdminRoleUpdate,
    AdminRoleRevoke,
    OrganizerRevoke,
    // Platform
    AnnouncementSend,
    DataExport,
}

impl AuditActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditActionType::HackathonApprove => "hackathon_approve",
            AuditActionType::HackathonReject => "hackathon_reject",
            AuditActionType::HackathonUnpublish => "hackathon_unpublish",
            AuditActionType::HackathonFeature => "hackathon_feature",
            AuditActionType::HackathonUnfeature => "hackathon_unfeature",
            AuditActionType::HackathonDelete => "hackathon_delete",
            AuditActionType::HackathonEdit => "hackathon_edit",
            AuditActionType::UserWarn => "user_warn",
            AuditActionType::UserMute => "user_mute",
            AuditActionType::UserSuspend => "user_suspend",
            AuditActionType::UserBan => "user_ban",
            AuditActionType::UserUnban => "user_unban",
            AuditActionType::UserDelete => "user_delete",
            AuditActionType::AdminRoleAssign => "admin_role_assign",
            AuditActionType::AdminRoleUpdate => "admin_role_update",
            AuditActionType::AdminRoleRevoke => "admin_role_revoke",
            AuditActionType::OrganizerRevoke => "organizer_revoke",
            AuditActionType::AnnouncementSend => "announcement_send",
            AuditActionType::DataExport => "data_export",
        }
    }

    pub const fn all() -> &'static [AuditActionType] {
        &[
            AuditActionType::HackathonApprove,
            AuditActionType::HackathonReject,
            AuditActionType::HackathonUnpublish,
            AuditActionType::HackathonFeature,
            AuditActionType::HackathonUnfeature,
            AuditActionType::HackathonDelete,
            AuditActionType::HackathonEdit,
            AuditActionType::UserWarn,
            AuditActionType::UserMute,
            AuditActionType::UserSuspend,
            AuditActionType::UserBan,
            AuditActionType::UserUnban,
            AuditActionType::UserDelete,
            AuditActionType::AdminRoleAssign,
            AuditActionType::AdminRoleUpdate,
            AuditActionType::AdminRoleRevoke,
            AuditActionType::OrganizerRevoke,
            AuditActionType::AnnouncementSend,
            AuditActionType::DataExport,
        ]
    }
}

impl fmt::Display for AuditActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditActionType {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditActionType::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ModerationError::UnknownValue {
                kind: "audit action type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTargetType {
    Hackathon,
    User,
    Admin,
    Organizer,
    Announcement,
    System,
}

impl AuditTargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditTargetType::Hackathon => "hackathon",
            AuditTargetType::User => "user",
            AuditTargetType::Admin => "admin",
            AuditTargetType::Organizer => "organizer",
            AuditTargetType::Announcement => "announcement",
            AuditTargetType::System => "system",
        }
    }
}

impl fmt::Display for AuditTargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditTargetType {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hackathon" => Ok(AuditTargetType::Hackathon),
            "user" => Ok(AuditTargetType::User),
            "admin" => Ok(AuditTargetType::Admin),
            "organizer" => Ok(AuditTargetType::Organizer),
            "announcement" => Ok(AuditTargetType::Announcement),
            "system" => Ok(AuditTargetType::System),
            other => Err(ModerationError::UnknownValue {
                kind: "audit target type",
                value: other.to_string(),
            }),
        }
    }
}

/// Input for [`crate::services::create_audit_log_entry`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuditLogInput {
    pub action_type: AuditActionType,
    #[validate(custom(function = "not_blank"))]
    pub admin_id: String,
    #[validate(email)]
    pub admin_email: String,
    pub target_type: AuditTargetType,
    #[validate(custom(function = "not_blank"))]
    pub target_id: String,
    #[validate(custom(function = "not_blank"))]
    pub reason: String,
    #[serde(default)]
    pub before_state: Option<Snapshot>,
    #[serde(default)]
    pub after_state: Option<Snapshot>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Immutable record of one privileged action.
///
/// Fields are private; the only way to obtain an entry is through the audit
/// service (or by deserializing a stored row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    id: Uuid,
    action_type: AuditActionType,
    admin_id: String,
    admin_email: String,
    target_type: AuditTargetType,
    target_id: String,
    reason: String,
    before_state: Option<Snapshot>,
    after_state: Option<Snapshot>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Callers must have validated `input`; the reason is stored trimmed.
    pub(crate) fn from_validated(input: CreateAuditLogInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_type: input.action_type,
            admin_id: input.admin_id,
            admin_email: input.admin_email,
            target_type: input.target_type,
            target_id: input.target_id,
            reason: input.reason.trim().to_string(),
            before_state: input.before_state,
            after_state: input.after_state,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn action_type(&self) -> AuditActionType {
        self.action_type
    }

    pub fn admin_id(&self) -> &str {
        &self.admin_id
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    pub fn target_type(&self) -> AuditTargetType {
        self.target_type
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn before_state(&self) -> Option<&Snapshot> {
        self.before_state.as_ref()
    }

    pub fn after_state(&self) -> Option<&Snapshot> {
        self.after_state.as_ref()
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Removed => "removed",
            ChangeType::Modified => "modified",
        }
    }
}

/// One field-level change between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    pub field: String,
    pub change_type: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
}

impl DiffEntry {
    pub fn added(field: &str, after: Value) -> Self {
        Self {
            field: field.to_string(),
            change_type: ChangeType::Added,
            before: None,
            after: Some(after),
        }
    }

    pub fn removed(field: &str, before: Value) -> Self {
        Self {
            field: field.to_string(),
            change_type: ChangeType::Removed,
            before: Some(before),
            after: None,
        }
    }

    pub fn modified(field: &str, before: Value, after: Value) -> Self {
        Self {
            field: field.to_string(),
            change_type: ChangeType::Modified,
            before: Some(before),
            after: Some(after),
        }
    }

    /// Single human-readable line, e.g. `status: "draft" -> "published"`.
    pub fn describe(&self) -> String {
        let show = |v: &Option<Value>| v.as_ref().map(Value::to_string).unwrap_or_default();
        match self.change_type {
            ChangeType::Added => format!("{}: added {}", self.field, show(&self.after)),
            ChangeType::Removed => format!("{}: removed {}", self.field, show(&self.before)),
            ChangeType::Modified => format!(
                "{}: {} -> {}",
                self.field,
                show(&self.before),
                show(&self.after)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDiff {
    pub entries: Vec<DiffEntry>,
    pub has_changes: bool,
}

impl AuditDiff {
    pub fn changed_fields(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.field.as_str()).collect()
    }
}

/// Audit entry prepared for a data export, with the admin email masked.
#[derive(Debug, Clone, Serialize)]
pub struct AuditExportRecord {
    pub id: String,
    pub action_type: &'static str,
    pub admin_id: String,
    pub admin_email: String,
    pub target_type: &'static str,
    pub target_id: String,
    pub reason: String,
    pub created_at: String,
}

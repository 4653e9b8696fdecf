use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::admin::Permission;
use super::audit_log::{AuditActionType, AuditTargetType};
use super::entity::{EntityKind, TargetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HackathonBulkAction {
    Approve,
    Reject,
    Unpublish,
    Feature,
    Unfeature,
    Delete,
}

impl HackathonBulkAction {
    pub const ALL: &'static [HackathonBulkAction] = &[
        HackathonBulkAction::Approve,
        HackathonBulkAction::Reject,
        HackathonBulkAction::Unpublish,
        HackathonBulkAction::Feature,
        HackathonBulkAction::Unfeature,
        HackathonBulkAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HackathonBulkAction::Approve => "approve",
            HackathonBulkAction::Reject => "reject",
            HackathonBulkAction::Unpublish => "unpublish",
            HackathonBulkAction::Feature => "feature",
            HackathonBulkAction::Unfeature => "unfeature",
            HackathonBulkAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserBulkAction {
    Warn,
    Mute,
    Suspend,
    Ban,
    Unban,
}

impl UserBulkAction {
    pub const ALL: &'static [UserBulkAction] = &[
        UserBulkAction::Warn,
        UserBulkAction::Mute,
        UserBulkAction::Suspend,
        UserBulkAction::Ban,
        UserBulkAction::Unban,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserBulkAction::Warn => "warn",
            UserBulkAction::Mute => "mute",
            UserBulkAction::Suspend => "suspend",
            UserBulkAction::Ban => "ban",
            UserBulkAction::Unban => "unban",
        }
    }
}

/// User actions that must carry a positive duration in hours.
pub const DURATION_REQUIRED_ACTIONS: &[UserBulkAction] =
    &[UserBulkAction::Mute, UserBulkAction::Suspend];

/// Action from an entity kind's closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "action", rename_all = "snake_case")]
pub enum BulkAction {
    Hackathon(HackathonBulkAction),
    User(UserBulkAction),
}

impl BulkAction {
    /// Looks up `name` in the vocabulary of `kind`.
    pub fn parse(kind: EntityKind, name: &str) -> Option<Self> {
        match kind {
            EntityKind::Hackathon => HackathonBulkAction::ALL
                .iter()
                .find(|a| a.as_str() == name)
                .map(|a| BulkAction::Hackathon(*a)),
            EntityKind::User => UserBulkAction::ALL
                .iter()
                .find(|a| a.as_str() == name)
                .map(|a| BulkAction::User(*a)),
        }
    }

    /// Action names accepted for `kind`.
    pub fn vocabulary(kind: EntityKind) -> Vec<&'static str> {
        match kind {
            EntityKind::Hackathon => HackathonBulkAction::ALL.iter().map(|a| a.as_str()).collect(),
            EntityKind::User => UserBulkAction::ALL.iter().map(|a| a.as_str()).collect(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Hackathon(a) => a.as_str(),
            BulkAction::User(a) => a.as_str(),
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            BulkAction::Hackathon(_) => EntityKind::Hackathon,
            BulkAction::User(_) => EntityKind::User,
        }
    }

    pub fn requires_duration(&self) -> bool {
        matches!(self, BulkAction::User(a) if DURATION_REQUIRED_ACTIONS.contains(a))
    }

    /// Permission an admin must hold to run this action.
    pub fn required_permission(&self) -> Permission {
        match self {
            BulkAction::Hackathon(HackathonBulkAction::Approve) => Permission::CanApproveHackathons,
            BulkAction::Hackathon(HackathonBulkAction::Reject) => Permission::CanRejectHackathons,
            BulkAction::Hackathon(HackathonBulkAction::Unpublish) => {
                Permission::CanUnpublishHackathons
            }
            BulkAction::Hackathon(HackathonBulkAction::Feature)
            | BulkAction::Hackathon(HackathonBulkAction::Unfeature) => {
                Permission::CanFeatureHackathons
            }
            BulkAction::Hackathon(HackathonBulkAction::Delete) => Permission::CanDeleteHackathons,
            BulkAction::User(UserBulkAction::Warn) | BulkAction::User(UserBulkAction::Mute) => {
                Permission::CanModerateUsers
            }
            BulkAction::User(UserBulkAction::Suspend)
            | BulkAction::User(UserBulkAction::Ban)
            | BulkAction::User(UserBulkAction::Unban) => Permission::CanBanUsers,
        }
    }

    pub fn audit_action(&self) -> AuditActionType {
        match self {
            BulkAction::Hackathon(HackathonBulkAction::Approve) => AuditActionType::HackathonApprove,
            BulkAction::Hackathon(HackathonBulkAction::Reject) => AuditActionType::HackathonReject,
            BulkAction::Hackathon(HackathonBulkAction::Unpublish) => {
                AuditActionType::HackathonUnpublish
            }
            BulkAction::Hackathon(HackathonBulkAction::Feature) => AuditActionType::HackathonFeature,
            BulkAction::Hackathon(HackathonBulkAction::Unfeature) => {
                AuditActionType::HackathonUnfeature
            }
            BulkAction::Hackathon(HackathonBulkAction::Delete) => AuditActionType::HackathonDelete,
            BulkAction::User(UserBulkAction::Warn) => AuditActionType::UserWarn,
            BulkAction::User(UserBulkAction::Mute) => AuditActionType::UserMute,
            BulkAction::User(UserBulkAction::Suspend) => AuditActionType::UserSuspend,
            BulkAction::User(UserBulkAction::Ban) => AuditActionType::UserBan,
            BulkAction::User(UserBulkAction::Unban) => AuditActionType::UserUnban,
        }
    }

    pub fn audit_target(&self) -> AuditTargetType {
        match self {
            BulkAction::Hackathon(_) => AuditTargetType::Hackathon,
            BulkAction::User(_) => AuditTargetType::User,
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_kind(), self.as_str())
    }
}

/// A validated bulk request, ready to execute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkActionRequest {
    pub ids: Vec<TargetId>,
    pub action: BulkAction,
    pub reason: String,
    /// Present only for actions that require a duration.
    pub duration_hours: Option<f64>,
}

impl BulkActionRequest {
    /// End of a mute or suspension started at `now`. `None` when there is no
    /// duration or the end falls outside the representable date range.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let hours = self.duration_hours.filter(|h| h.is_finite() && *h > 0.0)?;
        // `as` saturates, so oversized values are rejected by try_seconds
        let duration = Duration::try_seconds((hours * 3600.0).round() as i64)?;
        now.checked_add_signed(duration)
    }
}

/// One reason a bulk request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("{field} is required")]
    MissingField { field: String },

    #[error("{field} must be {expected}")]
    WrongType { field: String, expected: String },

    #[error("{field} must not be empty")]
    EmptyCollection { field: String },

    #[error("{field} must not be blank")]
    Blank { field: String },

    #[error("{field} '{value}' is not one of: {allowed}")]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("{field} is required when {condition}")]
    MissingConditionalField { field: String, condition: String },

    #[error("{field}[{index}] must be {expected}")]
    MalformedId {
        field: String,
        index: usize,
        expected: String,
    },

    #[error("{field} may contain at most {max} items (got {actual})")]
    TooManyItems {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("{field} may be at most {max}")]
    TooLarge { field: String, max: u64 },

    #[error("{field} may be at most {max} characters (got {actual})")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Outcome of one target within a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemResult {
    pub id: TargetId,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkItemResult {
    pub fn success(id: impl Into<TargetId>) -> Self {
        Self {
            id: id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(id: impl Into<TargetId>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregated bulk outcome; `successful + failed == total == results.len()`.
///
/// Counts are derived from `results` at construction and the fields are
/// read-only so the accounting cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkActionResponse {
    total: usize,
    successful: usize,
    failed: usize,
    results: Vec<BulkItemResult>,
}

impl BulkActionResponse {
    pub fn from_results(results: Vec<BulkItemResult>) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn results(&self) -> &[BulkItemResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<BulkItemResult> {
        self.results
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOutcome {
    /// No targets were processed.
    Empty,
    FullSuccess,
    FullFailure,
    PartialSuccess,
}

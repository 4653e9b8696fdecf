use crate::models::{PermissionCheckResult, ValidationResult};

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Invalid audit log input: {}", .0.join("; "))]
    InvalidAuditInput(Vec<String>),

    #[error("Invalid bulk request: {}", .0.messages().join("; "))]
    InvalidBulkRequest(ValidationResult),

    #[error("Permission denied: {}", .0.reason.as_deref().unwrap_or("not allowed"))]
    PermissionDenied(PermissionCheckResult),

    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),
}

impl ModerationError {
    /// HTTP-equivalent status code for callers translating into an API response.
    pub fn status_code(&self) -> u16 {
        match self {
            ModerationError::InvalidAuditInput(_)
            | ModerationError::InvalidBulkRequest(_)
            | ModerationError::UnknownValue { .. } => 400,
            ModerationError::PermissionDenied(_) => 403,
            ModerationError::Config(_) | ModerationError::InvalidConfig(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ModerationError::InvalidAuditInput(_) => "INVALID_AUDIT_INPUT",
            ModerationError::InvalidBulkRequest(_) => "BAD_REQUEST",
            ModerationError::UnknownValue { .. } => "BAD_REQUEST",
            ModerationError::PermissionDenied(_) => "FORBIDDEN",
            ModerationError::Config(_) | ModerationError::InvalidConfig(_) => "CONFIG_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ModerationError>;

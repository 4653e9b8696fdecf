//! Validation of raw bulk action payloads.
//!
//! All rules are checked and every problem is reported; nothing is processed
//! unless the whole request is valid.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::config::BulkConfig;
use crate::models::{
    BulkAction, BulkActionRequest, EntityKind, TargetId, ValidationIssue, ValidationResult,
};

static DEFAULT_VALIDATOR: Lazy<BulkRequestValidator> =
    Lazy::new(|| BulkRequestValidator::new(BulkConfig::default()));

#[derive(Debug, Clone)]
pub struct BulkRequestValidator {
    config: BulkConfig,
}

impl BulkRequestValidator {
    pub fn new(config: BulkConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, kind: EntityKind, payload: &Value) -> ValidationResult {
        match self.parse(kind, payload) {
            Ok(_) => ValidationResult::from_issues(Vec::new()),
            Err(result) => result,
        }
    }

    /// Validates `payload` and returns the typed request, with the reason
    /// trimmed and the duration kept only for actions that need one.
    pub fn parse(
        &self,
        kind: EntityKind,
        payload: &Value,
    ) -> Result<BulkActionRequest, ValidationResult> {
        let Some(object) = payload.as_object() else {
            return Err(reject(
                kind,
                vec![ValidationIssue::WrongType {
                    field: "request".to_string(),
                    expected: "an object".to_string(),
                }],
            ));
        };

        let mut issues = Vec::new();
        let ids = self.parse_ids(kind, object, &mut issues);
        let action = parse_action(kind, object, &mut issues);
        let duration_hours = action.and_then(|a| self.parse_duration(&a, object, &mut issues));
        let reason = self.parse_reason(object, &mut issues);

        match (ids, action, reason) {
            (Some(ids), Some(action), Some(reason)) if issues.is_empty() => {
                Ok(BulkActionRequest {
                    ids,
                    action,
                    reason,
                    duration_hours,
                })
            }
            _ => Err(reject(kind, issues)),
        }
    }

    fn parse_ids(
        &self,
        kind: EntityKind,
        object: &Map<String, Value>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<Vec<TargetId>> {
        let items = match object.get("ids") {
            None | Some(Value::Null) => {
                issues.push(ValidationIssue::MissingField {
                    field: "ids".to_string(),
                });
                return None;
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                issues.push(ValidationIssue::WrongType {
                    field: "ids".to_string(),
                    expected: "an array".to_string(),
                });
                return None;
            }
        };

        if items.is_empty() {
            issues.push(ValidationIssue::EmptyCollection {
                field: "ids".to_string(),
            });
            return None;
        }

        if items.len() > self.config.max_targets {
            issues.push(ValidationIssue::TooManyItems {
                field: "ids".to_string(),
                max: self.config.max_targets,
                actual: items.len(),
            });
        }

        let mut ids = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match parse_id(kind, item) {
                Some(id) => ids.push(id),
                None => issues.push(ValidationIssue::MalformedId {
                    field: "ids".to_string(),
                    index,
                    expected: expected_id(kind).to_string(),
                }),
            }
        }

        (ids.len() == items.len()).then_some(ids)
    }

    fn parse_reason(
        &self,
        object: &Map<String, Value>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<String> {
        match object.get("reason") {
            None | Some(Value::Null) => {
                issues.push(ValidationIssue::MissingField {
                    field: "reason".to_string(),
                });
                None
            }
            Some(Value::String(raw)) => {
                let reason = raw.trim();
                let length = reason.chars().count();
                if reason.is_empty() {
                    issues.push(ValidationIssue::Blank {
                        field: "reason".to_string(),
                    });
                    None
                } else if length > self.config.max_reason_length {
                    issues.push(ValidationIssue::TooLong {
                        field: "reason".to_string(),
                        max: self.config.max_reason_length,
                        actual: length,
                    });
                    None
                } else {
                    Some(reason.to_string())
                }
            }
            Some(_) => {
                issues.push(ValidationIssue::WrongType {
                    field: "reason".to_string(),
                    expected: "a string".to_string(),
                });
                None
            }
        }
    }
    /// Duration is only read for actions that require it; otherwise it is ignored.
    fn parse_duration(
        &self,
        action: &BulkAction,
        object: &Map<String, Value>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<f64> {
        if !action.requires_duration() {
            return None;
        }

        match object.get("duration_hours") {
            None | Some(Value::Null) => {
                issues.push(missing_duration(action));
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(hours) => self.check_duration(hours, issues),
                None => {
                    issues.push(duration_wrong_type());
                    None
                }
            },
            Some(_) => {
                issues.push(duration_wrong_type());
                None
            }
        }
    }

    fn check_duration(&self, hours: f64, issues: &mut Vec<ValidationIssue>) -> Option<f64> {
        if !hours.is_finite() || hours <= 0.0 {
            issues.push(duration_wrong_type());
            return None;
        }
        if hours > f64::from(self.config.max_duration_hours) {
            issues.push(ValidationIssue::TooLarge {
                field: "duration_hours".to_string(),
                max: u64::from(self.config.max_duration_hours),
            });
            return None;
        }
        Some(hours)
    }

    /// Re-checks an already typed request against the same rules as
    /// [`BulkRequestValidator::parse`]. Requests built by hand (retries,
    /// internal callers) go through this before anything is executed.
    pub fn check(&self, request: &BulkActionRequest) -> ValidationResult {
        let kind = request.action.entity_kind();
        let mut issues = Vec::new();

        if request.ids.is_empty() {
            issues.push(ValidationIssue::EmptyCollection {
                field: "ids".to_string(),
            });
        } else if request.ids.len() > self.config.max_targets {
            issues.push(ValidationIssue::TooManyItems {
                field: "ids".to_string(),
                max: self.config.max_targets,
                actual: request.ids.len(),
            });
        }
        for (index, id) in request.ids.iter().enumerate() {
            if !id_matches(kind, id) {
                issues.push(ValidationIssue::MalformedId {
                    field: "ids".to_string(),
                    index,
                    expected: expected_id(kind).to_string(),
                });
            }
        }

        if request.action.requires_duration() {
            match request.duration_hours {
                Some(hours) => {
                    self.check_duration(hours, &mut issues);
                }
                None => issues.push(missing_duration(&request.action)),
            }
        }

        let reason = request.reason.trim();
        let length = reason.chars().count();
        if reason.is_empty() {
            issues.push(ValidationIssue::Blank {
                field: "reason".to_string(),
            });
        } else if length > self.config.max_reason_length {
            issues.push(ValidationIssue::TooLong {
                field: "reason".to_string(),
                max: self.config.max_reason_length,
                actual: length,
            });
        }

        if issues.is_empty() {
            ValidationResult::from_issues(issues)
        } else {
            reject(kind, issues)
        }
    }
}

fn missing_duration(action: &BulkAction) -> ValidationIssue {
    ValidationIssue::MissingConditionalField {
        field: "duration_hours".to_string(),
        condition: format!("action is '{}'", action.as_str()),
    }
}

fn duration_wrong_type() -> ValidationIssue {
    ValidationIssue::WrongType {
        field: "duration_hours".to_string(),
        expected: "a positive number".to_string(),
    }
}

fn id_matches(kind: EntityKind, id: &TargetId) -> bool {
    match (kind, id) {
        (EntityKind::Hackathon, TargetId::Int(id)) => *id > 0,
        (EntityKind::User, TargetId::Str(id)) => !id.trim().is_empty(),
        _ => false,
    }
}

fn reject(kind: EntityKind, issues: Vec<ValidationIssue>) -> ValidationResult {
    let result = ValidationResult::from_issues(issues);
    tracing::debug!(
        kind = %kind,
        errors = ?result.messages(),
        "bulk request rejected"
    );
    result
}

fn parse_id(kind: EntityKind, value: &Value) -> Option<TargetId> {
    let id = match value {
        Value::Number(n) => TargetId::Int(n.as_i64()?),
        Value::String(s) => TargetId::Str(s.clone()),
        _ => return None,
    };
    id_matches(kind, &id).then_some(id)
}

fn expected_id(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Hackathon => "a positive integer",
        EntityKind::User => "a non-blank string",
    }
}

fn parse_action(
    kind: EntityKind,
    object: &Map<String, Value>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<BulkAction> {
    match object.get("action") {
        None | Some(Value::Null) => {
            issues.push(ValidationIssue::MissingField {
                field: "action".to_string(),
            });
            None
        }
        Some(Value::String(name)) => {
            let action = BulkAction::parse(kind, name);
            if action.is_none() {
                issues.push(ValidationIssue::InvalidEnumValue {
                    field: "action".to_string(),
                    value: name.clone(),
                    allowed: BulkAction::vocabulary(kind).join(", "),
                });
            }
            action
        }
        Some(_) => {
            issues.push(ValidationIssue::WrongType {
                field: "action".to_string(),
                expected: "a string".to_string(),
            });
            None
        }
    }
}

/// Validates with the default bulk configuration.
pub fn validate_bulk_request(kind: EntityKind, payload: &Value) -> ValidationResult {
    DEFAULT_VALIDATOR.validate(kind, payload)
}

/// Validates with the default bulk configuration and returns the typed request.
pub fn parse_bulk_request(
    kind: EntityKind,
    payload: &Value,
) -> Result<BulkActionRequest, ValidationResult> {
    DEFAULT_VALIDATOR.parse(kind, payload)
}

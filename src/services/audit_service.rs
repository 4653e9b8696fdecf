// Audit service - builds immutable audit entries and before/after diffs.
// Persistence of the entries is up to the caller; rows are append-only.
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde_json::{Number, Value};
use validator::Validate;

use crate::config::AuditConfig;
use crate::error::{ModerationError, Result};
use crate::models::{
    AuditActionType, AuditDiff, AuditExportRecord, AuditLogEntry, CreateAuditLogInput, DiffEntry,
    Snapshot,
};
use crate::utils::mask_email;

const REDACTED: &str = "[REDACTED]";

static DEFAULT_AUDIT_SERVICE: Lazy<AuditService> =
    Lazy::new(|| AuditService::new(AuditConfig::default()));

#[derive(Debug, Clone)]
pub struct AuditService {
    config: AuditConfig,
}

impl AuditService {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    /// Checks `input` without building an entry.
    pub fn validate_input(&self, input: &CreateAuditLogInput) -> Result<()> {
        let mut errors = Vec::new();
        if let Err(e) = input.validate() {
            for (field, field_errors) in e.field_errors() {
                for err in field_errors {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    errors.push(format!("{}: {}", field, message));
                }
            }
        }

        let reason_len = input.reason.trim().chars().count();
        if reason_len > self.config.max_reason_length {
            errors.push(format!(
                "reason: may be at most {} characters (got {})",
                self.config.max_reason_length, reason_len
            ));
        }

        if !errors.is_empty() {
            errors.sort();
            tracing::debug!(?errors, "audit log input rejected");
            return Err(ModerationError::InvalidAuditInput(errors));
        }
        Ok(())
    }

    /// Validates `input` and builds a new entry with a fresh random id and
    /// the current time. Snapshots are redacted before they are stored.
    pub fn create_entry(&self, mut input: CreateAuditLogInput) -> Result<AuditLogEntry> {
        self.validate_input(&input)?;

        input.before_state = input
            .before_state
            .map(|s| redact_snapshot(&s, &self.config.redact_fields));
        input.after_state = input
            .after_state
            .map(|s| redact_snapshot(&s, &self.config.redact_fields));

        let entry = AuditLogEntry::from_validated(input);
        tracing::debug!(
            id = %entry.id(),
            action = %entry.action_type(),
            target = %entry.target_id(),
            "audit log entry created"
        );
        Ok(entry)
    }
}

/// Builds an audit entry using the default audit configuration.
pub fn create_audit_log_entry(input: CreateAuditLogInput) -> Result<AuditLogEntry> {
    DEFAULT_AUDIT_SERVICE.create_entry(input)
}

/// Structural equality over JSON values.
///
/// `null` equals only `null`; values of different kinds are never equal.
/// Numbers compare by value, so `1` and `1.0` are equal.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => snapshots_equal(x, y),
        _ => false,
    }
}

/// Integers compare exactly. A float equals an integer only when it has no
/// fractional part and converts to that exact integer.
fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (integer_value(x), integer_value(y)) {
        (Some(a), Some(b)) => a == b,
        (Some(i), None) => float_equals_integer(y.as_f64(), i),
        (None, Some(i)) => float_equals_integer(x.as_f64(), i),
        (None, None) => matches!((x.as_f64(), y.as_f64()), (Some(a), Some(b)) if a == b),
    }
}

fn integer_value(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn float_equals_integer(float: Option<f64>, integer: i128) -> bool {
    match float {
        // no JSON integer lies at or beyond 2^64
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 18_446_744_073_709_551_616.0 => {
            f as i128 == integer
        }
        _ => false,
    }
}

fn snapshots_equal(a: &Snapshot, b: &Snapshot) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, value)| b.get(key).map_or(false, |other| deep_equal(value, other)))
}

/// Equality over optional snapshots. An absent snapshot is equal to an
/// empty one, matching [`compute_diff`], so `compute_diff(a, b).has_changes`
/// is always `!snapshot_equal(a, b)`.
pub fn snapshot_equal(before: Option<&Snapshot>, after: Option<&Snapshot>) -> bool {
    let empty = Snapshot::new();
    snapshots_equal(before.unwrap_or(&empty), after.unwrap_or(&empty))
}

/// Field-level diff between two optional snapshots.
///
/// Entries follow the key order of `before`, then the keys only present in
/// `after`. An absent snapshot is treated as having no fields.
pub fn compute_diff(before: Option<&Snapshot>, after: Option<&Snapshot>) -> AuditDiff {
    let empty = Snapshot::new();
    let before = before.unwrap_or(&empty);
    let after = after.unwrap_or(&empty);

    let mut entries = Vec::new();
    for (field, old) in before {
        match after.get(field) {
            None => entries.push(DiffEntry::removed(field, old.clone())),
            Some(new) if !deep_equal(old, new) => {
                entries.push(DiffEntry::modified(field, old.clone(), new.clone()))
            }
            Some(_) => {}
        }
    }
    for (field, new) in after {
        if !before.contains_key(field) {
            entries.push(DiffEntry::added(field, new.clone()));
        }
    }

    AuditDiff {
        has_changes: !entries.is_empty(),
        entries,
    }
}

/// Copy of `snapshot` with sensitive keys (matched case-insensitively,
/// recursively through nested objects and arrays) replaced.
pub fn redact_snapshot(snapshot: &Snapshot, sensitive: &[String]) -> Snapshot {
    snapshot
        .iter()
        .map(|(key, value)| {
            let value = if sensitive.iter().any(|s| s.eq_ignore_ascii_case(key)) {
                Value::String(REDACTED.to_string())
            } else {
                redact_value(value, sensitive)
            };
            (key.clone(), value)
        })
        .collect()
}

fn redact_value(value: &Value, sensitive: &[String]) -> Value {
    match value {
        Value::Object(map) => Value::Object(redact_snapshot(map, sensitive)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_value(v, sensitive)).collect()),
        other => other.clone(),
    }
}

impl AuditLogEntry {
    /// Diff between this entry's before and after states.
    pub fn diff(&self) -> AuditDiff {
        compute_diff(self.before_state(), self.after_state())
    }

    pub fn export_record(&self) -> AuditExportRecord {
        AuditExportRecord {
            id: self.id().to_string(),
            action_type: self.action_type().as_str(),
            admin_id: self.admin_id().to_string(),
            admin_email: mask_email(self.admin_email()),
            target_type: self.target_type().as_str(),
            target_id: self.target_id().to_string(),
            reason: self.reason().to_string(),
            created_at: self.created_at().to_rfc3339(),
        }
    }
}

/// Read-side filter over already-loaded audit entries.
#[derive(Debug, Clone, Default)]
pub struct AuditLogQuery {
    pub admin_id: Option<String>,
    pub action_type: Option<AuditActionType>,
    pub target_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditLogQuery {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.admin_id.as_deref().map_or(true, |id| entry.admin_id() == id)
            && self.action_type.map_or(true, |a| entry.action_type() == a)
            && self.target_id.as_deref().map_or(true, |id| entry.target_id() == id)
            && self.since.map_or(true, |t| entry.created_at() >= t)
            && self.until.map_or(true, |t| entry.created_at() <= t)
    }

    /// Matching entries, most recent first, truncated to `limit`.
    pub fn run<'a>(&self, entries: &'a [AuditLogEntry]) -> Vec<&'a AuditLogEntry> {
        let mut matched: Vec<&AuditLogEntry> = entries.iter().filter(|e| self.matches(e)).collect();
        matched.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

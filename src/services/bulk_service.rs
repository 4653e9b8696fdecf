// Bulk service - aggregates per-item outcomes and drives bulk execution
use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use validator::Validate;

use crate::config::ModerationConfig;
use crate::error::{ModerationError, Result};
use crate::models::{
    AdminRoleAssignment, AuditLogEntry, BulkActionRequest, BulkActionResponse, BulkItemResult,
    BulkOutcome, CreateAuditLogInput, EntityKind, Snapshot, TargetId,
};
use crate::services::audit_service::AuditService;
use crate::services::bulk_validation::BulkRequestValidator;
use crate::services::permission_service::check_permission;

/// Builds a response from per-item outcomes. The accounting invariant
/// `successful + failed == total == results.len()` always holds.
pub fn aggregate_results(results: Vec<BulkItemResult>) -> BulkActionResponse {
    BulkActionResponse::from_results(results)
}

pub fn failed_ids(response: &BulkActionResponse) -> Vec<TargetId> {
    response
        .results()
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.id.clone())
        .collect()
}

pub fn successful_ids(response: &BulkActionResponse) -> Vec<TargetId> {
    response
        .results()
        .iter()
        .filter(|r| r.success)
        .map(|r| r.id.clone())
        .collect()
}

/// Concatenates the results of several responses, in order.
pub fn merge_responses<I>(responses: I) -> BulkActionResponse
where
    I: IntoIterator<Item = BulkActionResponse>,
{
    let results = responses
        .into_iter()
        .flat_map(BulkActionResponse::into_results)
        .collect();
    aggregate_results(results)
}

/// Folds a retry round into the original response: an id present in `retry`
/// takes the retry outcome in its original position. Ids only present in
/// `retry` are appended.
pub fn apply_retry(original: BulkActionResponse, retry: BulkActionResponse) -> BulkActionResponse {
    let mut latest: HashMap<TargetId, BulkItemResult> = HashMap::new();
    let mut extra = Vec::new();
    let known: std::collections::HashSet<TargetId> =
        original.results().iter().map(|r| r.id.clone()).collect();

    for result in retry.into_results() {
        if known.contains(&result.id) {
            latest.insert(result.id.clone(), result);
        } else {
            extra.push(result);
        }
    }

    let mut results: Vec<BulkItemResult> = original
        .into_results()
        .into_iter()
        .map(|r| latest.get(&r.id).cloned().unwrap_or(r))
        .collect();
    results.extend(extra);
    aggregate_results(results)
}

pub fn classify(response: &BulkActionResponse) -> BulkOutcome {
    match (response.successful(), response.failed()) {
        (0, 0) => BulkOutcome::Empty,
        (_, 0) => BulkOutcome::FullSuccess,
        (0, _) => BulkOutcome::FullFailure,
        _ => BulkOutcome::PartialSuccess,
    }
}

pub fn is_partial_success(response: &BulkActionResponse) -> bool {
    classify(response) == BulkOutcome::PartialSuccess
}

/// Request covering only the failed targets of `response`, for a retry round.
pub fn retry_request(
    request: &BulkActionRequest,
    response: &BulkActionResponse,
) -> Option<BulkActionRequest> {
    let ids = failed_ids(response);
    if ids.is_empty() {
        return None;
    }
    Some(BulkActionRequest {
        ids,
        ..request.clone()
    })
}

/// State change reported by the executor for one target.
#[derive(Debug, Clone, Default)]
pub struct ItemEffect {
    pub before: Option<Snapshot>,
    pub after: Option<Snapshot>,
}

/// Performs the domain mutation for one target (external collaborator).
#[async_trait]
pub trait BulkActionExecutor: Send + Sync {
    async fn execute(
        &self,
        id: &TargetId,
        request: &BulkActionRequest,
    ) -> std::result::Result<ItemEffect, String>;
}

/// The authenticated admin on whose behalf a bulk action runs.
#[derive(Debug, Clone, Validate)]
pub struct AdminContext {
    #[validate(length(min = 1))]
    pub admin_id: String,
    #[validate(email)]
    pub admin_email: String,
    pub assignment: Option<AdminRoleAssignment>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// An item whose outcome is in the response but whose audit entry could not
/// be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFailure {
    pub id: TargetId,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct BulkExecution {
    pub response: BulkActionResponse,
    /// Entries in the same order as `response.results()`. Together with
    /// `audit_failures` there is exactly one record per item.
    pub audit_entries: Vec<AuditLogEntry>,
    pub audit_failures: Vec<AuditFailure>,
}

pub struct BulkOperationProcessor {
    validator: BulkRequestValidator,
    audit: AuditService,
}

impl BulkOperationProcessor {
    pub fn new(config: &ModerationConfig) -> Self {
        Self {
            validator: BulkRequestValidator::new(config.bulk.clone()),
            audit: AuditService::new(config.audit.clone()),
        }
    }

    /// Validates a raw payload and executes it. Nothing runs unless the
    /// payload is valid and the admin holds the action's permission.
    pub async fn execute<E>(
        &self,
        admin: &AdminContext,
        kind: EntityKind,
        payload: &Value,
        executor: &E,
    ) -> Result<BulkExecution>
    where
        E: BulkActionExecutor + ?Sized,
    {
        let request = self
            .validator
            .parse(kind, payload)
            .map_err(ModerationError::InvalidBulkRequest)?;
        self.execute_request(admin, &request, executor).await
    }

    /// Executes a typed request. The request is re-checked against the
    /// configured rules first, so hand-built requests cannot reach the
    /// executor with malformed ids or a missing duration.
    pub async fn execute_request<E>(
        &self,
        admin: &AdminContext,
        request: &BulkActionRequest,
        executor: &E,
    ) -> Result<BulkExecution>
    where
        E: BulkActionExecutor + ?Sized,
    {
        let validation = self.validator.check(request);
        if !validation.valid {
            return Err(ModerationError::InvalidBulkRequest(validation));
        }

        let check = check_permission(admin.assignment.as_ref(), request.action.required_permission());
        if !check.allowed {
            return Err(ModerationError::PermissionDenied(check));
        }

        admin.validate().map_err(|e| {
            ModerationError::InvalidAuditInput(vec![format!("admin context: {}", e)])
        })?;
        // Validate the audit fields shared by every item before any mutation runs.
        self.audit
            .validate_input(&self.audit_input(admin, request, &TargetId::Str("-".into()), None, None))?;

        let outcomes = join_all(request.ids.iter().map(|id| async move {
            let outcome = executor.execute(id, request).await;
            (id, outcome)
        }))
        .await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut audit_entries = Vec::with_capacity(outcomes.len());
        let mut audit_failures = Vec::new();
        for (id, outcome) in outcomes {
            let (result, before, after) = match outcome {
                Ok(effect) => (BulkItemResult::success(id.clone()), effect.before, effect.after),
                Err(error) => {
                    tracing::warn!(id = %id, action = %request.action, %error, "bulk item failed");
                    let after = failure_snapshot(&error);
                    (BulkItemResult::failure(id.clone(), error), None, Some(after))
                }
            };
            match self
                .audit
                .create_entry(self.audit_input(admin, request, id, before, after))
            {
                Ok(entry) => audit_entries.push(entry),
                Err(error) => {
                    tracing::error!(id = %id, action = %request.action, %error, "audit entry not recorded");
                    audit_failures.push(AuditFailure {
                        id: id.clone(),
                        error: error.to_string(),
                    });
                }
            }
            results.push(result);
        }

        let response = aggregate_results(results);
        tracing::info!(
            admin = %admin.admin_id,
            action = %request.action,
            total = response.total(),
            successful = response.successful(),
            failed = response.failed(),
            "bulk action completed"
        );

        Ok(BulkExecution {
            response,
            audit_entries,
            audit_failures,
        })
    }

    fn audit_input(
        &self,
        admin: &AdminContext,
        request: &BulkActionRequest,
        id: &TargetId,
        before: Option<Snapshot>,
        after: Option<Snapshot>,
    ) -> CreateAuditLogInput {
        CreateAuditLogInput {
            action_type: request.action.audit_action(),
            admin_id: admin.admin_id.clone(),
            admin_email: admin.admin_email.clone(),
            target_type: request.action.audit_target(),
            target_id: id.to_string(),
            reason: request.reason.clone(),
            before_state: before,
            after_state: after,
            ip_address: admin.ip_address.clone(),
            user_agent: admin.user_agent.clone(),
        }
    }
}

fn failure_snapshot(error: &str) -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.insert("success".to_string(), json!(false));
    snapshot.insert("error".to_string(), Value::String(error.to_string()));
    snapshot
}

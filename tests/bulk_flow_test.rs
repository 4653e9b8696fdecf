//! End-to-end bulk processing: validation, permission gate, per-item
//! execution and audit trail.
//!
//! Run: cargo test --test bulk_flow_test

mod fixtures;

use std::sync::Mutex;

use admin_moderation::models::{
    AdminRole, AuditActionType, AuditTargetType, BulkAction, BulkActionRequest, BulkItemResult,
    BulkOutcome, EntityKind, Snapshot, TargetId, UserBulkAction, ValidationIssue,
};
use admin_moderation::services::{
    aggregate_results, apply_retry, classify, failed_ids, retry_request, successful_ids,
    AdminContext, BulkActionExecutor, BulkOperationProcessor, ItemEffect,
};
use admin_moderation::{ModerationConfig, ModerationError};
use async_trait::async_trait;
use chrono::Utc;
use fixtures::assignment;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Executor that fails for a fixed set of ids and records every call.
struct MockExecutor {
    failing: Vec<&'static str>,
    calls: Mutex<Vec<TargetId>>,
}

impl MockExecutor {
    fn failing(ids: &[&'static str]) -> Self {
        Self {
            failing: ids.to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<TargetId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BulkActionExecutor for MockExecutor {
    async fn execute(&self, id: &TargetId, request: &BulkActionRequest) -> Result<ItemEffect, String> {
        self.calls.lock().unwrap().push(id.clone());
        if self.failing.iter().any(|f| id.to_string() == *f) {
            return Err(format!("user {} not found", id));
        }
        Ok(ItemEffect {
            before: Some(snapshot(json!({ "status": "active" }))),
            after: Some(snapshot(json!({ "status": request.action.as_str() }))),
        })
    }
}

fn snapshot(value: Value) -> Snapshot {
    match value {
        Value::Object(map) => map,
        _ => panic!("snapshot must be an object"),
    }
}

fn admin(role: AdminRole) -> AdminContext {
    AdminContext {
        admin_id: "admin-7".to_string(),
        admin_email: "moderator@hackhub.dev".to_string(),
        assignment: Some(assignment(role)),
        ip_address: Some("10.0.0.1".to_string()),
        user_agent: None,
    }
}

fn processor() -> BulkOperationProcessor {
    BulkOperationProcessor::new(&ModerationConfig::default())
}

#[tokio::test]
async fn test_bulk_ban_with_one_failure() {
    let executor = MockExecutor::failing(&["u2"]);
    let payload = json!({
        "ids": ["u1", "u2", "u3"],
        "action": "ban",
        "reason": "  spam wave  ",
    });

    let execution = processor()
        .execute(&admin(AdminRole::Admin), EntityKind::User, &payload, &executor)
        .await
        .unwrap();

    let response = &execution.response;
    assert_eq!(response.total(), 3);
    assert_eq!(response.successful(), 2);
    assert_eq!(response.failed(), 1);
    assert_eq!(classify(response), BulkOutcome::PartialSuccess);
    assert_eq!(failed_ids(response), vec![TargetId::from("u2")]);
    assert_eq!(
        response.results()[1].error.as_deref(),
        Some("user u2 not found")
    );

    assert_eq!(execution.audit_entries.len(), 3);
    for (entry, result) in execution.audit_entries.iter().zip(response.results()) {
        assert_eq!(entry.target_id(), result.id.to_string());
        assert_eq!(entry.action_type(), AuditActionType::UserBan);
        assert_eq!(entry.target_type(), AuditTargetType::User);
        assert_eq!(entry.reason(), "spam wave");
        assert_eq!(entry.admin_id(), "admin-7");
    }

    let failed_entry = &execution.audit_entries[1];
    assert_eq!(
        failed_entry.after_state().and_then(|s| s.get("success")),
        Some(&json!(false))
    );
    assert!(failed_entry.before_state().is_none());

    let ok_entry = &execution.audit_entries[0];
    assert!(ok_entry.diff().has_changes);
    assert_eq!(ok_entry.diff().changed_fields(), vec!["status"]);
}

#[tokio::test]
async fn test_denied_admin_processes_nothing() {
    let executor = MockExecutor::failing(&[]);
    let payload = json!({ "ids": ["u1", "u2"], "action": "ban", "reason": "abuse" });

    let err = processor()
        .execute(&admin(AdminRole::Moderator), EntityKind::User, &payload, &executor)
        .await
        .unwrap_err();

    match err {
        ModerationError::PermissionDenied(check) => {
            assert!(!check.allowed);
            assert_eq!(check.role, Some(AdminRole::Moderator));
        }
        other => panic!("expected permission denial, got {:?}", other),
    }
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_missing_assignment_is_denied() {
    let executor = MockExecutor::failing(&[]);
    let mut context = admin(AdminRole::SuperAdmin);
    context.assignment = None;
    let payload = json!({ "ids": [1, 2], "action": "approve", "reason": "looks good" });

    let err = processor()
        .execute(&context, EntityKind::Hackathon, &payload, &executor)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 403);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_payload_is_rejected_before_execution() {
    let executor = MockExecutor::failing(&[]);
    let payload = json!({ "ids": ["u1"], "action": "mute", "reason": "flooding chat" });

    let err = processor()
        .execute(&admin(AdminRole::SuperAdmin), EntityKind::User, &payload, &executor)
        .await
        .unwrap_err();

    match err {
        ModerationError::InvalidBulkRequest(result) => {
            assert!(!result.valid);
            assert!(result.errors.iter().any(|issue| matches!(
                issue,
                ValidationIssue::MissingConditionalField { field, .. } if field == "duration_hours"
            )));
        }
        other => panic!("expected invalid request, got {:?}", other),
    }
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_admin_email_blocks_execution() {
    let executor = MockExecutor::failing(&[]);
    let mut context = admin(AdminRole::Admin);
    context.admin_email = "not-an-email".to_string();
    let payload = json!({ "ids": ["u1"], "action": "warn", "reason": "first strike" });

    let err = processor()
        .execute(&context, EntityKind::User, &payload, &executor)
        .await
        .unwrap_err();

    assert!(matches!(err, ModerationError::InvalidAuditInput(_)));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_timed_mute_and_retry_round() {
    let executor = MockExecutor::failing(&["u3"]);
    let payload = json!({
        "ids": ["u1", "u3"],
        "action": "mute",
        "reason": "cool down",
        "duration_hours": 24,
    });
    let processor = processor();
    let context = admin(AdminRole::Moderator);

    let first = processor
        .execute(&context, EntityKind::User, &payload, &executor)
        .await
        .unwrap();
    assert_eq!(first.response.failed(), 1);

    let request = BulkActionRequest {
        ids: vec!["u1".into(), "u3".into()],
        action: BulkAction::parse(EntityKind::User, "mute").unwrap(),
        reason: "cool down".to_string(),
        duration_hours: Some(24.0),
    };
    let now = Utc::now();
    assert_eq!(request.expires_at(now), Some(now + chrono::Duration::hours(24)));

    let retry = retry_request(&request, &first.response).unwrap();
    assert_eq!(retry.ids, vec![TargetId::from("u3")]);

    let recovering = MockExecutor::failing(&[]);
    let second = processor
        .execute_request(&context, &retry, &recovering)
        .await
        .unwrap();
    let combined = apply_retry(first.response, second.response);
    assert_eq!(combined.total(), 2);
    assert_eq!(classify(&combined), BulkOutcome::FullSuccess);
}

#[tokio::test]
async fn test_hackathon_ids_are_numeric() {
    let executor = MockExecutor::failing(&[]);
    let payload = json!({ "ids": [11, 12], "action": "feature", "reason": "spotlight" });

    let execution = processor()
        .execute(&admin(AdminRole::Admin), EntityKind::Hackathon, &payload, &executor)
        .await
        .unwrap();

    assert_eq!(executor.calls(), vec![TargetId::Int(11), TargetId::Int(12)]);
    assert_eq!(execution.audit_entries[0].target_type(), AuditTargetType::Hackathon);
    assert_eq!(execution.audit_entries[0].target_id(), "11");
}

#[tokio::test]
async fn test_hand_built_request_with_bad_ids_runs_nothing() {
    let executor = MockExecutor::failing(&[]);
    let request = BulkActionRequest {
        ids: vec![TargetId::from("u1"), TargetId::from("  "), TargetId::Int(5)],
        action: BulkAction::User(UserBulkAction::Ban),
        reason: "spam wave".to_string(),
        duration_hours: None,
    };

    let err = processor()
        .execute_request(&admin(AdminRole::Admin), &request, &executor)
        .await
        .unwrap_err();

    match err {
        ModerationError::InvalidBulkRequest(result) => {
            let indexes: Vec<usize> = result
                .errors
                .iter()
                .filter_map(|issue| match issue {
                    ValidationIssue::MalformedId { index, .. } => Some(*index),
                    _ => None,
                })
                .collect();
            assert_eq!(indexes, vec![1, 2]);
        }
        other => panic!("expected invalid request, got {:?}", other),
    }
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_hand_built_suspend_without_duration_runs_nothing() {
    let executor = MockExecutor::failing(&[]);
    let request = BulkActionRequest {
        ids: vec![TargetId::from("u1")],
        action: BulkAction::User(UserBulkAction::Suspend),
        reason: "repeat offender".to_string(),
        duration_hours: None,
    };

    let err = processor()
        .execute_request(&admin(AdminRole::Admin), &request, &executor)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_extreme_duration_is_rejected() {
    let executor = MockExecutor::failing(&[]);
    let payload = json!({
        "ids": ["u1"],
        "action": "suspend",
        "reason": "x",
        "duration_hours": 1e12,
    });

    let err = processor()
        .execute(&admin(AdminRole::Admin), EntityKind::User, &payload, &executor)
        .await
        .unwrap_err();

    match err {
        ModerationError::InvalidBulkRequest(result) => {
            assert!(result
                .errors
                .iter()
                .any(|issue| matches!(issue, ValidationIssue::TooLarge { .. })));
        }
        other => panic!("expected invalid request, got {:?}", other),
    }
    assert!(executor.calls().is_empty());

    let hand_built = BulkActionRequest {
        ids: vec![TargetId::from("u1")],
        action: BulkAction::User(UserBulkAction::Suspend),
        reason: "x".to_string(),
        duration_hours: Some(1e12),
    };
    assert_eq!(hand_built.expires_at(Utc::now()), None);
    assert!(processor()
        .execute_request(&admin(AdminRole::Admin), &hand_built, &executor)
        .await
        .is_err());
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_every_item_has_one_audit_record() {
    let executor = MockExecutor::failing(&["u2", "u4"]);
    let payload = json!({
        "ids": ["u1", "u2", "u3", "u4"],
        "action": "warn",
        "reason": "off-topic posts",
    });

    let execution = processor()
        .execute(&admin(AdminRole::Moderator), EntityKind::User, &payload, &executor)
        .await
        .unwrap();

    assert_eq!(execution.response.total(), 4);
    assert!(execution.audit_failures.is_empty());
    assert_eq!(
        execution.audit_entries.len() + execution.audit_failures.len(),
        execution.response.total()
    );
}

fn arb_outcomes() -> impl Strategy<Value = Vec<bool>> {
    proptest::collection::vec(any::<bool>(), 0..50)
}

fn build(outcomes: &[bool]) -> Vec<BulkItemResult> {
    outcomes
        .iter()
        .enumerate()
        .map(|(i, ok)| {
            let id = format!("u{}", i);
            if *ok {
                BulkItemResult::success(id)
            } else {
                BulkItemResult::failure(id, "boom")
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_aggregate_accounting(outcomes in arb_outcomes()) {
        let response = aggregate_results(build(&outcomes));
        prop_assert_eq!(response.successful() + response.failed(), response.total());
        prop_assert_eq!(response.total(), outcomes.len());
        prop_assert_eq!(response.results().len(), outcomes.len());
        prop_assert_eq!(response.successful(), outcomes.iter().filter(|ok| **ok).count());
        prop_assert_eq!(
            successful_ids(&response).len() + failed_ids(&response).len(),
            response.total()
        );
    }

    #[test]
    fn prop_uniform_outcomes_classify(n in 1usize..30, ok in any::<bool>()) {
        let response = aggregate_results(build(&vec![ok; n]));
        let expected = if ok { BulkOutcome::FullSuccess } else { BulkOutcome::FullFailure };
        prop_assert_eq!(classify(&response), expected);
        if ok {
            prop_assert_eq!(response.failed(), 0);
        } else {
            prop_assert_eq!(response.successful(), 0);
        }
    }

    #[test]
    fn prop_mixed_outcomes_are_partial(mut outcomes in arb_outcomes()) {
        outcomes.push(true);
        outcomes.push(false);
        let response = aggregate_results(build(&outcomes));
        prop_assert_eq!(classify(&response), BulkOutcome::PartialSuccess);
    }
}

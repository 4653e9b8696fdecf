//! Checks a bulk action payload offline: validation result and permission check
//! Run with: cargo run --bin moderation-check -- request.json
//!
//! Input document:
//! { "kind": "user", "role": "moderator", "request": { "ids": [...], "action": "...", "reason": "..." } }

use admin_moderation::models::{AdminRole, AdminRoleAssignment, CreateAdminRole, EntityKind};
use admin_moderation::services::{check_permission, BulkRequestValidator};
use admin_moderation::{telemetry, ModerationConfig};
use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CheckInput {
    kind: EntityKind,
    role: Option<AdminRole>,
    request: serde_json::Value,
}

fn main() -> anyhow::Result<()> {
    let config = ModerationConfig::load()?;
    telemetry::init_tracing(&config.log);

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MODERATION_INPUT").ok())
        .context("usage: moderation-check <input.json> (or set MODERATION_INPUT)")?;

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let input: CheckInput = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;
    tracing::info!(kind = %input.kind, path = %path, "checking bulk request");

    let validator = BulkRequestValidator::new(config.bulk.clone());
    let validation = validator.validate(input.kind, &input.request);
    let assignment = input.role.map(|role| {
        AdminRoleAssignment::new(CreateAdminRole {
            user_id: "moderation-check".to_string(),
            role: Some(role),
            ..Default::default()
        })
    });
    let permission = validator
        .parse(input.kind, &input.request)
        .ok()
        .map(|request| check_permission(assignment.as_ref(), request.action.required_permission()));

    let report = serde_json::json!({
        "validation": {
            "valid": validation.valid,
            "errors": validation.messages(),
        },
        "permission": permission,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

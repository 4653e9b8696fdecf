//! Shared fixtures and proptest strategies for the integration tests.
#![allow(dead_code)]

use admin_moderation::models::{
    AdminRole, AdminRoleAssignment, CreateAdminRole, FilterCriteria, Hackathon, OneOrMany,
    PermissionOverrides, Snapshot, UserRecord,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::collection::{btree_map, vec};
use proptest::option;
use proptest::prelude::*;
use serde_json::Value;

pub const STATUSES: &[&str] = &["draft", "pending_review", "published", "rejected", "archived"];
pub const FORMATS: &[&str] = &["online", "in_person", "hybrid"];
pub const OWNERS: &[&str] = &["org-1", "org-2", "org-3"];
pub const WORDS: &[&str] = &["Rust", "climate", "AI", "health", "fintech", "Open Source"];

pub fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn hackathon(id: i64, status: &str, registrations: i64) -> Hackathon {
    Hackathon {
        id,
        title: format!("Hackathon {}", id),
        description: Some("Build something great".to_string()),
        organization: Some("HackHub".to_string()),
        location: None,
        status: status.to_string(),
        format: "online".to_string(),
        created_by: "org-1".to_string(),
        organizer_email: Some(format!("organizer{}@hackhub.dev", id)),
        start_date: base_date() + Duration::days(id),
        end_date: base_date() + Duration::days(id + 2),
        registrations_count: registrations,
        featured: id % 2 == 0,
        created_at: base_date(),
    }
}

pub fn assignment(role: AdminRole) -> AdminRoleAssignment {
    AdminRoleAssignment::new(CreateAdminRole {
        user_id: format!("{}-admin", role),
        role: Some(role),
        ..Default::default()
    })
}

pub fn ids_of(items: &[&Hackathon]) -> Vec<i64> {
    items.iter().map(|h| h.id).collect()
}

fn pick(values: &'static [&'static str]) -> impl Strategy<Value = String> {
    proptest::sample::select(values).prop_map(String::from)
}

fn text() -> impl Strategy<Value = Option<String>> {
    option::of(proptest::sample::select(WORDS).prop_map(|w| format!("{} challenge", w)))
}

pub fn arb_hackathon() -> impl Strategy<Value = Hackathon> {
    (
        (1i64..10_000, pick(STATUSES), pick(FORMATS), pick(OWNERS)),
        (text(), text(), text(), text()),
        (
            option::of(pick(OWNERS).prop_map(|o| format!("{}@HackHub.dev", o))),
            0i64..120,
            0i64..500,
            any::<bool>(),
        ),
    )
        .prop_map(
            |((id, status, format, owner), (title, description, organization, location), (email, day, regs, featured))| {
                Hackathon {
                    id,
                    title: title.unwrap_or_else(|| format!("Hackathon {}", id)),
                    description,
                    organization,
                    location,
                    status,
                    format,
                    created_by: owner,
                    organizer_email: email,
                    start_date: base_date() + Duration::days(day),
                    end_date: base_date() + Duration::days(day + 2),
                    registrations_count: regs,
                    featured,
                    created_at: base_date(),
                }
            },
        )
}

/// Hackathons with unique ids, so results can be compared as id sets.
pub fn arb_hackathons() -> impl Strategy<Value = Vec<Hackathon>> {
    vec(arb_hackathon(), 0..40).prop_map(|mut items| {
        for (index, item) in items.iter_mut().enumerate() {
            item.id = index as i64 + 1;
        }
        items
    })
}

pub fn arb_user() -> impl Strategy<Value = UserRecord> {
    (
        ("[a-z]{1,6}", text(), option::of(pick(OWNERS).prop_map(|o| format!("{}@mail.dev", o)))),
        (text(), option::of(pick(&["participant", "organizer", "judge"]))),
        (pick(&["active", "warned", "muted", "suspended", "banned"]), 0i64..10, any::<bool>(), 0i64..365),
    )
        .prop_map(|((username, full_name, email), (bio, role), (status, warnings, verified, day))| {
            UserRecord {
                id: format!("u-{}", username),
                username,
                full_name,
                email,
                bio,
                role,
                status,
                warning_count: warnings,
                email_verified: verified,
                created_at: base_date() + Duration::days(day),
            }
        })
}

fn arb_set(values: &'static [&'static str]) -> impl Strategy<Value = OneOrMany> {
    prop_oneof![
        pick(values).prop_map(OneOrMany::One),
        vec(pick(values), 0..3).prop_map(OneOrMany::Many),
    ]
}

pub fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
    (
        (
            option::of(arb_set(STATUSES)),
            option::of(arb_set(&["online", "in_person", "hybrid", "participant", "organizer"])),
            option::of(prop_oneof![pick(OWNERS), Just("u-abc".to_string())]),
            option::of(prop_oneof![Just("ORG-1".to_string()), Just("hackhub".to_string()), Just("  ".to_string())]),
        ),
        (
            option::of(0i64..120),
            option::of(0i64..365),
            option::of(0i64..300),
            option::of(0i64..500),
        ),
        (
            option::of(any::<bool>()),
            option::of(prop_oneof![
                pick(WORDS),
                Just("CHALLENGE".to_string()),
                Just("zzz".to_string()),
                Just(String::new()),
            ]),
        ),
    )
        .prop_map(|((status, format, owner_id, owner_email), (from, to, min, max), (flag, search))| {
            FilterCriteria {
                status,
                format,
                owner_id,
                owner_email,
                date_from: from.map(|d| base_date() + Duration::days(d)),
                date_to: to.map(|d| base_date() + Duration::days(d)),
                min_count: min,
                max_count: max,
                flag,
                search,
            }
        })
}

pub fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..5).prop_map(Value::from),
        "[a-c]{0,2}".prop_map(Value::String),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..3).prop_map(Value::Array),
            btree_map("[a-c]", inner, 0..3)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

pub fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    btree_map("[a-f]", arb_value(), 0..6).prop_map(|m| m.into_iter().collect())
}

pub fn arb_role() -> impl Strategy<Value = AdminRole> {
    proptest::sample::select(AdminRole::all())
}

pub fn arb_overrides() -> impl Strategy<Value = PermissionOverrides> {
    btree_map(
        proptest::sample::select(admin_moderation::models::Permission::all()),
        any::<bool>(),
        0..6,
    )
}

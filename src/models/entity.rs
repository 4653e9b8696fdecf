// Entities under moderation. The engine only reads them.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of entity a bulk action or audit record targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Hackathon,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Hackathon => "hackathon",
            EntityKind::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target identifier. Hackathons use integer keys, users opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetId {
    Int(i64),
    Str(String),
}

impl TargetId {
    pub fn kind(&self) -> EntityKind {
        match self {
            TargetId::Int(_) => EntityKind::Hackathon,
            TargetId::Str(_) => EntityKind::User,
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetId::Int(id) => write!(f, "{}", id),
            TargetId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for TargetId {
    fn from(id: i64) -> Self {
        TargetId::Int(id)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        TargetId::Str(id.to_string())
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        TargetId::Str(id)
    }
}

/// Read-only view the filter engine uses to inspect an entity.
///
/// Each accessor maps one filter dimension onto the entity's own field;
/// `None` means the entity has no value for that dimension.
pub trait Filterable {
    fn status(&self) -> &str;
    fn format(&self) -> Option<&str>;
    fn owner_id(&self) -> Option<&str>;
    fn owner_email(&self) -> Option<&str>;
    /// Timestamp the date range applies to.
    fn filter_date(&self) -> Option<DateTime<Utc>>;
    /// Count the numeric range applies to.
    fn filter_count(&self) -> Option<i64>;
    fn flag(&self) -> Option<bool>;
    /// Fixed, ordered list of fields free-text search looks at.
    fn search_fields(&self) -> Vec<Option<&str>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hackathon {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub organization: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub format: String,
    pub created_by: String,
    pub organizer_email: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registrations_count: i64,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Filterable for Hackathon {
    fn status(&self) -> &str {
        &self.status
    }

    fn format(&self) -> Option<&str> {
        Some(&self.format)
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.created_by)
    }

    fn owner_email(&self) -> Option<&str> {
        self.organizer_email.as_deref()
    }

    fn filter_date(&self) -> Option<DateTime<Utc>> {
        Some(self.start_date)
    }

    fn filter_count(&self) -> Option<i64> {
        Some(self.registrations_count)
    }

    fn flag(&self) -> Option<bool> {
        Some(self.featured)
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.title.as_str()),
            self.description.as_deref(),
            self.organization.as_deref(),
            self.location.as_deref(),
        ]
    }
}

/// Platform user as seen by the moderation dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
    pub status: String,
    pub warning_count: i64,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Filterable for UserRecord {
    fn status(&self) -> &str {
        &self.status
    }

    fn format(&self) -> Option<&str> {
        self.role.as_deref()
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn owner_email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn filter_date(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn filter_count(&self) -> Option<i64> {
        Some(self.warning_count)
    }

    fn flag(&self) -> Option<bool> {
        Some(self.email_verified)
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            self.full_name.as_deref(),
            Some(self.username.as_str()),
            self.email.as_deref(),
            self.bio.as_deref(),
        ]
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single value or a set of accepted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn contains(&self, value: &str) -> bool {
        match self {
            OneOrMany::One(expected) => expected == value,
            OneOrMany::Many(expected) => expected.iter().any(|e| e == value),
        }
    }

    /// An empty set places no constraint.
    pub fn is_empty(&self) -> bool {
        matches!(self, OneOrMany::Many(values) if values.is_empty())
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(String::from).collect())
    }
}

/// Query describing which entities to select. Every field is optional and
/// `None` leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub status: Option<OneOrMany>,
    pub format: Option<OneOrMany>,
    pub owner_id: Option<String>,
    /// Case-insensitive substring of the owner's email.
    pub owner_email: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub min_count: Option<i64>,
    pub max_count: Option<i64>,
    pub flag: Option<bool>,
    /// Case-insensitive substring matched against every search field.
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn with_status(mut self, status: impl Into<OneOrMany>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<OneOrMany>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_owner_email(mut self, needle: impl Into<String>) -> Self {
        self.owner_email = Some(needle.into());
        self
    }

    pub fn with_date_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_count_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_count = min;
        self.max_count = max;
        self
    }

    pub fn with_flag(mut self, flag: bool) -> Self {
        self.flag = Some(flag);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Owner email needle, `None` when absent or blank.
    pub fn owner_email_needle(&self) -> Option<String> {
        normalized_needle(self.owner_email.as_deref())
    }

    /// Search needle, `None` when absent or blank.
    pub fn search_needle(&self) -> Option<String> {
        normalized_needle(self.search.as_deref())
    }

    pub fn status_set(&self) -> Option<&OneOrMany> {
        self.status.as_ref().filter(|s| !s.is_empty())
    }

    pub fn format_set(&self) -> Option<&OneOrMany> {
        self.format.as_ref().filter(|f| !f.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.status_set().is_none()
            && self.format_set().is_none()
            && self.owner_id.is_none()
            && self.owner_email_needle().is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.min_count.is_none()
            && self.max_count.is_none()
            && self.flag.is_none()
            && self.search_needle().is_none()
    }
}

fn normalized_needle(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

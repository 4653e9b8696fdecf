use serde::Deserialize;
use validator::Validate;

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ModerationConfig {
    #[serde(default)]
    #[validate(nested)]
    pub bulk: BulkConfig,
    #[serde(default)]
    #[validate(nested)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkConfig {
    #[serde(default = "default_max_targets")]
    #[validate(range(min = 1, max = 10000))]
    pub max_targets: usize,
    #[serde(default = "default_bulk_reason_length")]
    #[validate(range(min = 1))]
    pub max_reason_length: usize,
    /// Upper bound for mute and suspension durations.
    #[serde(default = "default_max_duration_hours")]
    #[validate(range(min = 1))]
    pub max_duration_hours: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuditConfig {
    #[serde(default = "default_audit_reason_length")]
    #[validate(range(min = 1))]
    pub max_reason_length: usize,
    /// Snapshot keys whose values are replaced before they are recorded.
    #[serde(default = "default_redact_fields")]
    pub redact_fields: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

fn default_max_targets() -> usize {
    500
}

fn default_bulk_reason_length() -> usize {
    1000
}

fn default_max_duration_hours() -> u32 {
    // one year
    8760
}

fn default_audit_reason_length() -> usize {
    2000
}

fn default_redact_fields() -> Vec<String> {
    ["password", "token", "secret", "api_key"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_log_filter() -> String {
    "admin_moderation=info".to_string()
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_targets: default_max_targets(),
            max_reason_length: default_bulk_reason_length(),
            max_duration_hours: default_max_duration_hours(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_reason_length: default_audit_reason_length(),
            redact_fields: default_redact_fields(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl ModerationConfig {
    /// Loads configuration from `MODERATION__*` environment variables
    /// (after reading `.env` if present), falling back to defaults.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("bulk.max_targets", default_max_targets() as i64)?
            .set_default("bulk.max_reason_length", default_bulk_reason_length() as i64)?
            .set_default("bulk.max_duration_hours", default_max_duration_hours() as i64)?
            .set_default("audit.max_reason_length", default_audit_reason_length() as i64)?
            .set_default("log.filter", default_log_filter())?
            .set_default("log.json", false)?
            .add_source(
                config::Environment::with_prefix("MODERATION")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("audit.redact_fields")
                    .try_parsing(true),
            )
            .build()?;

        let config: ModerationConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

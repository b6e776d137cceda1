//! Typed community settings, validated once at the boundary.
//!
//! Settings come from a TOML file and may be overridden from the environment:
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `SUBGUARD_THRESHOLD` | `3` | Warning count that triggers a ban (1-11) |
//! | `SUBGUARD_BAN_DAYS` | `30` | Ban length in days (1-999) |
//! | `SUBGUARD_TEAM_NOTIFICATIONS` | `false` | Send a team notification per action |
//! | `SUBGUARD_REMIND_TEMPLATE` | built-in | Comment & Remind reply |
//! | `SUBGUARD_WARN_TEMPLATE` | built-in | Reply when a warning is issued |
//! | `SUBGUARD_BAN_TEMPLATE` | built-in | Reply when the warning results in a ban |
//!
//! Once built, a [`CommunitySettings`] value is never mutated by the engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::template::MessageTemplateSet;

/// Lowest accepted ban threshold.
pub const MIN_THRESHOLD: u32 = 1;
/// Highest accepted ban threshold.
pub const MAX_THRESHOLD: u32 = 11;
/// Shortest accepted ban, in days.
pub const MIN_BAN_DAYS: u32 = 1;
/// Longest accepted ban, in days.
pub const MAX_BAN_DAYS: u32 = 999;

pub const DEFAULT_THRESHOLD: u32 = 3;
pub const DEFAULT_BAN_DAYS: u32 = 30;

pub const ENV_THRESHOLD: &str = "SUBGUARD_THRESHOLD";
pub const ENV_BAN_DAYS: &str = "SUBGUARD_BAN_DAYS";
pub const ENV_TEAM_NOTIFICATIONS: &str = "SUBGUARD_TEAM_NOTIFICATIONS";
pub const ENV_REMIND_TEMPLATE: &str = "SUBGUARD_REMIND_TEMPLATE";
pub const ENV_WARN_TEMPLATE: &str = "SUBGUARD_WARN_TEMPLATE";
pub const ENV_BAN_TEMPLATE: &str = "SUBGUARD_BAN_TEMPLATE";

/// Configuration errors. Raised while loading settings, never at cycle time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },

    #[error("{var} is not a valid number: {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Threshold and ban length for one community.
///
/// Fields are private so a value outside the accepted ranges cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEscalationConfig")]
pub struct EscalationConfig {
    threshold: u32,
    ban_duration_days: u32,
}

impl EscalationConfig {
    /// Build a validated config.
    pub fn new(threshold: u32, ban_duration_days: u32) -> Result<Self, ConfigError> {
        RawEscalationConfig {
            threshold: i64::from(threshold),
            ban_duration_days: i64::from(ban_duration_days),
        }
        .try_into()
    }

    /// Warning count at which the next infraction becomes a ban.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Ban length in days.
    pub fn ban_duration_days(&self) -> u32 {
        self.ban_duration_days
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            ban_duration_days: DEFAULT_BAN_DAYS,
        }
    }
}

impl std::fmt::Display for EscalationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ban after {} warning(s) for {} day(s)",
            self.threshold, self.ban_duration_days
        )
    }
}

/// Unvalidated form, as it appears in a settings file.
///
/// Signed so that negative input is reported as out of range rather than
/// as a parse failure.
#[derive(Debug, Clone, Copy, Deserialize)]
struct RawEscalationConfig {
    #[serde(default = "default_threshold")]
    threshold: i64,
    #[serde(default = "default_ban_days")]
    ban_duration_days: i64,
}

fn default_threshold() -> i64 {
    i64::from(DEFAULT_THRESHOLD)
}

fn default_ban_days() -> i64 {
    i64::from(DEFAULT_BAN_DAYS)
}

impl TryFrom<RawEscalationConfig> for EscalationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawEscalationConfig) -> Result<Self, Self::Error> {
        let threshold = check_range("threshold", raw.threshold, MIN_THRESHOLD, MAX_THRESHOLD)?;
        let ban_duration_days = check_range(
            "ban_duration_days",
            raw.ban_duration_days,
            MIN_BAN_DAYS,
            MAX_BAN_DAYS,
        )?;
        Ok(Self {
            threshold,
            ban_duration_days,
        })
    }
}

fn check_range(field: &'static str, value: i64, min: u32, max: u32) -> Result<u32, ConfigError> {
    if value < i64::from(min) || value > i64::from(max) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    // Bounded by `max` above.
    Ok(value as u32)
}

/// Everything the engine reads about one community.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunitySettings {
    /// Ban threshold and duration
    pub escalation: EscalationConfig,
    /// Whether each warn/ban also produces a team notification
    pub team_notifications: bool,
    /// Custom reply templates; unset slots use the built-in defaults
    pub templates: MessageTemplateSet,
}

impl CommunitySettings {
    /// Parse settings from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply `SUBGUARD_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    ///
    /// Only variables the lookup returns are applied. The escalation config
    /// is re-validated as a whole, so a bad override leaves `self` unchanged.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawEscalationConfig {
            threshold: i64::from(self.escalation.threshold),
            ban_duration_days: i64::from(self.escalation.ban_duration_days),
        };
        if let Some(value) = lookup(ENV_THRESHOLD) {
            raw.threshold = parse_number(ENV_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_BAN_DAYS) {
            raw.ban_duration_days = parse_number(ENV_BAN_DAYS, &value)?;
        }
        let escalation = EscalationConfig::try_from(raw)?;

        self.escalation = escalation;
        if let Some(value) = lookup(ENV_TEAM_NOTIFICATIONS) {
            self.team_notifications = parse_bool_value(&value);
        }
        if let Some(value) = lookup(ENV_REMIND_TEMPLATE) {
            self.templates.reminder = Some(value);
        }
        if let Some(value) = lookup(ENV_WARN_TEMPLATE) {
            self.templates.warn = Some(value);
        }
        if let Some(value) = lookup(ENV_BAN_TEMPLATE) {
            self.templates.ban = Some(value);
        }
        Ok(())
    }

    /// Format as a human-readable summary line.
    pub fn summary(&self) -> String {
        format!(
            "{}; team notifications {}; custom templates: {}",
            self.escalation,
            if self.team_notifications { "ON" } else { "OFF" },
            self.templates.custom_count()
        )
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<i64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        })
}

/// Accepts "1", "true", or "yes" (case-insensitive).
fn parse_bool_value(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "1" || v == "true" || v == "yes"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = CommunitySettings::default();
        assert_eq!(settings.escalation.threshold(), 3);
        assert_eq!(settings.escalation.ban_duration_days(), 30);
        assert!(!settings.team_notifications);
        assert_eq!(settings.templates.custom_count(), 0);
    }

    #[test]
    fn test_bounds_accepted() {
        assert!(EscalationConfig::new(1, 1).is_ok());
        assert!(EscalationConfig::new(11, 999).is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = EscalationConfig::new(12, 30).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "threshold",
                value: 12,
                ..
            }
        ));
        assert!(EscalationConfig::new(0, 30).is_err());
    }

    #[test]
    fn test_ban_days_out_of_range() {
        let err = EscalationConfig::new(3, 1000).unwrap_err();
        assert!(err.to_string().contains("ban_duration_days"));
        assert!(EscalationConfig::new(3, 0).is_err());
    }

    #[test]
    fn test_from_toml() {
        let settings = CommunitySettings::from_toml_str(
            r#"
team_notifications = true

[escalation]
threshold = 5
ban_duration_days = 14

[templates]
ban = "{{author}} banned {{length}}d"
"#,
        )
        .unwrap();
        assert_eq!(settings.escalation.threshold(), 5);
        assert_eq!(settings.escalation.ban_duration_days(), 14);
        assert!(settings.team_notifications);
        assert_eq!(
            settings.templates.ban.as_deref(),
            Some("{{author}} banned {{length}}d")
        );
        assert!(settings.templates.warn.is_none());
    }

    #[test]
    fn test_from_toml_partial_escalation_uses_defaults() {
        let settings = CommunitySettings::from_toml_str("[escalation]\nthreshold = 2\n").unwrap();
        assert_eq!(settings.escalation.threshold(), 2);
        assert_eq!(settings.escalation.ban_duration_days(), DEFAULT_BAN_DAYS);
    }

    #[test]
    fn test_from_toml_rejects_out_of_range() {
        let err = CommunitySettings::from_toml_str("[escalation]\nthreshold = -1\n").unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = CommunitySettings::default();
        settings
            .apply_overrides(lookup(&[
                (ENV_THRESHOLD, "4"),
                (ENV_BAN_DAYS, " 7 "),
                (ENV_TEAM_NOTIFICATIONS, "Yes"),
                (ENV_WARN_TEMPLATE, "warned {{author}}"),
            ]))
            .unwrap();
        assert_eq!(settings.escalation.threshold(), 4);
        assert_eq!(settings.escalation.ban_duration_days(), 7);
        assert!(settings.team_notifications);
        assert_eq!(settings.templates.warn.as_deref(), Some("warned {{author}}"));
    }

    #[test]
    fn test_bad_override_leaves_settings_unchanged() {
        let mut settings = CommunitySettings::default();
        let err = settings
            .apply_overrides(lookup(&[(ENV_THRESHOLD, "99"), (ENV_TEAM_NOTIFICATIONS, "1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
        assert_eq!(settings, CommunitySettings::default());

        let err = settings
            .apply_overrides(lookup(&[(ENV_BAN_DAYS, "two weeks")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn test_parse_bool_value() {
        assert!(parse_bool_value("1"));
        assert!(parse_bool_value("TRUE"));
        assert!(parse_bool_value("yes"));
        assert!(!parse_bool_value("0"));
        assert!(!parse_bool_value("off"));
        assert!(!parse_bool_value(""));
    }

    #[test]
    fn test_summary() {
        let summary = CommunitySettings::default().summary();
        assert!(summary.contains("ban after 3 warning(s) for 30 day(s)"));
        assert!(summary.contains("team notifications OFF"));
    }
}

use anyhow::{Context, Result};
use moderation::CommunitySettings;
use std::path::PathBuf;

/// Default location of the file-backed warning store.
pub const DEFAULT_STORE_PATH: &str = ".subguard/warnings.json";

/// Operator-level configuration: where state, settings, and telemetry live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubGuardConfig {
    /// JSON file backing the warning store
    pub store_path: PathBuf,
    /// TOML community settings (None = built-in defaults)
    pub settings_path: Option<PathBuf>,
    /// JSONL sink for cycle telemetry (None = tracing only)
    pub telemetry_path: Option<PathBuf>,
}

impl Default for SubGuardConfig {
    fn default() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }
}

impl SubGuardConfig {
    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            store_path: lookup("SUBGUARD_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            settings_path: lookup("SUBGUARD_SETTINGS_PATH").map(PathBuf::from),
            telemetry_path: lookup("SUBGUARD_TELEMETRY_PATH").map(PathBuf::from),
        }
    }

    /// Load community settings from `settings_path` (if any), then apply
    /// `SUBGUARD_*` environment overrides.
    pub fn load_settings(&self) -> Result<CommunitySettings> {
        let mut settings = match &self.settings_path {
            Some(path) => CommunitySettings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => CommunitySettings::default(),
        };
        settings
            .apply_env()
            .context("applying SUBGUARD_* overrides")?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_defaults() {
        let config = SubGuardConfig::from_lookup(|_| None);
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert!(config.settings_path.is_none());
        assert!(config.telemetry_path.is_none());
    }

    #[test]
    fn test_from_lookup_reads_paths() {
        let vars: HashMap<&str, &str> = [
            ("SUBGUARD_STORE_PATH", "/var/lib/subguard/w.json"),
            ("SUBGUARD_TELEMETRY_PATH", "/tmp/cycles.jsonl"),
        ]
        .into_iter()
        .collect();
        let config = SubGuardConfig::from_lookup(|var| vars.get(var).map(|v| v.to_string()));
        assert_eq!(config.store_path, PathBuf::from("/var/lib/subguard/w.json"));
        assert_eq!(
            config.telemetry_path,
            Some(PathBuf::from("/tmp/cycles.jsonl"))
        );
    }

    #[test]
    fn test_load_settings_reports_file_context() {
        let config = SubGuardConfig {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            settings_path: Some(PathBuf::from("/nonexistent/subguard.toml")),
            telemetry_path: None,
        };
        let err = config.load_settings().unwrap_err();
        assert!(format!("{err:#}").contains("loading settings from /nonexistent/subguard.toml"));
    }

    #[test]
    fn test_load_settings_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subguard.toml");
        std::fs::write(
            &path,
            "team_notifications = true\n[escalation]\nthreshold = 5\nban_duration_days = 7\n",
        )
        .unwrap();
        let config = SubGuardConfig {
            store_path: dir.path().join("w.json"),
            settings_path: Some(path),
            telemetry_path: None,
        };
        let settings = config.load_settings().unwrap();
        assert!(settings.team_notifications);
        assert_eq!(settings.escalation.threshold(), 5);
        assert_eq!(settings.escalation.ban_duration_days(), 7);
    }
}

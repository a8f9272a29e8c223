use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CredentialError, Result};
use crate::secure::TextFormat;
use crate::vault::{CredentialType, PersistenceType};

/// Project-level configuration, loaded from `.credmgr.toml`.
///
/// Every field has a default so credmgr works without a config file.
/// Command-line flags override whatever is configured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Persistence used by `save` when `--persist` is not given.
    #[serde(default)]
    pub default_persistence: PersistenceType,

    /// Secret encoding for every command (default: unicode).
    #[serde(default)]
    pub text_format: TextFormat,

    /// Credential type used when `--type` is not given.
    #[serde(default)]
    pub credential_type: CredentialType,

    /// `tracing` filter applied when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_log_filter() -> String {
    "credmgr=warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_persistence: PersistenceType::default(),
            text_format: TextFormat::default(),
            credential_type: CredentialType::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".credmgr.toml";

    /// Load settings from `<project_dir>/.credmgr.toml`.
    ///
    /// A missing file yields defaults; an unparsable one is an error.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        toml::from_str(&contents).map_err(|e| {
            CredentialError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_match_credential_defaults() {
        let s = Settings::default();
        assert_eq!(s.default_persistence, PersistenceType::Session);
        assert_eq!(s.text_format, TextFormat::Unicode);
        assert_eq!(s.credential_type, CredentialType::Generic);
        assert_eq!(s.log_filter, "credmgr=warn");
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.credential_type, CredentialType::Generic);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
default_persistence = "local_machine"
text_format = "ansi"
credential_type = "domain_password"
log_filter = "credmgr=debug"
"#;
        fs::write(tmp.path().join(".credmgr.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.default_persistence, PersistenceType::LocalMachine);
        assert_eq!(settings.text_format, TextFormat::Ansi);
        assert_eq!(settings.credential_type, CredentialType::DomainPassword);
        assert_eq!(settings.log_filter, "credmgr=debug");
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".credmgr.toml"), "text_format = \"ansi\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.text_format, TextFormat::Ansi);
        assert_eq!(settings.default_persistence, PersistenceType::Session);
        assert_eq!(settings.log_filter, "credmgr=warn");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".credmgr.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(CredentialError::ConfigError(_))));
    }

    #[test]
    fn load_errors_on_unknown_persistence() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".credmgr.toml"), "default_persistence = \"forever\"\n").unwrap();

        assert!(Settings::load(tmp.path()).is_err());
    }
}

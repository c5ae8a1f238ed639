//! Configuration settings for formgate.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::DefenseError;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Security configuration for the token guard.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Path to the token secret file.
    #[serde(default = "default_secret_path")]
    pub secret_path: PathBuf,
    /// Width of the token validity window in seconds.
    #[serde(default = "default_token_window")]
    pub token_window_seconds: u64,
    /// Name of the form field that carries the anti-forgery token.
    #[serde(default = "default_token_field")]
    pub token_field: String,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for per-day audit log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Whether DEBUG/INFO/WARNING entries are recorded at startup.
    /// Errors are always recorded. Runtime changes go through
    /// [`crate::audit::AuditLog::set_enabled`].
    #[serde(default)]
    pub enabled: bool,
}

// Default value functions
fn default_secret_path() -> PathBuf {
    PathBuf::from("/etc/formgate/token.key")
}

fn default_token_window() -> u64 {
    43_200 // 12 hours
}

fn default_token_field() -> String {
    "_token".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/formgate")
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_path: default_secret_path(),
            token_window_seconds: default_token_window(),
            token_field: default_token_field(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            enabled: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DefenseError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DefenseError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| DefenseError::Config {
            message: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), DefenseError> {
        if self.security.token_window_seconds == 0 {
            return Err(DefenseError::Config {
                message: "token_window_seconds must be greater than zero".to_string(),
            });
        }

        if self.security.token_field.is_empty() {
            return Err(DefenseError::Config {
                message: "token_field cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_applied_for_omitted_sections() {
        let file = write_config("");
        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.security.token_window_seconds, 43_200);
        assert_eq!(settings.security.token_field, "_token");
        assert!(!settings.logging.enabled);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let file = write_config(
            r#"
[security]
token_window_seconds = 3600

[logging]
enabled = true
"#,
        );
        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.security.token_window_seconds, 3600);
        assert_eq!(settings.security.token_field, "_token");
        assert!(settings.logging.enabled);
    }

    #[test]
    fn test_zero_window_rejected() {
        let file = write_config("[security]\ntoken_window_seconds = 0\n");
        assert!(Settings::load(file.path()).is_err());
    }

    #[test]
    fn test_empty_token_field_rejected() {
        let file = write_config("[security]\ntoken_field = \"\"\n");
        assert!(Settings::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Settings::load("/nonexistent/formgate.toml").unwrap_err();
        assert!(matches!(err, DefenseError::Config { .. }));
    }
}

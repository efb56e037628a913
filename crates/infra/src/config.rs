//! Configuration loading and representation.
//!
//! Everything comes from environment variables:
//!
//! | variable             | default   | meaning                                      |
//! |----------------------|-----------|----------------------------------------------|
//! | `KEYWARD_RUN_MODE`   | `release` | `local` enables trusted-local logins         |
//! | `KEYWARD_LOCALE`     | `en_US`   | locale for user-facing messages              |
//! | `KEYWARD_LOG_FORMAT` | `json`    | `json` or `pretty`                           |
//! | `KEYWARD_FIXTURES`   | unset     | JSON account fixtures for the in-memory store |

use std::path::PathBuf;

use thiserror::Error;

use keyward_auth::{AuthSettings, OperatingMode};
use keyward_observability::{LogFormat, ParseLogFormatError};

use crate::i18n::DEFAULT_LOCALE;

pub const RUN_MODE_VAR: &str = "KEYWARD_RUN_MODE";
pub const LOCALE_VAR: &str = "KEYWARD_LOCALE";
pub const LOG_FORMAT_VAR: &str = "KEYWARD_LOG_FORMAT";
pub const FIXTURES_VAR: &str = "KEYWARD_FIXTURES";

/// Run mode value that selects [`OperatingMode::TrustedLocal`].
const TRUSTED_RUN_MODE: &str = "local";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("KEYWARD_LOG_FORMAT: {0}")]
    LogFormat(#[from] ParseLogFormatError),

    #[error("KEYWARD_LOCALE must not be empty")]
    EmptyLocale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub run_mode: OperatingMode,
    pub locale: String,
    pub log_format: LogFormat,
    pub fixtures: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            run_mode: OperatingMode::Normal,
            locale: DEFAULT_LOCALE.to_string(),
            log_format: LogFormat::default(),
            fixtures: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Only the exact value "local" turns verification off; anything else,
        // including typos, stays in normal mode.
        let run_mode = match lookup(RUN_MODE_VAR).as_deref().map(str::trim) {
            Some(TRUSTED_RUN_MODE) => OperatingMode::TrustedLocal,
            _ => OperatingMode::Normal,
        };

        let locale = match lookup(LOCALE_VAR) {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptyLocale),
            Some(raw) => raw.trim().to_string(),
            None => defaults.locale,
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        let fixtures = lookup(FIXTURES_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            run_mode,
            locale,
            log_format,
            fixtures,
        })
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            mode: self.run_mode,
        }
    }
}

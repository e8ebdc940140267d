//! core::config::schema
//!
//! Configuration file schema.
//!
//! The same schema is used for the global file and the per-project
//! `.gitfacts.toml`. Every field is optional so a project file only needs
//! to mention what it overrides.
//!
//! # Validation
//!
//! Values are validated after parsing (e.g., `abbrev` must be a length git
//! can abbreviate to).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Smallest abbreviation git accepts.
pub const MIN_ABBREV: u32 = 4;

/// Full SHA-1 hex length.
pub const MAX_ABBREV: u32 = 40;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// [describe]
/// abbrev = 10
/// always_long = true
/// dirty_suffix = "-dirty"
/// match = "v*"
///
/// [env]
/// prefix = "GIT_"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Describe formatting
    pub describe: Option<DescribeConfig>,

    /// Build-script environment output
    pub env: Option<EnvConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(describe) = &self.describe {
            describe.validate()?;
        }
        if let Some(env) = &self.env {
            env.validate()?;
        }
        Ok(())
    }
}

/// `[describe]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DescribeConfig {
    /// Abbreviated object id length
    pub abbrev: Option<u32>,

    /// Always emit `<tag>-<distance>-g<id>`, even when HEAD is tagged
    pub always_long: Option<bool>,

    /// Appended when the worktree has uncommitted changes
    pub dirty_suffix: Option<String>,

    /// Glob restricting which tags may be used
    #[serde(rename = "match")]
    pub pattern: Option<String>,
}

impl DescribeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(abbrev) = self.abbrev {
            if !(MIN_ABBREV..=MAX_ABBREV).contains(&abbrev) {
                return Err(ConfigError::InvalidValue(format!(
                    "describe.abbrev must be between {MIN_ABBREV} and {MAX_ABBREV}, got {abbrev}"
                )));
            }
        }
        if let Some(pattern) = &self.pattern {
            if pattern.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "describe.match cannot be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

/// `[env]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Prefix for `cargo:rustc-env` variable names
    pub prefix: Option<String>,
}

impl EnvConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.prefix {
            let valid = !prefix.is_empty()
                && prefix
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(ConfigError::InvalidValue(format!(
                    "env.prefix must be a non-empty identifier, got '{prefix}'"
                )));
            }
        }
        Ok(())
    }
}

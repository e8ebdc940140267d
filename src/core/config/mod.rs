//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! gitfacts has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: `.gitfacts.toml` in the project directory
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GITFACTS_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitfacts/config.toml`
//! 3. `<platform config dir>/gitfacts/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use gitfacts::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! println!("abbrev: {}", config.abbrev());
//! println!("env prefix: {}", config.env_prefix());
//! ```

pub mod schema;

pub use schema::{ConfigFile, DescribeConfig, EnvConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::git::DescribeSettings;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: a value set in the project
/// file wins over the global file, which wins over the default.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Project configuration (if a project file was found)
    pub project: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// File name of the per-project config.
    pub const PROJECT_FILE: &'static str = ".gitfacts.toml";

    /// Default abbreviated object id length.
    pub const DEFAULT_ABBREV: u32 = 7;

    /// Default build-script environment variable prefix.
    pub const DEFAULT_ENV_PREFIX: &'static str = "GIT_";

    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, `<project_dir>/.gitfacts.toml` is
    /// layered on top of the global file.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. Missing files are not an error (defaults are used).
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let global = Self::global_path();
        let project = project_dir.map(|dir| dir.join(Self::PROJECT_FILE));
        Self::load_from(global.as_deref(), project.as_deref())
    }

    /// Load configuration from explicit file paths.
    ///
    /// A path that does not exist is skipped.
    pub fn load_from(global: Option<&Path>, project: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = global.filter(|p| p.exists()) {
            config.global = Self::read_file(path)?;
            config.global_path = Some(path.to_path_buf());
        }
        if let Some(path) = project.filter(|p| p.exists()) {
            config.project = Some(Self::read_file(path)?);
            config.project_path = Some(path.to_path_buf());
        }

        Ok(config)
    }

    /// Locate the global config file, if any location is configured.
    fn global_path() -> Option<PathBuf> {
        // 1. $GITFACTS_CONFIG
        if let Ok(path) = std::env::var("GITFACTS_CONFIG") {
            return Some(PathBuf::from(path));
        }

        // 2. $XDG_CONFIG_HOME/gitfacts/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitfacts/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Platform config dir
        dirs::config_dir().map(|dir| dir.join("gitfacts/config.toml"))
    }

    fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(file)
    }

    /// Path of the global file that was loaded.
    pub fn global_file(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path of the project file that was loaded.
    pub fn project_file(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// Pick a value from the project file, then the global file.
    fn layered<T>(&self, pick: impl Fn(&ConfigFile) -> Option<T>) -> Option<T> {
        self.project
            .as_ref()
            .and_then(&pick)
            .or_else(|| pick(&self.global))
    }

    /// Abbreviated object id length used by describe.
    pub fn abbrev(&self) -> u32 {
        self.layered(|f| f.describe.as_ref()?.abbrev)
            .unwrap_or(Self::DEFAULT_ABBREV)
    }

    /// Whether describe always uses the long format.
    pub fn always_long(&self) -> bool {
        self.layered(|f| f.describe.as_ref()?.always_long)
            .unwrap_or(true)
    }

    /// Suffix appended to describe output for a dirty worktree.
    pub fn dirty_suffix(&self) -> Option<String> {
        self.layered(|f| f.describe.as_ref()?.dirty_suffix.clone())
    }

    /// Glob restricting describe to matching tags.
    pub fn describe_pattern(&self) -> Option<String> {
        self.layered(|f| f.describe.as_ref()?.pattern.clone())
    }

    /// Prefix for build-script environment variables.
    pub fn env_prefix(&self) -> String {
        self.layered(|f| f.env.as_ref()?.prefix.clone())
            .unwrap_or_else(|| Self::DEFAULT_ENV_PREFIX.to_string())
    }

    /// Describe settings with precedence applied.
    pub fn describe_settings(&self) -> DescribeSettings {
        DescribeSettings {
            abbrev: self.abbrev(),
            always_long: self.always_long(),
            dirty_suffix: self.dirty_suffix(),
            pattern: self.describe_pattern(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_without_files() {
        let config = Config::load_from(None, None).unwrap();
        assert_eq!(config.abbrev(), 7);
        assert!(config.always_long());
        assert_eq!(config.dirty_suffix(), None);
        assert_eq!(config.describe_pattern(), None);
        assert_eq!(config.env_prefix(), "GIT_");
        assert_eq!(config.describe_settings(), DescribeSettings::default());
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(
            Some(&dir.path().join("nope.toml")),
            Some(&dir.path().join(".gitfacts.toml")),
        )
        .unwrap();
        assert!(config.global_file().is_none());
        assert!(config.project_file().is_none());
    }

    #[test]
    fn project_overrides_global_per_field() {
        let dir = TempDir::new().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[describe]\nabbrev = 12\ndirty_suffix = \"-wip\"\n[env]\nprefix = \"VCS_\"\n",
        );
        let project = write(&dir, ".gitfacts.toml", "[describe]\nabbrev = 9\n");

        let config = Config::load_from(Some(&global), Some(&project)).unwrap();
        assert_eq!(config.abbrev(), 9);
        assert_eq!(config.dirty_suffix().as_deref(), Some("-wip"));
        assert_eq!(config.env_prefix(), "VCS_");
        assert_eq!(config.project_file(), Some(project.as_path()));
    }

    #[test]
    fn load_reads_project_file_from_dir() {
        let dir = TempDir::new().unwrap();
        write(&dir, Config::PROJECT_FILE, "[describe]\nmatch = \"v*\"\n");

        let project = dir.path().join(Config::PROJECT_FILE);
        let config = Config::load_from(None, Some(&project)).unwrap();
        assert_eq!(config.describe_pattern().as_deref(), Some("v*"));
    }

    #[test]
    fn parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.toml", "[describe\n");
        let err = Config::load_from(None, Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn invalid_value_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", "[describe]\nabbrev = 2\n");
        let err = Config::load_from(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}

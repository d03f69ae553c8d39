//! TOML configuration for an import-control check.
//!
//! An `import-control.toml` holds an `[analyzer]` section and the policy
//! itself under `[import-control]`:
//!
//! ```toml
//! [analyzer]
//! root = "./src"
//! exclude = ["**/generated/**"]
//! path = ".*/main/.*"
//! severity = "error"
//!
//! [import-control]
//! pkg = "com.example"
//! rules = [{ access = "allow", pkg = "java" }]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use import_control_core::policy::config_dto::RootDto;
use import_control_core::policy::loader::{self, LoadError};
use import_control_core::{ImportControl, Severity};
use regex::Regex;

/// Validated check configuration.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Project root directory.
    pub root: PathBuf,
    /// Glob patterns to exclude.
    pub exclude: Vec<glob::Pattern>,
    /// Only files whose path contains a match are checked.
    pub path: Regex,
    /// Severity of reported violations.
    pub severity: Severity,
    /// The policy, absent when the file has no `[import-control]` table.
    pub policy: Option<Arc<ImportControl>>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_path() -> String {
    ".*".to_string()
}

fn default_severity() -> String {
    "error".to_string()
}

/// Errors when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML.
    #[error("invalid config: {message}")]
    Parse {
        /// Parse error detail.
        message: String,
    },
    /// An `[analyzer]` value is invalid.
    #[error("config validation: {0}")]
    Validation(String),
    /// The `[import-control]` policy is invalid.
    #[error("invalid policy: {0}")]
    Policy(#[from] LoadError),
}

impl CheckConfig {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if TOML is invalid, a pattern does not compile, or the
    /// policy fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        /// Wrapper to handle the `[analyzer]` section in the TOML.
        #[derive(Deserialize)]
        struct RawConfig {
            #[serde(default)]
            analyzer: AnalyzerSection,
            #[serde(rename = "import-control", default)]
            import_control: Option<RootDto>,
        }

        #[derive(Deserialize)]
        struct AnalyzerSection {
            #[serde(default = "default_root")]
            root: PathBuf,
            #[serde(default)]
            exclude: Vec<String>,
            #[serde(default = "default_path")]
            path: String,
            #[serde(default = "default_severity")]
            severity: String,
        }

        impl Default for AnalyzerSection {
            fn default() -> Self {
                Self {
                    root: default_root(),
                    exclude: Vec::new(),
                    path: default_path(),
                    severity: default_severity(),
                }
            }
        }

        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;

        let exclude = raw
            .analyzer
            .exclude
            .iter()
            .enumerate()
            .map(|(i, p)| {
                glob::Pattern::new(p).map_err(|e| {
                    ConfigError::Validation(format!("analyzer.exclude[{i}]: `{p}`: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Searched, not anchored: `main` selects any path containing it.
        let path = Regex::new(&raw.analyzer.path).map_err(|e| {
            ConfigError::Validation(format!("analyzer.path: `{}`: {e}", raw.analyzer.path))
        })?;

        let severity = raw
            .analyzer
            .severity
            .parse::<Severity>()
            .map_err(|e| ConfigError::Validation(format!("analyzer.severity: {e}")))?;

        let policy = raw
            .import_control
            .map(loader::load_root)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            root: raw.analyzer.root,
            exclude,
            path,
            severity,
            policy,
        })
    }

    /// Whether `path` is excluded by one of the `exclude` globs.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(path))
    }

    /// Adds exclude patterns given on the command line.
    ///
    /// # Errors
    ///
    /// Returns error if a pattern is not a valid glob.
    pub fn add_excludes<'a>(
        &mut self,
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ConfigError> {
        for p in patterns {
            let pattern = glob::Pattern::new(p)
                .map_err(|e| ConfigError::Validation(format!("exclude `{p}`: {e}")))?;
            self.exclude.push(pattern);
        }
        Ok(())
    }
}

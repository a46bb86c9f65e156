//! # Configuration
//!
//! Settings for the server and CLI, layered in this order (later wins):
//!
//! 1. Built-in defaults
//! 2. TOML file given with `--config`
//! 3. Environment variables
//! 4. Command-line flags (applied by the CLI)
//!
//! ## Environment Variables
//!
//! - `GRADEBOOK_DATABASE`: Path to the redb database file
//! - `GRADEBOOK_RATE_LIMIT`: Requests per second (0 disables)
//! - `GRADEBOOK_CORS_ORIGINS`: Comma-separated origins, or "*" for all
//! - `GRADEBOOK_SUBJECT_POLICY`: "append" or "replace"

use clap::ValueEnum;
use gradebook_core::{Gradebook, GradebookError, SubjectPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default rate limit: 100 requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Where the gradebook keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// redb database file (ACID, persistent).
    #[default]
    Redb,
    /// Process memory; lost on exit.
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redb => f.write_str("redb"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Top-level gradebook configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradebookConfig {
    /// Path to the redb database file.
    pub database: PathBuf,
    pub backend: Backend,
    /// Host to bind the HTTP server to.
    pub host: String,
    pub port: u16,
    /// Requests per second across all clients; 0 disables limiting.
    pub rate_limit: u32,
    /// Comma-separated allowed origins, "*" for any. Localhost when unset.
    pub cors_origins: Option<String>,
    /// What happens when a grade repeats a subject.
    pub subject_policy: SubjectPolicy,
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("gradebook.redb"),
            backend: Backend::default(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
            subject_policy: SubjectPolicy::default(),
        }
    }
}

impl GradebookConfig {
    /// Load the configuration file (if any) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, GradebookError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    GradebookError::IoError(format!(
                        "Cannot read config '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, GradebookError> {
        toml::from_str(text)
            .map_err(|e| GradebookError::InvalidInput(format!("Invalid config: {}", e)))
    }

    /// Apply `GRADEBOOK_*` overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), GradebookError> {
        if let Some(database) = lookup("GRADEBOOK_DATABASE").filter(|v| !v.is_empty()) {
            self.database = PathBuf::from(database);
        }
        if let Some(rate) = lookup("GRADEBOOK_RATE_LIMIT") {
            self.rate_limit = rate.trim().parse().map_err(|_| {
                GradebookError::InvalidInput(format!("GRADEBOOK_RATE_LIMIT '{}' is not a number", rate))
            })?;
        }
        if let Some(origins) = lookup("GRADEBOOK_CORS_ORIGINS") {
            self.cors_origins = Some(origins);
        }
        if let Some(policy) = lookup("GRADEBOOK_SUBJECT_POLICY") {
            self.subject_policy = policy.parse()?;
        }
        Ok(())
    }

    /// Open the configured gradebook.
    pub fn open_gradebook(&self) -> Result<Gradebook, GradebookError> {
        let book = match self.backend {
            Backend::Redb => Gradebook::with_redb(&self.database)?,
            Backend::Memory => Gradebook::new(),
        };
        Ok(book.with_policy(self.subject_policy))
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Configuration System
//!
//! Layered configuration for the kernel front end: merge-policy defaults, the
//! global config file, workspace config files, then `TILLER__*` environment
//! variables. Later sources override earlier ones.

use crate::error::SetupError;
use crate::logging::LoggingConfig;
use crate::manifest::MANIFEST_FILE;
use crate::suggest::DEFAULT_MAX_DISTANCE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TillerConfig {
    #[serde(default)]
    pub kernel: KernelConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Kernel construction options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Raw display mode: log lines are collected instead of styled
    #[serde(default)]
    pub raw: bool,

    /// Maximum edit distance for "did you mean" suggestions
    #[serde(default = "default_suggestion_distance")]
    pub suggestion_distance: usize,
}

fn default_suggestion_distance() -> usize {
    DEFAULT_MAX_DISTANCE
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            raw: false,
            suggestion_distance: default_suggestion_distance(),
        }
    }
}

/// Where the command manifest lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding the manifest; defaults to the workspace root
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    #[serde(default = "default_manifest_file")]
    pub file_name: String,
}

fn default_true() -> bool {
    true
}

fn default_manifest_file() -> String {
    MANIFEST_FILE.to_string()
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_dir: None,
            file_name: default_manifest_file(),
        }
    }
}

impl ManifestConfig {
    /// Manifest directory, relative paths resolved against `workspace_root`.
    pub fn resolve_base_dir(&self, workspace_root: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => workspace_root.join(dir),
            None => workspace_root.to_path_buf(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Kernel: {0}")]
    Kernel(String),

    #[error("Manifest: {0}")]
    Manifest(String),

    #[error("Logging: {0}")]
    Logging(String),
}

impl TillerConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.kernel.suggestion_distance == 0 {
            errors.push(ValidationError::Kernel(
                "suggestion_distance must be at least 1".to_string(),
            ));
        }

        let file_name = self.manifest.file_name.trim();
        if file_name.is_empty() {
            errors.push(ValidationError::Manifest(
                "file_name cannot be empty".to_string(),
            ));
        } else if Path::new(file_name).components().count() != 1 {
            errors.push(ValidationError::Manifest(format!(
                "file_name '{}' must be a bare file name",
                file_name
            )));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`TillerConfig`] from the layered sources
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    global_path: Option<PathBuf>,
    skip_global: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `path` as the global config file instead of the platform location.
    pub fn with_global_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_path = Some(path.into());
        self.skip_global = false;
        self
    }

    /// Ignore the global config file.
    pub fn without_global(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Load configuration for `workspace_root`.
    pub fn load(&self, workspace_root: &Path) -> Result<TillerConfig, SetupError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        if !self.skip_global {
            let global_path = self.global_path.clone().or_else(global_config_path);
            builder = sources::global_file::add_to_builder(builder, global_path.as_deref())?;
        }
        builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        builder = builder.add_source(
            config::Environment::with_prefix("TILLER")
                .separator("__")
                .try_parsing(true),
        );

        let config: TillerConfig = builder.build()?.try_deserialize()?;
        validated(config)
    }

    /// Load a single explicit file on top of the defaults.
    pub fn load_from_file(&self, path: &Path) -> Result<TillerConfig, SetupError> {
        if !path.exists() {
            return Err(SetupError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: TillerConfig = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        validated(config)
    }
}

fn validated(config: TillerConfig) -> Result<TillerConfig, SetupError> {
    config.validate().map_err(|errors| {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        SetupError::Config(joined)
    })?;
    Ok(config)
}

//! Merge rules: defaults, override order, conflict handling.

use crate::manifest::MANIFEST_FILE;
use crate::suggest::DEFAULT_MAX_DISTANCE;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("kernel.raw", false)?
        .set_default("kernel.suggestion_distance", DEFAULT_MAX_DISTANCE as u64)?
        .set_default("manifest.enabled", true)?
        .set_default("manifest.file_name", MANIFEST_FILE)
}

//! CLI route: run context that builds the kernel from configuration and
//! forwards the command tokens to it.

use crate::cli::builtins::{builtin_catalog, builtin_commands};
use crate::cli::help::render_listing;
use crate::config::{ConfigLoader, TillerConfig};
use crate::error::{KernelError, SetupError};
use crate::kernel::{hook_fn, GlobalFlagOptions, HookEvent, HookSubject, Kernel};
use crate::manifest::{Manifest, ManifestResolver};
use crate::metadata::{FlagType, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Runtime context for CLI execution: workspace root and the wired kernel.
pub struct RunContext {
    kernel: Kernel,
    workspace_root: PathBuf,
}

impl RunContext {
    /// Load configuration from an explicit file, or from the layered sources
    /// of `workspace_root`.
    pub fn load_config(
        workspace_root: &Path,
        config_path: Option<&Path>,
    ) -> Result<TillerConfig, SetupError> {
        match config_path {
            Some(path) => ConfigLoader::new().load_from_file(path),
            None => ConfigLoader::new().load(workspace_root),
        }
    }

    /// Build the kernel: built-in commands, the `--ansi` global flag, tracing
    /// hooks and, when enabled, the workspace manifest.
    pub async fn new(workspace_root: PathBuf, config: &TillerConfig) -> Result<Self, KernelError> {
        let mut kernel = Kernel::with_config(&config.kernel);
        kernel.register(builtin_commands())?;

        let logger = kernel.logger().clone();
        kernel.flag(
            "ansi",
            GlobalFlagOptions::of_type(FlagType::Boolean).describe("Toggle colored output"),
            move |value, _, _| {
                if let Value::Boolean(enabled) = value {
                    logger.set_ansi(*enabled);
                }
            },
        );

        kernel.after(
            HookEvent::Find,
            hook_fn(|subject: HookSubject<'_>| {
                match subject.definition() {
                    Some(definition) => {
                        tracing::debug!(command = %definition.name(), "command resolved")
                    }
                    None => tracing::debug!("no command resolved"),
                }
                Ok(())
            }),
        );
        kernel.before(
            HookEvent::Run,
            hook_fn(|subject: HookSubject<'_>| {
                if let Some(definition) = subject.definition() {
                    tracing::info!(command = %definition.name(), "command started");
                }
                Ok(())
            }),
        );

        if config.manifest.enabled {
            let base_dir = config.manifest.resolve_base_dir(&workspace_root);
            let manifest = Manifest::load_file(base_dir, &config.manifest.file_name).await?;
            if !manifest.is_empty() {
                tracing::debug!(commands = manifest.entries().len(), "attaching manifest");
                kernel.use_manifest(ManifestResolver::new(manifest, Arc::new(builtin_catalog())));
            }
        }

        Ok(Self {
            kernel,
            workspace_root,
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Dispatch `argv`. Without a command, returns the listing to print.
    pub async fn execute(&self, argv: &[String]) -> Result<Option<String>, KernelError> {
        let listing_only = argv.first().map_or(true, |token| token.starts_with('-'));
        let started = Instant::now();

        self.kernel.handle(argv).await?;
        if listing_only {
            return Ok(Some(render_listing(&self.kernel.summaries())));
        }

        tracing::info!(
            command = %argv[0],
            duration_ms = started.elapsed().as_millis() as u64,
            "command completed"
        );
        Ok(None)
    }
}

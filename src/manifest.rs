//! Manifest-backed lazy command resolution.
//!
//! A manifest is a JSON index of command name → loader reference, with cached
//! metadata for listing. Materializing the command is delegated to an injected
//! [`CommandLoader`]; resolved definitions are cached for the process.

use crate::command::CommandDefinition;
use crate::error::KernelError;
use crate::metadata::CommandMetadata;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default manifest file name, relative to the base directory.
pub const MANIFEST_FILE: &str = "tiller-manifest.json";

/// A lazily loadable command reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub command_path: String,
    /// Cached metadata, usable for listing without loading code
    #[serde(flatten)]
    pub metadata: CommandMetadata,
}

impl ManifestEntry {
    pub fn command_name(&self) -> &str {
        &self.metadata.name
    }
}

/// Parsed manifest file
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    base_dir: PathBuf,
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new(base_dir: impl Into<PathBuf>, entries: BTreeMap<String, ManifestEntry>) -> Self {
        Self {
            base_dir: base_dir.into(),
            entries,
        }
    }

    /// Read `<base_dir>/tiller-manifest.json`. A missing file is an empty manifest.
    pub async fn load(base_dir: impl Into<PathBuf>) -> Result<Self, KernelError> {
        Self::load_file(base_dir, MANIFEST_FILE).await
    }

    pub async fn load_file(
        base_dir: impl Into<PathBuf>,
        file_name: &str,
    ) -> Result<Self, KernelError> {
        let base_dir = base_dir.into();
        let path = base_dir.join(file_name);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no manifest file, using empty manifest");
                return Ok(Self::new(base_dir, BTreeMap::new()));
            }
            Err(e) => {
                return Err(KernelError::InvalidManifest {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let entries: BTreeMap<String, ManifestEntry> =
            serde_json::from_str(&contents).map_err(|e| KernelError::InvalidManifest {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(path = %path.display(), commands = entries.len(), "loaded manifest");
        Ok(Self::new(base_dir, entries))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn entries(&self) -> &BTreeMap<String, ManifestEntry> {
        &self.entries
    }

    /// Look up by command name, then by declared alias.
    pub fn find(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.get(name).or_else(|| {
            self.entries
                .values()
                .find(|entry| entry.metadata.aliases.iter().any(|a| a == name))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Materializes the command referenced by a manifest entry.
///
/// `Ok(None)` means the reference resolved but exposes no command.
#[async_trait]
pub trait CommandLoader: Send + Sync {
    async fn load(
        &self,
        base_dir: &Path,
        entry: &ManifestEntry,
    ) -> anyhow::Result<Option<CommandDefinition>>;
}

type Constructor = Arc<dyn Fn() -> CommandDefinition + Send + Sync>;

/// In-process loader: command paths map to definition constructors compiled
/// into the binary.
#[derive(Default, Clone)]
pub struct CatalogLoader {
    constructors: HashMap<String, Constructor>,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, command_path: impl AsRef<str>, constructor: F) -> Self
    where
        F: Fn() -> CommandDefinition + Send + Sync + 'static,
    {
        self.constructors
            .insert(normalize(command_path.as_ref()), Arc::new(constructor));
        self
    }
}

fn normalize(command_path: &str) -> String {
    command_path.trim_start_matches("./").to_string()
}

#[async_trait]
impl CommandLoader for CatalogLoader {
    async fn load(
        &self,
        _base_dir: &Path,
        entry: &ManifestEntry,
    ) -> anyhow::Result<Option<CommandDefinition>> {
        Ok(self
            .constructors
            .get(&normalize(&entry.command_path))
            .map(|constructor| constructor()))
    }
}

/// Resolves manifest entries through a loader, caching each result
pub struct ManifestResolver {
    manifest: Manifest,
    loader: Arc<dyn CommandLoader>,
    cache: RwLock<HashMap<String, Arc<CommandDefinition>>>,
}

impl ManifestResolver {
    pub fn new(manifest: Manifest, loader: Arc<dyn CommandLoader>) -> Self {
        Self {
            manifest,
            loader,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub async fn resolve(&self, entry: &ManifestEntry) -> Result<Arc<CommandDefinition>, KernelError> {
        let name = entry.command_name().to_string();
        if let Some(cached) = self.cache.read().get(&name) {
            return Ok(Arc::clone(cached));
        }

        let failure = |reason: String| KernelError::CommandLoadFailure {
            command_name: name.clone(),
            command_path: entry.command_path.clone(),
            reason,
        };

        let loaded = self
            .loader
            .load(self.manifest.base_dir(), entry)
            .await
            .map_err(|e| failure(format!("{:#}", e)))?
            .ok_or_else(|| failure("no command is exported by this path".to_string()))?;

        if loaded.name().trim().is_empty() {
            return Err(failure(format!(
                "\"{}\" does not define a command name",
                loaded.type_name()
            )));
        }
        loaded
            .metadata()
            .validate(loaded.type_name())
            .map_err(|e| failure(e.to_string()))?;

        let resolved = Arc::new(loaded);
        tracing::debug!(command = %name, path = %entry.command_path, "materialized manifest command");
        self.cache
            .write()
            .entry(name)
            .or_insert_with(|| Arc::clone(&resolved));
        Ok(resolved)
    }
}

//! Manifest-backed commands: file loading, lazy materialization, caching.

use crate::integration::test_utils::{argv, recording, simple, Record};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tiller::kernel::CommandSource;
use tiller::manifest::{
    CatalogLoader, CommandLoader, Manifest, ManifestEntry, ManifestResolver, MANIFEST_FILE,
};
use tiller::metadata::{ArgumentDefinition, CommandMetadata, Value};
use tiller::{CommandDefinition, Kernel, KernelError};

const MANIFEST: &str = r#"{
    "make:controller": {
        "commandName": "make:controller",
        "commandPath": "./commands/make_controller",
        "description": "Create a controller",
        "aliases": ["mc"],
        "args": [
            {"propertyName": "name", "name": "name", "type": "string", "required": true}
        ],
        "flags": [
            {"propertyName": "resource", "name": "resource", "type": "boolean"}
        ]
    },
    "broken": {
        "commandName": "broken",
        "commandPath": "./commands/missing"
    }
}"#;

fn write_manifest(dir: &Path, contents: &str) {
    std::fs::write(dir.join(MANIFEST_FILE), contents).unwrap();
}

/// Loader that counts materializations and records the base directory it saw
struct TrackingLoader {
    inner: CatalogLoader,
    loads: AtomicUsize,
    base_dirs: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl CommandLoader for TrackingLoader {
    async fn load(
        &self,
        base_dir: &Path,
        entry: &ManifestEntry,
    ) -> anyhow::Result<Option<CommandDefinition>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.base_dirs.lock().push(base_dir.to_path_buf());
        self.inner.load(base_dir, entry).await
    }
}

fn make_controller() -> (CommandDefinition, Record) {
    recording(
        CommandMetadata::new("make:controller")
            .argument(ArgumentDefinition::string("name"))
            .flag(tiller::metadata::FlagDefinition::boolean("resource")),
    )
}

async fn kernel_with_manifest(dir: &TempDir) -> (Kernel, Arc<TrackingLoader>, Record) {
    let (definition, record) = make_controller();
    let definition = Arc::new(definition);
    let shared = Arc::clone(&definition);
    let loader = Arc::new(TrackingLoader {
        inner: CatalogLoader::new().with("commands/make_controller", move || {
            let shared = Arc::clone(&shared);
            CommandDefinition::from_factory(
                shared.type_name().to_string(),
                shared.metadata().clone(),
                move |context| shared.instantiate(context),
            )
        }),
        loads: AtomicUsize::new(0),
        base_dirs: Mutex::new(Vec::new()),
    });

    let manifest = Manifest::load(dir.path()).await.unwrap();
    let mut kernel = Kernel::raw();
    kernel.use_manifest(ManifestResolver::new(manifest, loader.clone()));
    (kernel, loader, record)
}

#[tokio::test]
async fn test_manifest_command_is_loaded_once_and_run() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), MANIFEST);
    let (kernel, loader, record) = kernel_with_manifest(&dir).await;

    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);

    kernel
        .handle(&argv(&["make:controller", "users", "--resource"]))
        .await
        .unwrap();
    let first = kernel.find(&argv(&["make:controller"])).await.unwrap().unwrap();
    let again = kernel.find(&argv(&["mc"])).await.unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert_eq!(*loader.base_dirs.lock(), vec![dir.path().to_path_buf()]);

    let record = record.lock();
    assert_eq!(record.handled, 1);
    assert_eq!(record.values.get("name"), Some(&Value::from("users")));
    assert_eq!(record.values.get("resource"), Some(&Value::Boolean(true)));
}

#[tokio::test]
async fn test_unresolvable_entry_is_a_load_failure() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), MANIFEST);
    let (kernel, _, _) = kernel_with_manifest(&dir).await;

    let err = kernel.handle(&argv(&["broken"])).await.unwrap_err();
    assert_eq!(err.code(), "E_COMMAND_LOAD_FAILURE");
    match err {
        KernelError::CommandLoadFailure {
            command_name,
            command_path,
            ..
        } => {
            assert_eq!(command_name, "broken");
            assert_eq!(command_path, "./commands/missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

struct ErroringLoader;

#[async_trait]
impl CommandLoader for ErroringLoader {
    async fn load(
        &self,
        _base_dir: &Path,
        _entry: &ManifestEntry,
    ) -> anyhow::Result<Option<CommandDefinition>> {
        Err(anyhow::anyhow!("syntax error in module"))
    }
}

#[tokio::test]
async fn test_loader_errors_carry_the_reason() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), MANIFEST);
    let manifest = Manifest::load(dir.path()).await.unwrap();
    let resolver = ManifestResolver::new(manifest, Arc::new(ErroringLoader));

    let entry = resolver.manifest().find("broken").unwrap().clone();
    let err = resolver.resolve(&entry).await.unwrap_err();
    assert_eq!(err.code(), "E_COMMAND_LOAD_FAILURE");
    assert!(err.to_string().contains("syntax error in module"));
}

#[tokio::test]
async fn test_loaded_command_is_validated() {
    let dir = TempDir::new().unwrap();
    write_manifest(
        dir.path(),
        r#"{"copy": {"commandName": "copy", "commandPath": "./commands/copy"}}"#,
    );
    let loader = CatalogLoader::new().with("./commands/copy", || {
        recording(
            CommandMetadata::new("copy")
                .argument(ArgumentDefinition::spread("files"))
                .argument(ArgumentDefinition::string("destination")),
        )
        .0
    });
    let mut kernel = Kernel::raw();
    kernel.use_manifest(ManifestResolver::new(
        Manifest::load(dir.path()).await.unwrap(),
        Arc::new(loader),
    ));

    let err = kernel.find(&argv(&["copy"])).await.unwrap_err();
    assert_eq!(err.code(), "E_COMMAND_LOAD_FAILURE");
    assert!(err.to_string().contains("Spread argument \"files\""), "{}", err);
}

#[tokio::test]
async fn test_missing_manifest_file_means_no_commands() {
    let dir = TempDir::new().unwrap();
    let (kernel, loader, _) = kernel_with_manifest(&dir).await;

    assert!(kernel.find(&argv(&["make:controller"])).await.unwrap().is_none());
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_summaries_use_cached_metadata() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), MANIFEST);
    let (mut kernel, loader, _) = kernel_with_manifest(&dir).await;
    kernel.register([simple("broken")]).unwrap();

    let summaries = kernel.summaries();
    let names: Vec<_> = summaries
        .iter()
        .map(|s| (s.name.as_str(), s.source))
        .collect();
    assert_eq!(
        names,
        vec![
            ("broken", CommandSource::Local),
            ("make:controller", CommandSource::Manifest)
        ]
    );
    assert_eq!(summaries[1].description, "Create a controller");
    assert_eq!(summaries[1].aliases, vec!["mc"]);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
}

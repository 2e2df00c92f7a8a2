//! Execution pipeline: parsing, binding, handle.

use crate::integration::test_utils::{argv, failing, greet_metadata, recording};
use parking_lot::Mutex;
use std::sync::Arc;
use tiller::kernel::{hook_fn, HookEvent, HookSubject};
use tiller::metadata::{ArgumentDefinition, CommandMetadata, FlagDefinition, Value};
use tiller::parser::ParsedArgv;
use tiller::{Kernel, KernelError};

#[tokio::test]
async fn test_positional_argument_is_bound() {
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();

    let parsed: Arc<Mutex<Option<ParsedArgv>>> = Arc::default();
    let sink = Arc::clone(&parsed);
    kernel.before(
        HookEvent::Run,
        hook_fn(move |subject: HookSubject<'_>| {
            *sink.lock() = subject.parsed().cloned();
            Ok(())
        }),
    );

    kernel.handle(&argv(&["greet", "virk"])).await.unwrap();

    let parsed = parsed.lock().clone().unwrap();
    assert_eq!(parsed.positionals, vec!["virk"]);
    let record = record.lock();
    assert_eq!(record.values.get("name"), Some(&Value::from("virk")));
    assert_eq!(record.handled, 1);
    assert_eq!(record.raw, Some(true));
}

#[tokio::test]
async fn test_boolean_flag_forms_bind_booleans() {
    for tokens in [
        &["greet", "virk", "--admin=true"][..],
        &["greet", "virk", "--admin"][..],
        &["greet", "--admin", "virk"][..],
    ] {
        let mut kernel = Kernel::raw();
        let (greet, record) = recording(greet_metadata());
        kernel.register([greet]).unwrap();

        kernel.handle(&argv(tokens)).await.unwrap();
        let record = record.lock();
        assert_eq!(
            record.values.get("admin"),
            Some(&Value::Boolean(true)),
            "tokens: {:?}",
            tokens
        );
        assert_eq!(record.values.get("name"), Some(&Value::from("virk")));
    }
}

#[tokio::test]
async fn test_negated_boolean_flag_binds_false() {
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();

    kernel
        .handle(&argv(&["greet", "virk", "--no-admin"]))
        .await
        .unwrap();
    assert_eq!(
        record.lock().values.get("admin"),
        Some(&Value::Boolean(false))
    );
}

#[tokio::test]
async fn test_absent_flag_without_default_stays_unset() {
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();

    kernel.handle(&argv(&["greet", "virk"])).await.unwrap();
    assert!(!record.lock().values.contains_key("admin"));
}

#[tokio::test]
async fn test_missing_argument_fails_before_handle() {
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();
    let registered = Arc::clone(kernel.registry().get("greet").unwrap());

    for _ in 0..2 {
        let err = kernel.handle(&argv(&["greet", "--admin"])).await.unwrap_err();
        assert_eq!(err.code(), "E_MISSING_ARGUMENT");
        match err {
            KernelError::MissingArgument {
                argument_name,
                command,
            } => {
                assert_eq!(argument_name, "name");
                assert!(Arc::ptr_eq(&command, &registered));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    let record = record.lock();
    assert_eq!(record.handled, 0);
    assert!(record.values.is_empty());
}

#[tokio::test]
async fn test_spread_collects_remaining_tokens() {
    let mut kernel = Kernel::raw();
    let (copy, record) = recording(
        CommandMetadata::new("copy")
            .argument(ArgumentDefinition::string("destination"))
            .argument(ArgumentDefinition::spread("files")),
    );
    kernel.register([copy]).unwrap();

    kernel
        .handle(&argv(&["copy", "out", "a.txt", "b.txt", "c.txt"]))
        .await
        .unwrap();
    let record = record.lock();
    assert_eq!(record.values.get("destination"), Some(&Value::from("out")));
    assert_eq!(
        record.values.get("files"),
        Some(&Value::List(vec![
            "a.txt".to_string(),
            "b.txt".to_string(),
            "c.txt".to_string()
        ]))
    );
}

#[tokio::test]
async fn test_optional_arguments_may_be_omitted() {
    let mut kernel = Kernel::raw();
    let (make, record) = recording(
        CommandMetadata::new("make")
            .argument(ArgumentDefinition::string("name"))
            .argument(ArgumentDefinition::string("directory").optional()),
    );
    kernel.register([make]).unwrap();

    kernel.handle(&argv(&["make", "controller"])).await.unwrap();
    let record = record.lock();
    assert_eq!(record.values.get("name"), Some(&Value::from("controller")));
    assert!(!record.values.contains_key("directory"));
}

#[tokio::test]
async fn test_typed_flags_defaults_and_aliases() {
    let mut kernel = Kernel::raw();
    let (serve, record) = recording(
        CommandMetadata::new("serve")
            .flag(FlagDefinition::number("port").alias("p").default_value(3333.0))
            .flag(FlagDefinition::string("host").default_value("localhost"))
            .flag(FlagDefinition::array("watch"))
            .flag(FlagDefinition::num_array("retries")),
    );
    kernel.register([serve]).unwrap();

    kernel
        .handle(&argv(&[
            "serve",
            "-p",
            "8080",
            "--watch",
            "src",
            "--watch",
            "config",
            "--retries",
            "1",
            "--retries",
            "5",
        ]))
        .await
        .unwrap();

    let record = record.lock();
    assert_eq!(record.values.get("port"), Some(&Value::Number(8080.0)));
    assert_eq!(record.values.get("host"), Some(&Value::from("localhost")));
    assert_eq!(
        record.values.get("watch"),
        Some(&Value::List(vec!["src".to_string(), "config".to_string()]))
    );
    assert_eq!(
        record.values.get("retries"),
        Some(&Value::NumList(vec![1.0, 5.0]))
    );
}

#[tokio::test]
async fn test_unknown_flag_is_rejected() {
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();

    let err = kernel
        .handle(&argv(&["greet", "virk", "--bogus"]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E_INVALID_FLAG");
    assert_eq!(record.lock().handled, 0);
}

#[tokio::test]
async fn test_non_numeric_value_for_number_flag_is_rejected() {
    let mut kernel = Kernel::raw();
    let (serve, _) = recording(CommandMetadata::new("serve").flag(FlagDefinition::number("port")));
    kernel.register([serve]).unwrap();

    let err = kernel
        .handle(&argv(&["serve", "--port", "eighty"]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E_INVALID_FLAG");
}

#[tokio::test]
async fn test_command_failure_propagates_unchanged() {
    let mut kernel = Kernel::raw();
    let (deploy, record) = failing(CommandMetadata::new("deploy"), "remote rejected push");
    kernel.register([deploy]).unwrap();

    let after_runs = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&after_runs);
    kernel.after(
        HookEvent::Run,
        hook_fn(move |_subject: HookSubject<'_>| {
            *counter.lock() += 1;
            Ok(())
        }),
    );

    let err = kernel.handle(&argv(&["deploy"])).await.unwrap_err();
    assert_eq!(err.code(), "E_COMMAND_FAILED");
    assert_eq!(err.to_string(), "remote rejected push");
    assert_eq!(record.lock().handled, 1);
    assert_eq!(*after_runs.lock(), 0);
}

#[tokio::test]
async fn test_each_invocation_gets_a_fresh_instance() {
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();

    kernel.handle(&argv(&["greet", "virk"])).await.unwrap();
    kernel.exec("greet", &argv(&["romain"])).await.unwrap();

    let record = record.lock();
    assert_eq!(record.instances, 2);
    assert_eq!(record.handled, 2);
    assert_eq!(record.values.get("name"), Some(&Value::from("romain")));
}

#[tokio::test]
async fn test_exec_unknown_command() {
    let kernel = Kernel::raw();
    let err = kernel.exec("greet", &[]).await.unwrap_err();
    assert_eq!(err.code(), "E_COMMAND_NOT_FOUND");
}

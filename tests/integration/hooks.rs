//! Lifecycle hooks: ordering across suspension and failure propagation.

use crate::integration::test_utils::{argv, greet_metadata, recording};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tiller::kernel::{hook_fn, Hook, HookEvent, HookSubject};
use tiller::Kernel;

type Journal = Arc<Mutex<Vec<String>>>;

/// Yields to the scheduler before recording, to prove hooks are awaited in turn.
struct YieldingHook {
    journal: Journal,
    label: &'static str,
    yields: usize,
}

#[async_trait]
impl Hook for YieldingHook {
    async fn call(&self, _subject: HookSubject<'_>) -> anyhow::Result<()> {
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
        self.journal.lock().push(self.label.to_string());
        Ok(())
    }
}

fn yielding(journal: &Journal, label: &'static str, yields: usize) -> YieldingHook {
    YieldingHook {
        journal: Arc::clone(journal),
        label,
        yields,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_hooks_run_in_registration_order() {
    let journal: Journal = Arc::default();
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();

    kernel.before(HookEvent::Find, yielding(&journal, "before:find#1", 5));
    kernel.before(HookEvent::Find, yielding(&journal, "before:find#2", 0));
    kernel.after(HookEvent::Find, yielding(&journal, "after:find", 3));
    kernel.before(HookEvent::Run, yielding(&journal, "before:run#1", 4));
    kernel.before(HookEvent::Run, yielding(&journal, "before:run#2", 0));
    kernel.after(HookEvent::Run, yielding(&journal, "after:run", 2));

    kernel.handle(&argv(&["greet", "virk"])).await.unwrap();

    assert_eq!(
        *journal.lock(),
        vec![
            "before:find#1",
            "before:find#2",
            "after:find",
            "before:run#1",
            "before:run#2",
            "after:run",
        ]
    );
    assert_eq!(record.lock().handled, 1);
}

#[tokio::test]
async fn test_failing_before_run_hook_aborts_the_command() {
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();
    kernel.before(
        HookEvent::Run,
        hook_fn(|_subject: HookSubject<'_>| Err(anyhow::anyhow!("not authorized"))),
    );

    let err = kernel.handle(&argv(&["greet", "virk"])).await.unwrap_err();
    assert_eq!(err.code(), "E_HOOK_FAILED");
    assert_eq!(err.to_string(), "before run hook failed: not authorized");
    assert_eq!(record.lock().handled, 0);
}

#[tokio::test]
async fn test_failing_find_hook_propagates() {
    let mut kernel = Kernel::raw();
    kernel.after(
        HookEvent::Find,
        hook_fn(|_subject: HookSubject<'_>| Err(anyhow::anyhow!("lookup audit failed"))),
    );

    let err = kernel.find(&argv(&["anything"])).await.unwrap_err();
    assert_eq!(err.code(), "E_HOOK_FAILED");
}

#[tokio::test]
async fn test_run_hooks_observe_the_bound_command() {
    let mut kernel = Kernel::raw();
    let (greet, record) = recording(greet_metadata());
    kernel.register([greet]).unwrap();

    let observed = Arc::new(Mutex::new(Vec::new()));
    let before = Arc::clone(&observed);
    let rec = Arc::clone(&record);
    kernel.before(
        HookEvent::Run,
        hook_fn(move |subject: HookSubject<'_>| {
            let name = subject.definition().map(|d| d.name().to_string());
            let recorded = rec.lock();
            before
                .lock()
                .push((name, recorded.values.len(), recorded.handled));
            Ok(())
        }),
    );

    kernel
        .handle(&argv(&["greet", "virk", "--admin"]))
        .await
        .unwrap();
    assert_eq!(*observed.lock(), vec![(Some("greet".to_string()), 2, 0)]);
}

//! Lifecycle hooks around command resolution (`find`) and execution (`run`).

use crate::command::{Command, CommandDefinition};
use crate::error::KernelError;
use crate::parser::ParsedArgv;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Find,
    Run,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::Find => "find",
            HookEvent::Run => "run",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Before,
    After,
}

impl HookPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPhase::Before => "before",
            HookPhase::After => "after",
        }
    }
}

/// What a hook observes
#[derive(Clone, Copy)]
pub enum HookSubject<'a> {
    /// Result of resolution; `None` when no command matched
    Find(Option<&'a CommandDefinition>),
    /// The bound instance about to run, or that just ran
    Run {
        definition: &'a CommandDefinition,
        command: &'a dyn Command,
        parsed: &'a ParsedArgv,
    },
}

impl<'a> HookSubject<'a> {
    pub fn definition(&self) -> Option<&'a CommandDefinition> {
        match self {
            HookSubject::Find(definition) => *definition,
            HookSubject::Run { definition, .. } => Some(*definition),
        }
    }

    /// Parsed input of the run; `None` for `find`
    pub fn parsed(&self) -> Option<&'a ParsedArgv> {
        match self {
            HookSubject::Find(_) => None,
            HookSubject::Run { parsed, .. } => Some(*parsed),
        }
    }
}

/// An observer callback; may suspend.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn call(&self, subject: HookSubject<'_>) -> anyhow::Result<()>;
}

/// Adapter returned by [`hook_fn`]
pub struct FnHook<F>(F);

/// Wrap a synchronous closure as a [`Hook`].
pub fn hook_fn<F>(f: F) -> FnHook<F>
where
    F: for<'a> Fn(HookSubject<'a>) -> anyhow::Result<()> + Send + Sync,
{
    FnHook(f)
}

#[async_trait]
impl<F> Hook for FnHook<F>
where
    F: for<'a> Fn(HookSubject<'a>) -> anyhow::Result<()> + Send + Sync,
{
    async fn call(&self, subject: HookSubject<'_>) -> anyhow::Result<()> {
        (self.0)(subject)
    }
}

/// Ordered hooks per event and phase
#[derive(Default)]
pub struct HookRegistry {
    before_find: Vec<Arc<dyn Hook>>,
    after_find: Vec<Arc<dyn Hook>>,
    before_run: Vec<Arc<dyn Hook>>,
    after_run: Vec<Arc<dyn Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, phase: HookPhase, event: HookEvent, hook: Arc<dyn Hook>) {
        self.slot_mut(phase, event).push(hook);
    }

    pub fn len(&self, phase: HookPhase, event: HookEvent) -> usize {
        self.slot(phase, event).len()
    }

    /// Await every hook for `(phase, event)` in registration order. The first
    /// failure stops the sequence.
    pub async fn execute(
        &self,
        phase: HookPhase,
        event: HookEvent,
        subject: HookSubject<'_>,
    ) -> Result<(), KernelError> {
        for hook in self.slot(phase, event) {
            hook.call(subject)
                .await
                .map_err(|source| KernelError::HookFailed {
                    phase: phase.as_str(),
                    event: event.as_str(),
                    source,
                })?;
        }
        Ok(())
    }

    fn slot(&self, phase: HookPhase, event: HookEvent) -> &Vec<Arc<dyn Hook>> {
        match (phase, event) {
            (HookPhase::Before, HookEvent::Find) => &self.before_find,
            (HookPhase::After, HookEvent::Find) => &self.after_find,
            (HookPhase::Before, HookEvent::Run) => &self.before_run,
            (HookPhase::After, HookEvent::Run) => &self.after_run,
        }
    }

    fn slot_mut(&mut self, phase: HookPhase, event: HookEvent) -> &mut Vec<Arc<dyn Hook>> {
        match (phase, event) {
            (HookPhase::Before, HookEvent::Find) => &mut self.before_find,
            (HookPhase::After, HookEvent::Find) => &mut self.after_find,
            (HookPhase::Before, HookEvent::Run) => &mut self.before_run,
            (HookPhase::After, HookEvent::Run) => &mut self.after_run,
        }
    }
}

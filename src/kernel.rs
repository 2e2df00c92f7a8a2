//! Kernel: owns the command registry, the optional manifest, global flags and
//! lifecycle hooks, and drives resolution and execution of one invocation.
//!
//! Setup (`register`, `use_manifest`, `flag`, `before`, `after`) takes
//! `&mut self`; `find`, `handle` and `exec` only read the kernel.

pub mod global_flags;
pub mod hooks;
pub mod registry;

pub use global_flags::{GlobalFlagCallback, GlobalFlagOptions, GlobalFlags};
pub use hooks::{hook_fn, FnHook, Hook, HookEvent, HookPhase, HookRegistry, HookSubject};
pub use registry::CommandRegistry;

use crate::binder;
use crate::command::{CommandContext, CommandDefinition};
use crate::config::KernelConfig;
use crate::error::KernelError;
use crate::manifest::ManifestResolver;
use crate::metadata::Value;
use crate::parser::{self, ParsedArgv};
use crate::suggest::suggest_within;
use crate::ui::{DialoguerResponder, Logger, Prompt, PromptBus, PromptEvent, PromptResponder, PromptTrap};
use std::collections::BTreeSet;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// Where a listed command comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Local,
    Manifest,
}

/// Listing entry; manifest entries use cached metadata and are not loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub source: CommandSource,
}

pub struct Kernel {
    registry: CommandRegistry,
    manifest: Option<ManifestResolver>,
    hooks: HookRegistry,
    global_flags: GlobalFlags,
    raw: bool,
    suggestion_distance: usize,
    logger: Logger,
    prompt: Prompt,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Self::with_config(&KernelConfig::default())
    }

    /// Kernel in raw display mode: plain collected log lines and scripted
    /// prompts.
    pub fn raw() -> Self {
        Self::with_config(&KernelConfig {
            raw: true,
            ..KernelConfig::default()
        })
    }

    pub fn with_config(config: &KernelConfig) -> Self {
        let responder: Arc<dyn PromptResponder> = if config.raw {
            Arc::new(PromptTrap::new())
        } else {
            Arc::new(DialoguerResponder)
        };
        Self {
            registry: CommandRegistry::new(),
            manifest: None,
            hooks: HookRegistry::new(),
            global_flags: GlobalFlags::default(),
            raw: config.raw,
            suggestion_distance: config.suggestion_distance,
            logger: Logger::new(config.raw),
            prompt: Prompt::new(responder),
        }
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Logger shared with every command instance.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Replace the prompt responder. Subscriptions from [`Self::prompt_events`]
    /// stay connected.
    pub fn set_prompt_responder(&mut self, responder: Arc<dyn PromptResponder>) {
        self.prompt = self.prompt.clone().with_responder(responder);
    }

    /// Subscribe to prompt events emitted by command instances.
    pub fn prompt_events(&mut self) -> Receiver<PromptEvent> {
        let (bus, receiver) = PromptBus::new_pair();
        self.prompt = self.prompt.clone().with_bus(bus);
        receiver
    }

    /// Register command definitions in order. Stops at the first invalid one;
    /// definitions before it stay registered.
    pub fn register<I>(&mut self, commands: I) -> Result<(), KernelError>
    where
        I: IntoIterator<Item = CommandDefinition>,
    {
        for definition in commands {
            let name = definition.name().to_string();
            self.registry.register(definition)?;
            tracing::debug!(command = %name, "registered command");
        }
        Ok(())
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Attach a manifest as a lower-priority command source.
    pub fn use_manifest(&mut self, resolver: ManifestResolver) {
        self.manifest = Some(resolver);
    }

    pub fn flag<F>(&mut self, name: &str, options: GlobalFlagOptions, callback: F)
    where
        F: Fn(&Value, &ParsedArgv, Option<&CommandDefinition>) + Send + Sync + 'static,
    {
        self.global_flags.register(name, options, Arc::new(callback));
    }

    pub fn global_flags(&self) -> &GlobalFlags {
        &self.global_flags
    }

    pub fn before<H: Hook + 'static>(&mut self, event: HookEvent, hook: H) {
        self.hooks.add(HookPhase::Before, event, Arc::new(hook));
    }

    pub fn after<H: Hook + 'static>(&mut self, event: HookEvent, hook: H) {
        self.hooks.add(HookPhase::After, event, Arc::new(hook));
    }

    /// Local names first, then manifest names not shadowed locally.
    pub fn command_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let local = self.registry.names();
        let manifest = self
            .manifest
            .iter()
            .flat_map(|resolver| resolver.manifest().entries().keys().map(String::as_str));
        local
            .chain(manifest)
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect()
    }

    /// Close matches for an unknown command name.
    pub fn suggestions(&self, name: &str) -> Vec<String> {
        let names = self.command_names();
        suggest_within(name, names.iter().map(String::as_str), self.suggestion_distance)
    }

    pub fn summaries(&self) -> Vec<CommandSummary> {
        let mut summaries: Vec<CommandSummary> = self
            .registry
            .definitions()
            .map(|definition| {
                let metadata = definition.metadata();
                CommandSummary {
                    name: metadata.name.clone(),
                    description: metadata.description.clone(),
                    aliases: metadata.aliases.clone(),
                    source: CommandSource::Local,
                }
            })
            .collect();

        if let Some(resolver) = &self.manifest {
            for entry in resolver.manifest().entries().values() {
                if self.registry.contains(entry.command_name()) {
                    continue;
                }
                summaries.push(CommandSummary {
                    name: entry.metadata.name.clone(),
                    description: entry.metadata.description.clone(),
                    aliases: entry.metadata.aliases.clone(),
                    source: CommandSource::Manifest,
                });
            }
        }

        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// Resolve the command named by the first token of `argv_head`.
    ///
    /// Local registrations win over manifest entries. Both `find` hook phases
    /// observe the final result; `Ok(None)` means no command matched.
    pub async fn find(
        &self,
        argv_head: &[String],
    ) -> Result<Option<Arc<CommandDefinition>>, KernelError> {
        let resolved = match argv_head.first() {
            Some(name) => self.resolve(name).await?,
            None => None,
        };

        let subject = HookSubject::Find(resolved.as_deref());
        self.hooks
            .execute(HookPhase::Before, HookEvent::Find, subject)
            .await?;
        self.hooks
            .execute(HookPhase::After, HookEvent::Find, subject)
            .await?;
        Ok(resolved)
    }

    async fn resolve(&self, name: &str) -> Result<Option<Arc<CommandDefinition>>, KernelError> {
        if let Some(definition) = self.registry.get(name) {
            tracing::debug!(command = %name, "resolved local command");
            return Ok(Some(Arc::clone(definition)));
        }

        let Some(resolver) = &self.manifest else {
            return Ok(None);
        };
        match resolver.manifest().find(name) {
            Some(entry) => resolver.resolve(entry).await.map(Some),
            None => Ok(None),
        }
    }

    /// Dispatch one invocation (argv without the program name).
    pub async fn handle(&self, argv: &[String]) -> Result<(), KernelError> {
        let Some(command_name) = argv.first().filter(|token| !token.starts_with('-')) else {
            let parsed = parser::parse_globals(self.global_flags.definitions(), argv)?;
            self.global_flags.apply(&parsed, None);
            return Ok(());
        };

        let definition = self
            .find(&argv[..1])
            .await?
            .ok_or_else(|| KernelError::CommandNotFound {
                name: command_name.clone(),
                suggestions: self.suggestions(command_name),
            })?;
        self.run(definition, &argv[1..]).await
    }

    /// Run a command by name with explicit arguments.
    pub async fn exec(&self, name: &str, args: &[String]) -> Result<(), KernelError> {
        let definition = self
            .find(&[name.to_string()])
            .await?
            .ok_or_else(|| KernelError::CommandNotFound {
                name: name.to_string(),
                suggestions: self.suggestions(name),
            })?;
        self.run(definition, args).await
    }

    async fn run(
        &self,
        definition: Arc<CommandDefinition>,
        rest: &[String],
    ) -> Result<(), KernelError> {
        let mut command = definition.instantiate(CommandContext {
            raw: self.raw,
            logger: self.logger.clone(),
            prompt: self.prompt.clone(),
        });

        let metadata = definition.metadata();
        let parsed = parser::parse_command(
            &metadata.name,
            &metadata.flags,
            self.global_flags.definitions(),
            rest,
        )?;
        tracing::debug!(command = %metadata.name, positionals = parsed.positionals.len(), "parsed arguments");

        let bindings = binder::plan(&definition, &parsed)?;
        binder::apply(&definition, bindings, command.as_mut())?;
        self.global_flags.apply(&parsed, Some(definition.as_ref()));

        self.hooks
            .execute(
                HookPhase::Before,
                HookEvent::Run,
                HookSubject::Run {
                    definition: &definition,
                    command: command.as_ref(),
                    parsed: &parsed,
                },
            )
            .await?;

        tracing::debug!(command = %metadata.name, "running command");
        command.handle().await.map_err(KernelError::Command)?;

        self.hooks
            .execute(
                HookPhase::After,
                HookEvent::Run,
                HookSubject::Run {
                    definition: &definition,
                    command: command.as_ref(),
                    parsed: &parsed,
                },
            )
            .await
    }
}

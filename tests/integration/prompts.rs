//! Prompt capability handed to commands.

use crate::integration::test_utils::argv;
use async_trait::async_trait;
use std::sync::Arc;
use tiller::error::{BindError, PromptError};
use tiller::metadata::{CommandMetadata, Value};
use tiller::ui::{AskOptions, Logger, Prompt, PromptAnswer, PromptEvent, PromptKind, PromptTrap};
use tiller::{Command, CommandContext, CommandDefinition, CommandType, Kernel};

/// Asks for a name and an age, logs a welcome.
struct Onboard {
    logger: Logger,
    prompt: Prompt,
}

impl CommandType for Onboard {
    fn metadata() -> CommandMetadata {
        CommandMetadata::new("onboard").description("Interactive onboarding")
    }

    fn create(context: CommandContext) -> Self {
        Self {
            logger: context.logger,
            prompt: context.prompt,
        }
    }
}

#[async_trait]
impl Command for Onboard {
    fn set(&mut self, _property: &str, _value: Value) -> Result<(), BindError> {
        Err(BindError::UnknownProperty)
    }

    async fn handle(&mut self) -> anyhow::Result<()> {
        let name = self
            .prompt
            .ask("What is your name?", AskOptions::default().default_value("guest"))
            .await?;
        let age = self
            .prompt
            .ask(
                "How old are you?",
                AskOptions::default().validate(|answer| answer.parse::<u8>().is_ok()),
            )
            .await?;
        self.logger.success(format!("Welcome {} ({})", name, age));
        Ok(())
    }
}

#[tokio::test]
async fn test_trapped_answers_drive_the_command() {
    let trap = Arc::new(PromptTrap::new());
    trap.trap("What is your name?", PromptAnswer::Text(String::new()))
        .trap("How old are you?", PromptAnswer::Text("30".to_string()));

    let mut kernel = Kernel::raw();
    kernel.set_prompt_responder(trap.clone());
    let events = kernel.prompt_events();
    kernel.register([CommandDefinition::of::<Onboard>()]).unwrap();

    kernel.handle(&argv(&["onboard"])).await.unwrap();

    assert_eq!(kernel.logger().logs(), vec!["[ success ] Welcome guest (30)"]);
    assert_eq!(trap.pending(), 0);
    let asked: Vec<_> = events
        .try_iter()
        .filter_map(|event| match event {
            PromptEvent::Asked(request) => Some((request.kind, request.message)),
            PromptEvent::Rejected { .. } => None,
        })
        .collect();
    assert_eq!(
        asked,
        vec![
            (PromptKind::Input, "What is your name?".to_string()),
            (PromptKind::Input, "How old are you?".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_failed_validation_surfaces_enter_the_value() {
    let trap = Arc::new(PromptTrap::new());
    trap.trap("What is your name?", PromptAnswer::Text("virk".to_string()))
        .trap("How old are you?", PromptAnswer::Text("old".to_string()));

    let mut kernel = Kernel::raw();
    kernel.set_prompt_responder(trap);
    let events = kernel.prompt_events();
    kernel.register([CommandDefinition::of::<Onboard>()]).unwrap();

    let err = kernel.handle(&argv(&["onboard"])).await.unwrap_err();
    assert_eq!(err.code(), "E_COMMAND_FAILED");
    assert_eq!(err.to_string(), "Enter the value");

    let rejected: Vec<_> = events
        .try_iter()
        .filter(|event| matches!(event, PromptEvent::Rejected { .. }))
        .collect();
    assert_eq!(
        rejected,
        vec![PromptEvent::Rejected {
            message: "How old are you?".to_string(),
            reason: "Enter the value".to_string(),
        }]
    );
    assert!(kernel.logger().logs().is_empty());
}

#[tokio::test]
async fn test_untrapped_prompt_fails() {
    let mut kernel = Kernel::raw();
    kernel.register([CommandDefinition::of::<Onboard>()]).unwrap();

    let err = kernel.handle(&argv(&["onboard"])).await.unwrap_err();
    match err {
        tiller::KernelError::Command(source) => {
            assert_eq!(
                source.downcast_ref::<PromptError>(),
                Some(&PromptError::Untrapped("What is your name?".to_string()))
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_events_survive_responder_swap() {
    let trap = Arc::new(PromptTrap::new());
    trap.trap("What is your name?", PromptAnswer::Text("virk".to_string()))
        .trap("How old are you?", PromptAnswer::Text("32".to_string()));

    let mut kernel = Kernel::raw();
    let events = kernel.prompt_events();
    kernel.set_prompt_responder(trap);
    kernel.register([CommandDefinition::of::<Onboard>()]).unwrap();

    kernel.handle(&argv(&["onboard"])).await.unwrap();

    assert_eq!(kernel.logger().logs(), vec!["[ success ] Welcome virk (32)"]);
    let asked = events
        .try_iter()
        .filter(|event| matches!(event, PromptEvent::Asked(_)))
        .count();
    assert_eq!(asked, 2);
}

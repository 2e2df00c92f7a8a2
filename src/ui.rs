//! Terminal capabilities exposed to commands: leveled logging and prompts.

pub mod logger;
pub mod prompt;

pub use logger::{LogLevel, LogLine, Logger};
pub use prompt::{
    AskOptions, DialoguerResponder, Prompt, PromptAnswer, PromptBus, PromptEvent, PromptKind,
    PromptRequest, PromptResponder, PromptTrap, ENTER_THE_VALUE,
};

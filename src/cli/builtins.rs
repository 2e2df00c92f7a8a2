//! Built-in commands shipped with the `tiller` binary.

use crate::command::{Command, CommandContext, CommandDefinition, CommandType};
use crate::error::BindError;
use crate::manifest::CatalogLoader;
use crate::metadata::{ArgumentDefinition, CommandMetadata, FlagDefinition, Value};
use crate::ui::Logger;
use async_trait::async_trait;

/// Greets a user by name.
const MAX_GREETINGS: u32 = 100;

pub struct Greet {
    logger: Logger,
    name: String,
    admin: bool,
    times: f64,
}

impl CommandType for Greet {
    fn metadata() -> CommandMetadata {
        CommandMetadata::new("greet")
            .description("Greet a user")
            .alias("hi")
            .argument(ArgumentDefinition::string("name").describe("Who to greet"))
            .flag(FlagDefinition::boolean("admin").describe("Greet as an administrator"))
            .flag(
                FlagDefinition::number("times")
                    .alias("t")
                    .default_value(1.0)
                    .describe("How many greetings to print"),
            )
    }

    fn create(context: CommandContext) -> Self {
        Self {
            logger: context.logger,
            name: String::new(),
            admin: false,
            times: 1.0,
        }
    }
}

#[async_trait]
impl Command for Greet {
    fn set(&mut self, property: &str, value: Value) -> Result<(), BindError> {
        match property {
            "name" => self.name = value.try_into()?,
            "admin" => self.admin = value.try_into()?,
            "times" => self.times = value.try_into()?,
            _ => return Err(BindError::UnknownProperty),
        }
        Ok(())
    }

    async fn handle(&mut self) -> anyhow::Result<()> {
        if !(0.0..=MAX_GREETINGS as f64).contains(&self.times) || self.times.fract() != 0.0 {
            anyhow::bail!("--times must be a whole number between 0 and {}", MAX_GREETINGS);
        }
        for _ in 0..self.times as u32 {
            self.logger.success(format!("Hello {}", self.name));
        }
        if self.admin {
            self.logger.info(format!("{} has administrator access", self.name));
        }
        Ok(())
    }
}

/// Prints its arguments.
pub struct Echo {
    logger: Logger,
    words: Vec<String>,
    upper: bool,
    separator: String,
}

impl CommandType for Echo {
    fn metadata() -> CommandMetadata {
        CommandMetadata::new("echo")
            .description("Print the given words")
            .argument(
                ArgumentDefinition::spread("words")
                    .optional()
                    .describe("Words to print"),
            )
            .flag(FlagDefinition::boolean("upper").alias("u").describe("Uppercase the output"))
            .flag(
                FlagDefinition::string("separator")
                    .default_value(" ")
                    .describe("Separator placed between words"),
            )
    }

    fn create(context: CommandContext) -> Self {
        Self {
            logger: context.logger,
            words: Vec::new(),
            upper: false,
            separator: " ".to_string(),
        }
    }
}

#[async_trait]
impl Command for Echo {
    fn set(&mut self, property: &str, value: Value) -> Result<(), BindError> {
        match property {
            "words" => self.words = value.try_into()?,
            "upper" => self.upper = value.try_into()?,
            "separator" => self.separator = value.try_into()?,
            _ => return Err(BindError::UnknownProperty),
        }
        Ok(())
    }

    async fn handle(&mut self) -> anyhow::Result<()> {
        let line = self.words.join(&self.separator);
        let line = if self.upper { line.to_uppercase() } else { line };
        self.logger.info(line);
        Ok(())
    }
}

/// Definitions registered eagerly by the binary.
pub fn builtin_commands() -> Vec<CommandDefinition> {
    vec![CommandDefinition::of::<Greet>(), CommandDefinition::of::<Echo>()]
}

/// Loader for manifest entries pointing at built-in command paths.
pub fn builtin_catalog() -> CatalogLoader {
    CatalogLoader::new()
        .with("commands/greet", CommandDefinition::of::<Greet>)
        .with("commands/echo", CommandDefinition::of::<Echo>)
}
